//! CSV directory row store
//!
//! `sessions.csv` is only ever appended to. `users.csv` is rewritten through a
//! temporary file and renamed into place.

use crate::error::InsightError;
use crate::store::users::UserSummary;
use crate::store::RowStore;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

pub const SESSIONS_FILE: &str = "sessions.csv";
pub const USERS_FILE: &str = "users.csv";

/// Row store backed by two CSV files in a directory
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Open (and create if needed) a store directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, InsightError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.dir.join(SESSIONS_FILE)
    }

    pub fn users_path(&self) -> PathBuf {
        self.dir.join(USERS_FILE)
    }

    /// Number of session rows, header excluded
    pub fn session_row_count(&self) -> Result<usize, InsightError> {
        let path = self.sessions_path();
        if !path.exists() {
            return Ok(0);
        }
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let mut count = 0;
        for record in reader.records() {
            record?;
            count += 1;
        }
        Ok(count)
    }

    fn append(&self, record: &[String]) -> Result<(), InsightError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.sessions_path())?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(record)?;
        writer.flush()?;
        Ok(())
    }
}

impl RowStore for CsvStore {
    fn session_header(&self) -> Result<Option<Vec<String>>, InsightError> {
        let path = self.sessions_path();
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
        match reader.records().next() {
            Some(record) => Ok(Some(record?.iter().map(str::to_string).collect())),
            None => Ok(None),
        }
    }

    fn write_session_header(&mut self, header: &[String]) -> Result<(), InsightError> {
        if self.session_header()?.is_some() {
            return Err(InsightError::StoreError(format!(
                "{} already has a header",
                self.sessions_path().display()
            )));
        }
        self.append(header)
    }

    fn append_session_row(&mut self, row: &[String]) -> Result<(), InsightError> {
        self.append(row)
    }

    fn load_users(&self) -> Result<Vec<UserSummary>, InsightError> {
        let path = self.users_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(path)?;
        let mut users = Vec::new();
        for record in reader.deserialize() {
            users.push(record?);
        }
        Ok(users)
    }

    fn save_users(&mut self, users: &[UserSummary]) -> Result<(), InsightError> {
        let tmp = self.dir.join(format!("{USERS_FILE}.tmp"));
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            for user in users {
                writer.serialize(user)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, self.users_path())?;
        Ok(())
    }
}
