//! In-memory row store

use crate::error::InsightError;
use crate::store::users::UserSummary;
use crate::store::RowStore;

/// Row store kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    users: Vec<UserSummary>,
    header_writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session rows, header excluded
    pub fn session_rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn users(&self) -> &[UserSummary] {
        &self.users
    }

    /// How many times the header has been written
    pub fn header_writes(&self) -> usize {
        self.header_writes
    }
}

impl RowStore for MemoryStore {
    fn session_header(&self) -> Result<Option<Vec<String>>, InsightError> {
        Ok(self.header.clone())
    }

    fn write_session_header(&mut self, header: &[String]) -> Result<(), InsightError> {
        if self.header.is_some() {
            return Err(InsightError::StoreError(
                "session header already written".to_string(),
            ));
        }
        self.header = Some(header.to_vec());
        self.header_writes += 1;
        Ok(())
    }

    fn append_session_row(&mut self, row: &[String]) -> Result<(), InsightError> {
        self.rows.push(row.to_vec());
        Ok(())
    }

    fn load_users(&self) -> Result<Vec<UserSummary>, InsightError> {
        Ok(self.users.clone())
    }

    fn save_users(&mut self, users: &[UserSummary]) -> Result<(), InsightError> {
        self.users = users.to_vec();
        Ok(())
    }
}
