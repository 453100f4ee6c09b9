//! Record plumbing shared by the repositories.
//!
//! Rows are written without an `id` field; the record id (`table:key`) carries
//! the identity. Reads deserialize into [`Record`] and rebuild the domain type
//! from the key.

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use ulid::Ulid;

use crate::DbError;

/// A row as SurrealDB returns it.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Record<T> {
    pub id: Thing,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    /// The raw key part of the record id.
    pub fn key(&self) -> String {
        self.id.id.to_raw()
    }

    /// The key parsed as a ULID.
    pub fn ulid(&self) -> Result<Ulid, DbError> {
        let key = self.key();
        Ulid::from_string(&key)
            .map_err(|e| DbError::Query(format!("Invalid record id {}: {}", self.id, e)))
    }
}
