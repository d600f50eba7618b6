use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{new_id, now_timestamp, Database};
use crate::error::StoreError;

/// An application that originates transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSourceRow {
    pub app_source_id: String,
    pub app_source_name: String,
    pub app_source_date_created: String,
}

impl AppSourceRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            app_source_id: row.get(0)?,
            app_source_name: row.get(1)?,
            app_source_date_created: row.get(2)?,
        })
    }
}

impl Database {
    pub fn create_app_source(&self, name: &str) -> Result<AppSourceRow, StoreError> {
        self.create_app_source_with_id(&new_id(), name)
    }

    /// Insert an app source under a caller-chosen id.
    pub fn create_app_source_with_id(
        &self,
        app_source_id: &str,
        name: &str,
    ) -> Result<AppSourceRow, StoreError> {
        let conn = self.conn()?;
        let now = now_timestamp();

        conn.execute(
            "INSERT INTO app_source_table (app_source_id, app_source_name, app_source_date_created) VALUES (?1, ?2, ?3)",
            params![app_source_id, name, now],
        )?;

        Ok(AppSourceRow {
            app_source_id: app_source_id.to_string(),
            app_source_name: name.to_string(),
            app_source_date_created: now,
        })
    }

    pub fn get_app_source(&self, app_source_id: &str) -> Result<Option<AppSourceRow>, StoreError> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                "SELECT app_source_id, app_source_name, app_source_date_created FROM app_source_table WHERE app_source_id = ?1",
                params![app_source_id],
                AppSourceRow::from_row,
            )
            .optional()?;

        Ok(row)
    }

    /// All app sources, oldest first.
    pub fn list_app_sources(&self) -> Result<Vec<AppSourceRow>, StoreError> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT app_source_id, app_source_name, app_source_date_created FROM app_source_table ORDER BY app_source_date_created ASC, rowid ASC",
        )?;
        let rows = stmt
            .query_map([], AppSourceRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
