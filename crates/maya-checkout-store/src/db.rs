use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS app_source_table (
    app_source_id TEXT PRIMARY KEY,
    app_source_name TEXT NOT NULL,
    app_source_date_created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transaction_table (
    transaction_id TEXT PRIMARY KEY,
    transaction_reference_id TEXT UNIQUE NOT NULL,
    transaction_app_source TEXT NOT NULL REFERENCES app_source_table(app_source_id),
    transaction_app_source_user_id TEXT NOT NULL,
    transaction_service_id TEXT NOT NULL,
    transaction_service_name TEXT NOT NULL,
    transaction_status TEXT NOT NULL DEFAULT 'PENDING',
    transaction_total_amount REAL NOT NULL,
    transaction_payment_channel TEXT,
    transaction_date TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_transaction_status ON transaction_table(transaction_status);
CREATE INDEX IF NOT EXISTS idx_transaction_date ON transaction_table(transaction_date);

CREATE TABLE IF NOT EXISTS customer_table (
    customer_id TEXT PRIMARY KEY,
    customer_provider_id TEXT NOT NULL,
    customer_provider_name TEXT NOT NULL,
    customer_user_id TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_customer_user ON customer_table(customer_user_id);

CREATE TABLE IF NOT EXISTS customer_card_table (
    customer_card_id TEXT PRIMARY KEY,
    customer_card_customer_id TEXT NOT NULL REFERENCES customer_table(customer_id),
    customer_card_provider_id TEXT NOT NULL,
    customer_card_provider_name TEXT NOT NULL,
    customer_card_token TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS payment_token_table (
    payment_token_id TEXT PRIMARY KEY,
    payment_token_customer_id TEXT NOT NULL REFERENCES customer_table(customer_id),
    payment_token_value TEXT NOT NULL,
    payment_token_provider_name TEXT NOT NULL,
    payment_token_state TEXT,
    payment_token_date_created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS region_table (
    region_id TEXT PRIMARY KEY,
    region TEXT NOT NULL,
    region_is_available INTEGER NOT NULL DEFAULT 1,
    region_is_disabled INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS province_table (
    province_id TEXT PRIMARY KEY,
    province TEXT NOT NULL,
    province_region_id TEXT NOT NULL REFERENCES region_table(region_id),
    province_is_available INTEGER NOT NULL DEFAULT 1,
    province_is_disabled INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS city_table (
    city_id TEXT PRIMARY KEY,
    city TEXT NOT NULL,
    city_province_id TEXT NOT NULL REFERENCES province_table(province_id),
    city_is_available INTEGER NOT NULL DEFAULT 1,
    city_is_disabled INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS barangay_table (
    barangay_id TEXT PRIMARY KEY,
    barangay TEXT NOT NULL,
    barangay_city_id TEXT NOT NULL REFERENCES city_table(city_id),
    barangay_zip_code TEXT NOT NULL,
    barangay_is_available INTEGER NOT NULL DEFAULT 1,
    barangay_is_disabled INTEGER NOT NULL DEFAULT 0
);
"#;

/// SQLite database wrapper
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        tracing::debug!(path = %path, "checkout database opened");
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;

        // WAL for concurrent readers; foreign keys are off by default in SQLite
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(())
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Scoped access to the underlying connection for queries the typed
    /// helpers do not cover.
    pub fn with_connection<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.conn()?;
        f(&conn)
    }
}

/// Current time as an RFC 3339 UTC timestamp, the format every date column uses.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkout.db");
        let path = path.to_str().unwrap();

        Database::new(path).unwrap();
        let reopened = Database::new(path).unwrap();

        let tables: i64 = reopened
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE '%_table'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(tables, 9);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::new(":memory:").unwrap();
        let result = db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO province_table (province_id, province, province_region_id) VALUES ('p1', 'Cavite', 'missing')",
                [],
            )?;
            Ok(())
        });
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[test]
    fn test_timestamps_sort_lexically() {
        let earlier = now_timestamp();
        let later = now_timestamp();
        assert!(earlier <= later);
        assert!(earlier.ends_with('Z'));
    }
}
