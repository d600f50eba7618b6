use std::env;

const DEFAULT_DB_PATH: &str = "./checkout.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database path (`:memory:` for a throwaway database).
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let db_path = env::var("CHECKOUT_DB_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        Self { db_path }
    }
}
