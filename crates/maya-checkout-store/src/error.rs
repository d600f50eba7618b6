use checkout::CheckoutError;

/// Errors raised by the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database lock poisoned")]
    LockPoisoned,
}

impl From<StoreError> for CheckoutError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => CheckoutError::NotFound(what),
            other => CheckoutError::Database(other.to_string()),
        }
    }
}
