use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur while writing a page.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sea-orm. The page's transaction was rolled back.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Whether the failure looks like lock contention or a dropped connection.
    ///
    /// Used for log classification only; page writes are never retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        let StoreError::Database(err) = self;
        match err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
            DbErr::Exec(_) | DbErr::Query(_) => {
                let err_str = err.to_string().to_lowercase();
                err_str.contains("locked")
                    || err_str.contains("busy")
                    || err_str.contains("timeout")
                    || err_str.contains("connection")
            }
            _ => false,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
