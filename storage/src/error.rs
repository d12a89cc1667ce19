use dbot_core::DbotError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for DbotError {
    fn from(err: StorageError) -> Self {
        DbotError::Storage(err.to_string())
    }
}
