//! Errors raised while reading or writing saved lamp state.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The database file or its directory could not be created.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A saved record is not valid lamp state JSON.
    #[error("Corrupt state record: {0}")]
    Record(#[from] serde_json::Error),

    /// redb failed; the message names the failing step.
    #[error("State database error: {0}")]
    Database(String),
}

/// redb reports each step (open, begin, table, read/write, commit) with its own type.
macro_rules! database_error {
    ($($ty:ty => $step:literal),+ $(,)?) => {
        $(
            impl From<$ty> for Error {
                fn from(e: $ty) -> Self {
                    Error::Database(format!("{}: {}", $step, e))
                }
            }
        )+
    };
}

database_error! {
    redb::DatabaseError => "open",
    redb::TransactionError => "begin transaction",
    redb::TableError => "open table",
    redb::StorageError => "access",
    redb::CommitError => "commit",
}
