use thiserror::Error;

use crate::common::TransactionID;

#[derive(Error, Debug)]
pub enum DbError {
    /// The transaction lost a wound-wait conflict. The caller must unwind
    /// and abort the transaction; any further lock request fails the same
    /// way.
    #[error("transaction {0:?} aborted")]
    TransactionAborted(TransactionID),

    #[error("{0}")]
    Db(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DbResult<T> = Result<T, DbError>;
