use thiserror::Error;

pub type Result<T> = std::result::Result<T, TellerError>;

/// Errors produced by the teller engine.
///
/// The validation variants are recoverable outcomes: the interaction layer
/// turns each into a single user-facing message and resets the active
/// sub-flow. Only the storage variants propagate out of the engine.
#[derive(Error, Debug)]
pub enum TellerError {
    #[error("card {number} does not exist")]
    NonexistentCard { number: String },
    #[error("card number failed checksum validation")]
    InvalidChecksum,
    #[error("transfer target is the same account")]
    SameAccountTransfer,
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },
    #[error("card is blocked after too many failed login attempts")]
    LockedAccount,
    #[error("wrong PIN")]
    WrongPin,
    #[error("amount must be positive, got {amount}")]
    InvalidAmount { amount: i64 },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("stored card record is corrupt: {0}")]
    CorruptRecord(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
}
