use rust_decimal::Decimal;
use thiserror::Error;

/// Every failure the vending machine can report.
///
/// The `Display` text of each variant is the message shown to the customer,
/// so callers should treat it as part of the public contract.
#[derive(Error, Debug)]
pub enum VendingError {
    #[error("Invalid coin: {0}")]
    InvalidCoin(Decimal),
    /// Coin input that is not a decimal number at all, kept verbatim.
    #[error("Invalid coin: {0}")]
    UnreadableCoin(String),
    #[error("Item '{0}' not found.")]
    ItemNotFound(String),
    #[error("Item '{0}' not found for restock.")]
    RestockItemNotFound(String),
    #[error("Item '{0}' is out of stock.")]
    OutOfStock(String),
    #[error("Insufficient funds. Insert more coins.")]
    InsufficientFunds,
    #[error("Unable to provide exact change.")]
    ChangeUnavailable,
    #[error("{0}")]
    InvalidRestockInput(String),
    #[error("No coins to return.")]
    NoActiveBalance,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Storage error: {0}")]
    Persistence(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
}

impl VendingError {
    /// True when the failure came from the state store rather than from
    /// the customer's request. These are fatal to the operation.
    pub fn is_persistence(&self) -> bool {
        match self {
            VendingError::Persistence(_)
            | VendingError::IoError(_)
            | VendingError::JsonError(_) => true,
            #[cfg(feature = "storage-rocksdb")]
            VendingError::RocksDBError(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, VendingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_messages_match_customer_text() {
        assert_eq!(
            VendingError::InvalidCoin(dec!(0.03)).to_string(),
            "Invalid coin: 0.03"
        );
        assert_eq!(
            VendingError::InsufficientFunds.to_string(),
            "Insufficient funds. Insert more coins."
        );
        assert_eq!(
            VendingError::NoActiveBalance.to_string(),
            "No coins to return."
        );
    }

    #[test]
    fn test_persistence_classification() {
        assert!(VendingError::Persistence("disk full".into()).is_persistence());
        assert!(VendingError::IoError(std::io::Error::other("boom")).is_persistence());
        assert!(!VendingError::ChangeUnavailable.is_persistence());
        assert!(!VendingError::OutOfStock("Soda".into()).is_persistence());
    }
}
