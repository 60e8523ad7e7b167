//! Error kinds returned by fallible map and cursor operations.

use thiserror::Error;

/// Every failure leaves the map exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
    /// A configuration argument is outside its domain.
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
    /// A keyed lookup or erase found no matching entry.
    #[error("element with such key is not present in the container")]
    NotFound,
    /// The cursor is the end sentinel or refers to an erased entry.
    #[error("cursor does not point to an element")]
    IteratorInvalid,
}
