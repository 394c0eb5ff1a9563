//! Error types for map construction and insertion.

use core::fmt;

/// Why `TsHashMap::insert` could not create a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    /// The node arena is full; no further entries can be created.
    SlotsExhausted,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::SlotsExhausted => write!(f, "no free slot for a new entry"),
        }
    }
}

impl std::error::Error for InsertError {}

/// Why a map could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The bucket array could not be allocated.
    Allocation { buckets: usize },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Allocation { buckets } => {
                write!(f, "could not allocate {} buckets", buckets)
            }
        }
    }
}

impl std::error::Error for BuildError {}
