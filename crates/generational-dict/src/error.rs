//! Error types for generation control.

use thiserror::Error;

use crate::Generation;

/// Error raised by operations that would corrupt the generation history.
///
/// Absence of a key or of a value at a generation is never an error; reads
/// return `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DictError {
    /// The operation is not valid in the store's current state. Nothing was
    /// mutated.
    #[error("invalid state at generation {generation}: {reason}")]
    InvalidState {
        /// Generation the store was at when the operation was attempted.
        generation: Generation,
        /// Why the operation was rejected.
        reason: InvalidStateReason,
    },
}

impl DictError {
    /// Generation the store was at when the operation was rejected.
    pub const fn generation(&self) -> Generation {
        match self {
            Self::InvalidState { generation, .. } => *generation,
        }
    }

    /// Why the operation was rejected.
    pub const fn reason(&self) -> InvalidStateReason {
        match self {
            Self::InvalidState { reason, .. } => *reason,
        }
    }
}

/// Cause of an [`DictError::InvalidState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidStateReason {
    /// Writes already landed at the generation being abandoned.
    #[error("{updates} write(s) landed at this generation")]
    PendingWrites { updates: u64 },

    /// Some key holds an entry at the current generation even though the
    /// update counter was reset. Rolling back would leave it above the
    /// counter.
    #[error("history holds entries up to generation {highest}")]
    WouldOrphan { highest: Generation },

    /// The counter is already at zero.
    #[error("generation counter is already at zero")]
    AtGenesis,
}

/// Result type for dictionary operations.
pub type DictResult<T> = Result<T, DictError>;
