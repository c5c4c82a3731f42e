//! Generation counter with guarded rollback.
//!
//! The counter moves in two directions:
//!
//! - **advance**: `+1`, resets the update counter
//! - **abandon**: `-1`, resets the update counter, only while no history
//!   entry sits at the generation being left
//!
//! The abandon guard keeps the invariant `current >= highest_written`, so a
//! history entry can never end up above the counter.

use crate::error::{DictError, DictResult, InvalidStateReason};

/// A generation number (monotonically increasing, except for abandon).
pub type Generation = u64;

/// Generation state shared by the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationCounter {
    /// Generation that writes currently land at.
    current: Generation,
    /// Writes performed since the last advance or abandon.
    updates: u64,
    /// Highest generation any write ever landed at.
    highest_written: Option<Generation>,
}

impl GenerationCounter {
    /// Create a counter at generation 0 with no writes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: 0,
            updates: 0,
            highest_written: None,
        }
    }

    /// Current generation.
    #[inline]
    pub const fn current(&self) -> Generation {
        self.current
    }

    /// Writes performed at the current generation.
    #[inline]
    pub const fn updates(&self) -> u64 {
        self.updates
    }

    /// Whether the current generation has received writes.
    #[inline]
    pub const fn is_dirty(&self) -> bool {
        self.updates > 0
    }

    /// Highest generation any write landed at, if there was one.
    #[inline]
    pub const fn highest_written(&self) -> Option<Generation> {
        self.highest_written
    }

    /// Move to the next generation and return it.
    pub fn advance(&mut self) -> Generation {
        self.current += 1;
        self.updates = 0;
        self.current
    }

    /// Check whether [`abandon`](Self::abandon) would succeed.
    pub fn check_abandon(&self) -> Result<(), InvalidStateReason> {
        if self.updates > 0 {
            return Err(InvalidStateReason::PendingWrites {
                updates: self.updates,
            });
        }
        if let Some(highest) = self.highest_written {
            if highest >= self.current {
                return Err(InvalidStateReason::WouldOrphan { highest });
            }
        }
        if self.current == 0 {
            return Err(InvalidStateReason::AtGenesis);
        }
        Ok(())
    }

    /// Step back one generation and return it.
    ///
    /// Fails without touching any state when the generation being left has
    /// history entries, or when the counter is already at zero.
    pub fn abandon(&mut self) -> DictResult<Generation> {
        self.check_abandon()
            .map_err(|reason| DictError::InvalidState {
                generation: self.current,
                reason,
            })?;

        self.current -= 1;
        self.updates = 0;
        Ok(self.current)
    }

    /// Account for one write at the current generation and return it.
    pub(crate) fn record_write(&mut self) -> Generation {
        debug_assert!(
            self.highest_written.is_none_or(|h| h <= self.current),
            "history entry above the generation counter"
        );
        self.updates += 1;
        self.highest_written = Some(self.current);
        self.current
    }
}
