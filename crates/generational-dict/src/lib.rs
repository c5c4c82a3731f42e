//! Generational versioned dictionary.
//!
//! A key/value store that keeps every value written under a key, tagged by
//! the generation it was written at. Callers fold batches of updates into
//! it one generation at a time and can read any key as it stood at any
//! earlier generation.
//!
//! # Key Concepts
//!
//! - **Generation**: store-wide logical epoch, advanced explicitly per batch
//! - **History**: per-key ordered mapping `generation -> value`
//! - **As-of read**: the value at the highest generation `<=` the one asked for
//! - **Latest read**: the value at the key's highest generation, O(1)
//! - **Abandon**: undo a speculative advance, rejected once anything was
//!   written at the generation being abandoned
//!
//! # Usage
//!
//! ```
//! use generational_dict::GenerationalDict;
//!
//! let mut dict = GenerationalDict::new();
//! dict.add("x", 1);
//!
//! dict.advance_generation();
//! dict.add("x", 2);
//!
//! assert_eq!(dict.get_as_of("x", 0), Some(&1));
//! assert_eq!(dict.get_latest("x"), Some(&2));
//!
//! // Speculative batch that turned out empty
//! dict.advance_generation();
//! dict.abandon_generation()?;
//! assert_eq!(dict.generation(), 1);
//! # Ok::<(), generational_dict::DictError>(())
//! ```

mod dict;
mod error;
mod generation;
mod history;
mod select;

pub use dict::{GenerationalDict, Snapshot};
pub use error::{DictError, DictResult, InvalidStateReason};
pub use generation::{Generation, GenerationCounter};
pub use history::History;
pub use select::{Predicate, View};
