//! rir-core: Shared types for impulse response datasets
//!
//! This crate provides the foundational types used across all rirkit crates:
//! the channel-major sample matrix, catalog entries with their identifiers,
//! and the error taxonomy.

mod catalog;
mod error;
mod matrix;

pub use catalog::*;
pub use error::*;
pub use matrix::*;

/// Type alias for audio samples (always f64 for maximum precision)
pub type Sample = f64;
