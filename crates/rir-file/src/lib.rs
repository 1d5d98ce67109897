//! rir-file: File decoders for impulse response datasets
//!
//! Every reader in this crate comes in two flavors:
//! - a cheap *probe* that reads only headers (channel count, sample count,
//!   sample rate) so catalogs never touch sample payloads, and
//! - a full *decode* that produces a channel-major [`rir_core::IrMatrix`].
//!
//! Formats:
//! - WAV (via hound) - native, lossless
//! - FLAC / OGG Vorbis / AIFF (via symphonia)
//! - MATLAB Level 5 MAT containers (numeric arrays, uncompressed)
//! - Raw headerless sample dumps

mod audio;
mod mat;
mod raw;

pub use audio::*;
pub use mat::*;
pub use raw::*;
