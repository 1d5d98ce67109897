//! Catalog entries and IR identifiers

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Stable key for one impulse response within a dataset.
///
/// The variants cover the layouts found in the wild: one file per IR, one
/// matrix container holding many IRs, SOFA-style measurement grids, and
/// logical groups assembled from several per-channel files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IrId {
    /// One file, one IR
    File(PathBuf),
    /// One column / member of a multi-IR container file
    Member { file: PathBuf, index: usize },
    /// One (measurement, receiver) cell of a measurement grid
    Measurement {
        file: PathBuf,
        measurement: usize,
        receiver: usize,
    },
    /// Logical name for a group of per-channel files
    Name(String),
}

impl fmt::Display for IrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrId::File(path) => write!(f, "{}", path.display()),
            IrId::Member { file, index } => write!(f, "{}#{}", file.display(), index),
            IrId::Measurement {
                file,
                measurement,
                receiver,
            } => write!(f, "{}#{}.{}", file.display(), measurement, receiver),
            IrId::Name(name) => f.write_str(name),
        }
    }
}

/// One catalog row: identifier plus geometry, derived from headers or
/// layout conventions without decoding sample data.
///
/// This 4-field shape is the wire contract with callers and is identical
/// across all drivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Lookup key, unique within the dataset
    pub id: IrId,
    /// Number of audio channels
    pub channels: usize,
    /// Samples per channel
    pub samples: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl CatalogEntry {
    pub fn new(id: IrId, channels: usize, samples: usize, sample_rate: u32) -> Self {
        Self {
            id,
            channels,
            samples,
            sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let file = IrId::File(PathBuf::from("a/b.wav"));
        assert_eq!(file.to_string(), "a/b.wav");

        let member = IrId::Member {
            file: PathBuf::from("m.mat"),
            index: 3,
        };
        assert_eq!(member.to_string(), "m.mat#3");

        let cell = IrId::Measurement {
            file: PathBuf::from("r.sofa"),
            measurement: 1,
            receiver: 0,
        };
        assert_eq!(cell.to_string(), "r.sofa#1.0");

        assert_eq!(IrId::Name("room_a".into()).to_string(), "room_a");
    }
}
