//! Headerless raw sample dumps
//!
//! Some recording rigs publish IRs as bare sample arrays with the geometry
//! documented out-of-band. The sample count comes from the file size.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use rir_core::{DatasetError, DatasetResult, Sample};

/// On-disk element type of a raw dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSampleType {
    F32Le,
    F64Le,
    I16Le,
}

impl RawSampleType {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            RawSampleType::F32Le => 4,
            RawSampleType::F64Le => 8,
            RawSampleType::I16Le => 2,
        }
    }
}

/// Sample count implied by the file size.
pub fn raw_info(path: &Path, dtype: RawSampleType) -> DatasetResult<usize> {
    let len = std::fs::metadata(path)?.len() as usize;
    let width = dtype.bytes_per_sample();
    if len % width != 0 {
        return Err(DatasetError::corrupt(
            path,
            format!("{len} bytes is not a multiple of the {width}-byte sample width"),
        ));
    }
    Ok(len / width)
}

/// Read the whole dump as one mono sample row. Integer types are scaled to
/// the [-1, 1) float convention; float types are returned as stored.
pub fn read_raw(path: &Path, dtype: RawSampleType) -> DatasetResult<Vec<Sample>> {
    let count = raw_info(path, dtype)?;
    let mut reader = BufReader::new(File::open(path)?);

    let mut samples = Vec::with_capacity(count);
    match dtype {
        RawSampleType::F32Le => {
            for _ in 0..count {
                samples.push(reader.read_f32::<LittleEndian>()? as Sample);
            }
        }
        RawSampleType::F64Le => {
            for _ in 0..count {
                samples.push(reader.read_f64::<LittleEndian>()?);
            }
        }
        RawSampleType::I16Le => {
            for _ in 0..count {
                samples.push(reader.read_i16::<LittleEndian>()? as Sample / 32768.0);
            }
        }
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    #[test]
    fn f32_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imp010.f32");
        let mut bytes = Vec::new();
        for v in [0.25f32, -0.5, 1.0] {
            bytes.write_f32::<LittleEndian>(v).unwrap();
        }
        std::fs::write(&path, &bytes).unwrap();

        assert_eq!(raw_info(&path, RawSampleType::F32Le).unwrap(), 3);
        assert_eq!(
            read_raw(&path, RawSampleType::F32Le).unwrap(),
            vec![0.25, -0.5, 1.0]
        );
    }

    #[test]
    fn i16_is_scaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imp.i16");
        let mut bytes = Vec::new();
        for v in [16384i16, -32768] {
            bytes.write_i16::<LittleEndian>(v).unwrap();
        }
        std::fs::write(&path, &bytes).unwrap();

        assert_eq!(
            read_raw(&path, RawSampleType::I16Le).unwrap(),
            vec![0.5, -1.0]
        );
    }

    #[test]
    fn odd_size_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.f32");
        std::fs::write(&path, [0u8; 7]).unwrap();
        assert!(matches!(
            raw_info(&path, RawSampleType::F32Le),
            Err(DatasetError::CorruptFile { .. })
        ));
    }
}
