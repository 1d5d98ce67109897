//! Fixture builders shared by the dataset contract suites
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

/// Write an interleaved 16-bit PCM WAV.
pub fn write_wav_i16(path: &Path, channels: u16, sample_rate: u32, interleaved: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in interleaved {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

/// Chop `cut` bytes off the end of a file, leaving its header intact.
pub fn truncate_file(path: &Path, cut: usize) {
    let bytes = std::fs::read(path).unwrap();
    std::fs::write(path, &bytes[..bytes.len() - cut]).unwrap();
}

const MI_INT8: u32 = 1;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;
const MX_DOUBLE: u32 = 6;

/// Write a minimal uncompressed MAT v5 file of real f64 arrays.
/// Data is column-major, `(rows, cols)` per variable.
pub fn write_mat(path: &Path, vars: &[(&str, usize, usize, Vec<f64>)]) {
    let mut out = Vec::new();
    let mut text = [b' '; 116];
    text[..29].copy_from_slice(b"MATLAB 5.0 MAT-file, fixture\0");
    out.extend_from_slice(&text);
    out.extend_from_slice(&[0u8; 8]);
    out.write_u16::<LittleEndian>(0x0100).unwrap();
    out.extend_from_slice(b"IM");

    for (name, rows, cols, data) in vars {
        assert_eq!(rows * cols, data.len());
        let mut body = Vec::new();

        body.write_u32::<LittleEndian>(MI_UINT32).unwrap();
        body.write_u32::<LittleEndian>(8).unwrap();
        body.write_u32::<LittleEndian>(MX_DOUBLE).unwrap();
        body.write_u32::<LittleEndian>(0).unwrap();

        body.write_u32::<LittleEndian>(MI_INT32).unwrap();
        body.write_u32::<LittleEndian>(8).unwrap();
        body.write_i32::<LittleEndian>(*rows as i32).unwrap();
        body.write_i32::<LittleEndian>(*cols as i32).unwrap();

        body.write_u32::<LittleEndian>(MI_INT8).unwrap();
        body.write_u32::<LittleEndian>(name.len() as u32).unwrap();
        body.write_all(name.as_bytes()).unwrap();
        body.extend_from_slice(&vec![0u8; (8 - name.len() % 8) % 8]);

        body.write_u32::<LittleEndian>(MI_DOUBLE).unwrap();
        body.write_u32::<LittleEndian>((data.len() * 8) as u32).unwrap();
        for value in data {
            body.write_f64::<LittleEndian>(*value).unwrap();
        }

        out.write_u32::<LittleEndian>(MI_MATRIX).unwrap();
        out.write_u32::<LittleEndian>(body.len() as u32).unwrap();
        out.extend_from_slice(&body);
    }
    std::fs::write(path, out).unwrap();
}

/// Write a headerless little-endian f32 dump.
pub fn write_raw_f32(path: &Path, values: &[f32]) {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for &value in values {
        bytes.write_f32::<LittleEndian>(value).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}
