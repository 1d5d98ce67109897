//! MATLAB Level 5 MAT-file reader
//!
//! Just enough of the container to index and load the numeric arrays the
//! reverb databases ship: 128-byte header, tagged data elements (including
//! the packed small-element form), and `miMATRIX` elements with real
//! numeric payloads. Arrays are stored column-major.
//!
//! Out of scope: compressed elements (no decompression dependency is
//! carried; re-save with `-nocompression` if needed), complex, sparse,
//! cell, struct, object and character arrays, and big-endian files.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use rir_core::{DatasetError, DatasetResult};

const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT16: u32 = 3;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_SINGLE: u32 = 7;
const MI_DOUBLE: u32 = 9;
const MI_INT64: u32 = 12;
const MI_UINT64: u32 = 13;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;

const MX_DOUBLE: u8 = 6;
const MX_SINGLE: u8 = 7;
const MX_INT8: u8 = 8;
const MX_UINT8: u8 = 9;
const MX_INT16: u8 = 10;
const MX_UINT16: u8 = 11;
const MX_INT32: u8 = 12;
const MX_UINT32: u8 = 13;

const FLAG_COMPLEX: u32 = 0x0800;

/// Name and dimensions of one array, from headers only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatVarInfo {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
}

/// One loaded numeric array, converted to f64, column-major.
#[derive(Debug, Clone)]
pub struct MatVar {
    name: String,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl MatVar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// One column as a contiguous slice (column-major storage).
    pub fn column(&self, col: usize) -> &[f64] {
        &self.data[col * self.rows..(col + 1) * self.rows]
    }

    /// One row, gathered across columns.
    pub fn row(&self, row: usize) -> Vec<f64> {
        (0..self.cols).map(|c| self.data[c * self.rows + row]).collect()
    }

    /// All rows, in order. The matrix as `(rows, cols)` nested vecs.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|r| self.row(r)).collect()
    }
}

/// A fully loaded MAT-file: every real numeric 2-D array in it.
#[derive(Debug)]
pub struct MatFile {
    vars: Vec<MatVar>,
}

impl MatFile {
    /// Load all numeric arrays from a MAT-file.
    pub fn open(path: &Path) -> DatasetResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        read_header(&mut reader, path)?;
        let vars = scan(&mut reader, path, true)?
            .into_iter()
            .map(|raw| MatVar {
                name: raw.name,
                rows: raw.rows,
                cols: raw.cols,
                data: raw.data.unwrap_or_default(),
            })
            .collect();
        Ok(Self { vars })
    }

    pub fn var(&self, name: &str) -> Option<&MatVar> {
        self.vars.iter().find(|v| v.name == name)
    }

    /// First array in file order.
    pub fn first(&self) -> Option<&MatVar> {
        self.vars.first()
    }

    pub fn vars(&self) -> &[MatVar] {
        &self.vars
    }
}

/// List the numeric arrays in a MAT-file without reading their payloads.
pub fn mat_probe(path: &Path) -> DatasetResult<Vec<MatVarInfo>> {
    let mut reader = BufReader::new(File::open(path)?);
    read_header(&mut reader, path)?;
    Ok(scan(&mut reader, path, false)?
        .into_iter()
        .map(|raw| MatVarInfo {
            name: raw.name,
            rows: raw.rows,
            cols: raw.cols,
        })
        .collect())
}

struct RawVar {
    name: String,
    rows: usize,
    cols: usize,
    data: Option<Vec<f64>>,
}

fn read_header<R: Read>(r: &mut R, path: &Path) -> DatasetResult<()> {
    let mut header = [0u8; 128];
    r.read_exact(&mut header)
        .map_err(|_| DatasetError::corrupt(path, "short MAT header"))?;

    match &header[126..128] {
        b"IM" => Ok(()),
        b"MI" => Err(DatasetError::UnsupportedFormat(format!(
            "big-endian MAT-file: {}",
            path.display()
        ))),
        _ => Err(DatasetError::corrupt(path, "not a Level 5 MAT-file")),
    }
}

struct Tag {
    data_type: u32,
    size: usize,
    /// Payload of a packed small element (tag and data share 8 bytes)
    small: Option<[u8; 4]>,
}

/// Read one element tag. `None` on clean EOF.
fn read_tag<R: Read>(r: &mut R) -> DatasetResult<Option<Tag>> {
    let mut first = [0u8; 4];
    match r.read_exact(&mut first) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let word = u32::from_le_bytes(first);

    if word >> 16 != 0 {
        // Small element: upper half is the byte count, data fills the
        // remaining 4 tag bytes.
        let mut payload = [0u8; 4];
        r.read_exact(&mut payload)?;
        Ok(Some(Tag {
            data_type: word & 0xFFFF,
            size: (word >> 16) as usize,
            small: Some(payload),
        }))
    } else {
        let size = r.read_u32::<LittleEndian>()? as usize;
        Ok(Some(Tag {
            data_type: word,
            size,
            small: None,
        }))
    }
}

/// Bytes of trailing padding after a regular element payload.
fn pad8(size: usize) -> usize {
    (8 - size % 8) % 8
}

fn scan<R: Read + Seek>(r: &mut R, path: &Path, load_data: bool) -> DatasetResult<Vec<RawVar>> {
    let mut vars = Vec::new();

    while let Some(tag) = read_tag(r)? {
        match tag.data_type {
            MI_COMPRESSED => {
                return Err(DatasetError::UnsupportedFormat(format!(
                    "compressed MAT element in {} (re-save with -nocompression)",
                    path.display()
                )));
            }
            MI_MATRIX => {
                if tag.small.is_some() {
                    return Err(DatasetError::corrupt(path, "matrix in small element"));
                }
                let end = r.stream_position()? + (tag.size + pad8(tag.size)) as u64;
                if let Some(var) = parse_matrix(r, path, load_data)? {
                    vars.push(var);
                }
                r.seek(SeekFrom::Start(end))?;
            }
            _ => {
                // Unrelated top-level element, skip it.
                if tag.small.is_none() {
                    r.seek(SeekFrom::Current((tag.size + pad8(tag.size)) as i64))?;
                }
            }
        }
    }

    Ok(vars)
}

/// Read one subelement's payload into owned bytes (small or regular form).
fn read_sub_bytes<R: Read>(r: &mut R, path: &Path, expect: &str) -> DatasetResult<(u32, Vec<u8>)> {
    let tag = read_tag(r)?
        .ok_or_else(|| DatasetError::corrupt(path, format!("missing {expect} subelement")))?;
    if let Some(payload) = tag.small {
        return Ok((tag.data_type, payload[..tag.size].to_vec()));
    }
    let mut bytes = vec![0u8; tag.size];
    r.read_exact(&mut bytes)?;
    let mut pad = vec![0u8; pad8(tag.size)];
    r.read_exact(&mut pad)?;
    Ok((tag.data_type, bytes))
}

/// Parse a `miMATRIX` element up to (and optionally including) its real
/// data. Returns `None` for array kinds the reader scopes out; the caller
/// seeks past the element either way.
fn parse_matrix<R: Read + Seek>(
    r: &mut R,
    path: &Path,
    load_data: bool,
) -> DatasetResult<Option<RawVar>> {
    // Array flags: class byte plus complex/global/logical bits.
    let (flags_type, flags) = read_sub_bytes(r, path, "array flags")?;
    if flags_type != MI_UINT32 || flags.len() < 8 {
        return Err(DatasetError::corrupt(path, "malformed array flags"));
    }
    let flags_word = u32::from_le_bytes([flags[0], flags[1], flags[2], flags[3]]);
    let class = (flags_word & 0xFF) as u8;

    // Dimensions.
    let (dims_type, dims_bytes) = read_sub_bytes(r, path, "dimensions")?;
    if dims_type != MI_INT32 {
        return Err(DatasetError::corrupt(path, "malformed dimensions"));
    }
    let dims: Vec<usize> = dims_bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as usize)
        .collect();

    // Array name.
    let (name_type, name_bytes) = read_sub_bytes(r, path, "array name")?;
    if name_type != MI_INT8 {
        return Err(DatasetError::corrupt(path, "malformed array name"));
    }
    let name = String::from_utf8_lossy(&name_bytes).into_owned();

    if !matches!(
        class,
        MX_DOUBLE | MX_SINGLE | MX_INT8 | MX_UINT8 | MX_INT16 | MX_UINT16 | MX_INT32 | MX_UINT32
    ) {
        log::debug!("{}: skipping non-numeric array '{name}'", path.display());
        return Ok(None);
    }
    if flags_word & FLAG_COMPLEX != 0 {
        log::debug!("{}: skipping complex array '{name}'", path.display());
        return Ok(None);
    }
    if dims.len() != 2 {
        log::debug!(
            "{}: skipping {}-D array '{name}'",
            path.display(),
            dims.len()
        );
        return Ok(None);
    }
    let (rows, cols) = (dims[0], dims[1]);

    if !load_data {
        return Ok(Some(RawVar {
            name,
            rows,
            cols,
            data: None,
        }));
    }

    // Real part.
    let tag = read_tag(r)?
        .ok_or_else(|| DatasetError::corrupt(path, "missing array data"))?;
    let count = rows * cols;
    let data = match tag.small {
        Some(payload) => decode_numeric(&payload[..tag.size], tag.data_type, path)?,
        None => {
            let mut bytes = vec![0u8; tag.size];
            r.read_exact(&mut bytes)?;
            decode_numeric(&bytes, tag.data_type, path)?
        }
    };
    if data.len() != count {
        return Err(DatasetError::corrupt(
            path,
            format!("array '{name}' holds {} of {count} values", data.len()),
        ));
    }

    Ok(Some(RawVar {
        name,
        rows,
        cols,
        data: Some(data),
    }))
}

/// Convert a numeric payload to f64. The element type may be narrower than
/// the array class; values are the numbers as written, no scaling.
fn decode_numeric(bytes: &[u8], data_type: u32, path: &Path) -> DatasetResult<Vec<f64>> {
    fn from<const W: usize>(bytes: &[u8], f: impl Fn([u8; W]) -> f64) -> Vec<f64> {
        bytes
            .chunks_exact(W)
            .map(|c| {
                let mut buf = [0u8; W];
                buf.copy_from_slice(c);
                f(buf)
            })
            .collect()
    }

    Ok(match data_type {
        MI_INT8 => bytes.iter().map(|&b| b as i8 as f64).collect(),
        MI_UINT8 => bytes.iter().map(|&b| b as f64).collect(),
        MI_INT16 => from::<2>(bytes, |b| i16::from_le_bytes(b) as f64),
        MI_UINT16 => from::<2>(bytes, |b| u16::from_le_bytes(b) as f64),
        MI_INT32 => from::<4>(bytes, |b| i32::from_le_bytes(b) as f64),
        MI_UINT32 => from::<4>(bytes, |b| u32::from_le_bytes(b) as f64),
        MI_SINGLE => from::<4>(bytes, |b| f32::from_le_bytes(b) as f64),
        MI_DOUBLE => from::<8>(bytes, f64::from_le_bytes),
        MI_INT64 => from::<8>(bytes, |b| i64::from_le_bytes(b) as f64),
        MI_UINT64 => from::<8>(bytes, |b| u64::from_le_bytes(b) as f64),
        other => {
            return Err(DatasetError::corrupt(
                path,
                format!("unsupported numeric element type {other}"),
            ));
        }
    })
}
