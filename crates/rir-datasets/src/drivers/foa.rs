//! 360° BRIR database driver
//!
//! Mixed layout: MAT containers holding `IR_L`/`IR_R` arrays whose columns
//! pair up into stereo IRs, plus plain WAV files alongside them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rir_core::{CatalogEntry, DatasetError, DatasetResult, IrId, IrMatrix};
use rir_file::{MatFile, MatVar, audio_info, mat_probe, read_audio};

use crate::dataset::{DatasetInfo, IrDataset, IrRecord, IrStream, check_shape, find_entry};
use crate::drivers::stream_file_groups;
use crate::flat::FileMatcher;

const LEFT: &str = "IR_L";
const RIGHT: &str = "IR_R";
const SAMPLE_RATE: u32 = 48000;

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Stereo-pair MAT containers plus loose WAV files under one root.
pub struct FoaBrirDataset {
    info: DatasetInfo,
    root: PathBuf,
    matcher: FileMatcher,
    catalog: RwLock<Option<Arc<Vec<CatalogEntry>>>>,
}

impl FoaBrirDataset {
    pub fn new(info: DatasetInfo, root: impl Into<PathBuf>) -> DatasetResult<Self> {
        Ok(Self {
            info,
            root: root.into(),
            matcher: FileMatcher::new(&["**/*.mat", "**/*.wav"], &[])?,
            catalog: RwLock::new(None),
        })
    }

    fn scan(&self) -> DatasetResult<Arc<Vec<CatalogEntry>>> {
        if let Some(catalog) = self.catalog.read().as_ref() {
            return Ok(catalog.clone());
        }

        let files = self.matcher.discover(&self.root)?;
        let mut entries = Vec::new();
        for file in files {
            if has_extension(&file, "mat") {
                let vars = match mat_probe(&file) {
                    Ok(vars) => vars,
                    Err(e @ DatasetError::UnsupportedFormat(_)) => return Err(e),
                    Err(e) => {
                        log::warn!("{}: skipping {}: {e}", self.info.id, file.display());
                        continue;
                    }
                };
                let left = vars.iter().find(|v| v.name == LEFT);
                let right = vars.iter().find(|v| v.name == RIGHT);
                match (left, right) {
                    (Some(l), Some(r)) if l.rows == r.rows && l.cols == r.cols => {
                        for index in 0..l.cols {
                            entries.push(CatalogEntry::new(
                                IrId::Member {
                                    file: file.clone(),
                                    index,
                                },
                                2,
                                l.rows,
                                SAMPLE_RATE,
                            ));
                        }
                    }
                    _ => log::warn!(
                        "{}: skipping {}: missing or mismatched {LEFT}/{RIGHT}",
                        self.info.id,
                        file.display()
                    ),
                }
            } else {
                match audio_info(&file) {
                    Ok(info) => entries.push(CatalogEntry::new(
                        IrId::File(file),
                        info.channels,
                        info.samples,
                        info.sample_rate,
                    )),
                    Err(e) => log::warn!("{}: skipping {}: {e}", self.info.id, file.display()),
                }
            }
        }
        if entries.is_empty() {
            return Err(DatasetError::DatasetNotFound(format!(
                "{}: no usable files under {}",
                self.info.id,
                self.root.display()
            )));
        }

        log::info!("{}: cataloged {} IRs", self.info.id, entries.len());
        let entries = Arc::new(entries);
        *self.catalog.write() = Some(entries.clone());
        Ok(entries)
    }

    fn stereo_record(
        left: &MatVar,
        right: &MatVar,
        entry: &CatalogEntry,
    ) -> DatasetResult<IrRecord> {
        let IrId::Member { file, index } = &entry.id else {
            return Err(DatasetError::UnknownIdentifier(entry.id.to_string()));
        };
        if *index >= left.cols() || *index >= right.cols() {
            return Err(DatasetError::corrupt(
                file,
                format!("stereo pair {index} out of range"),
            ));
        }
        let matrix = IrMatrix::from_channels(vec![
            left.column(*index).to_vec(),
            right.column(*index).to_vec(),
        ])
        .ok_or_else(|| DatasetError::corrupt(file, "left/right length mismatch"))?;
        check_shape(entry, &matrix)?;
        Ok((entry.id.clone(), entry.sample_rate, matrix))
    }

    fn open_pair(file: &Path) -> DatasetResult<(MatVar, MatVar)> {
        let mat = MatFile::open(file)?;
        let left = mat
            .var(LEFT)
            .ok_or_else(|| DatasetError::corrupt(file, format!("no '{LEFT}' array")))?;
        let right = mat
            .var(RIGHT)
            .ok_or_else(|| DatasetError::corrupt(file, format!("no '{RIGHT}' array")))?;
        Ok((left.clone(), right.clone()))
    }
}

impl IrDataset for FoaBrirDataset {
    fn dataset_id(&self) -> &str {
        &self.info.id
    }

    fn name(&self) -> &str {
        &self.info.name
    }

    fn url(&self) -> Option<&str> {
        self.info.url.as_deref()
    }

    fn license(&self) -> Option<&str> {
        self.info.license.as_deref()
    }

    fn download_urls(&self) -> &[String] {
        &self.info.download_urls
    }

    fn list_irs(&self) -> DatasetResult<Vec<CatalogEntry>> {
        Ok(self.scan()?.as_ref().clone())
    }

    fn get(&self, id: &IrId) -> DatasetResult<IrMatrix> {
        let catalog = self.scan()?;
        let entry = find_entry(&catalog, id)?;
        match &entry.id {
            IrId::Member { file, .. } => {
                let (left, right) = Self::open_pair(file)?;
                let (_, _, matrix) = Self::stereo_record(&left, &right, entry)?;
                Ok(matrix)
            }
            IrId::File(path) => {
                let (matrix, _) = read_audio(path)?;
                check_shape(entry, &matrix)?;
                Ok(matrix)
            }
            other => Err(DatasetError::UnknownIdentifier(other.to_string())),
        }
    }

    fn get_all(&self) -> DatasetResult<IrStream<'_>> {
        let catalog = self.scan()?;
        Ok(stream_file_groups(catalog, |file, entries| {
            match &entries[0].id {
                IrId::Member { .. } => {
                    let (left, right) = Self::open_pair(file)?;
                    entries
                        .iter()
                        .map(|entry| Self::stereo_record(&left, &right, entry))
                        .collect()
                }
                _ => {
                    // Plain audio member, one entry per file.
                    let entry = &entries[0];
                    let (matrix, _) = read_audio(file)?;
                    check_shape(entry, &matrix)?;
                    Ok(vec![(entry.id.clone(), entry.sample_rate, matrix)])
                }
            }
        }))
    }
}
