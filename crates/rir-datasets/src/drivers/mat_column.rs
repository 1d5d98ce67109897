//! MAT-container drivers
//!
//! Two shapes occur in the wild: one named array per file (the whole array
//! is the IR, rows are channels), and one array whose *columns* are
//! separate mono IRs. The first is a [`FileDecoder`] so the flat driver
//! can carry it; the second needs member identifiers and gets its own
//! driver.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rir_core::{CatalogEntry, DatasetError, DatasetResult, IrId, IrMatrix};
use rir_file::{AudioInfo, MatFile, MatVar, MatVarInfo, mat_probe};

use crate::dataset::{DatasetInfo, IrDataset, IrStream, check_shape, find_entry};
use crate::drivers::stream_file_groups;
use crate::flat::{FileDecoder, FileMatcher};

// ═══════════════════════════════════════════════════════════════════════════════
// WHOLE-ARRAY-PER-FILE DECODER
// ═══════════════════════════════════════════════════════════════════════════════

/// Decoder for MAT files holding one named `(channels, samples)` array.
pub struct MatVarDecoder {
    pub var: &'static str,
    pub sample_rate: u32,
}

impl FileDecoder for MatVarDecoder {
    fn probe(&self, path: &Path) -> DatasetResult<AudioInfo> {
        let vars = mat_probe(path)?;
        let var = vars
            .iter()
            .find(|v| v.name == self.var)
            .ok_or_else(|| DatasetError::corrupt(path, format!("no '{}' array", self.var)))?;
        Ok(AudioInfo {
            channels: var.rows,
            samples: var.cols,
            sample_rate: self.sample_rate,
        })
    }

    fn decode(&self, path: &Path) -> DatasetResult<(IrMatrix, u32)> {
        let mat = MatFile::open(path)?;
        let var = mat
            .var(self.var)
            .ok_or_else(|| DatasetError::corrupt(path, format!("no '{}' array", self.var)))?;
        let matrix = IrMatrix::from_channels(var.to_rows())
            .ok_or_else(|| DatasetError::corrupt(path, format!("empty '{}' array", self.var)))?;
        Ok((matrix, self.sample_rate))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLUMN-PER-IR DRIVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Which array of each file holds the IR columns.
#[derive(Debug, Clone, Copy)]
pub enum MatVarSelector {
    /// Array with this exact name
    Named(&'static str),
    /// First numeric array in the file
    First,
}

impl MatVarSelector {
    fn pick_info<'a>(&self, vars: &'a [MatVarInfo]) -> Option<&'a MatVarInfo> {
        match self {
            MatVarSelector::Named(name) => vars.iter().find(|v| v.name == *name),
            MatVarSelector::First => vars.first(),
        }
    }

    fn pick<'a>(&self, mat: &'a MatFile, path: &Path) -> DatasetResult<&'a MatVar> {
        let var = match self {
            MatVarSelector::Named(name) => mat.var(name),
            MatVarSelector::First => mat.first(),
        };
        var.ok_or_else(|| DatasetError::corrupt(path, self.describe()))
    }

    fn describe(&self) -> String {
        match self {
            MatVarSelector::Named(name) => format!("no '{name}' array"),
            MatVarSelector::First => "no numeric array".to_string(),
        }
    }
}

enum Source {
    Matched(FileMatcher),
    /// Fixed member list, relative to the root
    Fixed(Vec<String>),
}

/// MAT files whose array columns are independent mono IRs.
pub struct MatColumnDataset {
    info: DatasetInfo,
    root: PathBuf,
    source: Source,
    selector: MatVarSelector,
    sample_rate: u32,
    catalog: RwLock<Option<Arc<Vec<CatalogEntry>>>>,
}

impl MatColumnDataset {
    /// Discover container files by glob pattern.
    pub fn with_patterns(
        info: DatasetInfo,
        root: impl Into<PathBuf>,
        patterns: &[&str],
        selector: MatVarSelector,
        sample_rate: u32,
    ) -> DatasetResult<Self> {
        Ok(Self {
            info,
            root: root.into(),
            source: Source::Matched(FileMatcher::new(patterns, &[])?),
            selector,
            sample_rate,
            catalog: RwLock::new(None),
        })
    }

    /// Fixed, documented member list (some databases ship exactly N files).
    pub fn with_files(
        info: DatasetInfo,
        root: impl Into<PathBuf>,
        files: &[&str],
        selector: MatVarSelector,
        sample_rate: u32,
    ) -> Self {
        Self {
            info,
            root: root.into(),
            source: Source::Fixed(files.iter().map(|f| f.to_string()).collect()),
            selector,
            sample_rate,
            catalog: RwLock::new(None),
        }
    }

    fn files(&self) -> DatasetResult<Vec<PathBuf>> {
        match &self.source {
            Source::Matched(matcher) => matcher.discover(&self.root),
            Source::Fixed(names) => {
                if !self.root.is_dir() {
                    return Err(DatasetError::not_found(&self.root));
                }
                Ok(names
                    .iter()
                    .map(|name| self.root.join(name))
                    .filter(|path| path.is_file())
                    .collect())
            }
        }
    }

    fn scan(&self) -> DatasetResult<Arc<Vec<CatalogEntry>>> {
        if let Some(catalog) = self.catalog.read().as_ref() {
            return Ok(catalog.clone());
        }

        let files = self.files()?;
        let mut entries = Vec::new();
        for file in files {
            let vars = match mat_probe(&file) {
                Ok(vars) => vars,
                Err(e @ DatasetError::UnsupportedFormat(_)) => return Err(e),
                Err(e) => {
                    log::warn!("{}: skipping {}: {e}", self.info.id, file.display());
                    continue;
                }
            };
            let Some(var) = self.selector.pick_info(&vars) else {
                log::warn!(
                    "{}: skipping {}: {}",
                    self.info.id,
                    file.display(),
                    self.selector.describe()
                );
                continue;
            };
            for index in 0..var.cols {
                entries.push(CatalogEntry::new(
                    IrId::Member {
                        file: file.clone(),
                        index,
                    },
                    1,
                    var.rows,
                    self.sample_rate,
                ));
            }
        }
        if entries.is_empty() {
            return Err(DatasetError::DatasetNotFound(format!(
                "{}: no usable MAT containers under {}",
                self.info.id,
                self.root.display()
            )));
        }

        log::info!("{}: cataloged {} IRs", self.info.id, entries.len());
        let entries = Arc::new(entries);
        *self.catalog.write() = Some(entries.clone());
        Ok(entries)
    }

    fn column_record(
        &self,
        var: &MatVar,
        entry: &CatalogEntry,
    ) -> DatasetResult<(IrId, u32, IrMatrix)> {
        let IrId::Member { file, index } = &entry.id else {
            return Err(DatasetError::UnknownIdentifier(entry.id.to_string()));
        };
        if *index >= var.cols() {
            return Err(DatasetError::corrupt(
                file,
                format!("column {index} out of range ({} columns)", var.cols()),
            ));
        }
        let matrix = IrMatrix::from_mono(var.column(*index).to_vec());
        check_shape(entry, &matrix)?;
        Ok((entry.id.clone(), entry.sample_rate, matrix))
    }
}

impl IrDataset for MatColumnDataset {
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
        let IrId::Member { file, .. } = &entry.id else {
            return Err(DatasetError::UnknownIdentifier(entry.id.to_string()));
        };
        let mat = MatFile::open(file)?;
        let var = self.selector.pick(&mat, file)?;
        let (_, _, matrix) = self.column_record(var, entry)?;
        Ok(matrix)
    }

    fn get_all(&self) -> DatasetResult<IrStream<'_>> {
        let catalog = self.scan()?;
        Ok(stream_file_groups(catalog, move |file, entries| {
            let mat = MatFile::open(file)?;
            let var = self.selector.pick(&mat, file)?;
            entries
                .iter()
                .map(|entry| self.column_record(var, entry))
                .collect()
        }))
    }
}
