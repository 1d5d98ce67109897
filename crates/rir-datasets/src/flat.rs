//! Generic flat-directory driver
//!
//! Covers the common case of one file per IR somewhere under the root.
//! What varies between databases — glob patterns and the on-disk format —
//! is injected: patterns as data, the format as a [`FileDecoder`] strategy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use parking_lot::RwLock;
use rir_core::{CatalogEntry, DatasetError, DatasetResult, IrId, IrMatrix};
use rir_file::{AudioInfo, RawSampleType, audio_info, raw_info, read_audio, read_raw};
use walkdir::WalkDir;

use crate::dataset::{DatasetInfo, IrDataset, IrStream, check_shape, find_entry};

// ═══════════════════════════════════════════════════════════════════════════════
// DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Include/exclude glob matching over paths relative to a dataset root.
///
/// `*` stays within one path component (as in shell globs); `**` crosses
/// directories.
pub(crate) struct FileMatcher {
    patterns: Vec<String>,
    include: GlobSet,
    exclude: GlobSet,
}

fn build_globset(patterns: &[&str]) -> DatasetResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                DatasetError::UnsupportedFormat(format!("bad glob pattern '{pattern}': {e}"))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| DatasetError::UnsupportedFormat(format!("bad glob set: {e}")))
}

impl FileMatcher {
    pub fn new(patterns: &[&str], excludes: &[&str]) -> DatasetResult<Self> {
        Ok(Self {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            include: build_globset(patterns)?,
            exclude: build_globset(excludes)?,
        })
    }

    /// Walk `root` and return all matching files, sorted for deterministic
    /// catalogs. Unreadable directory entries are logged and skipped.
    pub fn discover(&self, root: &Path) -> DatasetResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(DatasetError::not_found(root));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping unreadable entry under {}: {e}", root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if self.include.is_match(rel) && !self.exclude.is_match(rel) {
                files.push(entry.path().to_path_buf());
            }
        }
        log::debug!(
            "{}: {} files match {:?}",
            root.display(),
            files.len(),
            self.patterns
        );
        Ok(files)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FORMAT STRATEGIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Format strategy for a flat dataset: probe headers cheaply, decode fully.
pub trait FileDecoder: Send + Sync {
    /// Channel count, sample count and rate from headers only.
    fn probe(&self, path: &Path) -> DatasetResult<AudioInfo>;

    /// Full decode into a channel-major matrix plus the file's sample rate.
    fn decode(&self, path: &Path) -> DatasetResult<(IrMatrix, u32)>;
}

/// Ordinary audio containers: WAV through hound, the rest through
/// symphonia.
pub struct SoundfileDecoder;

impl FileDecoder for SoundfileDecoder {
    fn probe(&self, path: &Path) -> DatasetResult<AudioInfo> {
        audio_info(path)
    }

    fn decode(&self, path: &Path) -> DatasetResult<(IrMatrix, u32)> {
        read_audio(path)
    }
}

/// Headerless mono sample dumps with out-of-band geometry.
pub struct RawArrayDecoder {
    pub dtype: RawSampleType,
    pub sample_rate: u32,
}

impl FileDecoder for RawArrayDecoder {
    fn probe(&self, path: &Path) -> DatasetResult<AudioInfo> {
        Ok(AudioInfo {
            channels: 1,
            samples: raw_info(path, self.dtype)?,
            sample_rate: self.sample_rate,
        })
    }

    fn decode(&self, path: &Path) -> DatasetResult<(IrMatrix, u32)> {
        let samples = read_raw(path, self.dtype)?;
        Ok((IrMatrix::from_mono(samples), self.sample_rate))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DRIVER
// ═══════════════════════════════════════════════════════════════════════════════

/// One file per IR under a directory tree.
pub struct FlatFileDataset {
    info: DatasetInfo,
    root: PathBuf,
    matcher: FileMatcher,
    decoder: Arc<dyn FileDecoder>,
    catalog: RwLock<Option<Arc<Vec<CatalogEntry>>>>,
}

impl FlatFileDataset {
    pub fn new(
        info: DatasetInfo,
        root: impl Into<PathBuf>,
        patterns: &[&str],
        decoder: Arc<dyn FileDecoder>,
    ) -> DatasetResult<Self> {
        Self::with_excludes(info, root, patterns, &[], decoder)
    }

    pub fn with_excludes(
        info: DatasetInfo,
        root: impl Into<PathBuf>,
        patterns: &[&str],
        excludes: &[&str],
        decoder: Arc<dyn FileDecoder>,
    ) -> DatasetResult<Self> {
        Ok(Self {
            info,
            root: root.into(),
            matcher: FileMatcher::new(patterns, excludes)?,
            decoder,
            catalog: RwLock::new(None),
        })
    }

    pub fn info(&self) -> &DatasetInfo {
        &self.info
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scan(&self) -> DatasetResult<Arc<Vec<CatalogEntry>>> {
        if let Some(catalog) = self.catalog.read().as_ref() {
            return Ok(catalog.clone());
        }

        let files = self.matcher.discover(&self.root)?;
        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            match self.decoder.probe(&file) {
                Ok(info) => entries.push(CatalogEntry::new(
                    IrId::File(file),
                    info.channels,
                    info.samples,
                    info.sample_rate,
                )),
                // A missing capability is loud; an unreadable header only
                // drops that file from the catalog.
                Err(e @ DatasetError::UnsupportedFormat(_)) => return Err(e),
                Err(e) => log::warn!("{}: skipping {}: {e}", self.info.id, file.display()),
            }
        }
        if entries.is_empty() {
            return Err(DatasetError::DatasetNotFound(format!(
                "{}: no files matching {:?}",
                self.root.display(),
                self.matcher.patterns()
            )));
        }

        log::info!("{}: cataloged {} IRs", self.info.id, entries.len());
        let entries = Arc::new(entries);
        *self.catalog.write() = Some(entries.clone());
        Ok(entries)
    }

    fn decode_entry(&self, entry: &CatalogEntry) -> DatasetResult<IrMatrix> {
        let IrId::File(path) = &entry.id else {
            return Err(DatasetError::UnknownIdentifier(entry.id.to_string()));
        };
        let (matrix, _) = self.decoder.decode(path)?;
        check_shape(entry, &matrix)?;
        Ok(matrix)
    }
}

impl IrDataset for FlatFileDataset {
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
        self.decode_entry(entry)
    }

    fn get_all(&self) -> DatasetResult<IrStream<'_>> {
        let catalog = self.scan()?;
        let iter = (0..catalog.len()).map(move |i| {
            let entry = &catalog[i];
            let matrix = self.decode_entry(entry)?;
            Ok((entry.id.clone(), entry.sample_rate, matrix))
        });
        Ok(Box::new(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_respects_component_boundaries() {
        let matcher = FileMatcher::new(&["near/rsp*/*", "**/*.wav"], &["examples/*"]).unwrap();
        assert!(matcher.include.is_match("near/rsp01/imp000.dat"));
        assert!(!matcher.include.is_match("near/rsp01/deep/imp000.dat"));
        assert!(matcher.include.is_match("a/b/c.wav"));
        assert!(matcher.include.is_match("top.wav"));
        assert!(matcher.exclude.is_match("examples/demo.wav"));
        assert!(!matcher.exclude.is_match("rooms/examples.wav"));
    }

    #[test]
    fn missing_root_is_dataset_not_found() {
        let ds = FlatFileDataset::new(
            DatasetInfo::new("t", "T"),
            "/nonexistent/rirkit-test-root",
            &["**/*.wav"],
            Arc::new(SoundfileDecoder),
        )
        .unwrap();
        assert!(matches!(
            ds.list_irs(),
            Err(DatasetError::DatasetNotFound(_))
        ));
    }
}
