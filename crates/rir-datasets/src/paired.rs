//! Per-channel file pairing
//!
//! Some rigs record each channel to its own file (`room_a_ch1.wav`,
//! `room_a_ch2.wav`, or `_L`/`_R` pairs). This driver groups such files
//! into one IR per stem, with rows stacked in suffix order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rir_core::{CatalogEntry, DatasetError, DatasetResult, IrId, IrMatrix, Sample};
use rir_file::AudioInfo;

use crate::dataset::{DatasetInfo, IrDataset, IrStream, check_shape, find_entry};
use crate::flat::{FileDecoder, FileMatcher};

struct PairedScan {
    entries: Vec<CatalogEntry>,
    /// Group name → member files in suffix order
    groups: BTreeMap<String, Vec<PathBuf>>,
}

/// One IR assembled from several single-channel files sharing a stem.
pub struct PairedChannelDataset {
    info: DatasetInfo,
    root: PathBuf,
    matcher: FileMatcher,
    suffixes: Vec<String>,
    decoder: Arc<dyn FileDecoder>,
    scan: RwLock<Option<Arc<PairedScan>>>,
}

impl PairedChannelDataset {
    /// `suffixes` is the ordered list of filename-stem endings that make up
    /// one group, e.g. `["_ch1", "_ch2"]` or `["_L", "_R"]`. Row order in
    /// the decoded matrix follows suffix order.
    pub fn new(
        info: DatasetInfo,
        root: impl Into<PathBuf>,
        patterns: &[&str],
        suffixes: &[&str],
        decoder: Arc<dyn FileDecoder>,
    ) -> DatasetResult<Self> {
        Ok(Self {
            info,
            root: root.into(),
            matcher: FileMatcher::new(patterns, &[])?,
            suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
            decoder,
            scan: RwLock::new(None),
        })
    }

    /// Group name for a member file: root-relative path, extension and
    /// suffix stripped. `None` if no configured suffix matches.
    fn group_name(&self, rel: &Path) -> Option<(usize, String)> {
        let stem = rel.with_extension("");
        let stem = stem.to_string_lossy();
        self.suffixes
            .iter()
            .enumerate()
            .find_map(|(slot, suffix)| {
                stem.strip_suffix(suffix.as_str())
                    .map(|base| (slot, base.to_string()))
            })
    }

    fn scan(&self) -> DatasetResult<Arc<PairedScan>> {
        if let Some(scan) = self.scan.read().as_ref() {
            return Ok(scan.clone());
        }

        let files = self.matcher.discover(&self.root)?;
        let mut slots: BTreeMap<String, Vec<Option<(PathBuf, AudioInfo)>>> = BTreeMap::new();
        for file in files {
            let rel = file.strip_prefix(&self.root).unwrap_or(&file);
            let Some((slot, name)) = self.group_name(rel) else {
                log::warn!(
                    "{}: {} matches no channel suffix {:?}",
                    self.info.id,
                    file.display(),
                    self.suffixes
                );
                continue;
            };
            let info = match self.decoder.probe(&file) {
                Ok(info) => info,
                Err(e @ DatasetError::UnsupportedFormat(_)) => return Err(e),
                Err(e) => {
                    log::warn!("{}: skipping {}: {e}", self.info.id, file.display());
                    continue;
                }
            };
            slots
                .entry(name)
                .or_insert_with(|| vec![None; self.suffixes.len()])[slot] = Some((file, info));
        }

        let mut entries = Vec::new();
        let mut groups = BTreeMap::new();
        for (name, members) in slots {
            if members.iter().any(|m| m.is_none()) {
                log::warn!("{}: incomplete channel group '{name}'", self.info.id);
                continue;
            }
            let members: Vec<(PathBuf, AudioInfo)> = members.into_iter().flatten().collect();
            let samples = members[0].1.samples;
            let sample_rate = members[0].1.sample_rate;
            if members
                .iter()
                .any(|(_, i)| i.samples != samples || i.sample_rate != sample_rate)
            {
                log::warn!("{}: geometry mismatch in group '{name}'", self.info.id);
                continue;
            }
            let channels = members.iter().map(|(_, i)| i.channels).sum();
            entries.push(CatalogEntry::new(
                IrId::Name(name.clone()),
                channels,
                samples,
                sample_rate,
            ));
            groups.insert(name, members.into_iter().map(|(p, _)| p).collect());
        }
        if entries.is_empty() {
            return Err(DatasetError::DatasetNotFound(format!(
                "{}: no complete channel groups matching {:?}",
                self.root.display(),
                self.matcher.patterns()
            )));
        }

        log::info!("{}: cataloged {} grouped IRs", self.info.id, entries.len());
        let scan = Arc::new(PairedScan { entries, groups });
        *self.scan.write() = Some(scan.clone());
        Ok(scan)
    }

    fn decode_group(&self, scan: &PairedScan, entry: &CatalogEntry) -> DatasetResult<IrMatrix> {
        let IrId::Name(name) = &entry.id else {
            return Err(DatasetError::UnknownIdentifier(entry.id.to_string()));
        };
        let members = scan
            .groups
            .get(name)
            .ok_or_else(|| DatasetError::UnknownIdentifier(name.clone()))?;

        let mut rows: Vec<Vec<Sample>> = Vec::with_capacity(entry.channels);
        for file in members {
            let (matrix, _) = self.decoder.decode(file)?;
            rows.extend(matrix.into_channels());
        }
        let matrix = IrMatrix::from_channels(rows)
            .ok_or_else(|| DatasetError::corrupt(Path::new(name), "member lengths differ"))?;
        check_shape(entry, &matrix)?;
        Ok(matrix)
    }
}

impl IrDataset for PairedChannelDataset {
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
        Ok(self.scan()?.entries.clone())
    }

    fn get(&self, id: &IrId) -> DatasetResult<IrMatrix> {
        let scan = self.scan()?;
        let entry = find_entry(&scan.entries, id)?;
        self.decode_group(&scan, entry)
    }

    fn get_all(&self) -> DatasetResult<IrStream<'_>> {
        let scan = self.scan()?;
        let iter = (0..scan.entries.len()).map(move |i| {
            let entry = &scan.entries[i];
            let matrix = self.decode_group(&scan, entry)?;
            Ok((entry.id.clone(), entry.sample_rate, matrix))
        });
        Ok(Box::new(iter))
    }
}
