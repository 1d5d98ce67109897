//! SOFA-backed datasets with an injected decoder
//!
//! SOFA (Spatially Oriented Format for Acoustics) rides on HDF5, which is
//! a heavyweight optional dependency. Rather than linking it here, drivers
//! accept a caller-supplied [`SofaDecoder`]; built without one they report
//! `UnsupportedFormat` and leave every other driver usable.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rir_core::{CatalogEntry, DatasetError, DatasetResult, IrId, IrMatrix};

use crate::dataset::{DatasetInfo, IrDataset, IrStream, check_shape, find_entry};
use crate::drivers::stream_file_groups;
use crate::flat::FileMatcher;

const SAMPLE_RATE: u32 = 48000;

/// Measurement-grid dimensions of one SOFA file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SofaDims {
    pub measurements: usize,
    pub receivers: usize,
    pub samples: usize,
}

/// Caller-supplied SOFA reader.
pub trait SofaDecoder: Send + Sync {
    /// Grid dimensions, from headers only.
    fn dimensions(&self, path: &Path) -> DatasetResult<SofaDims>;

    /// The full IR data: one `(receivers, samples)` matrix per measurement.
    fn data_ir(&self, path: &Path) -> DatasetResult<Vec<IrMatrix>>;
}

fn no_decoder(id: &str) -> DatasetError {
    DatasetError::UnsupportedFormat(format!("{id}: no SOFA decoder installed"))
}

/// Shared scaffolding for the two IoSR sets: discovery, dims probing, and
/// the per-file bulk pass. What differs is how a grid cell maps onto
/// catalog entries.
struct SofaScaffold {
    info: DatasetInfo,
    root: PathBuf,
    matcher: FileMatcher,
    decoder: Option<Arc<dyn SofaDecoder>>,
    catalog: RwLock<Option<Arc<Vec<CatalogEntry>>>>,
}

impl SofaScaffold {
    fn new(
        info: DatasetInfo,
        root: impl Into<PathBuf>,
        patterns: &[&str],
        decoder: Option<Arc<dyn SofaDecoder>>,
    ) -> DatasetResult<Self> {
        Ok(Self {
            info,
            root: root.into(),
            matcher: FileMatcher::new(patterns, &[])?,
            decoder,
            catalog: RwLock::new(None),
        })
    }

    fn decoder(&self) -> DatasetResult<&Arc<dyn SofaDecoder>> {
        self.decoder.as_ref().ok_or_else(|| no_decoder(&self.info.id))
    }

    fn scan(
        &self,
        entries_for: impl Fn(&PathBuf, SofaDims) -> Vec<CatalogEntry>,
    ) -> DatasetResult<Arc<Vec<CatalogEntry>>> {
        if let Some(catalog) = self.catalog.read().as_ref() {
            return Ok(catalog.clone());
        }

        let decoder = self.decoder()?;
        let files = self.matcher.discover(&self.root)?;
        let mut entries = Vec::new();
        for file in files {
            match decoder.dimensions(&file) {
                Ok(dims) => entries.extend(entries_for(&file, dims)),
                Err(e @ DatasetError::UnsupportedFormat(_)) => return Err(e),
                Err(e) => log::warn!("{}: skipping {}: {e}", self.info.id, file.display()),
            }
        }
        if entries.is_empty() {
            return Err(DatasetError::DatasetNotFound(format!(
                "{}: no SOFA files matching {:?} under {}",
                self.info.id,
                self.matcher.patterns(),
                self.root.display()
            )));
        }

        log::info!("{}: cataloged {} IRs", self.info.id, entries.len());
        let entries = Arc::new(entries);
        *self.catalog.write() = Some(entries.clone());
        Ok(entries)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ONE ENTRY PER (MEASUREMENT, RECEIVER)
// ═══════════════════════════════════════════════════════════════════════════════

/// IoSR real rooms: every receiver of every measurement is its own mono IR.
pub struct IosrRealRoomsDataset {
    scaffold: SofaScaffold,
}

impl IosrRealRoomsDataset {
    pub fn new(
        info: DatasetInfo,
        root: impl Into<PathBuf>,
        decoder: Option<Arc<dyn SofaDecoder>>,
    ) -> DatasetResult<Self> {
        Ok(Self {
            scaffold: SofaScaffold::new(info, root, &["**/*_48k.sofa"], decoder)?,
        })
    }

    fn scan(&self) -> DatasetResult<Arc<Vec<CatalogEntry>>> {
        self.scaffold.scan(|file, dims| {
            let mut entries = Vec::with_capacity(dims.measurements * dims.receivers);
            for measurement in 0..dims.measurements {
                for receiver in 0..dims.receivers {
                    entries.push(CatalogEntry::new(
                        IrId::Measurement {
                            file: file.clone(),
                            measurement,
                            receiver,
                        },
                        1,
                        dims.samples,
                        SAMPLE_RATE,
                    ));
                }
            }
            entries
        })
    }

    fn cell_record(
        measurements: &[IrMatrix],
        entry: &CatalogEntry,
    ) -> DatasetResult<(IrId, u32, IrMatrix)> {
        let IrId::Measurement {
            file,
            measurement,
            receiver,
        } = &entry.id
        else {
            return Err(DatasetError::UnknownIdentifier(entry.id.to_string()));
        };
        let grid = measurements.get(*measurement).ok_or_else(|| {
            DatasetError::corrupt(file, format!("measurement {measurement} out of range"))
        })?;
        let row = grid.channels().get(*receiver).ok_or_else(|| {
            DatasetError::corrupt(file, format!("receiver {receiver} out of range"))
        })?;
        let matrix = IrMatrix::from_mono(row.clone());
        check_shape(entry, &matrix)?;
        Ok((entry.id.clone(), entry.sample_rate, matrix))
    }
}

impl IrDataset for IosrRealRoomsDataset {
    fn dataset_id(&self) -> &str {
        &self.scaffold.info.id
    }

    fn name(&self) -> &str {
        &self.scaffold.info.name
    }

    fn url(&self) -> Option<&str> {
        self.scaffold.info.url.as_deref()
    }

    fn license(&self) -> Option<&str> {
        self.scaffold.info.license.as_deref()
    }

    fn download_urls(&self) -> &[String] {
        &self.scaffold.info.download_urls
    }

    fn list_irs(&self) -> DatasetResult<Vec<CatalogEntry>> {
        Ok(self.scan()?.as_ref().clone())
    }

    fn get(&self, id: &IrId) -> DatasetResult<IrMatrix> {
        let catalog = self.scan()?;
        let entry = find_entry(&catalog, id)?;
        let IrId::Measurement { file, .. } = &entry.id else {
            return Err(DatasetError::UnknownIdentifier(entry.id.to_string()));
        };
        let measurements = self.scaffold.decoder()?.data_ir(file)?;
        let (_, _, matrix) = Self::cell_record(&measurements, entry)?;
        Ok(matrix)
    }

    fn get_all(&self) -> DatasetResult<IrStream<'_>> {
        let catalog = self.scan()?;
        Ok(stream_file_groups(catalog, move |file, entries| {
            let measurements = self.scaffold.decoder()?.data_ir(file)?;
            entries
                .iter()
                .map(|entry| Self::cell_record(&measurements, entry))
                .collect()
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ONE ENTRY PER MEASUREMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// IoSR listening room: each measurement is one multichannel BRIR.
pub struct IosrListeningRoomsDataset {
    scaffold: SofaScaffold,
}

impl IosrListeningRoomsDataset {
    pub fn new(
        info: DatasetInfo,
        root: impl Into<PathBuf>,
        decoder: Option<Arc<dyn SofaDecoder>>,
    ) -> DatasetResult<Self> {
        Ok(Self {
            scaffold: SofaScaffold::new(
                info,
                root,
                &["IoSR_ListeningRoom_BRIRs.sofa"],
                decoder,
            )?,
        })
    }

    fn scan(&self) -> DatasetResult<Arc<Vec<CatalogEntry>>> {
        self.scaffold.scan(|file, dims| {
            (0..dims.measurements)
                .map(|index| {
                    CatalogEntry::new(
                        IrId::Member {
                            file: file.clone(),
                            index,
                        },
                        dims.receivers,
                        dims.samples,
                        SAMPLE_RATE,
                    )
                })
                .collect()
        })
    }

    fn measurement_record(
        measurements: &[IrMatrix],
        entry: &CatalogEntry,
    ) -> DatasetResult<(IrId, u32, IrMatrix)> {
        let IrId::Member { file, index } = &entry.id else {
            return Err(DatasetError::UnknownIdentifier(entry.id.to_string()));
        };
        let matrix = measurements
            .get(*index)
            .ok_or_else(|| {
                DatasetError::corrupt(file, format!("measurement {index} out of range"))
            })?
            .clone();
        check_shape(entry, &matrix)?;
        Ok((entry.id.clone(), entry.sample_rate, matrix))
    }
}

impl IrDataset for IosrListeningRoomsDataset {
    fn dataset_id(&self) -> &str {
        &self.scaffold.info.id
    }

    fn name(&self) -> &str {
        &self.scaffold.info.name
    }

    fn url(&self) -> Option<&str> {
        self.scaffold.info.url.as_deref()
    }

    fn license(&self) -> Option<&str> {
        self.scaffold.info.license.as_deref()
    }

    fn download_urls(&self) -> &[String] {
        &self.scaffold.info.download_urls
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
        let measurements = self.scaffold.decoder()?.data_ir(file)?;
        let (_, _, matrix) = Self::measurement_record(&measurements, entry)?;
        Ok(matrix)
    }

    fn get_all(&self) -> DatasetResult<IrStream<'_>> {
        let catalog = self.scan()?;
        Ok(stream_file_groups(catalog, move |file, entries| {
            let measurements = self.scaffold.decoder()?.data_ir(file)?;
            entries
                .iter()
                .map(|entry| Self::measurement_record(&measurements, entry))
                .collect()
        }))
    }
}
