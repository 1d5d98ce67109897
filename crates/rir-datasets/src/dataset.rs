//! Dataset trait and common record types

use rir_core::{CatalogEntry, DatasetError, DatasetResult, IrId, IrMatrix};
use serde::{Deserialize, Serialize};

/// One streamed IR: identifier, sample rate, decoded matrix.
pub type IrRecord = (IrId, u32, IrMatrix);

/// Lazy bulk stream over a dataset, in catalog order. Each item is the
/// record or the error for exactly that entry; a corrupt file surfaces
/// when the consumer reaches it and does not poison the remainder.
pub type IrStream<'a> = Box<dyn Iterator<Item = DatasetResult<IrRecord>> + 'a>;

/// Provenance metadata carried by every driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Unique machine slug (e.g. "openair")
    pub id: String,

    /// Human-readable dataset title
    pub name: String,

    /// Where to find out more about this dataset
    #[serde(default)]
    pub url: Option<String>,

    /// Copyright notice, license name, authors
    #[serde(default)]
    pub license: Option<String>,

    /// Direct download URLs
    #[serde(default)]
    pub download_urls: Vec<String>,
}

impl DatasetInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: None,
            license: None,
            download_urls: Vec::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_urls.push(url.into());
        self
    }
}

/// Capability set of a dataset driver.
///
/// Implementations bind to an immutable root directory at construction and
/// never write to it. The catalog is computed lazily on first use and cached
/// for the instance's lifetime. `get_all` may be called repeatedly; each
/// call replays the scan with a fresh iterator.
pub trait IrDataset: Send + Sync {
    /// Unique dataset slug (e.g. "mird")
    fn dataset_id(&self) -> &str;

    /// Human-readable dataset title
    fn name(&self) -> &str;

    /// Where to find out more about this dataset
    fn url(&self) -> Option<&str> {
        None
    }

    /// License name / copyright notice
    fn license(&self) -> Option<&str> {
        None
    }

    /// Direct dataset download URLs
    fn download_urls(&self) -> &[String] {
        &[]
    }

    /// Enumerate all IRs with their geometry, without decoding sample data.
    ///
    /// Fails with [`DatasetError::DatasetNotFound`] if the root is missing
    /// or holds none of the expected files. Deterministic for an unchanged
    /// root.
    fn list_irs(&self) -> DatasetResult<Vec<CatalogEntry>>;

    /// Decode one IR by identifier.
    ///
    /// The identifier must come from this instance's `list_irs`; anything
    /// else is [`DatasetError::UnknownIdentifier`]. Decode failures are
    /// [`DatasetError::CorruptFile`]. No file handle outlives the call.
    fn get(&self, id: &IrId) -> DatasetResult<IrMatrix>;

    /// Stream every IR in catalog order, amortizing per-container costs
    /// (each multi-IR file is decoded once per pass).
    fn get_all(&self) -> DatasetResult<IrStream<'_>>;

    /// Number of IRs in the dataset.
    fn len(&self) -> DatasetResult<usize> {
        Ok(self.list_irs()?.len())
    }

    fn is_empty(&self) -> DatasetResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Locate `id` in a catalog or fail with `UnknownIdentifier`.
pub(crate) fn find_entry<'a>(
    catalog: &'a [CatalogEntry],
    id: &IrId,
) -> DatasetResult<&'a CatalogEntry> {
    catalog
        .iter()
        .find(|e| &e.id == id)
        .ok_or_else(|| DatasetError::UnknownIdentifier(id.to_string()))
}

/// Enforce the catalog/decode shape invariant. A mismatch means the file
/// changed or lied about its geometry; it is reported as corrupt, never
/// returned as data.
pub(crate) fn check_shape(entry: &CatalogEntry, matrix: &IrMatrix) -> DatasetResult<()> {
    if matrix.shape() != (entry.channels, entry.samples) {
        return Err(DatasetError::CorruptFile {
            path: entry.id.to_string(),
            reason: format!(
                "decoded shape {:?}, catalog says ({}, {})",
                matrix.shape(),
                entry.channels,
                entry.samples
            ),
        });
    }
    Ok(())
}
