//! rir-datasets: Uniform access to room impulse response databases
//!
//! Every supported database gets a *driver* implementing [`IrDataset`]:
//! enumerate IRs with their geometry (`list_irs`), fetch one by identifier
//! (`get`), or stream the whole dataset with per-container amortization
//! (`get_all`). Most databases are plain directories of audio files and are
//! covered by [`FlatFileDataset`] presets; the rest (matrix containers,
//! per-channel file pairs, SOFA grids) have dedicated drivers.
//!
//! ```no_run
//! use std::path::Path;
//! use rir_datasets::DatasetRegistry;
//!
//! let registry = DatasetRegistry::with_builtin();
//! let dataset = registry.build("openair", Path::new("/data/openair"))?;
//! for entry in dataset.list_irs()? {
//!     println!("{}: {} ch, {} samples @ {} Hz",
//!         entry.id, entry.channels, entry.samples, entry.sample_rate);
//! }
//! # Ok::<(), rir_datasets::DatasetError>(())
//! ```

mod dataset;
mod flat;
mod paired;
mod registry;

pub mod drivers;
pub mod presets;

pub use dataset::*;
pub use flat::*;
pub use paired::*;
pub use registry::*;

pub use rir_core::{CatalogEntry, DatasetError, DatasetResult, IrId, IrMatrix, Sample};
