//! Dataset registry — central lookup for all built-in drivers

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use rir_core::{DatasetError, DatasetResult};

use crate::dataset::{DatasetInfo, IrDataset};
use crate::presets;

/// Constructor binding a driver to a root directory.
pub type BuildFn = fn(&Path) -> DatasetResult<Arc<dyn IrDataset>>;

/// Registered driver: provenance metadata plus a constructor.
pub struct DatasetDescriptor {
    pub info: DatasetInfo,
    build: BuildFn,
}

impl DatasetDescriptor {
    pub fn new(info: DatasetInfo, build: BuildFn) -> Self {
        Self { info, build }
    }

    /// Construct the driver over `root`.
    pub fn build(&self, root: &Path) -> DatasetResult<Arc<dyn IrDataset>> {
        (self.build)(root)
    }
}

/// Central registry of dataset drivers, keyed by slug.
#[derive(Default)]
pub struct DatasetRegistry {
    datasets: HashMap<String, DatasetDescriptor>,
}

impl DatasetRegistry {
    /// Create empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in driver.
    ///
    /// SOFA-backed drivers are registered without a decoder; they construct
    /// fine and report `UnsupportedFormat` on first use unless rebuilt with
    /// one injected.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();

        registry.register(DatasetDescriptor::new(presets::openair_info(), |root| {
            let ds = presets::openair(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::but_reverb_info(), |root| {
            let ds = presets::but_reverb(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::darmstadt_info(), |root| {
            let ds = presets::darmstadt(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::ash_brir_info(), |root| {
            let ds = presets::ash_brir(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::hopkins_info(), |root| {
            let ds = presets::hopkins(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::reverb2014_info(), |root| {
            let ds = presets::reverb2014(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::mardy_info(), |root| {
            let ds = presets::mardy(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::drr_info(), |root| {
            let ds = presets::drr(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::isophonics_info(), |root| {
            let ds = presets::isophonics(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::pori_info(), |root| {
            let ds = presets::pori(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::spargair_info(), |root| {
            let ds = presets::spargair(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::voxengo_info(), |root| {
            let ds = presets::voxengo(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(
            presets::hybridreverb2_info(),
            |root| {
                let ds = presets::hybridreverb2(root)?;
                Ok(Arc::new(ds) as Arc<dyn IrDataset>)
            },
        ));
        registry.register(DatasetDescriptor::new(presets::air_info(), |root| {
            let ds = presets::air(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::mird_info(), |root| {
            let ds = presets::mird(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(
            presets::bell_varechoic_info(),
            |root| {
                let ds = presets::bell_varechoic(root);
                Ok(Arc::new(ds) as Arc<dyn IrDataset>)
            },
        ));
        registry.register(DatasetDescriptor::new(presets::foa_brir_info(), |root| {
            let ds = presets::foa_brir(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(presets::rwcp_info(), |root| {
            let ds = presets::rwcp(root)?;
            Ok(Arc::new(ds) as Arc<dyn IrDataset>)
        }));
        registry.register(DatasetDescriptor::new(
            presets::iosr_real_rooms_info(),
            |root| {
                let ds = presets::iosr_real_rooms(root, None)?;
                Ok(Arc::new(ds) as Arc<dyn IrDataset>)
            },
        ));
        registry.register(DatasetDescriptor::new(
            presets::iosr_listening_rooms_info(),
            |root| {
                let ds = presets::iosr_listening_rooms(root, None)?;
                Ok(Arc::new(ds) as Arc<dyn IrDataset>)
            },
        ));

        registry
    }

    /// Register a driver descriptor (replaces any previous one with the
    /// same id).
    pub fn register(&mut self, descriptor: DatasetDescriptor) {
        self.datasets
            .insert(descriptor.info.id.clone(), descriptor);
    }

    pub fn get(&self, id: &str) -> Option<&DatasetDescriptor> {
        self.datasets.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.datasets.contains_key(id)
    }

    /// All registered slugs, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.datasets.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.datasets.values()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Build the driver registered under `id` over `root`.
    pub fn build(&self, id: &str, root: &Path) -> DatasetResult<Arc<dyn IrDataset>> {
        let descriptor = self.get(id).ok_or_else(|| {
            DatasetError::DatasetNotFound(format!("no driver registered for '{id}'"))
        })?;
        descriptor.build(root)
    }

    /// Structural sniffing: first registered driver (in slug order) whose
    /// catalog comes up non-empty over `root`.
    pub fn detect(&self, root: &Path) -> Option<(String, Arc<dyn IrDataset>)> {
        for id in self.ids() {
            let descriptor = self.get(id)?;
            if let Ok(dataset) = descriptor.build(root) {
                match dataset.list_irs() {
                    Ok(catalog) if !catalog.is_empty() => {
                        return Some((id.to_string(), dataset));
                    }
                    _ => {}
                }
            }
        }
        None
    }

    /// Markdown table of every registered dataset's provenance, sorted by
    /// name.
    pub fn license_table(&self) -> String {
        let mut rows: Vec<&DatasetDescriptor> = self.datasets.values().collect();
        rows.sort_by(|a, b| a.info.name.cmp(&b.info.name));

        let mut out = String::from("| Dataset | License |\n| --- | --- |\n");
        for descriptor in rows {
            let name = match &descriptor.info.url {
                Some(url) => format!("[{}]({url})", descriptor.info.name),
                None => descriptor.info.name.clone(),
            };
            let license = descriptor.info.license.as_deref().unwrap_or("");
            let _ = writeln!(out, "| {name} | {license} |");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_roster() {
        let registry = DatasetRegistry::with_builtin();
        assert!(registry.len() >= 19);
        for id in ["openair", "air", "mird", "rwcp", "foa_brir", "bell_varechoic"] {
            assert!(registry.contains(id), "missing {id}");
        }
        let ids = registry.ids();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn build_unknown_id_fails() {
        let registry = DatasetRegistry::with_builtin();
        assert!(matches!(
            registry.build("nope", Path::new("/tmp")),
            Err(DatasetError::DatasetNotFound(_))
        ));
    }

    #[test]
    fn license_table_renders_links() {
        let registry = DatasetRegistry::with_builtin();
        let table = registry.license_table();
        assert!(table.starts_with("| Dataset | License |"));
        assert!(table.contains("[BUT Speech@FIT Reverb Database]"));
        assert!(table.contains("CC-BY-4.0"));
    }

    #[test]
    fn detect_prefers_first_matching_slug() {
        let dir = tempfile::tempdir().unwrap();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer =
            hound::WavWriter::create(dir.path().join("IR_office.wav"), spec).unwrap();
        for _ in 0..16 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let registry = DatasetRegistry::with_builtin();
        let (id, dataset) = registry.detect(dir.path()).unwrap();
        // "but_reverb" sorts before the catch-all wav drivers and its
        // IR_*.wav pattern matches.
        assert_eq!(id, "but_reverb");
        assert_eq!(dataset.len().unwrap(), 1);
    }
}
