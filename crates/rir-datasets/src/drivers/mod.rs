//! Per-database drivers for layouts the flat driver cannot express

mod foa;
mod mat_column;
mod sofa;

pub use foa::*;
pub use mat_column::*;
pub use sofa::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rir_core::{CatalogEntry, DatasetError, IrId};

use crate::dataset::{IrRecord, IrStream};

/// Backing file of an identifier, if it has one.
pub(crate) fn id_file(id: &IrId) -> Option<&PathBuf> {
    match id {
        IrId::File(file) => Some(file),
        IrId::Member { file, .. } => Some(file),
        IrId::Measurement { file, .. } => Some(file),
        IrId::Name(_) => None,
    }
}

/// Re-raise a container-level failure for one of its member entries.
pub(crate) fn member_error(e: &DatasetError, id: &IrId) -> DatasetError {
    match e {
        DatasetError::UnsupportedFormat(msg) => DatasetError::UnsupportedFormat(msg.clone()),
        other => DatasetError::CorruptFile {
            path: id.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Stream a catalog in order, decoding each container file once and
/// yielding all of its member records before moving on. Consecutive
/// entries backed by the same file form one group; if the group loader
/// fails, every member of that group yields the failure, and later groups
/// are unaffected.
pub(crate) fn stream_file_groups<'a, F>(catalog: Arc<Vec<CatalogEntry>>, load_group: F) -> IrStream<'a>
where
    F: Fn(&Path, &[CatalogEntry]) -> rir_core::DatasetResult<Vec<IrRecord>> + 'a,
{
    let mut ranges: Vec<std::ops::Range<usize>> = Vec::new();
    for (i, entry) in catalog.iter().enumerate() {
        let same_file = ranges.last().is_some_and(|range| {
            range.end == i
                && match (id_file(&catalog[range.start].id), id_file(&entry.id)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
        });
        if same_file {
            if let Some(range) = ranges.last_mut() {
                range.end = i + 1;
            }
            continue;
        }
        ranges.push(i..i + 1);
    }

    Box::new(ranges.into_iter().flat_map(move |range| {
        let entries = &catalog[range];
        let records: Vec<rir_core::DatasetResult<IrRecord>> = match id_file(&entries[0].id) {
            Some(file) => match load_group(file, entries) {
                Ok(records) => records.into_iter().map(Ok).collect(),
                Err(e) => entries.iter().map(|en| Err(member_error(&e, &en.id))).collect(),
            },
            None => entries
                .iter()
                .map(|en| Err(DatasetError::UnknownIdentifier(en.id.to_string())))
                .collect(),
        };
        records
    }))
}
