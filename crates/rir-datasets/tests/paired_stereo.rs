//! Per-channel file grouping

mod common;

use std::sync::Arc;

use rir_datasets::{
    DatasetInfo, IrDataset, IrId, PairedChannelDataset, SoundfileDecoder,
};

fn paired(root: &std::path::Path) -> PairedChannelDataset {
    PairedChannelDataset::new(
        DatasetInfo::new("paired", "Paired channel test set"),
        root,
        &["**/*.wav"],
        &["_ch1", "_ch2"],
        Arc::new(SoundfileDecoder),
    )
    .unwrap()
}

#[test]
fn stereo_pair_catalogs_as_one_entry() {
    let dir = tempfile::tempdir().unwrap();
    let left: Vec<i16> = (0..4800).map(|i| (i % 311) as i16).collect();
    let right: Vec<i16> = (0..4800).map(|i| -((i % 173) as i16)).collect();
    common::write_wav_i16(&dir.path().join("room_a_ch1.wav"), 1, 48000, &left);
    common::write_wav_i16(&dir.path().join("room_a_ch2.wav"), 1, 48000, &right);

    let ds = paired(dir.path());
    let catalog = ds.list_irs().unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, IrId::Name("room_a".into()));
    assert_eq!(
        (catalog[0].channels, catalog[0].samples, catalog[0].sample_rate),
        (2, 4800, 48000)
    );

    // Row 0 is the _ch1 file, row 1 the _ch2 file.
    let matrix = ds.get(&catalog[0].id).unwrap();
    assert_eq!(matrix.shape(), (2, 4800));
    assert_eq!(matrix.channel(0)[1], 1.0 / 32768.0);
    assert_eq!(matrix.channel(1)[1], -1.0 / 32768.0);
    assert_eq!(matrix.channel(0)[310], 310.0 / 32768.0);
}

#[test]
fn incomplete_groups_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    common::write_wav_i16(&dir.path().join("room_a_ch1.wav"), 1, 48000, &[1i16; 16]);
    common::write_wav_i16(&dir.path().join("room_a_ch2.wav"), 1, 48000, &[2i16; 16]);
    // No _ch2 partner.
    common::write_wav_i16(&dir.path().join("room_b_ch1.wav"), 1, 48000, &[3i16; 16]);

    let ds = paired(dir.path());
    let catalog = ds.list_irs().unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, IrId::Name("room_a".into()));
}

#[test]
fn mismatched_geometry_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    common::write_wav_i16(&dir.path().join("room_a_ch1.wav"), 1, 48000, &[1i16; 16]);
    common::write_wav_i16(&dir.path().join("room_a_ch2.wav"), 1, 48000, &[2i16; 24]);
    common::write_wav_i16(&dir.path().join("room_b_ch1.wav"), 1, 48000, &[3i16; 8]);
    common::write_wav_i16(&dir.path().join("room_b_ch2.wav"), 1, 48000, &[4i16; 8]);

    let ds = paired(dir.path());
    let catalog = ds.list_irs().unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, IrId::Name("room_b".into()));
}

#[test]
fn get_all_matches_get() {
    let dir = tempfile::tempdir().unwrap();
    for room in ["alpha", "beta"] {
        common::write_wav_i16(
            &dir.path().join(format!("{room}_ch1.wav")),
            1,
            48000,
            &[5i16; 32],
        );
        common::write_wav_i16(
            &dir.path().join(format!("{room}_ch2.wav")),
            1,
            48000,
            &[-5i16; 32],
        );
    }

    let ds = paired(dir.path());
    let catalog = ds.list_irs().unwrap();
    let streamed: Vec<_> = ds.get_all().unwrap().map(|r| r.unwrap()).collect();

    assert_eq!(streamed.len(), catalog.len());
    for (entry, (id, _, matrix)) in catalog.iter().zip(&streamed) {
        assert_eq!(&entry.id, id);
        assert_eq!(ds.get(&entry.id).unwrap(), *matrix);
    }
}
