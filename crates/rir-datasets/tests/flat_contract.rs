//! Interface contract over flat-directory datasets

mod common;

use rir_datasets::{DatasetError, IrDataset, IrId, presets};

#[test]
fn catalog_is_sorted_deterministic_and_shape_accurate() {
    let dir = tempfile::tempdir().unwrap();
    common::write_wav_i16(&dir.path().join("b.wav"), 2, 48000, &[0i16; 64]);
    common::write_wav_i16(&dir.path().join("a.wav"), 1, 44100, &[0i16; 100]);
    std::fs::create_dir(dir.path().join("hall")).unwrap();
    common::write_wav_i16(&dir.path().join("hall/c.wav"), 1, 48000, &[0i16; 10]);

    let ds = presets::wav_dataset("test", "Test set", dir.path()).unwrap();
    let catalog = ds.list_irs().unwrap();

    let names: Vec<String> = catalog.iter().map(|e| e.id.to_string()).collect();
    assert_eq!(catalog.len(), 3);
    assert!(names[0].ends_with("a.wav"));
    assert!(names[1].ends_with("b.wav"));
    assert!(names[2].ends_with("c.wav"));

    assert_eq!(
        (catalog[0].channels, catalog[0].samples, catalog[0].sample_rate),
        (1, 100, 44100)
    );
    assert_eq!(
        (catalog[1].channels, catalog[1].samples, catalog[1].sample_rate),
        (2, 32, 48000)
    );

    // Idempotent for an unchanged root.
    assert_eq!(ds.list_irs().unwrap(), catalog);

    // Declared geometry matches decoded geometry.
    for entry in &catalog {
        let matrix = ds.get(&entry.id).unwrap();
        assert_eq!(matrix.shape(), (entry.channels, entry.samples));
    }
}

#[test]
fn get_all_equals_get_in_catalog_order() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..4 {
        let frames: Vec<i16> = (0..50).map(|s| (s * (i + 1)) as i16).collect();
        common::write_wav_i16(&dir.path().join(format!("r{i}.wav")), 1, 48000, &frames);
    }

    let ds = presets::wav_dataset("test", "Test set", dir.path()).unwrap();
    let catalog = ds.list_irs().unwrap();

    let streamed: Vec<_> = ds.get_all().unwrap().map(|r| r.unwrap()).collect();
    assert_eq!(streamed.len(), catalog.len());
    for (entry, (id, sample_rate, matrix)) in catalog.iter().zip(&streamed) {
        assert_eq!(&entry.id, id);
        assert_eq!(entry.sample_rate, *sample_rate);
        // Bit-for-bit equal to the random-access path.
        assert_eq!(ds.get(&entry.id).unwrap(), *matrix);
    }

    // Restartable: a second pass replays identically.
    let second: Vec<_> = ds.get_all().unwrap().map(|r| r.unwrap()).collect();
    assert_eq!(streamed, second);
}

#[test]
fn unknown_identifier_is_loud() {
    let dir = tempfile::tempdir().unwrap();
    common::write_wav_i16(&dir.path().join("a.wav"), 1, 48000, &[0i16; 8]);

    let ds = presets::wav_dataset("test", "Test set", dir.path()).unwrap();
    ds.list_irs().unwrap();

    let missing = IrId::File(dir.path().join("ghost.wav"));
    assert!(matches!(
        ds.get(&missing),
        Err(DatasetError::UnknownIdentifier(_))
    ));
}

#[test]
fn missing_and_empty_roots_are_dataset_not_found() {
    let ds = presets::wav_dataset("test", "Test set", "/nonexistent/rirkit-root").unwrap();
    assert!(matches!(
        ds.list_irs(),
        Err(DatasetError::DatasetNotFound(_))
    ));

    let empty = tempfile::tempdir().unwrap();
    let ds = presets::wav_dataset("test", "Test set", empty.path()).unwrap();
    assert!(matches!(
        ds.list_irs(),
        Err(DatasetError::DatasetNotFound(_))
    ));
}

#[test]
fn one_corrupt_file_defers_until_reached() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..10 {
        common::write_wav_i16(
            &dir.path().join(format!("r{i:02}.wav")),
            1,
            48000,
            &[7i16; 64],
        );
    }
    // Sorts between r05 and r06; header still declares 64 samples.
    let corrupt = dir.path().join("r05x.wav");
    common::write_wav_i16(&corrupt, 1, 48000, &[7i16; 64]);
    common::truncate_file(&corrupt, 40);

    let ds = presets::wav_dataset("test", "Test set", dir.path()).unwrap();
    let catalog = ds.list_irs().unwrap();
    assert_eq!(catalog.len(), 11);

    let corrupt_pos = catalog
        .iter()
        .position(|e| e.id.to_string().ends_with("r05x.wav"))
        .unwrap();
    assert_eq!(corrupt_pos, 6);

    let results: Vec<_> = ds.get_all().unwrap().collect();
    assert_eq!(results.len(), 11);
    for (i, result) in results.iter().enumerate() {
        if i == corrupt_pos {
            assert!(matches!(result, Err(DatasetError::CorruptFile { .. })));
        } else {
            assert!(result.is_ok(), "entry {i} should decode");
        }
    }

    // Random access agrees with the stream.
    assert!(matches!(
        ds.get(&catalog[corrupt_pos].id),
        Err(DatasetError::CorruptFile { .. })
    ));
}

#[test]
fn raw_dump_dataset_catalogs_by_file_size() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("near/data/rsp01")).unwrap();
    let values: Vec<f32> = (0..32).map(|i| i as f32 / 32.0).collect();
    common::write_raw_f32(&dir.path().join("near/data/rsp01/imp000"), &values);

    let ds = presets::rwcp(dir.path()).unwrap();
    let catalog = ds.list_irs().unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(
        (catalog[0].channels, catalog[0].samples, catalog[0].sample_rate),
        (1, 32, 48000)
    );

    let matrix = ds.get(&catalog[0].id).unwrap();
    assert_eq!(matrix.channel(0)[1], 1.0 / 32.0);
}
