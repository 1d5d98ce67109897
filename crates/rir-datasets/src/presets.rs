//! Preset constructors for the supported databases
//!
//! Most published IR collections are plain directory trees of audio files;
//! they differ only in glob patterns and provenance. Each preset pairs the
//! metadata with the right driver configuration.

use std::path::PathBuf;
use std::sync::Arc;

use rir_core::DatasetResult;
use rir_file::RawSampleType;

use crate::dataset::DatasetInfo;
use crate::drivers::{
    FoaBrirDataset, IosrListeningRoomsDataset, IosrRealRoomsDataset, MatColumnDataset,
    MatVarDecoder, MatVarSelector, SofaDecoder,
};
use crate::flat::{FlatFileDataset, RawArrayDecoder, SoundfileDecoder};

fn soundfile() -> Arc<SoundfileDecoder> {
    Arc::new(SoundfileDecoder)
}

/// Ad-hoc flat WAV tree without curated metadata.
pub fn wav_dataset(
    id: &str,
    name: &str,
    root: impl Into<PathBuf>,
) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(DatasetInfo::new(id, name), root, &["**/*.wav"], soundfile())
}

/// Ad-hoc flat FLAC tree without curated metadata.
pub fn flac_dataset(
    id: &str,
    name: &str,
    root: impl Into<PathBuf>,
) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(DatasetInfo::new(id, name), root, &["**/*.flac"], soundfile())
}

// ═══════════════════════════════════════════════════════════════════════════════
// FLAT WAV DATABASES
// ═══════════════════════════════════════════════════════════════════════════════

pub fn openair_info() -> DatasetInfo {
    DatasetInfo::new("openair", "Open AIR impulse response library")
        .with_url("https://www.openairlib.net/")
}

pub fn openair(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::with_excludes(
        openair_info(),
        root,
        &["**/*.wav"],
        &["examples/*"],
        soundfile(),
    )
}

pub fn but_reverb_info() -> DatasetInfo {
    DatasetInfo::new("but_reverb", "BUT Speech@FIT Reverb Database")
        .with_url("https://speech.fit.vutbr.cz/software/but-speech-fit-reverb-database")
        .with_license("CC-BY-4.0")
}

pub fn but_reverb(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(but_reverb_info(), root, &["**/IR_*.wav"], soundfile())
}

pub fn darmstadt_info() -> DatasetInfo {
    DatasetInfo::new("darmstadt", "Darmstadt RIR sample packs")
}

pub fn darmstadt(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(darmstadt_info(), root, &["**/*rir.wav"], soundfile())
}

pub fn ash_brir_info() -> DatasetInfo {
    DatasetInfo::new("ash_brir", "ASH-IR binaural room impulse responses")
        .with_url("https://github.com/ShanonPearce/ASH-IR-Dataset")
}

pub fn ash_brir(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(ash_brir_info(), root, &["BRIRs/**/*.wav"], soundfile())
}

pub fn hopkins_info() -> DatasetInfo {
    DatasetInfo::new("hopkins", "Hopkins IR library")
}

pub fn hopkins(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(hopkins_info(), root, &["Real Spaces/**/*.wav"], soundfile())
}

pub fn reverb2014_info() -> DatasetInfo {
    DatasetInfo::new("reverb2014", "REVERB Challenge 2014 room impulse responses")
        .with_url("https://reverb2014.dereverberation.com/")
}

pub fn reverb2014(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(reverb2014_info(), root, &["**/RIR_*.wav"], soundfile())
}

pub fn mardy_info() -> DatasetInfo {
    DatasetInfo::new("mardy", "MARDY multichannel acoustic reverberation database")
}

pub fn mardy(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(mardy_info(), root, &["**/*.wav"], soundfile())
}

pub fn drr_info() -> DatasetInfo {
    DatasetInfo::new("drr", "DRR-scaled binaural room impulse responses")
}

pub fn drr(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(drr_info(), root, &["**/*.wav"], soundfile())
}

pub fn isophonics_info() -> DatasetInfo {
    DatasetInfo::new("isophonics", "Isophonics room impulse responses")
        .with_url("http://isophonics.net/")
}

pub fn isophonics(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(isophonics_info(), root, &["**/*.wav"], soundfile())
}

pub fn pori_info() -> DatasetInfo {
    DatasetInfo::new("pori", "Pori Promenadikeskus concert hall impulse responses")
        .with_url("http://legacy.spa.aalto.fi/projects/poririrs/")
}

pub fn pori(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(pori_info(), root, &["**/*.wav"], soundfile())
}

pub fn spargair_info() -> DatasetInfo {
    DatasetInfo::new("spargair", "SPARG ambisonic room impulse responses")
}

pub fn spargair(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(spargair_info(), root, &["**/*.wav"], soundfile())
}

pub fn voxengo_info() -> DatasetInfo {
    DatasetInfo::new("voxengo", "Voxengo free reverb impulse responses")
        .with_url("https://www.voxengo.com/impulses/")
}

pub fn voxengo(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(voxengo_info(), root, &["**/*.wav"], soundfile())
}

pub fn hybridreverb2_info() -> DatasetInfo {
    DatasetInfo::new("hybridreverb2", "HybridReverb2 impulse response database")
}

pub fn hybridreverb2(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(hybridreverb2_info(), root, &["**/*.flac"], soundfile())
}

// ═══════════════════════════════════════════════════════════════════════════════
// MATRIX CONTAINERS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn air_info() -> DatasetInfo {
    DatasetInfo::new("air", "Aachen Impulse Response (AIR) database").with_url(
        "https://www.iks.rwth-aachen.de/en/research/tools-downloads/databases/aachen-impulse-response-database/",
    )
}

pub fn air(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(
        air_info(),
        root,
        &["**/*.mat"],
        Arc::new(MatVarDecoder {
            var: "h_air",
            sample_rate: 48000,
        }),
    )
}

pub fn mird_info() -> DatasetInfo {
    DatasetInfo::new("mird", "Multichannel Impulse Response Database (MIRD)").with_url(
        "https://www.audiolabs-erlangen.de/fau/professor/habets/activities/multichannel-audio-database",
    )
}

pub fn mird(root: impl Into<PathBuf>) -> DatasetResult<MatColumnDataset> {
    MatColumnDataset::with_patterns(
        mird_info(),
        root,
        &["**/*.mat"],
        MatVarSelector::Named("impulse_response"),
        48000,
    )
}

pub fn bell_varechoic_info() -> DatasetInfo {
    DatasetInfo::new("bell_varechoic", "Bell Labs varechoic chamber impulse responses")
}

pub fn bell_varechoic(root: impl Into<PathBuf>) -> MatColumnDataset {
    MatColumnDataset::with_files(
        bell_varechoic_info(),
        root,
        &["IR_00.mat", "IR_43.mat", "IR_100.mat"],
        MatVarSelector::First,
        10000,
    )
}

pub fn foa_brir_info() -> DatasetInfo {
    DatasetInfo::new(
        "foa_brir",
        "360° binaural room impulse response database for 6DOF research",
    )
    .with_url("https://zenodo.org/record/2641166")
    .with_license("CC-BY-4.0")
}

pub fn foa_brir(root: impl Into<PathBuf>) -> DatasetResult<FoaBrirDataset> {
    FoaBrirDataset::new(foa_brir_info(), root)
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAW DUMPS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn rwcp_info() -> DatasetInfo {
    DatasetInfo::new("rwcp", "RWCP Sound Scene Database real environment IRs")
}

pub fn rwcp(root: impl Into<PathBuf>) -> DatasetResult<FlatFileDataset> {
    FlatFileDataset::new(
        rwcp_info(),
        root,
        &["near/data/rsp*/*", "micarray/**/imp*.*"],
        Arc::new(RawArrayDecoder {
            dtype: RawSampleType::F32Le,
            sample_rate: 48000,
        }),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOFA GRIDS (DECODER INJECTED)
// ═══════════════════════════════════════════════════════════════════════════════

pub fn iosr_real_rooms_info() -> DatasetInfo {
    DatasetInfo::new("iosr_real_rooms", "IoSR real rooms BRIR set")
}

pub fn iosr_real_rooms(
    root: impl Into<PathBuf>,
    decoder: Option<Arc<dyn SofaDecoder>>,
) -> DatasetResult<IosrRealRoomsDataset> {
    IosrRealRoomsDataset::new(iosr_real_rooms_info(), root, decoder)
}

pub fn iosr_listening_rooms_info() -> DatasetInfo {
    DatasetInfo::new("iosr_listening_rooms", "IoSR listening room BRIRs")
}

pub fn iosr_listening_rooms(
    root: impl Into<PathBuf>,
    decoder: Option<Arc<dyn SofaDecoder>>,
) -> DatasetResult<IosrListeningRoomsDataset> {
    IosrListeningRoomsDataset::new(iosr_listening_rooms_info(), root, decoder)
}
