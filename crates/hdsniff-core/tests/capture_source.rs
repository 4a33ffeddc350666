use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use hdsniff_core::{
    CaptureFile, CaptureSource, DecodeOptions, MemorySource, SourceError, analyze_source,
};

fn temp_path(suffix: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("hdsniff_{unique}_{suffix}"));
    path
}

#[test]
fn capture_file_loads_all_bytes() {
    let path = temp_path("capture.bin");
    fs::write(&path, [0x96, 0x00, 0x1E]).unwrap();
    let mut source = CaptureFile::open(&path).unwrap();
    let data = source.load().unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(data, [0x96, 0x00, 0x1E]);
    assert_eq!(source.size(), 3);
}

#[test]
fn capture_file_rejects_missing_file() {
    let path = temp_path("missing.bin");
    let err = CaptureFile::open(&path).unwrap_err();
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn capture_file_rejects_directory() {
    let path = temp_path("dir");
    fs::create_dir_all(&path).unwrap();
    let err = CaptureFile::open(&path).unwrap_err();
    let _ = fs::remove_dir(&path);
    assert!(matches!(err, SourceError::NotAFile { .. }));
}

#[test]
fn empty_capture_produces_empty_report() {
    let path = temp_path("empty.bin");
    fs::write(&path, b"").unwrap();
    let source = CaptureFile::open(&path).unwrap();
    let report = analyze_source(source, DecodeOptions::default()).unwrap();
    let _ = fs::remove_file(&path);

    assert!(report.events.is_empty());
    assert!(report.summary.is_clean());
    assert_eq!(report.input.bytes, 0);
}

#[test]
fn memory_source_uses_label() {
    let source = MemorySource::new("stdin", vec![0x00, 0x00]);
    let report = analyze_source(source, DecodeOptions::default()).unwrap();
    assert_eq!(report.input.path, "stdin");
    assert_eq!(report.summary.errors, 1);
    assert_eq!(report.summary.noise_bytes, 1);
}
