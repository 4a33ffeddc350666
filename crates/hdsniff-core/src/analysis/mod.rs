use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::protocols::hitec::{DecodeOptions, Decoder, RecoveryMode};
use crate::source::{CaptureFile, CaptureSource, SourceError};
use crate::{DecodeSummary, Report, make_stub_report};

mod events;
mod registers;

use events::event_record;
use registers::{RegisterStats, add_register_event, build_register_summaries};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn decode_capture_file(path: &Path, options: DecodeOptions) -> Result<Report, AnalysisError> {
    let source = CaptureFile::open(path)?;
    analyze_source(source, options)
}

pub fn analyze_source<S: CaptureSource>(
    mut source: S,
    options: DecodeOptions,
) -> Result<Report, AnalysisError> {
    let data = source.load()?;
    Ok(decode_bytes(&source.describe(), &data, options))
}

/// Decode an in-memory capture into a report.
pub fn decode_bytes(label: &str, data: &[u8], options: DecodeOptions) -> Report {
    let mut decoder = Decoder::with_options(data, options);
    let mut register_stats: BTreeMap<u8, RegisterStats> = BTreeMap::new();
    let mut events = Vec::new();

    for event in decoder.by_ref() {
        add_register_event(&mut register_stats, &event);
        events.push(event_record(&event));
    }

    let stats = decoder.stats();
    let mut report = make_stub_report(label, data.len() as u64);
    report.recovery = options.recovery;
    report.summary = DecodeSummary {
        bytes_total: data.len() as u64,
        reads: stats.reads,
        writes: stats.writes,
        errors: stats.errors,
        invalid_checksums: stats.invalid_checksums,
        noise_bytes: stats.noise_bytes,
        resync_bytes: match options.recovery {
            RecoveryMode::Local => None,
            RecoveryMode::Resync => Some(stats.resync_bytes),
        },
        truncated: decoder.truncation(),
    };
    report.registers = build_register_summaries(register_stats);
    report.events = events;
    report
}
