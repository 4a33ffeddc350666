//! hdsniff core library for offline decoding of Hitec D-series servo traffic.
//!
//! This crate turns a raw UART capture of the half-duplex programmer/servo
//! line into a stream of register reads, register writes and framing errors.
//! Capture sources feed the analysis layer, which drives the protocol decoder
//! (layout/reader/parser) and aggregates results into a deterministic report.
//! Decoding is byte-oriented and side-effect free; all I/O is isolated in
//! `source` modules.
//!
//! Invariants:
//! - Events are emitted in capture order and never overlap.
//! - Checksum mismatches flag a value, they never drop it.
//! - Nothing but the end of the capture stops decoding.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use hdsniff_core::{DecodeOptions, decode_capture_file};
//!
//! let report = decode_capture_file(Path::new("capture.bin"), DecodeOptions::default())?;
//! for event in &report.events {
//!     println!("{}", event.line);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
pub mod protocols;
mod source;

pub use analysis::{AnalysisError, analyze_source, decode_bytes, decode_capture_file};
pub use protocols::hitec::{
    ByteCursor, ByteSpan, DecodeOptions, DecodeStats, DecodedEvent, Decoder, FrameContext,
    FrameError, PendingField, RecoveryMode, RegisterAccess, Truncation, decode, name_of,
};
pub use source::{CaptureFile, CaptureSource, MAX_CAPTURE_BYTES, MemorySource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Timestamp used until the caller stamps the report.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoded capture with summaries in stable order.
///
/// # Examples
/// ```
/// use hdsniff_core::make_stub_report;
///
/// let report = make_stub_report("capture.bin", 12);
/// assert_eq!(report.report_version, hdsniff_core::REPORT_VERSION);
/// assert!(report.events.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,
    /// Recovery mode used for this decode.
    pub recovery: RecoveryMode,

    pub summary: DecodeSummary,
    /// Per-register summaries ordered by address.
    pub registers: Vec<RegisterSummary>,
    /// Decoded events in capture order.
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input capture metadata embedded in reports.
///
/// # Examples
/// ```
/// use hdsniff_core::InputInfo;
///
/// let input = InputInfo {
///     path: "capture.bin".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Capture-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSummary {
    pub bytes_total: u64,
    pub reads: u64,
    pub writes: u64,
    /// Structural mismatches (error events).
    pub errors: u64,
    /// Reads and writes reported with a bad checksum.
    pub invalid_checksums: u64,
    /// Zero bytes skipped between frames.
    pub noise_bytes: u64,
    /// Bytes discarded while searching for a command marker (resync mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resync_bytes: Option<u64>,
    /// Partial frame at the end of the capture, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<Truncation>,
}

impl DecodeSummary {
    /// True when the capture decoded without errors or bad checksums.
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.invalid_checksums == 0
    }
}

/// Per-register activity.
///
/// # Examples
/// ```
/// use hdsniff_core::RegisterSummary;
///
/// let summary = RegisterSummary {
///     register: 0x1E,
///     name: "HD_REG_TARGET".to_string(),
///     reads: 0,
///     writes: 2,
///     invalid_checksums: 0,
///     last_value: Some(3000),
/// };
/// assert_eq!(summary.writes, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterSummary {
    pub register: u8,
    pub name: String,
    pub reads: u64,
    pub writes: u64,
    pub invalid_checksums: u64,
    /// Last value seen with a valid checksum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_value: Option<u16>,
}

/// Flat, serializable form of a decoded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// `read`, `write` or `error`.
    pub kind: String,
    /// Capture offset of the frame start (reads/writes) or offending byte.
    pub offset: usize,
    /// Human-readable log line.
    pub line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<FrameContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Vec<u8>>,
}

/// Build a stub report with base fields filled and empty aggregates.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "hdsniff".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        recovery: RecoveryMode::default(),
        summary: DecodeSummary::default(),
        registers: vec![],
        events: vec![],
    }
}
