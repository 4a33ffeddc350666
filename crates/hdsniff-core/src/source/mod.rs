mod file;

pub use file::{CaptureFile, MAX_CAPTURE_BYTES};

use thiserror::Error;

/// Origin of a raw capture buffer.
pub trait CaptureSource {
    /// Human-readable origin, reported as the input path.
    fn describe(&self) -> String;

    /// Load the whole capture into memory.
    fn load(&mut self) -> Result<Vec<u8>, SourceError>;
}

/// In-memory capture, mostly useful for tests and piped input.
#[derive(Debug, Clone)]
pub struct MemorySource {
    label: String,
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }
}

impl CaptureSource for MemorySource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn load(&mut self) -> Result<Vec<u8>, SourceError> {
        Ok(std::mem::take(&mut self.data))
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("not a regular file: {path}")]
    NotAFile { path: String },
}
