//! Raw capture files.
//!
//! A capture is the byte-for-byte UART export of a logic analyzer: no
//! header, no timestamps, just the bytes seen on the line in order.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{CaptureSource, SourceError};

/// Largest capture accepted, in bytes.
pub const MAX_CAPTURE_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug)]
pub struct CaptureFile {
    path: PathBuf,
    file: File,
    size: u64,
}

impl CaptureFile {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(SourceError::NotAFile {
                path: path.display().to_string(),
            });
        }
        check_size(meta.len())?;
        let file = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            size: meta.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size reported by the filesystem when the file was opened.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl CaptureSource for CaptureFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&mut self) -> Result<Vec<u8>, SourceError> {
        let mut data = Vec::with_capacity(self.size as usize);
        // Bound the read in case the file grew after `open`.
        (&mut self.file)
            .take(MAX_CAPTURE_BYTES + 1)
            .read_to_end(&mut data)?;
        check_size(data.len() as u64)?;
        Ok(data)
    }
}

fn check_size(size: u64) -> Result<(), SourceError> {
    if size > MAX_CAPTURE_BYTES {
        return Err(SourceError::TooLarge {
            size,
            limit: MAX_CAPTURE_BYTES,
        });
    }
    Ok(())
}
