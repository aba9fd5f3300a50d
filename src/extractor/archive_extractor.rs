use crate::error::{Result, ShellError};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub entries_extracted: usize,
    pub bytes_extracted: u64,
    pub current_entry: Option<String>,
    pub skipped: Vec<String>,
    pub start_time: Instant,
}

impl ExtractionProgress {
    pub fn new() -> Self {
        Self {
            entries_extracted: 0,
            bytes_extracted: 0,
            current_entry: None,
            skipped: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn update_entry(&mut self, name: String, bytes: u64) {
        self.entries_extracted += 1;
        self.bytes_extracted += bytes;
        self.current_entry = Some(name);
    }

    pub fn add_skipped<S: Into<String>>(&mut self, name: S) {
        self.skipped.push(name.into());
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for ExtractionProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Unpacks plain or gzip-compressed tar archives.
#[derive(Debug, Default)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every entry of `archive_path` below `destination`, keeping the
    /// archive's internal layout. Entries that would land outside
    /// `destination` are skipped.
    pub fn extract(
        &self,
        archive_path: &Path,
        destination: &Path,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<ExtractionProgress> {
        let reader = self.open(archive_path)?;
        let mut archive = tar::Archive::new(reader);
        archive.set_overwrite(true);

        if !destination.exists() {
            fs::create_dir_all(destination)?;
        }

        let mut progress = ExtractionProgress::new();
        let entries = archive
            .entries()
            .map_err(|e| open_error(archive_path, e.to_string()))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| open_error(archive_path, e.to_string()))?;
            let name = entry
                .path()
                .map_err(|e| open_error(archive_path, e.to_string()))?
                .display()
                .to_string();
            let size = entry.header().size().unwrap_or(0);

            let unpacked = entry
                .unpack_in(destination)
                .map_err(|e| open_error(archive_path, format!("{}: {}", name, e)))?;

            if unpacked {
                tracing::debug!(entry = %name, bytes = size, "extracted entry");
                progress.update_entry(name, size);
            } else {
                tracing::warn!(entry = %name, "skipping entry outside extraction root");
                progress.add_skipped(name);
            }

            if let Some(callback) = progress_callback {
                callback(&progress);
            }
        }

        tracing::info!(
            archive = %archive_path.display(),
            entries = progress.entries_extracted,
            "archive extracted"
        );
        Ok(progress)
    }

    fn open(&self, archive_path: &Path) -> Result<Box<dyn Read>> {
        let file = File::open(archive_path).map_err(|e| open_error(archive_path, e.to_string()))?;
        let metadata = file
            .metadata()
            .map_err(|e| open_error(archive_path, e.to_string()))?;

        if !metadata.is_file() {
            return Err(open_error(archive_path, "not a regular file".to_string()));
        }
        if metadata.len() == 0 {
            return Err(open_error(archive_path, "archive is empty".to_string()));
        }

        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let compressed = reader
            .fill_buf()
            .map_err(|e| open_error(archive_path, e.to_string()))?
            .starts_with(&GZIP_MAGIC);

        if compressed {
            tracing::debug!(archive = %archive_path.display(), "gzip-compressed archive");
            Ok(Box::new(GzDecoder::new(reader)))
        } else {
            Ok(Box::new(reader))
        }
    }
}

fn open_error(path: &Path, reason: String) -> ShellError {
    ShellError::ArchiveOpen {
        path: PathBuf::from(path),
        reason,
    }
}
