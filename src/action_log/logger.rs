use crate::error::{Result, ShellError};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const INDENT: &[u8] = b"    ";

/// Closing bytes of every document this logger writes.
const DOCUMENT_TAIL: &[u8] = b"\n]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "iso_timestamp")]
    pub timestamp: NaiveDateTime,
    pub action: String,
}

impl LogEntry {
    pub fn new<S: Into<String>>(action: S) -> Self {
        Self {
            timestamp: now_timestamp(),
            action: action.into(),
        }
    }

    pub fn at<S: Into<String>>(timestamp: NaiveDateTime, action: S) -> Self {
        Self {
            timestamp,
            action: action.into(),
        }
    }
}

/// Append-only JSON action log.
///
/// The log file stays open for the lifetime of the logger. It always holds a
/// complete, pretty-printed JSON array; appending an entry overwrites only the
/// closing bracket instead of rewriting the whole document.
pub struct ActionLogger {
    path: PathBuf,
    file: File,
    entries: Vec<LogEntry>,
}

impl ActionLogger {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| log_io(&path, e))?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| log_io(&path, e))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| log_io(&path, e))?;

        let entries = parse_document(&content, &path)?;
        tracing::debug!(
            path = %path.display(),
            existing = entries.len(),
            "opened action log"
        );

        let mut logger = Self {
            path,
            file,
            entries,
        };
        // Normalize whatever was on disk so the tail invariant holds.
        if !content.is_empty() {
            logger.rewrite()?;
        }

        Ok(logger)
    }

    /// Record `action` with the current local time.
    pub fn log<S: Into<String>>(&mut self, action: S) -> Result<()> {
        self.append(LogEntry::new(action))
    }

    pub fn append(&mut self, entry: LogEntry) -> Result<()> {
        tracing::debug!(action = %entry.action, "logging action");

        if self.entries.is_empty() {
            self.entries.push(entry);
            return self.rewrite();
        }

        let mut chunk = Vec::from(&b",\n"[..]);
        chunk.extend(render_nested(&entry, &self.path)?);
        chunk.extend_from_slice(DOCUMENT_TAIL);

        self.file
            .seek(SeekFrom::End(-(DOCUMENT_TAIL.len() as i64)))
            .map_err(|e| log_io(&self.path, e))?;
        self.file
            .write_all(&chunk)
            .map_err(|e| log_io(&self.path, e))?;
        self.file.flush().map_err(|e| log_io(&self.path, e))?;

        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rewrite(&mut self) -> Result<()> {
        let document = render_document(&self.entries, &self.path)?;

        self.file.set_len(0).map_err(|e| log_io(&self.path, e))?;
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| log_io(&self.path, e))?;
        self.file
            .write_all(&document)
            .map_err(|e| log_io(&self.path, e))?;
        self.file.flush().map_err(|e| log_io(&self.path, e))?;

        Ok(())
    }
}

/// Read a log document from disk. A missing file reads as an empty log.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Vec<LogEntry>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => parse_document(&content, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(log_io(path, e)),
    }
}

fn parse_document(content: &str, path: &Path) -> Result<Vec<LogEntry>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(content).map_err(|e| ShellError::LogCorrupt {
        path: path.to_path_buf(),
        source: e,
    })
}

fn render_document(entries: &[LogEntry], path: &Path) -> Result<Vec<u8>> {
    render_pretty(entries, path)
}

/// An entry rendered as it appears inside the top-level array.
fn render_nested(entry: &LogEntry, path: &Path) -> Result<Vec<u8>> {
    let rendered = render_pretty(entry, path)?;

    let mut nested = Vec::with_capacity(rendered.len() + 64);
    for (i, line) in rendered.split(|b| *b == b'\n').enumerate() {
        if i > 0 {
            nested.push(b'\n');
        }
        nested.extend_from_slice(INDENT);
        nested.extend_from_slice(line);
    }
    Ok(nested)
}

fn render_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut serializer)
        .map_err(|e| ShellError::LogCorrupt {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(buffer)
}

fn now_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    // Microsecond precision, matching common ISO-8601 log timestamps.
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

/// ISO-8601 local timestamps with a six-digit fraction, omitted entirely
/// when the microseconds are zero.
mod iso_timestamp {
    use chrono::{NaiveDateTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const WHOLE_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
    const WITH_MICROS: &str = "%Y-%m-%dT%H:%M:%S%.6f";

    pub fn format(timestamp: &NaiveDateTime) -> String {
        let pattern = if timestamp.nanosecond() / 1_000 == 0 {
            WHOLE_SECONDS
        } else {
            WITH_MICROS
        };
        timestamp.format(pattern).to_string()
    }

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<NaiveDateTime>().map_err(de::Error::custom)
    }
}

fn log_io(path: &Path, source: std::io::Error) -> ShellError {
    ShellError::LogIo {
        path: path.to_path_buf(),
        source,
    }
}
