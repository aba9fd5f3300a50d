pub mod logger;

pub use logger::{read_document, ActionLogger, LogEntry};
