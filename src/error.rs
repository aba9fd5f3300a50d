use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Config file does not exist: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Error parsing YAML in {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration in {}: {reason}", path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Missing configuration values: {}", keys.join(", "))]
    ConfigMissingKeys { keys: Vec<String> },

    #[error("Cannot open archive {}: {reason}", path.display())]
    ArchiveOpen { path: PathBuf, reason: String },

    #[error("{command}: {message}")]
    CommandArgument {
        command: String,
        message: &'static str,
    },

    #[error("cd: {dir}: {reason}")]
    DirectoryChange { dir: String, reason: String },

    #[error("{name}: command not found")]
    UnknownCommand { name: String },

    #[error("uptime: {program}: {reason}")]
    SystemInfo { program: String, reason: String },

    #[error("Action log I/O failed for {}: {source}", path.display())]
    LogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Action log {} is not a valid log document: {source}", path.display())]
    LogCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shell was interrupted")]
    Cancelled,
}

impl ShellError {
    /// Errors the command loop reports and then keeps going after.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ShellError::CommandArgument { .. }
                | ShellError::DirectoryChange { .. }
                | ShellError::UnknownCommand { .. }
                | ShellError::SystemInfo { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::Cancelled => 130,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ShellError {
    fn user_message(&self) -> String {
        match self {
            ShellError::ConfigNotFound { .. } => "Config file does not exist.".to_string(),
            ShellError::ConfigInvalid { reason, .. } => {
                format!("Loaded config is not usable: {}", reason)
            }
            ShellError::ConfigMissingKeys { keys } => {
                format!(
                    "Missing configuration values: {}. Please check config.yaml.",
                    keys.join(", ")
                )
            }
            ShellError::ArchiveOpen { path, reason } => {
                format!("Failed to open virtual filesystem {}: {}", path.display(), reason)
            }
            ShellError::LogIo { path, source } => {
                format!("Could not write action log {}: {}", path.display(), source)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ShellError::ConfigNotFound { .. } => Some(
                "Create a config.yaml in the current directory, or run with --generate-config to write a sample one.".to_string()
            ),
            ShellError::ConfigParse { .. } => Some(
                "Check the YAML syntax of the configuration file.".to_string()
            ),
            ShellError::ConfigInvalid { .. } => Some(
                "The configuration must be a mapping of keys to values, e.g. `virtual_filesystem_path: fs.tar`.".to_string()
            ),
            ShellError::ConfigMissingKeys { .. } => Some(
                "Both virtual_filesystem_path and log_file_path must be set to non-empty strings.".to_string()
            ),
            ShellError::ArchiveOpen { .. } => Some(
                "Make sure virtual_filesystem_path points to a readable .tar or .tar.gz archive.".to_string()
            ),
            ShellError::LogCorrupt { .. } => Some(
                "Move the existing log file aside; a new one will be created on the next start.".to_string()
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
