use crate::error::{Result, ShellError};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the startup directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

pub const VIRTUAL_FILESYSTEM_KEY: &str = "virtual_filesystem_path";
pub const LOG_FILE_KEY: &str = "log_file_path";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub virtual_filesystem_path: String,
    pub log_file_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            virtual_filesystem_path: "fs.tar".to_string(),
            log_file_path: "log.json".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading configuration");

        if !path.is_file() {
            return Err(ShellError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content, path)
    }

    /// Parses and validates configuration text. `origin` is only used in error messages.
    pub fn from_yaml_str(content: &str, origin: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(ShellError::ConfigInvalid {
                path: origin.to_path_buf(),
                reason: "config is empty".to_string(),
            });
        }

        let value: Value = serde_yaml::from_str(content).map_err(|e| ShellError::ConfigParse {
            path: origin.to_path_buf(),
            source: e,
        })?;

        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            Value::Null => {
                return Err(ShellError::ConfigInvalid {
                    path: origin.to_path_buf(),
                    reason: "config is empty".to_string(),
                })
            }
            other => {
                return Err(ShellError::ConfigInvalid {
                    path: origin.to_path_buf(),
                    reason: format!("expected a mapping, found {}", value_kind(&other)),
                })
            }
        };

        Self::from_mapping(&mapping)
    }

    fn from_mapping(mapping: &Mapping) -> Result<Self> {
        let virtual_filesystem_path = required_string(mapping, VIRTUAL_FILESYSTEM_KEY);
        let log_file_path = required_string(mapping, LOG_FILE_KEY);

        match (virtual_filesystem_path, log_file_path) {
            (Some(virtual_filesystem_path), Some(log_file_path)) => Ok(Self {
                virtual_filesystem_path,
                log_file_path,
            }),
            (vfs, log) => {
                let mut keys = Vec::new();
                if vfs.is_none() {
                    keys.push(VIRTUAL_FILESYSTEM_KEY.to_string());
                }
                if log.is_none() {
                    keys.push(LOG_FILE_KEY.to_string());
                }
                Err(ShellError::ConfigMissingKeys { keys })
            }
        }
    }

    /// Archive location, with relative paths taken from `base`.
    pub fn archive_path(&self, base: &Path) -> PathBuf {
        base.join(&self.virtual_filesystem_path)
    }

    /// Action log location, with relative paths taken from `base`.
    pub fn log_path(&self, base: &Path) -> PathBuf {
        base.join(&self.log_file_path)
    }

    pub fn create_sample_config() -> String {
        serde_yaml::to_string(&Self::default()).unwrap_or_default()
    }
}

fn required_string(mapping: &Mapping, key: &str) -> Option<String> {
    mapping
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn parse(content: &str) -> Result<Config> {
        Config::from_yaml_str(content, Path::new("config.yaml"))
    }

    #[test]
    fn test_valid_config_round_trips_values() {
        let config = parse("virtual_filesystem_path: fs.tar\nlog_file_path: ignored.json\n").unwrap();
        assert_eq!(config.virtual_filesystem_path, "fs.tar");
        assert_eq!(config.log_file_path, "ignored.json");
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let config = parse(
            "virtual_filesystem_path: /srv/vfs.tar\nlog_file_path: log.json\nhostname: box\n",
        )
        .unwrap();
        assert_eq!(config.virtual_filesystem_path, "/srv/vfs.tar");
    }

    #[test]
    fn test_missing_keys() {
        let err = parse("virtual_filesystem_path: fs.tar\n").unwrap_err();
        match err {
            ShellError::ConfigMissingKeys { keys } => assert_eq!(keys, vec![LOG_FILE_KEY]),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = parse("other: 1\n").unwrap_err();
        match err {
            ShellError::ConfigMissingKeys { keys } => assert_eq!(keys.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let err = parse("virtual_filesystem_path: ''\nlog_file_path: log.json\n").unwrap_err();
        assert!(matches!(err, ShellError::ConfigMissingKeys { .. }));

        let err = parse("virtual_filesystem_path: fs.tar\nlog_file_path:\n").unwrap_err();
        assert!(matches!(err, ShellError::ConfigMissingKeys { .. }));
    }

    #[test]
    fn test_empty_or_null_config_is_invalid() {
        assert!(matches!(parse(""), Err(ShellError::ConfigInvalid { .. })));
        assert!(matches!(parse("~\n"), Err(ShellError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_non_mapping_config_is_invalid() {
        let err = parse("- fs.tar\n- log.json\n").unwrap_err();
        match err {
            ShellError::ConfigInvalid { reason, .. } => assert!(reason.contains("a list")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_yaml() {
        let err = parse("virtual_filesystem_path: [unclosed\n").unwrap_err();
        assert!(matches!(err, ShellError::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load_from_file(temp_dir.path().join(DEFAULT_CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, ShellError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config {
            virtual_filesystem_path: "disk.tar.gz".to_string(),
            log_file_path: "audit/log.json".to_string(),
        };
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", serde_yaml::to_string(&config).unwrap()).unwrap();

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_handwritten_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "# shell settings").unwrap();
        writeln!(temp_file, "virtual_filesystem_path: \"fs.tar\"").unwrap();
        writeln!(temp_file, "log_file_path: \"log.json\"").unwrap();

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_path_resolution() {
        let config = Config::default();
        let base = Path::new("/tmp/session");
        assert_eq!(config.archive_path(base), PathBuf::from("/tmp/session/fs.tar"));
        assert_eq!(config.log_path(base), PathBuf::from("/tmp/session/log.json"));

        let absolute = Config {
            virtual_filesystem_path: "/data/fs.tar".to_string(),
            log_file_path: "log.json".to_string(),
        };
        assert_eq!(absolute.archive_path(base), PathBuf::from("/data/fs.tar"));
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains(VIRTUAL_FILESYSTEM_KEY));
        assert!(sample.contains(LOG_FILE_KEY));
        assert_eq!(parse(&sample).unwrap(), Config::default());
    }
}
