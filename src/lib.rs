pub mod action_log;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod shell;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use error::{Result, ShellError, UserFriendlyError};

// Core functionality re-exports
pub use action_log::{ActionLogger, LogEntry};
pub use extractor::{ArchiveExtractor, ExtractionProgress};
pub use shell::{Command, Flow, Session, Shell, SystemInfo};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::io;
use std::path::{Path, PathBuf};

/// Startup and session driver. Turns a validated [`Config`] into a ready
/// [`Shell`] and runs it on the terminal.
pub struct TarShell {
    config: Config,
    root: PathBuf,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl TarShell {
    /// Create a new instance rooted at `root`, the directory the archive is
    /// unpacked into and the shell starts in.
    pub fn new(
        config: Config,
        root: PathBuf,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
    ) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            root,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create an instance for testing (no signal handler, no progress output)
    #[cfg(test)]
    pub fn new_for_test(config: Config, root: PathBuf) -> Self {
        Self {
            config,
            root,
            output_formatter: OutputFormatter::new(OutputMode::Plain, 0, true),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        }
    }

    /// Load the configuration named on the command line and root the shell
    /// in the current directory.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let formatter = OutputFormatter::new(cli.output_mode(), cli.verbosity_level(), cli.quiet);
        formatter.notice(&format!("Loading config {}", cli.config.display()));

        let config = cli.load_config()?;
        formatter.print_config_summary(&config);

        let root = std::env::current_dir()?;
        Self::new(
            config,
            root,
            cli.output_mode(),
            cli.verbosity_level(),
            cli.quiet,
        )
    }

    /// Unpack the virtual filesystem, open the action log and hand back a
    /// shell positioned at the root.
    ///
    /// The log is opened only after extraction so an archive entry at the
    /// log path cannot replace the file under an open handle.
    pub fn bootstrap(&self) -> Result<Shell> {
        self.shutdown.check_shutdown()?;

        let progress = self.extract_archive()?;
        let log_path = self.config.log_path(&self.root);
        let mut logger = ActionLogger::open(&log_path)?;
        self.output_formatter
            .info(&format!("Recording actions in {}", log_path.display()));
        logger.log(format!("Extracted {}", self.config.virtual_filesystem_path))?;
        self.output_formatter
            .print_extraction_summary(&self.config.virtual_filesystem_path, &progress);

        let session = Session::new(&self.root)?;
        Ok(Shell::new(session, logger))
    }

    /// Bootstrap and run the shell on stdin/stdout until it exits.
    pub fn run_interactive(&self) -> Result<()> {
        let mut shell = self.bootstrap()?;

        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        shell.run(stdin.lock(), &mut out, &self.shutdown)
    }

    fn extract_archive(&self) -> Result<ExtractionProgress> {
        let archive_path = self.config.archive_path(&self.root);
        self.output_formatter.start_operation(&format!(
            "Unpacking virtual filesystem {}",
            self.config.virtual_filesystem_path
        ));

        let spinner = self
            .progress_manager
            .create_extraction_spinner(&self.config.virtual_filesystem_path);
        let progress_callback = {
            let pb = spinner.clone();
            move |progress: &ExtractionProgress| {
                ui::progress::update_extraction_progress(&pb, progress);
            }
        };

        let result =
            ArchiveExtractor::new().extract(&archive_path, &self.root, Some(&progress_callback));
        match result {
            Ok(progress) => {
                ui::progress::finish_progress_with_summary(
                    &spinner,
                    "Virtual filesystem ready",
                    progress.elapsed(),
                );
                Ok(progress)
            }
            Err(e) => {
                spinner.finish_and_clear();
                Err(e)
            }
        }
    }

    /// Write a sample configuration file, refusing to replace an existing one.
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let output_path = output_path.as_ref();
        if output_path.exists() {
            return Err(ShellError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", output_path.display()),
            )));
        }
        std::fs::write(output_path, Config::create_sample_config())?;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &ShellError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_log::read_document;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn write_archive(path: &Path, files: &[(&str, &str)]) {
        let mut builder = tar::Builder::new(File::create(path).unwrap());
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.finish().unwrap();
    }

    fn scenario_config(log_file: &str) -> Config {
        Config {
            virtual_filesystem_path: "fs.tar".to_string(),
            log_file_path: log_file.to_string(),
        }
    }

    #[test]
    fn test_bootstrap_extracts_and_logs() {
        let temp_dir = TempDir::new().unwrap();
        write_archive(&temp_dir.path().join("fs.tar"), &[("a.txt", "alpha")]);

        let tarshell =
            TarShell::new_for_test(scenario_config("ignored.json"), temp_dir.path().to_path_buf());
        let mut shell = tarshell.bootstrap().unwrap();

        assert_eq!(
            fs::read_to_string(temp_dir.path().join("a.txt")).unwrap(),
            "alpha"
        );

        let entries = read_document(temp_dir.path().join("ignored.json")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "Extracted fs.tar");

        let mut out = Vec::new();
        shell.execute_line("ls", &mut out).unwrap();
        let listing = String::from_utf8(out).unwrap();
        assert!(listing.split_whitespace().any(|name| name == "a.txt"));
    }

    #[test]
    fn test_missing_archive_leaves_no_log() {
        let temp_dir = TempDir::new().unwrap();
        let tarshell =
            TarShell::new_for_test(scenario_config("log.json"), temp_dir.path().to_path_buf());

        let result = tarshell.bootstrap();
        assert!(matches!(result, Err(ShellError::ArchiveOpen { .. })));
        assert!(!temp_dir.path().join("log.json").exists());
    }

    #[test]
    fn test_archive_entry_at_log_path_keeps_entries() {
        let temp_dir = TempDir::new().unwrap();
        write_archive(
            &temp_dir.path().join("fs.tar"),
            &[("a.txt", "alpha"), ("log.json", "[]")],
        );
        let tarshell =
            TarShell::new_for_test(scenario_config("log.json"), temp_dir.path().to_path_buf());

        let mut shell = tarshell.bootstrap().unwrap();
        let mut out = Vec::new();
        shell.execute_line("date", &mut out).unwrap();
        assert_eq!(shell.execute_line("exit", &mut out).unwrap(), Flow::Exit);
        drop(shell);

        let actions: Vec<String> = read_document(temp_dir.path().join("log.json"))
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(
            actions,
            vec!["Extracted fs.tar", "Executed date command", "Exited shell"]
        );
    }

    #[test]
    fn test_bootstrap_appends_to_existing_log() {
        let temp_dir = TempDir::new().unwrap();
        write_archive(&temp_dir.path().join("fs.tar"), &[("a.txt", "alpha")]);
        let tarshell =
            TarShell::new_for_test(scenario_config("logs/log.json"), temp_dir.path().to_path_buf());

        drop(tarshell.bootstrap().unwrap());
        drop(tarshell.bootstrap().unwrap());

        let entries = read_document(temp_dir.path().join("logs/log.json")).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.action == "Extracted fs.tar"));
    }

    #[test]
    fn test_shutdown_handling() {
        let temp_dir = TempDir::new().unwrap();
        let tarshell = TarShell::new_for_test(Config::default(), temp_dir.path().to_path_buf());

        assert!(tarshell.is_running());
        tarshell.request_shutdown();
        assert!(!tarshell.is_running());
        assert!(matches!(tarshell.bootstrap(), Err(ShellError::Cancelled)));
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILE);

        TarShell::generate_sample_config(&config_path).unwrap();
        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, Config::default());

        // Never overwrites.
        assert!(TarShell::generate_sample_config(&config_path).is_err());
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());
    }
}
