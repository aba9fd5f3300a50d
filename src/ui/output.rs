use crate::config::Config;
use crate::error::{ShellError, UserFriendlyError};
use crate::extractor::ExtractionProgress;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static PACKAGE: Emoji = Emoji("📦 ", "> ");

/// Status messages around the shell session (startup, extraction, fatal
/// errors). Command output itself is written by the shell, not through here.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            OutputMode::Plain => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    /// Informational line shown unless running quiet.
    pub fn notice(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    /// Informational line shown only with `-v`.
    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", PACKAGE, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &ShellError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Plain => eprintln!("SUGGESTION: {}", suggestion),
            }
        }
    }

    pub fn print_config_summary(&self, config: &Config) {
        self.notice(&format!(
            "Tar path: {}, Log path: {}",
            config.virtual_filesystem_path, config.log_file_path
        ));
    }

    pub fn print_extraction_summary(&self, archive: &str, progress: &ExtractionProgress) {
        self.success(&format!(
            "Extracted {} ({} entries, {} bytes)",
            archive, progress.entries_extracted, progress.bytes_extracted
        ));

        if !progress.skipped.is_empty() {
            self.warning(&format!(
                "Skipped {} entries outside the extraction root: {}",
                progress.skipped.len(),
                progress.skipped.join(", ")
            ));
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Success => (&CHECKMARK, style(message).green().bold()),
                MessageType::Error => (&CROSS, style(message).red().bold()),
                MessageType::Warning => (&WARNING, style(message).yellow().bold()),
                MessageType::Info => (&INFO, style(message).cyan()),
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert_eq!(formatter.mode, OutputMode::Plain);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let quiet_formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
        assert!(!quiet_formatter.should_show_message(1));
    }
}
