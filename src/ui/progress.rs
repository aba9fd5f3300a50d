use crate::extractor::ExtractionProgress;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Spinner for archive extraction; the entry count is not known up front.
    pub fn create_extraction_spinner(&self, archive: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} entries {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]),
        );
        pb.set_message(format!("Extracting {}", archive));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

pub fn update_extraction_progress(pb: &ProgressBar, progress: &ExtractionProgress) {
    pb.set_position(progress.entries_extracted as u64);

    if let Some(ref entry) = progress.current_entry {
        pb.set_message(format!("Extracting {}", entry));
    }
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
