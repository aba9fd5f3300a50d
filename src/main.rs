use clap::Parser;
use std::process;
use tarshell::{Cli, OutputFormatter, ShellError, TarShell, UserFriendlyError};
use tracing_subscriber::EnvFilter;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(&cli);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let tarshell = match TarShell::from_cli(&cli) {
        Ok(tarshell) => tarshell,
        Err(e) => {
            print_startup_error(&cli, &e);
            return e.exit_code();
        }
    };

    match tarshell.run_interactive() {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!(error = ?e, "shell terminated with an error");
            tarshell.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = &cli.config;

    match TarShell::generate_sample_config(config_path) {
        Ok(()) => {
            println!(
                "Generated sample configuration file: {}",
                config_path.display()
            );
            println!("\nPlace an archive next to it and run:");
            println!("  tarshell --config {}", config_path.display());
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(cli: &Cli, error: &ShellError) {
    let formatter = OutputFormatter::new(cli.output_mode(), 0, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr so they never interleave with command output.
/// `RUST_LOG` wins over the verbosity flags.
fn setup_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
