use crate::action_log::ActionLogger;
use crate::error::Result;
use crate::shell::{Command, Session, SystemInfo};
use crate::ui::GracefulShutdown;
use chrono::Local;
use std::io::{BufRead, Write};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What the loop does after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The command loop: reads lines, dispatches them, and records every
/// successful command in the action log.
pub struct Shell {
    session: Session,
    logger: ActionLogger,
    system_info: SystemInfo,
}

impl Shell {
    pub fn new(session: Session, logger: ActionLogger) -> Self {
        Self {
            session,
            logger,
            system_info: SystemInfo::platform_default(),
        }
    }

    pub fn with_system_info(mut self, system_info: SystemInfo) -> Self {
        self.system_info = system_info;
        self
    }

    /// Read and execute lines until `exit`, end of input, or a shutdown request.
    pub fn run<R, W>(&mut self, mut input: R, out: &mut W, shutdown: &GracefulShutdown) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        loop {
            shutdown.check_shutdown()?;

            write!(out, "{}", self.session.prompt())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                tracing::info!("end of input, leaving shell");
                return Ok(());
            }

            // Interrupted while waiting for input: drop the line.
            shutdown.check_shutdown()?;

            if self.execute_line(&line, out)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Handle a single input line. Usage errors, unknown commands and failed
    /// `cd`/`uptime` calls are printed to `out` and the loop continues; any
    /// other error is returned.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let outcome = match Command::parse_line(line) {
            Ok(Some(command)) => self.execute(&command, out),
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => Err(e),
        };

        match outcome {
            Err(e) if e.is_recoverable() => {
                tracing::debug!(error = %e, "command failed");
                writeln!(out, "{}", e)?;
                Ok(Flow::Continue)
            }
            other => other,
        }
    }

    pub fn execute<W: Write>(&mut self, command: &Command, out: &mut W) -> Result<Flow> {
        tracing::debug!(command = command.name(), cwd = %self.session.cwd().display(), "dispatching");

        match command {
            Command::Ls => {
                let names = self.session.list()?;
                writeln!(out, "{}", names.join(" "))?;
            }
            Command::Cd { dir } => {
                self.session.change_dir(dir)?;
            }
            Command::Exit => {
                self.logger.log(command.log_action())?;
                writeln!(out, "Exiting...")?;
                return Ok(Flow::Exit);
            }
            Command::Chown { user, file } => {
                // Simulated: ownership is never changed on disk.
                writeln!(out, "Changed owner of {} to {}", file, user)?;
            }
            Command::Date => {
                writeln!(out, "{}", Local::now().format(DATE_FORMAT))?;
            }
            Command::Uptime => {
                let report = self.system_info.run()?;
                writeln!(out, "{}", report.trim_end_matches(&['\r', '\n'][..]))?;
            }
        }

        self.logger.log(command.log_action())?;
        Ok(Flow::Continue)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
