use crate::error::{Result, ShellError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ls,
    Cd { dir: String },
    Exit,
    Chown { user: String, file: String },
    Date,
    Uptime,
}

impl Command {
    /// Parse a tokenized input line. Returns `Ok(None)` for a blank line.
    ///
    /// Argument and lookup failures come back as recoverable errors whose
    /// display text is the message shown to the user.
    pub fn parse(tokens: &[&str]) -> Result<Option<Self>> {
        let Some((&name, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match name {
            "ls" => Command::Ls,
            "cd" => match args.first() {
                Some(dir) => Command::Cd {
                    dir: dir.to_string(),
                },
                None => return Err(usage("cd", "missing argument")),
            },
            "exit" => Command::Exit,
            "chown" => match args {
                [user, file] => Command::Chown {
                    user: user.to_string(),
                    file: file.to_string(),
                },
                _ => return Err(usage("chown", "invalid arguments")),
            },
            "date" => Command::Date,
            "uptime" => Command::Uptime,
            other => {
                return Err(ShellError::UnknownCommand {
                    name: other.to_string(),
                })
            }
        };

        Ok(Some(command))
    }

    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        Self::parse(&tokens)
    }

    /// Text recorded in the action log after the command succeeds.
    pub fn log_action(&self) -> String {
        match self {
            Command::Ls => "Executed ls command".to_string(),
            Command::Cd { dir } => format!("Changed directory to {}", dir),
            Command::Exit => "Exited shell".to_string(),
            Command::Chown { user, file } => format!("Changed owner of {} to {}", file, user),
            Command::Date => "Executed date command".to_string(),
            Command::Uptime => "Executed uptime command".to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Ls => "ls",
            Command::Cd { .. } => "cd",
            Command::Exit => "exit",
            Command::Chown { .. } => "chown",
            Command::Date => "date",
            Command::Uptime => "uptime",
        }
    }
}

fn usage(command: &str, message: &'static str) -> ShellError {
    ShellError::CommandArgument {
        command: command.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines() {
        assert_eq!(Command::parse_line("").unwrap(), None);
        assert_eq!(Command::parse_line("   \t ").unwrap(), None);
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::parse_line("ls").unwrap(), Some(Command::Ls));
        assert_eq!(Command::parse_line("  date  ").unwrap(), Some(Command::Date));
        assert_eq!(Command::parse_line("uptime").unwrap(), Some(Command::Uptime));
        assert_eq!(Command::parse_line("exit").unwrap(), Some(Command::Exit));
        // Extra arguments are ignored.
        assert_eq!(Command::parse_line("ls -la").unwrap(), Some(Command::Ls));
    }

    #[test]
    fn test_cd_arguments() {
        assert_eq!(
            Command::parse_line("cd home").unwrap(),
            Some(Command::Cd {
                dir: "home".to_string()
            })
        );
        assert_eq!(
            Command::parse_line("cd a b").unwrap(),
            Some(Command::Cd {
                dir: "a".to_string()
            })
        );

        let err = Command::parse_line("cd").unwrap_err();
        assert_eq!(err.to_string(), "cd: missing argument");
    }

    #[test]
    fn test_chown_requires_exactly_two_arguments() {
        assert_eq!(
            Command::parse_line("chown alice file.txt").unwrap(),
            Some(Command::Chown {
                user: "alice".to_string(),
                file: "file.txt".to_string()
            })
        );

        for line in ["chown", "chown alice", "chown alice a b"] {
            let err = Command::parse_line(line).unwrap_err();
            assert_eq!(err.to_string(), "chown: invalid arguments", "line: {}", line);
        }
    }

    #[test]
    fn test_unknown_and_case_sensitive() {
        let err = Command::parse_line("foobar").unwrap_err();
        assert_eq!(err.to_string(), "foobar: command not found");

        let err = Command::parse_line("LS").unwrap_err();
        assert!(matches!(err, ShellError::UnknownCommand { .. }));
    }

    #[test]
    fn test_log_actions() {
        let chown = Command::Chown {
            user: "alice".to_string(),
            file: "file.txt".to_string(),
        };
        assert_eq!(chown.log_action(), "Changed owner of file.txt to alice");
        assert_eq!(chown.name(), "chown");

        let cd = Command::Cd {
            dir: "/tmp".to_string(),
        };
        assert_eq!(cd.log_action(), "Changed directory to /tmp");
        assert_eq!(Command::Ls.log_action(), "Executed ls command");
        assert_eq!(Command::Exit.log_action(), "Exited shell");
        assert_eq!(Command::Date.log_action(), "Executed date command");
        assert_eq!(Command::Uptime.log_action(), "Executed uptime command");
    }
}
