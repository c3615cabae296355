//! Structured command construction
//!
//! Commands are built as argument lists and only rendered to a shell string
//! at the remote boundary, with POSIX quoting applied per word. Configuration
//! fields such as project names never reach the remote shell unescaped.

use std::borrow::Cow;

/// A program plus its argument vector
#[derive(Clone, Debug, PartialEq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }

    /// Render to a single shell-safe string for execution through a remote
    /// shell. Each word is quoted independently.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&shell_quote(&self.program));
        for arg in &self.args {
            out.push(' ');
            out.push_str(&shell_quote(arg));
        }
        out
    }
}

/// A command the pipeline intends to run, before execution
#[derive(Clone, Debug, PartialEq)]
pub enum PlannedCommand {
    /// Spawned directly on the initiating machine
    Local(CommandLine),
    /// Wrapped in an ssh invocation against the remote target.
    /// `pty` forces pseudo-terminal allocation (`ssh -t -t`); some of the
    /// toolchain's curses-based helpers crash without a controlling terminal.
    Remote { command: CommandLine, pty: bool },
}

impl PlannedCommand {
    pub fn local(command: CommandLine) -> Self {
        PlannedCommand::Local(command)
    }

    pub fn remote(command: CommandLine) -> Self {
        PlannedCommand::Remote {
            command,
            pty: false,
        }
    }

    pub fn remote_pty(command: CommandLine, pty: bool) -> Self {
        PlannedCommand::Remote { command, pty }
    }

    /// Human-readable form, used for the `>>>` echo and in stage reports
    pub fn describe(&self) -> String {
        match self {
            PlannedCommand::Local(cmd) => cmd.render(),
            PlannedCommand::Remote { command, pty } => {
                if *pty {
                    format!("ssh -t -t: {}", command.render())
                } else {
                    format!("ssh: {}", command.render())
                }
            }
        }
    }
}

/// Quote a single word for a POSIX shell.
///
/// Plain words pass through untouched; anything else is single-quoted with
/// embedded single quotes rewritten as `'\''`.
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    if word.is_empty() {
        return Cow::Borrowed("''");
    }
    let safe = word
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_-+=%@:,./~".contains(c));
    if safe {
        Cow::Borrowed(word)
    } else {
        let mut quoted = String::with_capacity(word.len() + 2);
        quoted.push('\'');
        for c in word.chars() {
            if c == '\'' {
                quoted.push_str("'\\''");
            } else {
                quoted.push(c);
            }
        }
        quoted.push('\'');
        Cow::Owned(quoted)
    }
}
