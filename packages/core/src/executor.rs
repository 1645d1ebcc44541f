//! Command execution abstraction with privilege escalation support.
//!
//! Every external tool the workflow relies on (`ping`, `smbclient`, `mount`,
//! `udisksctl`, `mount.cifs`) is invoked through a [`CommandRunner`], with
//! optional privilege escalation via `sudo` (TTY) or `pkexec` (polkit).

use std::borrow::Cow;
use std::process::Command;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, IoResultExt, Result};

/// Exit code used by `pkexec` and `sudo` wrappers when authentication is dismissed.
const AUTH_CANCELLED_CODE: i32 = 126;

/// Privilege escalation method for executing commands that require root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegeEscalation {
    /// Execute directly without privilege escalation.
    #[default]
    None,
    /// Use `pkexec` for GUI-based privilege escalation (polkit).
    Pkexec,
    /// Use `sudo` for TTY-based privilege escalation.
    Sudo,
}

impl PrivilegeEscalation {
    /// Returns the wrapper program, if any.
    pub fn wrapper(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Pkexec => Some("pkexec"),
            Self::Sudo => Some("sudo"),
        }
    }
}

impl FromStr for PrivilegeEscalation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "pkexec" => Ok(Self::Pkexec),
            "sudo" => Ok(Self::Sudo),
            _ => Err(Error::InvalidEscalation {
                tool: s.to_string(),
            }),
        }
    }
}

/// Captured result of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Returns true for a zero exit status.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Best available diagnostic: stderr if non-empty, otherwise the exit code.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Something that can run an external program to completion.
pub trait CommandRunner {
    /// Runs `program` with `args`, blocking until it exits.
    ///
    /// Output is captured, never forwarded to the terminal.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Runner backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .output()
            .command_context(program)?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Execution context for running system commands.
///
/// This struct holds the runner and the configuration for how commands
/// should be executed, particularly whether they need privilege escalation.
///
/// # Example
///
/// ```
/// use smbmount_core::executor::{ExecutionContext, PrivilegeEscalation};
///
/// // Default: no privilege escalation
/// let ctx = ExecutionContext::new();
/// assert_eq!(ctx.escalation(), PrivilegeEscalation::None);
///
/// // For terminal applications
/// let tty_ctx = ExecutionContext::with_sudo();
/// assert_eq!(tty_ctx.escalation(), PrivilegeEscalation::Sudo);
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionContext<R = SystemRunner> {
    escalation: PrivilegeEscalation,
    runner: R,
}

impl Default for ExecutionContext<SystemRunner> {
    fn default() -> Self {
        Self::with_escalation(PrivilegeEscalation::None)
    }
}

impl ExecutionContext<SystemRunner> {
    /// Creates a new execution context with no privilege escalation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an execution context that uses `pkexec` for privileged commands.
    pub fn with_pkexec() -> Self {
        Self::with_escalation(PrivilegeEscalation::Pkexec)
    }

    /// Creates an execution context that uses `sudo` for privileged commands.
    pub fn with_sudo() -> Self {
        Self::with_escalation(PrivilegeEscalation::Sudo)
    }

    /// Creates an execution context with a specific escalation method.
    pub fn with_escalation(escalation: PrivilegeEscalation) -> Self {
        Self {
            escalation,
            runner: SystemRunner,
        }
    }
}

impl<R: CommandRunner> ExecutionContext<R> {
    /// Creates an execution context around a custom runner.
    pub fn with_runner(runner: R, escalation: PrivilegeEscalation) -> Self {
        Self { escalation, runner }
    }

    /// Returns the current privilege escalation method.
    pub fn escalation(&self) -> PrivilegeEscalation {
        self.escalation
    }

    /// Returns the underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Executes a command as the invoking user.
    pub fn run(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!("running {} {}", cmd, redact_args(args).join(" "));
        self.runner.run(cmd, args)
    }

    /// Executes a command that requires root privileges.
    ///
    /// The command will be wrapped with the appropriate privilege escalation
    /// method based on the context configuration.
    pub fn run_privileged(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput> {
        match self.escalation.wrapper() {
            None => self.run(cmd, args),
            Some(wrapper) => {
                let mut wrapper_args = vec![cmd];
                wrapper_args.extend(args);
                self.run(wrapper, &wrapper_args)
            }
        }
    }

    /// Executes a command that requires root privileges, checking for success.
    ///
    /// Returns an error if the command fails or if authentication is cancelled.
    pub fn run_privileged_checked(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run_privileged(cmd, args)?;

        if !output.success() {
            if self.escalation != PrivilegeEscalation::None
                && output.code == Some(AUTH_CANCELLED_CODE)
            {
                return Err(Error::AuthenticationCancelled);
            }

            return Err(Error::CommandExit {
                command: cmd.to_string(),
                code: output.code.unwrap_or(-1),
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}

/// Masks secrets in command arguments before they are logged.
///
/// Handles `password=` option entries and the `user%password` form that
/// follows `-U`.
pub fn redact_args<'a>(args: &[&'a str]) -> Vec<Cow<'a, str>> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut after_user_flag = false;

    for arg in args {
        let masked = if after_user_flag && arg.contains('%') {
            let user = arg.split('%').next().unwrap_or_default();
            Cow::Owned(format!("{}%***", user))
        } else if arg.contains("password=") {
            Cow::Owned(mask_password_option(arg))
        } else {
            Cow::Borrowed(*arg)
        };
        after_user_flag = *arg == "-U";
        redacted.push(masked);
    }

    redacted
}

/// Option keys that may follow a password in a mount option string.
const OPTION_KEYS: [&str; 7] = [
    "username=",
    "credentials=",
    "domain=",
    "uid=",
    "gid=",
    "file_mode=",
    "dir_mode=",
];

/// Masks the value of `password=` up to the next known option key.
///
/// The password itself may contain commas, so splitting on `,` is not enough.
fn mask_password_option(options: &str) -> String {
    let Some(start) = options.find("password=") else {
        return options.to_string();
    };
    let value_start = start + "password=".len();
    let rest = &options[value_start..];

    let end = rest
        .match_indices(',')
        .map(|(i, _)| i)
        .find(|&i| OPTION_KEYS.iter().any(|key| rest[i + 1..].starts_with(key)))
        .unwrap_or(rest.len());

    format!("{}***{}", &options[..value_start], &rest[end..])
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted runner used by workflow tests.

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{CommandOutput, CommandRunner};
    use crate::error::Result;

    /// Replays queued outputs per program and records every invocation.
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        scripted: RefCell<Vec<(String, VecDeque<CommandOutput>)>>,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues an output for the next call of `program`.
        pub fn script(self, program: &str, output: CommandOutput) -> Self {
            {
                let mut scripted = self.scripted.borrow_mut();
                match scripted.iter_mut().find(|(p, _)| p == program) {
                    Some((_, queue)) => queue.push_back(output),
                    None => scripted.push((program.to_string(), VecDeque::from([output]))),
                }
            }
            self
        }

        pub fn ok(self, program: &str, stdout: &str) -> Self {
            self.script(
                program,
                CommandOutput {
                    code: Some(0),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                },
            )
        }

        pub fn fail(self, program: &str, code: i32, stderr: &str) -> Self {
            self.script(
                program,
                CommandOutput {
                    code: Some(code),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                },
            )
        }

        /// Every invocation as `[program, args...]`.
        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.borrow().clone()
        }

        /// Number of invocations of `program`.
        pub fn count(&self, program: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|call| call[0] == program)
                .count()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().map(|a| a.to_string()));
            self.calls.borrow_mut().push(call);

            // Unscripted programs succeed silently.
            let output = self
                .scripted
                .borrow_mut()
                .iter_mut()
                .find(|(p, _)| p == program)
                .and_then(|(_, queue)| queue.pop_front())
                .unwrap_or(CommandOutput {
                    code: Some(0),
                    ..Default::default()
                });
            Ok(output)
        }
    }
}
