//! Unified error types for the smbmount-core library.
//!
//! Uses SNAFU for context-rich error handling, especially useful when the same
//! underlying error type (like `std::io::Error`) appears in different contexts.

use snafu::{ResultExt, Snafu};
use std::path::PathBuf;

/// Result type alias using the library's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all core library operations.
///
/// Per-share mount failures are not represented here; they are recorded in
/// [`crate::mount::MountOutcome`] so one share cannot abort the others.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// No host was given.
    #[snafu(display("please enter a server hostname or IP"))]
    EmptyHost,

    /// Host would be read as an option by the tools it is passed to.
    #[snafu(display("invalid server hostname: {host}"))]
    InvalidHost { host: String },

    /// Username was empty where one is required.
    #[snafu(display("username cannot be empty"))]
    EmptyUsername,

    /// Mount was requested without any share.
    #[snafu(display("no shares selected"))]
    NoSharesSelected,

    /// Host did not answer the reachability check.
    #[snafu(display("host {host} is unreachable, check your connection"))]
    HostUnreachable { host: String },

    /// An action needed confirmation that was not given.
    #[snafu(display("cancelled: {reason}"))]
    UserCancelled { reason: String },

    /// Failed to execute a system command.
    #[snafu(display("failed to execute command '{command}'"))]
    CommandExecution {
        command: String,
        source: std::io::Error,
    },

    /// Command executed but returned non-zero exit code.
    #[snafu(display("command '{command}' exited with code {code}: {stderr}"))]
    CommandExit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// smbclient could not list the host's shares.
    #[snafu(display("failed to list shares: {stderr}"))]
    ShareListFailed { stderr: String },

    /// Credentials file could not be written or restricted.
    #[snafu(display("failed to create credentials file at {}", path.display()))]
    CredentialsWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Mount point creation failed.
    #[snafu(display("failed to create mount point at {}", path.display()))]
    MountPointCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Home directory not found.
    #[snafu(display("could not determine home directory"))]
    HomeDirNotFound,

    /// Config file could not be read.
    #[snafu(display("failed to read config at {}", path.display()))]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid JSON for a session.
    #[snafu(display("failed to parse config at {}", path.display()))]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// User cancelled authentication dialog.
    #[snafu(display("authentication cancelled by user"))]
    AuthenticationCancelled,

    /// Unknown credential mode name.
    #[snafu(display("invalid authentication mode: {mode}"))]
    InvalidAuthMode { mode: String },

    /// Unknown privilege escalation tool name.
    #[snafu(display("invalid privilege escalation tool: {tool}"))]
    InvalidEscalation { tool: String },
}

impl Error {
    /// Returns true when the session stopped because a confirmation was declined.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Error::UserCancelled { .. } | Error::AuthenticationCancelled
        )
    }
}

/// Extension trait for adding context to io::Error results.
pub trait IoResultExt<T> {
    /// Add context for command execution errors.
    fn command_context(self, command: impl Into<String>) -> Result<T>;

    /// Add context for credentials file errors.
    fn credentials_context(self, path: impl Into<PathBuf>) -> Result<T>;

    /// Add context for mount point creation errors.
    fn mount_point_context(self, path: impl Into<PathBuf>) -> Result<T>;

    /// Add context for config read errors.
    fn config_read_context(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn command_context(self, command: impl Into<String>) -> Result<T> {
        self.context(CommandExecutionSnafu {
            command: command.into(),
        })
    }

    fn credentials_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.context(CredentialsWriteSnafu { path: path.into() })
    }

    fn mount_point_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.context(MountPointCreationSnafu { path: path.into() })
    }

    fn config_read_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.context(ConfigReadSnafu { path: path.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_classification() {
        let cancelled = Error::UserCancelled {
            reason: "overwrite declined".to_string(),
        };
        assert!(cancelled.is_cancellation());
        assert!(Error::AuthenticationCancelled.is_cancellation());
        assert!(!Error::EmptyUsername.is_cancellation());
        assert!(
            !Error::ShareListFailed {
                stderr: "NT_STATUS_LOGON_FAILURE".to_string()
            }
            .is_cancellation()
        );
    }

    #[test]
    fn test_io_context_keeps_path() {
        let res: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.mount_point_context("/home/me/nas/docs").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to create mount point at /home/me/nas/docs"
        );
    }
}
