//! Credential resolution and credentials file handling.
//!
//! A session authenticates either through a credentials file understood by
//! `smbclient -A` and `mount.cifs credentials=`, or through a username and
//! password held in memory. The file format is fixed:
//!
//! ```text
//! username=<value>
//! password=<value>
//! ```

use std::fmt;
use std::fs::{OpenOptions, Permissions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use nix::libc;
use serde::{Deserialize, Serialize};

use crate::context::UserContext;
use crate::error::{Error, IoResultExt, Result};
use crate::naming::{check_host, mount_base_name};

/// Owner read/write, nothing for group or other.
pub const CREDENTIALS_FILE_MODE: u32 = 0o600;

/// Well-known credentials file name under the home directory.
pub const DEFAULT_CREDENTIALS_FILE: &str = ".cifs";

/// How authentication material is supplied for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Use `~/.cifs`, creating it on confirmation.
    #[default]
    Existing,
    /// Write a per-mount `~/.<name>-credentials` file.
    New,
    /// Keep username and password in memory only.
    Manual,
}

impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "existing" => Ok(Self::Existing),
            "new" => Ok(Self::New),
            "manual" => Ok(Self::Manual),
            _ => Err(Error::InvalidAuthMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// Resolved authentication material. Exactly one form is active.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    File { path: PathBuf },
    Inline { username: String, password: String },
}

impl Credential {
    /// Returns true when the password travels on command lines.
    pub fn is_inline(&self) -> bool {
        matches!(self, Credential::Inline { .. })
    }
}

// Never print the password.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::File { path } => f.debug_struct("File").field("path", path).finish(),
            Credential::Inline { username, .. } => f
                .debug_struct("Inline")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Everything the resolver needs, collected up front instead of by dialogs.
#[derive(Clone, Default)]
pub struct CredentialRequest {
    pub mode: AuthMode,
    pub host: String,
    /// Mount folder name; also names the per-mount credentials file.
    pub mount_base: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Allows creating a missing `~/.cifs` or overwriting an existing per-mount file.
    pub confirm: bool,
    /// Replaces `~/.cifs` for [`AuthMode::Existing`].
    pub credentials_file: Option<PathBuf>,
}

impl CredentialRequest {
    /// Local checks that need no external process.
    ///
    /// In [`AuthMode::Existing`] a username is needed only when the
    /// credentials file is missing and will be created.
    pub fn validate(&self, home: &Path) -> Result<()> {
        check_host(&self.host)?;
        match self.mode {
            AuthMode::New | AuthMode::Manual => required_username(self).map(|_| ()),
            AuthMode::Existing if self.confirm && !self.existing_path(home).exists() => {
                required_username(self).map(|_| ())
            }
            AuthMode::Existing => Ok(()),
        }
    }

    /// The file used by [`AuthMode::Existing`]: the override or `~/.cifs`.
    fn existing_path(&self, home: &Path) -> PathBuf {
        self.credentials_file
            .clone()
            .unwrap_or_else(|| existing_credentials_path(home))
    }
}

/// Path of the shared credentials file.
pub fn existing_credentials_path(home: &Path) -> PathBuf {
    home.join(DEFAULT_CREDENTIALS_FILE)
}

/// Path of the per-mount credentials file, e.g. `~/.nas_local-credentials`.
pub fn new_credentials_path(home: &Path, host: &str, mount_base: Option<&str>) -> PathBuf {
    home.join(format!(
        ".{}-credentials",
        mount_base_name(host, mount_base)
    ))
}

/// Renders the two-line credentials file body.
pub fn credentials_file_content(username: &str, password: &str) -> String {
    format!("username={}\npassword={}\n", username, password)
}

/// Writes a credentials file readable by its owner only.
///
/// The file is created with mode `0600`, and an existing file is truncated
/// and restricted before any secret is written to it. A symlink at `path` is
/// refused rather than followed.
pub fn write_credentials_file(path: &Path, username: &str, password: &str) -> Result<()> {
    if username.is_empty() {
        return Err(Error::EmptyUsername);
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(CREDENTIALS_FILE_MODE)
        .custom_flags(libc::O_NOFOLLOW)
        .open(path)
        .credentials_context(path)?;

    file.set_permissions(Permissions::from_mode(CREDENTIALS_FILE_MODE))
        .credentials_context(path)?;

    file.write_all(credentials_file_content(username, password).as_bytes())
        .credentials_context(path)?;
    file.sync_all().credentials_context(path)?;

    info!("wrote credentials file {}", path.display());
    Ok(())
}

fn required_username(request: &CredentialRequest) -> Result<&str> {
    match request.username.as_deref().map(str::trim) {
        Some(username) if !username.is_empty() => Ok(username),
        _ => Err(Error::EmptyUsername),
    }
}

/// Resolves how the session authenticates.
///
/// Only the filesystem is touched; no external process is started here.
pub fn resolve_credentials(request: &CredentialRequest, ctx: &UserContext) -> Result<Credential> {
    let password = request.password.as_deref().unwrap_or_default();

    match request.mode {
        AuthMode::Existing => {
            let path = request.existing_path(ctx.home());

            if !path.exists() {
                if !request.confirm {
                    return Err(Error::UserCancelled {
                        reason: format!(
                            "credentials file {} not found; pass --force with a username to create it",
                            path.display()
                        ),
                    });
                }
                let username = required_username(request)?;
                write_credentials_file(&path, username, password)?;
            } else {
                debug!("using credentials file {}", path.display());
            }

            Ok(Credential::File { path })
        }
        AuthMode::New => {
            let path =
                new_credentials_path(ctx.home(), &request.host, request.mount_base.as_deref());

            if path.exists() && !request.confirm {
                return Err(Error::UserCancelled {
                    reason: format!(
                        "credentials file {} exists; pass --force to overwrite it",
                        path.display()
                    ),
                });
            }

            let username = required_username(request)?;
            write_credentials_file(&path, username, password)?;
            Ok(Credential::File { path })
        }
        AuthMode::Manual => {
            let username = required_username(request)?;
            warn!(
                "manual credentials put the password on command lines visible to other local users; \
                 prefer a credentials file"
            );
            Ok(Credential::Inline {
                username: username.to_string(),
                password: password.to_string(),
            })
        }
    }
}
