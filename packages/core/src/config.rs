//! Session configuration.
//!
//! Every answer the workflow would otherwise ask for interactively is given
//! up front, from a JSON file and/or command line flags. Flags win.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use snafu::ResultExt;

use crate::credentials::{AuthMode, CredentialRequest};
use crate::error::{ConfigParseSnafu, Error, IoResultExt, Result};
use crate::executor::PrivilegeEscalation;

/// Escalation tool used when none is configured.
pub const DEFAULT_ESCALATION: PrivilegeEscalation = PrivilegeEscalation::Sudo;

/// Inputs for one run of the workflow.
///
/// ```
/// use smbmount_core::config::SessionConfig;
///
/// let config = SessionConfig::from_json(r#"{"host": "nas.local", "auth": "manual"}"#, "inline").unwrap();
/// assert_eq!(config.host().unwrap(), "nas.local");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub host: Option<String>,
    pub mount_base: Option<String>,
    pub auth: Option<AuthMode>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub escalation: Option<PrivilegeEscalation>,
    /// Create or overwrite credentials files without asking.
    pub force: bool,
    pub shares: Vec<String>,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("mount_base", &self.mount_base)
            .field("auth", &self.auth)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("credentials_file", &self.credentials_file)
            .field("escalation", &self.escalation)
            .field("force", &self.force)
            .field("shares", &self.shares)
            .finish()
    }
}

impl SessionConfig {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).config_read_context(path)?;
        Self::from_json(&text, path)
    }

    /// Parses JSON text; `origin` names the source in errors.
    pub fn from_json(text: &str, origin: impl Into<PathBuf>) -> Result<Self> {
        serde_json::from_str(text).context(ConfigParseSnafu {
            path: origin.into(),
        })
    }

    /// Layers `overrides` on top of `self`.
    pub fn merge(self, overrides: SessionConfig) -> Self {
        Self {
            host: overrides.host.or(self.host),
            mount_base: overrides.mount_base.or(self.mount_base),
            auth: overrides.auth.or(self.auth),
            username: overrides.username.or(self.username),
            password: overrides.password.or(self.password),
            credentials_file: overrides.credentials_file.or(self.credentials_file),
            escalation: overrides.escalation.or(self.escalation),
            force: overrides.force || self.force,
            shares: if overrides.shares.is_empty() {
                self.shares
            } else {
                overrides.shares
            },
        }
    }

    /// The trimmed, non-empty host.
    pub fn host(&self) -> Result<&str> {
        self.host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(Error::EmptyHost)
    }

    /// The trimmed mount base, if one was given.
    pub fn mount_base(&self) -> Option<&str> {
        self.mount_base
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }

    pub fn escalation(&self) -> PrivilegeEscalation {
        self.escalation.unwrap_or(DEFAULT_ESCALATION)
    }

    /// Builds the credential resolver input.
    pub fn credential_request(&self) -> Result<CredentialRequest> {
        Ok(CredentialRequest {
            mode: self.auth.unwrap_or_default(),
            host: self.host()?.to_string(),
            mount_base: self.mount_base().map(str::to_string),
            username: self.username.clone(),
            password: self.password.clone(),
            confirm: self.force,
            credentials_file: self.credentials_file.clone(),
        })
    }
}
