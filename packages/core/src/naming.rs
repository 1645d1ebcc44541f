//! Safe names and mount targets.
//!
//! Share and host names come from the network or from the user and may hold
//! anything. Only their safe form is ever used as a path component.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`.
///
/// The result has the same number of characters as the input and applying
/// it twice changes nothing.
pub fn safe_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Rejects an empty host or one that `ping` and `smbclient` would parse as an option.
pub fn check_host(host: &str) -> Result<()> {
    let host = host.trim();
    if host.is_empty() {
        return Err(Error::EmptyHost);
    }
    if host.starts_with('-') {
        return Err(Error::InvalidHost {
            host: host.to_string(),
        });
    }
    Ok(())
}

/// Returns the safe directory name for the mount base, defaulting to the host.
pub fn mount_base_name(host: &str, mount_base: Option<&str>) -> String {
    match mount_base.map(str::trim).filter(|b| !b.is_empty()) {
        Some(base) => safe_name(base),
        None => safe_name(host),
    }
}

/// Formats the UNC-style path used by smbclient, mount helpers and the mount table.
pub fn unc_path(host: &str, share: &str) -> String {
    format!("//{}/{}", host, share)
}

/// Where one share of one host is mounted.
///
/// Layout: `<home>/<safe mount base>/<safe share>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountTarget {
    host: String,
    share: String,
    dir: PathBuf,
}

impl MountTarget {
    pub fn new(home: &Path, host: &str, mount_base: Option<&str>, share: &str) -> Self {
        let dir = home
            .join(mount_base_name(host, mount_base))
            .join(safe_name(share));
        Self {
            host: host.to_string(),
            share: share.to_string(),
            dir,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The raw share name as listed by the server or typed by the user.
    pub fn share(&self) -> &str {
        &self.share
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn unc(&self) -> String {
        unc_path(&self.host, &self.share)
    }
}

impl fmt::Display for MountTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.unc(), self.dir.display())
    }
}
