//! Explicit per-session user context.
//!
//! The home directory and the numeric identity of the invoking user are read
//! once at startup and handed to the credential resolver and the mount
//! orchestrator, so nothing below reads them ambiently.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Identity and home of the user the shares are mounted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub home: PathBuf,
    pub uid: u32,
    pub gid: u32,
}

impl UserContext {
    pub fn new(home: impl Into<PathBuf>, uid: u32, gid: u32) -> Self {
        Self {
            home: home.into(),
            uid,
            gid,
        }
    }

    /// Builds the context of the current process.
    pub fn current() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
        Ok(Self::new(home, current_uid(), current_gid()))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

/// Returns the current user's UID.
pub fn current_uid() -> u32 {
    nix::unistd::getuid().as_raw()
}

/// Returns the current user's primary GID.
pub fn current_gid() -> u32 {
    nix::unistd::getgid().as_raw()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_matches_process_identity() {
        let ctx = UserContext::current().expect("home directory should exist in test environment");
        assert_eq!(ctx.uid, current_uid());
        assert_eq!(ctx.gid, current_gid());
        assert_eq!(Some(ctx.home.clone()), dirs::home_dir());
    }
}
