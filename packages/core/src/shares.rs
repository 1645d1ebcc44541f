//! Share discovery through `smbclient -L`.
//!
//! The listing is parsed line by line: any line containing `Disk` is a share
//! entry and its first whitespace-delimited token is the share name.

use std::fmt;

use crate::credentials::Credential;
use crate::error::{Error, Result};
use crate::executor::{CommandRunner, ExecutionContext};

/// Marker that identifies a disk-type share in `smbclient -L` output.
pub const DISK_MARKER: &str = "Disk";

/// Administrative shares that are never offered for mounting.
pub const RESERVED_SHARES: [&str; 2] = ["IPC$", "print$"];

/// Protocol requested from smbclient.
pub const MAX_PROTOCOL: &str = "SMB3";

/// Label of the selection entry that lets the user type a hidden share name.
pub const HIDDEN_SHARE_LABEL: &str = "+ Add hidden share";

/// A share name as exported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Share(String);

impl Share {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry offered for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareChoice {
    Discovered(Share),
    /// Trailing sentinel; never a discovery result.
    HiddenShare,
}

impl fmt::Display for ShareChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareChoice::Discovered(share) => fmt::Display::fmt(share, f),
            ShareChoice::HiddenShare => f.write_str(HIDDEN_SHARE_LABEL),
        }
    }
}

/// Result of a successful listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareListing {
    Available(Vec<Share>),
    /// The server answered but exported nothing mountable.
    NoSharesAvailable,
}

impl ShareListing {
    fn from_shares(shares: Vec<Share>) -> Self {
        if shares.is_empty() {
            ShareListing::NoSharesAvailable
        } else {
            ShareListing::Available(shares)
        }
    }

    /// Discovered shares in listing order; empty for [`ShareListing::NoSharesAvailable`].
    pub fn shares(&self) -> &[Share] {
        match self {
            ShareListing::Available(shares) => shares,
            ShareListing::NoSharesAvailable => &[],
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shares().iter().any(|s| s.name() == name)
    }

    /// Selection entries: discovered shares followed by the hidden-share sentinel.
    pub fn choices(&self) -> Vec<ShareChoice> {
        self.shares()
            .iter()
            .cloned()
            .map(ShareChoice::Discovered)
            .chain(std::iter::once(ShareChoice::HiddenShare))
            .collect()
    }
}

/// Builds the smbclient arguments for listing `host`.
pub fn list_args(host: &str, credential: &Credential) -> Vec<String> {
    let target = format!("//{}", host);
    match credential {
        Credential::File { path } => vec![
            "-A".to_string(),
            path.to_string_lossy().to_string(),
            "-L".to_string(),
            target,
            "-m".to_string(),
            MAX_PROTOCOL.to_string(),
        ],
        Credential::Inline { username, password } => vec![
            "-L".to_string(),
            target,
            "-m".to_string(),
            MAX_PROTOCOL.to_string(),
            "-U".to_string(),
            format!("{}%{}", username, password),
        ],
    }
}

/// Extracts mountable share names from `smbclient -L` output.
///
/// Reserved shares are dropped and the order of appearance is kept. A name
/// listed twice is reported once.
pub fn parse_share_listing(output: &str) -> Vec<Share> {
    let mut shares: Vec<Share> = Vec::new();

    for line in output.lines().filter(|line| line.contains(DISK_MARKER)) {
        let Some(name) = line.split_whitespace().next() else {
            continue;
        };
        if RESERVED_SHARES.contains(&name) {
            continue;
        }
        if shares.iter().any(|s| s.name() == name) {
            continue;
        }
        shares.push(Share::new(name));
    }

    shares
}

/// Lists the disk shares exported by `host`.
pub fn list_shares<R: CommandRunner>(
    exec: &ExecutionContext<R>,
    host: &str,
    credential: &Credential,
) -> Result<ShareListing> {
    if credential.is_inline() {
        warn!("passing the password to smbclient on its command line");
    }

    let args = list_args(host, credential);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = exec.run("smbclient", &args)?;

    if !output.success() {
        return Err(Error::ShareListFailed {
            stderr: output.diagnostic(),
        });
    }

    let listing = ShareListing::from_shares(parse_share_listing(&output.stdout));
    info!("{} share(s) found on {}", listing.shares().len(), host);
    Ok(listing)
}
