//! Mount table lookup.
//!
//! The table is the plain text printed by `mount`. Matching is a substring
//! test for `//host/share`, so a mount of `//nas/docs` also matches a query
//! for `//nas/doc`. Callers only see [`MountTable::contains_share`].

use crate::error::Result;
use crate::executor::{CommandRunner, ExecutionContext};
use crate::naming::unc_path;

/// Snapshot of the system mount table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountTable {
    text: String,
}

impl MountTable {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Runs `mount` and captures its listing.
    ///
    /// A non-zero exit yields an empty table.
    pub fn query<R: CommandRunner>(exec: &ExecutionContext<R>) -> Result<Self> {
        let output = exec.run("mount", &[])?;
        if !output.success() {
            warn!("mount table query failed: {}", output.diagnostic());
            return Ok(Self::default());
        }
        Ok(Self::from_text(output.stdout))
    }

    /// Returns true if any entry references `//host/share`.
    pub fn contains_share(&self, host: &str, share: &str) -> bool {
        self.text.contains(&unc_path(host, share))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::PrivilegeEscalation;
    use crate::executor::testing::RecordingRunner;

    const SAMPLE_MOUNTS: &str = "\
/dev/nvme0n1p2 on / type ext4 (rw,relatime)
//10.0.0.5/sharedocs on /home/alice/10_0_0_5/sharedocs type cifs (rw,relatime,vers=3.1.1)
";

    #[test]
    fn test_contains_share() {
        let table = MountTable::from_text(SAMPLE_MOUNTS);
        assert!(table.contains_share("10.0.0.5", "sharedocs"));
        assert!(!table.contains_share("10.0.0.5", "media"));
        assert!(!table.contains_share("10.0.0.6", "sharedocs"));
    }

    #[test]
    fn test_query_runs_mount_without_arguments() {
        let exec = ExecutionContext::with_runner(
            RecordingRunner::new().ok("mount", SAMPLE_MOUNTS),
            PrivilegeEscalation::Sudo,
        );
        let table = MountTable::query(&exec).unwrap();
        assert!(table.contains_share("10.0.0.5", "sharedocs"));
        assert_eq!(exec.runner().calls(), vec![vec!["mount"]]);
    }

    #[test]
    fn test_failed_query_is_empty() {
        let exec = ExecutionContext::with_runner(
            RecordingRunner::new().fail("mount", 1, "mount: permission denied"),
            PrivilegeEscalation::None,
        );
        let table = MountTable::query(&exec).unwrap();
        assert_eq!(table, MountTable::default());
    }
}
