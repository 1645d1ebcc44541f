//! Session report of per-share mount outcomes.

use std::fmt;
use std::path::PathBuf;

use crate::mount::{MountMethod, MountOutcome};
use crate::naming::MountTarget;

/// Outcome of one share, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareReport {
    pub share: String,
    pub target: PathBuf,
    pub outcome: MountOutcome,
}

/// Overall classification of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// No share failed. Already mounted shares count as fine.
    AllSucceeded,
    /// At least one failure and no success.
    AllFailed,
    Mixed,
}

impl ReportStatus {
    /// Process exit status for this classification.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportStatus::AllSucceeded => 0,
            ReportStatus::Mixed => 2,
            ReportStatus::AllFailed => 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountReport {
    entries: Vec<ShareReport>,
}

impl MountReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: MountTarget, outcome: MountOutcome) {
        self.entries.push(ShareReport {
            share: target.share().to_string(),
            target: target.dir().to_path_buf(),
            outcome,
        });
    }

    pub fn entries(&self) -> &[ShareReport] {
        &self.entries
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }

    pub fn already_mounted_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == MountOutcome::AlreadyMounted)
            .count()
    }

    pub fn status(&self) -> ReportStatus {
        match (self.success_count(), self.failure_count()) {
            (_, 0) => ReportStatus::AllSucceeded,
            (0, _) => ReportStatus::AllFailed,
            _ => ReportStatus::Mixed,
        }
    }
}

impl fmt::Display for ShareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.target.display();
        match &self.outcome {
            MountOutcome::Success(MountMethod::Unprivileged) => {
                write!(f, "Success: {} -> {}", self.share, target)
            }
            MountOutcome::Success(MountMethod::Privileged) => {
                write!(f, "Success (privileged): {} -> {}", self.share, target)
            }
            MountOutcome::AlreadyMounted => {
                write!(f, "Already mounted: {} at {}", self.share, target)
            }
            MountOutcome::DirectoryCreateFailed(reason) => {
                write!(f, "Error creating directory for {}: {}", self.share, reason)
            }
            MountOutcome::MountFailed(reason) => {
                write!(f, "Failed to mount {}: {}", self.share, reason)
            }
        }
    }
}

impl fmt::Display for MountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mount results:")?;
        writeln!(f)?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        writeln!(f)?;
        write!(
            f,
            "Summary: {} successful, {} failed",
            self.success_count(),
            self.failure_count()
        )?;
        let already = self.already_mounted_count();
        if already > 0 {
            write!(f, ", {} already mounted", already)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn report(outcomes: &[(&str, MountOutcome)]) -> MountReport {
        let mut report = MountReport::new();
        for (share, outcome) in outcomes {
            let target = MountTarget::new(Path::new("/home/alice"), "nas", None, share);
            report.push(target, outcome.clone());
        }
        report
    }

    #[test]
    fn test_status_classification() {
        let ok = MountOutcome::Success(MountMethod::Unprivileged);
        let failed = MountOutcome::MountFailed("denied".to_string());

        assert_eq!(report(&[("a", ok.clone())]).status(), ReportStatus::AllSucceeded);
        assert_eq!(
            report(&[("a", MountOutcome::AlreadyMounted)]).status(),
            ReportStatus::AllSucceeded
        );
        assert_eq!(report(&[("a", failed.clone())]).status(), ReportStatus::AllFailed);
        assert_eq!(
            report(&[("a", MountOutcome::AlreadyMounted), ("b", failed.clone())]).status(),
            ReportStatus::AllFailed
        );
        assert_eq!(
            report(&[("a", ok), ("b", failed)]).status(),
            ReportStatus::Mixed
        );
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(ReportStatus::AllSucceeded.exit_code(), 0);
        assert_eq!(ReportStatus::Mixed.exit_code(), 2);
        assert_eq!(ReportStatus::AllFailed.exit_code(), 3);
    }

    #[test]
    fn test_render() {
        let report = report(&[
            ("docs", MountOutcome::Success(MountMethod::Unprivileged)),
            ("media", MountOutcome::Success(MountMethod::Privileged)),
            ("old", MountOutcome::AlreadyMounted),
            ("bad dir", MountOutcome::DirectoryCreateFailed("Not a directory".to_string())),
            ("x$", MountOutcome::MountFailed("mount error(2)".to_string())),
        ]);

        let expected = "\
Mount results:

Success: docs -> /home/alice/nas/docs
Success (privileged): media -> /home/alice/nas/media
Already mounted: old at /home/alice/nas/old
Error creating directory for bad dir: Not a directory
Failed to mount x$: mount error(2)

Summary: 2 successful, 2 failed, 1 already mounted";
        assert_eq!(report.to_string(), expected);
        assert_eq!(report.already_mounted_count(), 1);
    }
}
