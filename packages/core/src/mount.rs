//! Mount operations module.
//!
//! Each selected share is mounted under `<home>/<base>/<share>`. `udisksctl`
//! is tried first since it needs no root rights when polkit allows it; only
//! if it fails is `mount.cifs` run through the configured escalation tool.

use std::fs;
use std::path::Path;

use crate::context::UserContext;
use crate::credentials::Credential;
use crate::error::{Error, IoResultExt, Result};
use crate::executor::{CommandRunner, ExecutionContext};
use crate::mounttab::MountTable;
use crate::naming::{MountTarget, check_host};
use crate::report::MountReport;

/// Permission bits applied to files of the mounted share.
pub const FILE_MODE: &str = "0660";

/// Permission bits applied to directories of the mounted share.
pub const DIR_MODE: &str = "0770";

/// How a share ended up mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMethod {
    /// `udisksctl`, no escalation.
    Unprivileged,
    /// `mount.cifs` through sudo or pkexec.
    Privileged,
}

/// Result of processing one share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Success(MountMethod),
    AlreadyMounted,
    DirectoryCreateFailed(String),
    MountFailed(String),
}

impl MountOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MountOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            MountOutcome::DirectoryCreateFailed(_) | MountOutcome::MountFailed(_)
        )
    }
}

/// Composes the `-o` option string shared by both mount helpers.
pub fn mount_options(credential: &Credential, uid: u32, gid: u32) -> String {
    let auth = match credential {
        Credential::File { path } => format!("credentials={}", path.display()),
        Credential::Inline { username, password } => {
            format!("username={},password={}", username, password)
        }
    };
    format!(
        "{},uid={},gid={},file_mode={},dir_mode={}",
        auth, uid, gid, FILE_MODE, DIR_MODE
    )
}

/// What to mount in one session.
#[derive(Debug, Clone)]
pub struct MountPlan {
    pub host: String,
    pub credential: Credential,
    /// Folder under the home directory; defaults to the host.
    pub mount_base: Option<String>,
    /// Raw share names, hidden ones included.
    pub shares: Vec<String>,
}

impl MountPlan {
    /// Local checks that need no external process.
    pub fn validate(&self) -> Result<()> {
        check_host(&self.host)?;
        if self.shares.iter().all(|s| s.trim().is_empty()) {
            return Err(Error::NoSharesSelected);
        }
        Ok(())
    }

    pub fn target(&self, home: &Path, share: &str) -> MountTarget {
        MountTarget::new(home, &self.host, self.mount_base.as_deref(), share)
    }
}

/// Creates a mount point directory if it doesn't exist.
pub fn create_mount_point(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path).mount_point_context(path)?;
    }
    Ok(())
}

/// Tries `udisksctl mount -t cifs -b //host/share -o <options>`.
fn mount_unprivileged<R: CommandRunner>(
    exec: &ExecutionContext<R>,
    target: &MountTarget,
    options: &str,
) -> bool {
    let unc = target.unc();
    match exec.run(
        "udisksctl",
        &["mount", "-t", "cifs", "-b", unc.as_str(), "-o", options],
    ) {
        Ok(output) if output.success() => true,
        Ok(output) => {
            debug!("udisksctl failed for {}: {}", unc, output.diagnostic());
            false
        }
        Err(e) => {
            debug!("udisksctl unavailable: {}", e);
            false
        }
    }
}

/// Runs `mount.cifs //host/share <dir> -o <options>` with escalation.
fn mount_privileged<R: CommandRunner>(
    exec: &ExecutionContext<R>,
    target: &MountTarget,
    options: &str,
) -> std::result::Result<(), String> {
    let unc = target.unc();
    let dir = target.dir().to_string_lossy().to_string();
    match exec.run_privileged_checked("mount.cifs", &[unc.as_str(), dir.as_str(), "-o", options]) {
        Ok(_) => Ok(()),
        Err(Error::CommandExit { code, stderr, .. }) => match stderr.trim() {
            "" => Err(format!("exit code {}", code)),
            stderr => Err(stderr.to_string()),
        },
        Err(e) => Err(e.to_string()),
    }
}

/// Mounts one share, never returning an error.
///
/// Steps: create the directory, skip if the mount table already lists the
/// share, try the unprivileged helper, then the privileged one.
pub fn mount_share<R: CommandRunner>(
    exec: &ExecutionContext<R>,
    target: &MountTarget,
    options: &str,
) -> MountOutcome {
    if let Err(e) = create_mount_point(target.dir()) {
        let reason = match &e {
            Error::MountPointCreation { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        warn!("{}: {}", e, reason);
        return MountOutcome::DirectoryCreateFailed(reason);
    }

    let table = MountTable::query(exec).unwrap_or_else(|e| {
        warn!("could not read mount table: {}", e);
        MountTable::default()
    });
    if table.contains_share(target.host(), target.share()) {
        info!("{} is already mounted", target.unc());
        return MountOutcome::AlreadyMounted;
    }

    if mount_unprivileged(exec, target, options) {
        info!("mounted {} with udisksctl", target);
        return MountOutcome::Success(MountMethod::Unprivileged);
    }

    match mount_privileged(exec, target, options) {
        Ok(()) => {
            info!("mounted {} with mount.cifs", target);
            MountOutcome::Success(MountMethod::Privileged)
        }
        Err(reason) => {
            warn!("failed to mount {}: {}", target.unc(), reason);
            MountOutcome::MountFailed(reason)
        }
    }
}

/// Mounts every share of the plan and collects the per-share outcomes.
///
/// One share's failure does not stop the others.
pub fn mount_all<R: CommandRunner>(
    exec: &ExecutionContext<R>,
    ctx: &UserContext,
    plan: &MountPlan,
) -> Result<MountReport> {
    plan.validate()?;

    if plan.credential.is_inline() {
        warn!("the mount option string carries the password in clear text");
    }
    let options = mount_options(&plan.credential, ctx.uid, ctx.gid);

    let mut report = MountReport::new();
    for share in plan.shares.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let target = plan.target(ctx.home(), share);
        let outcome = mount_share(exec, &target, &options);
        report.push(target, outcome);
    }

    Ok(report)
}
