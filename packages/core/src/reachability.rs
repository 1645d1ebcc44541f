//! Host reachability check using the system `ping`.

use crate::error::{Error, Result};
use crate::executor::{CommandRunner, ExecutionContext};

/// Number of echo requests sent per check.
pub const PING_COUNT: &str = "2";

/// Returns true if `ping -c 2 <host>` exits with status 0.
///
/// A missing `ping` binary counts as unreachable. There is no retry.
pub fn is_reachable<R: CommandRunner>(exec: &ExecutionContext<R>, host: &str) -> bool {
    match exec.run("ping", &["-c", PING_COUNT, host]) {
        Ok(output) => {
            if !output.success() {
                debug!("ping {} failed: {}", host, output.diagnostic());
            }
            output.success()
        }
        Err(e) => {
            warn!("could not run ping: {}", e);
            false
        }
    }
}

/// Fails with [`Error::HostUnreachable`] unless the host answers.
pub fn ensure_reachable<R: CommandRunner>(exec: &ExecutionContext<R>, host: &str) -> Result<()> {
    if is_reachable(exec, host) {
        info!("host {} is reachable", host);
        Ok(())
    } else {
        Err(Error::HostUnreachable {
            host: host.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::PrivilegeEscalation;
    use crate::executor::testing::RecordingRunner;

    #[test]
    fn test_reachable_on_zero_exit() {
        let exec = ExecutionContext::with_runner(
            RecordingRunner::new().ok("ping", "2 packets transmitted, 2 received"),
            PrivilegeEscalation::None,
        );
        assert!(is_reachable(&exec, "10.0.0.5"));
        assert_eq!(exec.runner().calls(), vec![vec!["ping", "-c", "2", "10.0.0.5"]]);
    }

    #[test]
    fn test_unreachable_on_nonzero_exit() {
        let exec = ExecutionContext::with_runner(
            RecordingRunner::new().fail("ping", 1, ""),
            PrivilegeEscalation::None,
        );
        assert!(!is_reachable(&exec, "10.0.0.99"));
        assert_eq!(exec.runner().count("ping"), 1);
    }

    #[test]
    fn test_ensure_reachable_error() {
        let exec = ExecutionContext::with_runner(
            RecordingRunner::new().fail("ping", 2, "ping: unknown host"),
            PrivilegeEscalation::None,
        );
        match ensure_reachable(&exec, "nowhere") {
            Err(Error::HostUnreachable { host }) => assert_eq!(host, "nowhere"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
