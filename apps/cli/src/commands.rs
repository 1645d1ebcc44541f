//! Command implementations wiring the core workflow to the terminal.

use std::env;
use std::io;
use std::path::Path;

use smbmount_core::workflow::{self, Selection};
use smbmount_core::{
    ExecutionContext, Result, SessionConfig, ShareListing, UserContext,
};

use crate::{ConnectArgs, MountArgs};

/// Printed when the listing succeeded but nothing is mountable.
const NO_SHARES_MESSAGE: &str = "No shares available";

/// Loads the config file, if any, and layers the flags on top.
fn session_config(
    config_path: Option<&Path>,
    args: &ConnectArgs,
    shares: Vec<String>,
) -> Result<SessionConfig> {
    let base = match config_path {
        Some(path) => {
            debug!("loading config {}", path.display());
            SessionConfig::load(path)?
        }
        None => SessionConfig::default(),
    };

    let flags = SessionConfig {
        host: args.host.clone(),
        mount_base: args.mount_base.clone(),
        auth: args.auth,
        username: args.username.clone(),
        password: read_password(args),
        credentials_file: args.credentials_file.clone(),
        escalation: None,
        force: args.force,
        shares,
    };

    Ok(base.merge(flags))
}

/// Password from the environment or the terminal; never from a flag.
fn read_password(args: &ConnectArgs) -> Option<String> {
    password_from(
        args,
        |name| env::var(name).ok(),
        || rpassword::prompt_password("SMB password: "),
    )
}

/// The environment variable wins; the prompt only runs with `--ask-password`.
fn password_from(
    args: &ConnectArgs,
    lookup: impl Fn(&str) -> Option<String>,
    prompt: impl FnOnce() -> io::Result<String>,
) -> Option<String> {
    if let Some(password) = lookup(&args.password_env) {
        debug!("password taken from ${}", args.password_env);
        return Some(password);
    }
    if args.ask_password {
        match prompt() {
            Ok(password) => return Some(password),
            Err(e) => warn!("could not read password from terminal: {}", e),
        }
    }
    None
}

/// `smbmount list`: prints discovered shares, then the hidden-share entry.
pub fn list(config_path: Option<&Path>, args: ConnectArgs) -> Result<i32> {
    let config = session_config(config_path, &args, Vec::new())?;
    let ctx = UserContext::current()?;
    let exec = ExecutionContext::new();

    let connection = workflow::connect(&exec, &ctx, &config)?;
    if connection.listing == ShareListing::NoSharesAvailable {
        println!("{}", NO_SHARES_MESSAGE);
        return Ok(0);
    }

    for choice in connection.listing.choices() {
        println!("{}", choice);
    }
    Ok(0)
}

/// `smbmount mount`: runs the whole session and prints the report.
pub fn mount(config_path: Option<&Path>, args: MountArgs) -> Result<i32> {
    let mut config = session_config(config_path, &args.connect, args.shares)?;
    if args.escalation.is_some() {
        config.escalation = args.escalation;
    }

    let selection = Selection {
        all: args.all,
        shares: config.shares.clone(),
        hidden: args.hidden,
    };
    selection.validate()?;

    let ctx = UserContext::current()?;
    let exec = ExecutionContext::with_escalation(config.escalation());

    let connection = workflow::connect(&exec, &ctx, &config)?;
    if connection.listing == ShareListing::NoSharesAvailable {
        warn!("{} on {}", NO_SHARES_MESSAGE, connection.host);
    }

    let report = workflow::mount(&exec, &ctx, &connection, &selection)?;
    println!("{}", report);

    Ok(report.status().exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use smbmount_core::AuthMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        connect: ConnectArgs,
    }

    fn connect_args(argv: &[&str]) -> ConnectArgs {
        let argv = std::iter::once("smbmount").chain(argv.iter().copied());
        TestCli::try_parse_from(argv).unwrap().connect
    }

    fn prompt_unused() -> io::Result<String> {
        panic!("prompt must not run")
    }

    #[test]
    fn test_password_env_takes_precedence_over_prompt() {
        let args = connect_args(&["nas", "--ask-password", "--password-env", "NAS_PW"]);
        let password = password_from(
            &args,
            |name| (name == "NAS_PW").then(|| "from-env".to_string()),
            prompt_unused,
        );
        assert_eq!(password.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_password_prompt_only_when_asked() {
        let args = connect_args(&["nas"]);
        assert_eq!(password_from(&args, |_| None, prompt_unused), None);

        let args = connect_args(&["nas", "--ask-password"]);
        let password = password_from(&args, |_| None, || Ok("typed".to_string()));
        assert_eq!(password.as_deref(), Some("typed"));

        let failed = password_from(&args, |_| None, || {
            Err(io::Error::new(io::ErrorKind::NotFound, "no tty"))
        });
        assert_eq!(failed, None);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"host": "10.0.0.5", "auth": "new", "username": "alice", "mount_base": "office", "shares": ["docs"]}}"#
        )
        .unwrap();
        let args = connect_args(&[
            "nas.local",
            "-u",
            "bob",
            "--password-env",
            "SMBMOUNT_TEST_UNSET_PASSWORD_VAR",
        ]);

        let config = session_config(Some(file.path()), &args, Vec::new()).unwrap();

        assert_eq!(config.host.as_deref(), Some("nas.local"));
        assert_eq!(config.username.as_deref(), Some("bob"));
        // Values without a flag come from the file.
        assert_eq!(config.auth, Some(AuthMode::New));
        assert_eq!(config.mount_base.as_deref(), Some("office"));
        assert_eq!(config.shares, vec!["docs"]);
        assert!(!config.force);

        let config = session_config(Some(file.path()), &args, vec!["media".to_string()]).unwrap();
        assert_eq!(config.shares, vec!["media"]);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = connect_args(&["nas"]);
        let missing = Path::new("/nonexistent/smbmount.json");
        assert!(session_config(Some(missing), &args, Vec::new()).is_err());
    }
}
