//! smbmount - discover and mount SMB shares from the command line.
//!
//! All answers the workflow needs (host, credentials mode, confirmations,
//! share selection) come from flags or a JSON config file, so the tool never
//! blocks on a prompt unless `--ask-password` is given.

#[macro_use]
extern crate log;

mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use smbmount_core::{AuthMode, PrivilegeEscalation};

/// Exit status for local or external errors.
const EXIT_ERROR: i32 = 1;

/// Exit status when a required confirmation was not given.
const EXIT_CANCELLED: i32 = 4;

/// SMB share mount tool.
#[derive(Parser)]
#[command(name = "smbmount")]
#[command(about = "Discover SMB shares on a host and mount them under your home directory")]
#[command(long_about = "Discover SMB shares on a host and mount them under your home directory.

Every external tool (ping, smbclient, udisksctl, mount.cifs) runs to completion \
without a timeout; a hanging tool hangs smbmount.

Exit status: 0 all mounted, 1 error, 2 some shares failed, 3 all shares failed, \
4 cancelled (missing --force).")]
struct Cli {
    /// JSON session config; flags override its values.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the disk shares exported by a host.
    List(ConnectArgs),

    /// Mount selected shares of a host.
    ///
    /// udisksctl is tried first; mount.cifs through sudo or pkexec is the
    /// fallback.
    Mount(MountArgs),
}

/// Host and authentication options shared by every command.
#[derive(Args)]
struct ConnectArgs {
    /// Server IP or hostname.
    host: Option<String>,

    /// Credentials source: existing (~/.cifs), new (per-mount file) or manual.
    #[arg(short, long)]
    auth: Option<AuthMode>,

    /// SMB username.
    #[arg(short, long)]
    username: Option<String>,

    /// Environment variable holding the SMB password.
    #[arg(long, default_value = "SMBMOUNT_PASSWORD")]
    password_env: String,

    /// Prompt for the SMB password on the terminal.
    #[arg(long)]
    ask_password: bool,

    /// Mount folder name under the home directory (defaults to the host).
    #[arg(short, long)]
    mount_base: Option<String>,

    /// Credentials file to use instead of ~/.cifs with --auth existing.
    #[arg(long)]
    credentials_file: Option<PathBuf>,

    /// Create a missing ~/.cifs or overwrite an existing per-mount credentials file.
    #[arg(short, long)]
    force: bool,
}

#[derive(Args)]
struct MountArgs {
    #[command(flatten)]
    connect: ConnectArgs,

    /// Share to mount; repeat for several.
    #[arg(short, long = "share")]
    shares: Vec<String>,

    /// Hidden share name (usually ending in `$`); repeat for several.
    #[arg(long = "hidden-share")]
    hidden: Vec<String>,

    /// Mount every discovered share.
    #[arg(long)]
    all: bool,

    /// Tool used for the privileged fallback: sudo, pkexec or none.
    #[arg(short, long)]
    escalation: Option<PrivilegeEscalation>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Renders an error with its chain of causes.
fn error_chain(err: &smbmount_core::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::List(args) => commands::list(cli.config.as_deref(), args),
        Commands::Mount(args) => commands::mount(cli.config.as_deref(), args),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("smbmount: {}", error_chain(&e));
            if e.is_cancellation() {
                EXIT_CANCELLED
            } else {
                EXIT_ERROR
            }
        }
    };

    std::process::exit(code);
}
