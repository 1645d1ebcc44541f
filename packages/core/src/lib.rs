//! smbmount-core: Core library for discovering and mounting SMB shares.
//!
//! This library drives the system tools that do the real work (`ping`,
//! `smbclient`, `mount`, `udisksctl`, `mount.cifs`) and turns their output
//! into typed results.
//!
//! # Modules
//!
//! - [`reachability`]: Host reachability check using `ping`
//! - [`credentials`]: Credential modes and credentials files
//! - [`shares`]: Share listing using `smbclient -L`
//! - [`mount`]: Per-share mounting with unprivileged/privileged fallback
//! - [`mounttab`]: Mount table lookup
//! - [`report`]: Per-session mount report
//! - [`workflow`]: The whole session, step by step
//! - [`executor`]: Command execution and privilege escalation
//! - [`config`]: Session configuration
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```no_run
//! use smbmount_core::{ExecutionContext, SessionConfig, UserContext, workflow};
//!
//! let config = SessionConfig::from_json(
//!     r#"{"host": "10.0.0.5", "auth": "existing"}"#,
//!     "inline",
//! ).unwrap();
//! let exec = ExecutionContext::with_sudo();
//! let ctx = UserContext::current().unwrap();
//!
//! let connection = workflow::connect(&exec, &ctx, &config).unwrap();
//! for choice in connection.listing.choices() {
//!     println!("{}", choice);
//! }
//!
//! let selection = workflow::Selection { all: true, ..Default::default() };
//! let report = workflow::mount(&exec, &ctx, &connection, &selection).unwrap();
//! println!("{}", report);
//! ```

#[macro_use]
extern crate log;

pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod mount;
pub mod mounttab;
pub mod naming;
pub mod reachability;
pub mod report;
pub mod shares;
pub mod workflow;

// Re-export commonly used types
pub use config::SessionConfig;
pub use context::UserContext;
pub use credentials::{AuthMode, Credential};
pub use error::{Error, Result};
pub use executor::{ExecutionContext, PrivilegeEscalation};
pub use mount::{MountMethod, MountOutcome};
pub use report::{MountReport, ReportStatus};
pub use shares::{Share, ShareChoice, ShareListing};
