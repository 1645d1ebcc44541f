//! The end-to-end session: reachability, credentials, listing, mounting.
//!
//! Steps run strictly in order and each one blocks on the external tool it
//! drives. Selection of shares happens between [`connect`] and [`mount`].

use crate::config::SessionConfig;
use crate::context::UserContext;
use crate::credentials::{Credential, resolve_credentials};
use crate::error::{Error, Result};
use crate::executor::{CommandRunner, ExecutionContext};
use crate::mount::{MountPlan, mount_all};
use crate::reachability::ensure_reachable;
use crate::report::MountReport;
use crate::shares::{ShareListing, list_shares};

/// A host that answered, with resolved credentials and its share listing.
#[derive(Debug, Clone)]
pub struct Connection {
    pub host: String,
    pub mount_base: Option<String>,
    pub credential: Credential,
    pub listing: ShareListing,
}

/// Which shares to mount, as requested by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Every discovered share.
    pub all: bool,
    /// Share names, discovered or not.
    pub shares: Vec<String>,
    /// Names typed for the hidden-share entry.
    pub hidden: Vec<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        !self.all && names(&self.shares).next().is_none() && names(&self.hidden).next().is_none()
    }

    /// Rejects an empty selection before anything runs.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::NoSharesSelected);
        }
        Ok(())
    }

    /// Turns the selection into the ordered, de-duplicated list of share names.
    ///
    /// Discovered shares come first when `all` is set, then explicit names,
    /// then hidden names. Names absent from the listing are kept.
    pub fn resolve(&self, listing: &ShareListing) -> Result<Vec<String>> {
        let mut selected: Vec<String> = Vec::new();
        let mut add = |name: &str| {
            if !selected.iter().any(|s| s == name) {
                selected.push(name.to_string());
            }
        };

        if self.all {
            listing.shares().iter().for_each(|s| add(s.name()));
        }
        for name in names(&self.shares) {
            if !listing.contains(name) {
                info!("{} was not listed by the server, mounting it as a hidden share", name);
            }
            add(name);
        }
        names(&self.hidden).for_each(&mut add);

        if selected.is_empty() {
            return Err(Error::NoSharesSelected);
        }
        Ok(selected)
    }
}

fn names(list: &[String]) -> impl Iterator<Item = &str> {
    list.iter().map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Checks the host, resolves credentials and lists the shares.
///
/// Local validation (host, username) happens before any process runs, and
/// an unreachable host stops the session before credentials are touched.
pub fn connect<R: CommandRunner>(
    exec: &ExecutionContext<R>,
    ctx: &UserContext,
    config: &SessionConfig,
) -> Result<Connection> {
    let request = config.credential_request()?;
    request.validate(ctx.home())?;

    ensure_reachable(exec, &request.host)?;

    let credential = resolve_credentials(&request, ctx)?;
    let listing = list_shares(exec, &request.host, &credential)?;

    Ok(Connection {
        host: request.host,
        mount_base: request.mount_base,
        credential,
        listing,
    })
}

/// Mounts the selected shares of an established connection.
pub fn mount<R: CommandRunner>(
    exec: &ExecutionContext<R>,
    ctx: &UserContext,
    connection: &Connection,
    selection: &Selection,
) -> Result<MountReport> {
    let plan = MountPlan {
        host: connection.host.clone(),
        credential: connection.credential.clone(),
        mount_base: connection.mount_base.clone(),
        shares: selection.resolve(&connection.listing)?,
    };
    mount_all(exec, ctx, &plan)
}
