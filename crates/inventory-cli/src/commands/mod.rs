//! CLI command implementations.

mod access;
mod api;
mod auth;

pub use access::{nav, route};
pub use api::get;
pub use auth::{login, logout, status, whoami};

use access_routing::AccessPolicy;
use anyhow::{Context as _, Result};
use auth_session::{AuthError, SessionManager, SessionSnapshot};
use inventory_config_and_utils::{Config, Paths};
use session_store::{FileStorage, SessionStore};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Everything a command needs: configuration, the bootstrapped session
/// and the access policy derived from the configuration.
pub struct Context {
    pub manager: SessionManager,
    pub policy: AccessPolicy,
    pub snapshot: SessionSnapshot,
}

/// Build the session manager from disk state and restore the session.
///
/// Ctrl-C while the stored session is being confirmed aborts the command.
pub async fn connect(paths: &Paths, config: &Config) -> Result<Context> {
    paths.ensure_dirs()?;

    let store = Arc::new(SessionStore::new(Box::new(FileStorage::new(
        paths.session_file(),
    ))));
    let manager = SessionManager::from_config(config, store)?;
    let policy = AccessPolicy::new(&config.privileged_roles);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    let result = manager.bootstrap(shutdown_rx).await;
    signal_task.abort();

    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(AuthError::Cancelled) => anyhow::bail!("Interrupted"),
        Err(e) => return Err(e).context("Failed to restore session"),
    };
    debug!(status = %snapshot.status, "Session ready");

    Ok(Context {
        manager,
        policy,
        snapshot,
    })
}
