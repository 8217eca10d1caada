//! `thrumd`: the per-repository coordination daemon binary.
//!
//! Startup order: resolve paths, acquire the lock file, load config, load
//! the last snapshot (if any) and replay unprocessed journal entries on
//! top of it, then bring up the two listeners and the periodic sync
//! poller.

use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;

use fs2::FileExt;
use parking_lot::Mutex;
use thrum_core::{Clock, SystemClock};
use thrum_daemon::config::{DaemonConfig, Paths};
use thrum_daemon::handlers::Handlers;
use thrum_daemon::pairing::PairingManager;
use thrum_daemon::peer_client::TcpPeerClient;
use thrum_daemon::peer_registry::PeerRegistry;
use thrum_daemon::state::State;
use thrum_daemon::sync_loop::SyncLoop;
use thrum_daemon::worktree::GitWorktreeInspector;
use thrum_daemon::{identity, listener, DaemonError};
use thrum_storage::{MaterializedState, MigrationRegistry, Snapshot, Wal};
use tokio::net::{TcpListener, UnixListener};

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let repo_id = std::env::var("THRUM_REPO_ID").unwrap_or_else(|_| default_repo_id());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let paths = Paths::resolve(&repo_id)?;
    std::fs::create_dir_all(&paths.state_dir)?;

    let lock_file = OpenOptions::new().create(true).write(true).open(&paths.lock_path)?;
    lock_file.try_lock_exclusive().map_err(DaemonError::LockHeld)?;

    let config = DaemonConfig::load(&paths.config_path)?;
    let config = DaemonConfig { repo_id: repo_id.clone(), ..config };

    let daemon_id = identity::load_or_create(&paths.daemon_id_path)?;
    let hostname = identity::hostname();

    let (materialized, processed_seq) = load_snapshot(&paths.snapshot_path)?;
    let mut wal = Wal::open(&paths.wal_path, processed_seq)?;
    let mut materialized = materialized;
    while let Some(entry) = wal.next_unprocessed()? {
        materialized.apply_event(&entry.event);
    }

    let clock = SystemClock::default();
    let state = Arc::new(State::new(daemon_id, clock.clone(), wal, materialized));
    let peer_registry = Arc::new(PeerRegistry::new());
    let peer_client = Arc::new(TcpPeerClient);
    let sync = SyncLoop::new(
        state.clone(),
        peer_registry.clone(),
        peer_client.clone(),
        clock.clone(),
        config.sync_debounce(),
        config.sync_max_batch,
    );

    let my_address = std::env::var("THRUM_PEER_ADDRESS").unwrap_or_else(|_| "127.0.0.1:0".to_string());
    let handlers = Arc::new(Handlers {
        state: state.clone(),
        clock: clock.clone(),
        config,
        context_dir: paths.context_dir.clone(),
        peer_registry,
        pairing: Arc::new(PairingManager::new()),
        worktree: Arc::new(GitWorktreeInspector),
        peer_client,
        sync: sync.clone(),
        hostname,
        my_address,
        pairing_rx: Mutex::new(None),
    });
    thrum_daemon::handlers::ensure_everyone_group(&handlers)?;

    if paths.socket_path.exists() {
        std::fs::remove_file(&paths.socket_path)?;
    }
    let unix_listener = UnixListener::bind(&paths.socket_path)?;
    let unix_handlers = handlers.clone();
    tokio::spawn(async move {
        if let Err(e) = listener::serve_unix(unix_listener, unix_handlers).await {
            tracing::error!(error = %e, "unix listener exited");
        }
    });

    if let Ok(tcp_listener) = TcpListener::bind("0.0.0.0:0").await {
        let tcp_handlers = handlers.clone();
        tokio::spawn(async move {
            if let Err(e) = listener::serve_tcp(tcp_listener, tcp_handlers).await {
                tracing::error!(error = %e, "peer listener exited");
            }
        });
    }

    periodic_sync(sync).await
}

/// Safety-net pull on a timer, independent of inbound `sync.notify` calls
/// (spec §4.4 "periodic safety-net pull").
async fn periodic_sync<C: Clock + 'static>(sync: Arc<SyncLoop<C>>) -> ! {
    let mut interval = tokio::time::interval(Duration::from_secs(30));
    loop {
        interval.tick().await;
        sync.poll_all_paired();
    }
}

fn load_snapshot(path: &std::path::Path) -> std::io::Result<(MaterializedState, u64)> {
    match Snapshot::load(path, &MigrationRegistry::new()) {
        Ok(snapshot) => Ok((snapshot.state, snapshot.seq)),
        Err(_) => Ok((MaterializedState::default(), 0)),
    }
}

/// Falls back to the current directory name when no repo id is
/// configured — a reasonable default for a daemon meant to be started
/// from inside the repository it coordinates.
fn default_repo_id() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "default".to_string())
}
