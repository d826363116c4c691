use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::export::DocumentExporter;
use crate::session::{SessionHandle, WizardSession};

/// Upper bound on how long an idle session outlives its TTL before the sweeper sees it.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Pluggable export backend. Default: TextExporter.
    pub exporter: Arc<dyn DocumentExporter>,
}

#[derive(Debug)]
struct TrackedSession {
    handle: SessionHandle,
    last_seen: Instant,
}

/// In-memory registry of live wizard sessions. Nothing survives a restart.
///
/// A browser tab that goes away never says so, so sessions not touched for
/// `idle_ttl` are evicted and disposed. A zero TTL keeps sessions until they
/// are deleted explicitly.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, TrackedSession>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_ttl,
        }
    }

    fn is_expired(&self, last_seen: Instant) -> bool {
        !self.idle_ttl.is_zero() && last_seen.elapsed() >= self.idle_ttl
    }

    pub async fn create(&self, config: &Config) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = SessionHandle::new(WizardSession::new(id, config.session_settings()));
        self.sessions.write().await.insert(
            id,
            TrackedSession {
                handle: handle.clone(),
                last_seen: Instant::now(),
            },
        );
        info!("Created session {id}");
        (id, handle)
    }

    /// Looks a session up and marks it as seen. A session that has already
    /// outlived its TTL is evicted here rather than handed out.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let tracked = sessions.get_mut(&id)?;
        if self.is_expired(tracked.last_seen) {
            let expired = sessions.remove(&id)?;
            drop(sessions);
            info!("Session {id} expired");
            expired.handle.with(|session| session.dispose()).await;
            return None;
        }
        tracked.last_seen = Instant::now();
        Some(tracked.handle.clone())
    }

    /// Removes and disposes a session. Returns `false` if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let Some(tracked) = self.sessions.write().await.remove(&id) else {
            return false;
        };
        tracked.handle.with(|session| session.dispose()).await;
        true
    }

    /// Disposes every session idle for longer than the TTL. Returns how many
    /// were evicted.
    pub async fn evict_idle(&self) -> usize {
        let expired: Vec<(Uuid, SessionHandle)> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, tracked)| self.is_expired(tracked.last_seen))
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|tracked| (id, tracked.handle)))
                .collect()
        };

        for (id, handle) in &expired {
            handle.with(|session| session.dispose()).await;
            debug!("Evicted idle session {id}");
        }
        if !expired.is_empty() {
            info!("Evicted {} idle session(s)", expired.len());
        }
        expired.len()
    }

    /// Starts the background sweep. Does nothing when the TTL is zero.
    pub fn spawn_idle_sweeper(&self) {
        if self.idle_ttl.is_zero() {
            return;
        }
        let store = self.clone();
        let period = self.idle_ttl.min(MAX_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                store.evict_idle().await;
            }
        });
    }
}
