//! In-memory session store: a map of per-session mutexes.
//!
//! The map lock is only held for lookups and membership changes. All
//! per-session mutation goes through the session's own mutex, so work on
//! different sessions never contends beyond the map lookup.
//!
//! A session is in use while anyone outside the map holds its handle or its
//! lock. The manager keeps its handle across model calls, so eviction and
//! expiry never drop a session with a call in flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::interview::models::Session;

pub type SessionHandle = Arc<Mutex<Session>>;

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Adds a session, evicting the least-recently-active idle session when full.
    pub async fn insert(&self, session: Session) -> Uuid {
        let id = session.id;
        let evicted = {
            let mut sessions = self.sessions.write().await;
            let evicted = if sessions.len() >= self.max_sessions {
                evict_least_recent(&mut sessions)
            } else {
                None
            };
            sessions.insert(id, Arc::new(Mutex::new(session)));
            evicted
        };

        if let Some((evicted_id, handle)) = evicted {
            info!("Session store full, evicted least recently active session {evicted_id}");
            handle.lock().await.release_upload();
        }
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Removes a session and deletes its upload. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(handle) => {
                handle.lock().await.release_upload();
                true
            }
            None => false,
        }
    }

    /// Removes every session idle for longer than `ttl`. Sessions whose lock is
    /// currently held are in use and are skipped.
    pub async fn remove_idle(&self, ttl: Duration) -> Vec<Uuid> {
        let now = Utc::now();
        let expired: Vec<(Uuid, SessionHandle)> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter_map(|(id, handle)| {
                    if is_shared(handle) {
                        return None;
                    }
                    let session = handle.try_lock().ok()?;
                    let idle = (now - session.last_activity).to_std().ok()?;
                    (idle > ttl).then_some(*id)
                })
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|handle| (id, handle)))
                .collect()
        };

        for (_, handle) in &expired {
            handle.lock().await.release_upload();
        }
        expired.into_iter().map(|(id, _)| id).collect()
    }

    /// Removes every session. Used on shutdown so no upload outlives the process.
    pub async fn drain(&self) -> usize {
        let drained: Vec<SessionHandle> = {
            let mut sessions = self.sessions.write().await;
            sessions.drain().map(|(_, handle)| handle).collect()
        };
        for handle in &drained {
            handle.lock().await.release_upload();
        }
        drained.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Called with the map's write lock held, so no new handle can be handed out
/// while the count is read.
fn is_shared(handle: &SessionHandle) -> bool {
    Arc::strong_count(handle) > 1
}

fn evict_least_recent(
    sessions: &mut HashMap<Uuid, SessionHandle>,
) -> Option<(Uuid, SessionHandle)> {
    let victim = sessions
        .iter()
        .filter_map(|(id, handle)| {
            if is_shared(handle) {
                return None;
            }
            let session = handle.try_lock().ok()?;
            Some((*id, session.last_activity))
        })
        .min_by_key(|(_, last_activity)| *last_activity)
        .map(|(id, _)| id);

    match victim {
        Some(id) => sessions.remove(&id).map(|handle| (id, handle)),
        None => {
            warn!("Session store full but every session is busy; growing past capacity");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn session(text: &str) -> Session {
        Session::new(text.to_string(), None)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = SessionStore::new(10);
        let id = store.insert(session("resume")).await;

        let handle = store.get(id).await.unwrap();
        assert_eq!(handle.lock().await.resume_text, "resume");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = SessionStore::new(10);
        let id = store.insert(session("resume")).await;

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_deletes_upload() {
        let store = SessionStore::new(10);
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let id = store
            .insert(Session::new("resume".to_string(), Some(file)))
            .await;

        assert!(path.exists());
        store.remove(id).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_active() {
        let store = SessionStore::new(2);
        let oldest = store.insert(session("a")).await;
        let newer = store.insert(session("b")).await;

        store.get(oldest).await.unwrap().lock().await.last_activity =
            Utc::now() - chrono::Duration::minutes(10);

        let newest = store.insert(session("c")).await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(oldest).await.is_none());
        assert!(store.get(newer).await.is_some());
        assert!(store.get(newest).await.is_some());
    }

    #[tokio::test]
    async fn test_capacity_skips_busy_sessions() {
        let store = SessionStore::new(1);
        let busy = store.insert(session("a")).await;
        let handle = store.get(busy).await.unwrap();
        let _guard = handle.lock().await;

        let second = store.insert(session("b")).await;

        assert!(store.get(busy).await.is_some());
        assert!(store.get(second).await.is_some());
    }

    #[tokio::test]
    async fn test_capacity_skips_sessions_with_outstanding_handles() {
        let store = SessionStore::new(1);
        let held = store.insert(session("a")).await;
        let _handle = store.get(held).await.unwrap();

        let second = store.insert(session("b")).await;

        assert!(store.get(held).await.is_some());
        assert!(store.get(second).await.is_some());
    }

    #[tokio::test]
    async fn test_remove_idle_skips_sessions_with_outstanding_handles() {
        let store = SessionStore::new(10);
        let id = store.insert(session("stale")).await;
        let handle = store.get(id).await.unwrap();
        handle.lock().await.last_activity = Utc::now() - chrono::Duration::hours(2);

        assert!(store.remove_idle(Duration::from_secs(3600)).await.is_empty());

        drop(handle);
        assert_eq!(store.remove_idle(Duration::from_secs(3600)).await, vec![id]);
    }

    #[tokio::test]
    async fn test_remove_idle_only_removes_expired() {
        let store = SessionStore::new(10);
        let stale = store.insert(session("stale")).await;
        let fresh = store.insert(session("fresh")).await;

        store.get(stale).await.unwrap().lock().await.last_activity =
            Utc::now() - chrono::Duration::hours(2);

        let removed = store.remove_idle(Duration::from_secs(3600)).await;

        assert_eq!(removed, vec![stale]);
        assert!(store.get(stale).await.is_none());
        assert!(store.get(fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_drain_empties_store_and_deletes_uploads() {
        let store = SessionStore::new(10);
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        store
            .insert(Session::new("a".to_string(), Some(file)))
            .await;
        store.insert(session("b")).await;

        assert_eq!(store.drain().await, 2);
        assert_eq!(store.len().await, 0);
        assert!(!path.exists());
    }
}
