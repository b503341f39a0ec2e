use crate::{bookmarks::BookmarkSet, eid::Eid};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::errors::AppError;

/// One user's browsing session. Owns that user's bookmarks.
#[derive(Debug)]
pub struct Session {
    pub bookmarks: BookmarkSet,
    last_seen: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            bookmarks: BookmarkSet::new(),
            last_seen: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() >= ttl
    }
}

/// Sessions of a multi-user deployment, each isolated from the others.
///
/// A session ends when it is closed or when it has not been used for `ttl`;
/// either way its bookmarks are dropped.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Eid, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn create(&self) -> Eid {
        let id = Eid::new();
        let mut sessions = self.sessions.write().await;
        evict_expired(&mut sessions, self.ttl);
        sessions.insert(id.clone(), Session::new());
        log::debug!("created session {id}, {} open", sessions.len());
        id
    }

    /// Drop a session and its bookmarks.
    pub async fn remove(&self, id: &Eid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                log::debug!("closed session {id}");
                Ok(())
            }
            None => Err(AppError::SessionNotFound(id.clone())),
        }
    }

    /// Drop every idle session. Returns how many were dropped.
    pub async fn evict_expired(&self) -> usize {
        let evicted = evict_expired(&mut *self.sessions.write().await, self.ttl);
        if evicted > 0 {
            log::info!("expired {evicted} idle sessions, {} open", self.len().await);
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Copy of the session's bookmarks, for use outside the lock.
    pub async fn bookmarks(&self, id: &Eid) -> Result<BookmarkSet, AppError> {
        self.with_session(id, |session| session.bookmarks.clone())
            .await
    }

    /// Run `f` on a live session and mark it as used.
    pub async fn with_session<F, R>(&self, id: &Eid, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.write().await;

        let expired = sessions.get(id).is_some_and(|s| s.is_expired(self.ttl));
        if expired {
            sessions.remove(id);
            log::debug!("session {id} expired");
        }

        let session = sessions
            .get_mut(id)
            .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
        session.last_seen = Instant::now();
        Ok(f(session))
    }
}

fn evict_expired(sessions: &mut HashMap<Eid, Session>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired(ttl));
    before - sessions.len()
}
