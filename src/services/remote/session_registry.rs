//! Session Registry
//!
//! Identity → session map, filled once from the allow-list and guarded by a
//! single exclusive lock. The gateway holds the lock for the whole handling
//! of one update (dispatch decision plus reply or queue push), so dispatch
//! decisions never interleave.

use std::collections::HashMap;

use tokio::sync::{Mutex, MutexGuard};

use script_relay_core::{Identity, Session};

use super::allow_list::AllowList;

/// Sessions keyed by identity.
pub type SessionMap = HashMap<Identity, Session>;

/// Locked view of the registry.
pub type SessionGuard<'a> = MutexGuard<'a, SessionMap>;

/// Registry of per-identity sessions.
pub struct SessionRegistry {
    sessions: Mutex<SessionMap>,
}

impl SessionRegistry {
    /// One `Waiting` session per allowed identity. No sessions are ever
    /// added or removed afterwards.
    pub fn from_allow_list(allow_list: &AllowList) -> Self {
        let sessions = allow_list
            .iter()
            .map(|id| (id.clone(), Session::new(id.clone())))
            .collect();
        Self {
            sessions: Mutex::new(sessions),
        }
    }

    /// Acquire the registry lock.
    pub async fn lock(&self) -> SessionGuard<'_> {
        self.sessions.lock().await
    }

    /// Snapshot of one session.
    pub async fn lookup(&self, identity: &Identity) -> Option<Session> {
        self.sessions.lock().await.get(identity).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
