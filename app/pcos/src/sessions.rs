//! Server-side session storage keyed by the session cookie.

use std::collections::HashMap;
use std::time::Duration;

use pcos_form::Session;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct Slot {
    session: Session,
    last_seen: Instant,
}

/// Upper bound on live sessions held by [`SessionStore::new`].
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Sessions idle for longer than the TTL are dropped, which ends their
/// history. At capacity, a new session evicts the least recently seen one.
pub struct SessionStore {
    ttl: Duration,
    max_sessions: usize,
    slots: Mutex<HashMap<String, Slot>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_limit(ttl, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_limit(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            ttl,
            max_sessions: max_sessions.max(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Run one interaction against the session `id`, creating it if needed.
    ///
    /// The store stays locked for the duration of `step`, so requests for the
    /// same session are applied one after another.
    pub async fn interact<R>(&self, id: &str, step: impl FnOnce(Session) -> (Session, R)) -> R {
        let mut slots = self.slots.lock().await;
        let now = Instant::now();

        let before = slots.len();
        slots.retain(|_, slot| now.duration_since(slot.last_seen) <= self.ttl);
        let expired = before - slots.len();
        if expired > 0 {
            log::debug!("dropped {expired} idle session(s)");
        }

        let session = match slots.remove(id) {
            Some(slot) => slot.session,
            None => {
                if slots.len() >= self.max_sessions {
                    evict_oldest(&mut slots);
                }
                log::debug!("starting session {id}");
                Session::new()
            }
        };
        let (session, out) = step(session);
        slots.insert(
            id.to_string(),
            Slot {
                session,
                last_seen: now,
            },
        );
        out
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn evict_oldest(slots: &mut HashMap<String, Slot>) {
    let oldest = slots
        .iter()
        .min_by_key(|(_, slot)| slot.last_seen)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        slots.remove(&id);
        log::warn!("session limit reached, evicted {id}");
    }
}
