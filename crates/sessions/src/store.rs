//! In-memory session store.
//!
//! Process-local and thread-safe; nothing survives a restart. Sessions are
//! owned exclusively by the store — readers get snapshots, never references.

use std::collections::HashMap;

use parking_lot::RwLock;

use tw_domain::turn::{Session, TurnRecord};
use tw_domain::{Error, Result};

/// Thread-safe map of user id → session history.
pub struct SessionStore {
    max_history_turns: usize,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(max_history_turns: usize) -> Self {
        Self {
            max_history_turns: max_history_turns.max(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot a user's session; an empty one when the user is new.
    pub fn load(&self, user_id: &str) -> Session {
        self.sessions
            .read()
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Session::new(user_id))
    }

    /// Append a completed turn, trimming the history to its bound.
    ///
    /// Rejects a record whose `ts_in` precedes the last stored turn — within
    /// one session records are monotonically ordered.
    pub fn append(&self, user_id: &str, record: TurnRecord) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .entry(user_id.to_owned())
            .or_insert_with(|| Session::new(user_id));

        if let Some(last) = session.last() {
            if record.ts_in < last.ts_in {
                return Err(Error::Internal(format!(
                    "turn for {user_id} arrived out of order: {} < {}",
                    record.ts_in, last.ts_in
                )));
            }
        }

        session.append(record, self.max_history_turns);
        tracing::debug!(
            user_id,
            history = session.history.len(),
            "turn appended to session"
        );
        Ok(())
    }

    /// History length for a user.
    pub fn history_len(&self, user_id: &str) -> usize {
        self.sessions
            .read()
            .get(user_id)
            .map(|s| s.history.len())
            .unwrap_or(0)
    }

    /// Drop a user's session entirely.
    pub fn reset(&self, user_id: &str) {
        self.sessions.write().remove(user_id);
    }

    /// Number of tracked users.
    pub fn user_count(&self) -> usize {
        self.sessions.read().len()
    }
}
