//! Per-user conversation state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// Where a user currently is in a multi-step dialogue, carrying the
/// partially-built expense across turns.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingExpenseCategory,
    AwaitingExpenseAmount {
        category_id: i64,
    },
    AwaitingExpenseNote {
        category_id: i64,
        amount: f64,
    },
    AwaitingNewCategoryName,
    AwaitingNewCategoryLimit {
        name: String,
    },
    AwaitingLimitTargetCategory,
    AwaitingLimitValue {
        category_id: i64,
    },
    AwaitingDeleteConfirmation,
}

struct SessionEntry {
    state: Arc<Mutex<ConversationState>>,
    last_seen: Instant,
}

/// Lazily-created per-user dialogue sessions.
///
/// The handler locks a user's slot for the whole turn, so messages from the
/// same user are processed strictly one at a time while different users
/// proceed independently.
pub struct SessionStore {
    sessions: std::sync::Mutex<HashMap<i64, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// The user's state slot, created at `Idle` on first interaction.
    pub fn get_or_create(&self, user_id: i64) -> Arc<Mutex<ConversationState>> {
        let mut sessions = self.sessions.lock().unwrap();
        let entry = sessions.entry(user_id).or_insert_with(|| SessionEntry {
            state: Arc::new(Mutex::new(ConversationState::Idle)),
            last_seen: Instant::now(),
        });
        entry.last_seen = Instant::now();
        entry.state.clone()
    }

    /// Drop sessions idle for longer than `ttl`. An evicted mid-flow
    /// session is simply abandoned; the next interaction starts over at
    /// `Idle`. Returns how many entries were removed.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {evicted} idle session(s)");
        }
        evicted
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
