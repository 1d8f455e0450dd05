//! Bounded per-session conversation memory

use lru::LruCache;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use docsage_core::ConversationTurn;

/// Ordered turn logs keyed by session id.
///
/// Each log keeps at most `history_cap` turns, dropping the oldest on append.
/// At most `max_sessions` logs are kept; the least recently used session is
/// evicted whole when a new one would exceed that bound. Every operation holds
/// the store lock for its full duration, so an append is never lost to a
/// concurrent one.
pub struct ConversationMemory {
    sessions: Mutex<LruCache<String, VecDeque<ConversationTurn>>>,
    history_cap: usize,
}

impl ConversationMemory {
    pub fn new(history_cap: usize, max_sessions: usize) -> Self {
        let capacity = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            history_cap: history_cap.max(1),
        }
    }

    /// Generate a fresh opaque session id
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Full retained history, oldest first. Empty for unknown or absent sessions.
    pub fn history(&self, session_id: Option<&str>) -> Vec<ConversationTurn> {
        self.recent(session_id, self.history_cap)
    }

    /// The `n` most recent turns, oldest first
    pub fn recent(&self, session_id: Option<&str>, n: usize) -> Vec<ConversationTurn> {
        let Some(id) = non_empty(session_id) else {
            return Vec::new();
        };
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(id)
            .map(|turns| {
                let skip = turns.len().saturating_sub(n);
                turns.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    /// Append one turn. No-op without a session id.
    pub fn append(&self, session_id: Option<&str>, turn: ConversationTurn) {
        self.append_all(session_id, [turn]);
    }

    /// Append several turns under a single lock acquisition
    pub fn append_all(
        &self,
        session_id: Option<&str>,
        turns: impl IntoIterator<Item = ConversationTurn>,
    ) {
        let Some(id) = non_empty(session_id) else {
            return;
        };
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

        if !sessions.contains(id) && sessions.len() == sessions.cap().get() {
            if let Some((evicted, _)) = sessions.peek_lru() {
                debug!(session_id = %evicted, "evicting least recently used session");
            }
        }

        let log = sessions.get_or_insert_mut(id.to_string(), VecDeque::new);
        for turn in turns {
            log.push_back(turn);
            while log.len() > self.history_cap {
                log.pop_front();
            }
        }
    }

    /// Remove a session's whole log, returning whether it existed
    pub fn clear(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.pop(session_id).is_some()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn non_empty(session_id: Option<&str>) -> Option<&str> {
    session_id.filter(|id| !id.trim().is_empty())
}
