use chrono::Utc;

use crate::common::{CacheEntry, ChatMessage};

use super::kv_store::KeyValueStore;

pub const CHAT_HISTORY_KEY: &str = "chatHistory";

/// Entries older than this are dropped whole on the next read.
pub const FRESHNESS_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Fresh cache contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedHistory {
    pub messages: Vec<ChatMessage>,
    pub ai_role: Option<String>,
}

/// Local copy of the conversation kept ahead of the server history endpoint.
///
/// Storage failures never escape: they are logged and the entry is reset.
pub struct HistoryCache<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load(&self) -> Option<CachedHistory> {
        self.load_at(now_ms())
    }

    pub fn load_at(&self, now_ms: i64) -> Option<CachedHistory> {
        let raw = match self.store.get(CHAT_HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("Failed to read chat history from local storage: {err}");
                self.clear();
                return None;
            }
        };

        let entry = match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Discarding corrupt chat history cache: {err}");
                self.clear();
                return None;
            }
        };

        let Some(age) = now_ms.checked_sub(entry.timestamp) else {
            log::warn!(
                "Discarding chat history cache with unusable timestamp {}",
                entry.timestamp
            );
            self.clear();
            return None;
        };
        if age >= FRESHNESS_WINDOW_MS {
            self.clear();
            log::info!("Removed stale chat history from local storage");
            return None;
        }

        Some(CachedHistory {
            messages: entry.messages,
            ai_role: entry.ai_role,
        })
    }

    pub fn save(&self, messages: &[ChatMessage], ai_role: Option<&str>) {
        self.save_at(messages, ai_role, now_ms());
    }

    pub fn save_at(&self, messages: &[ChatMessage], ai_role: Option<&str>, now_ms: i64) {
        let entry = CacheEntry {
            messages: messages.to_vec(),
            timestamp: now_ms,
            ai_role: ai_role.map(str::to_string),
        };

        let result = serde_json::to_string(&entry)
            .map_err(|err| err.to_string())
            .and_then(|json| {
                self.store
                    .set(CHAT_HISTORY_KEY, &json)
                    .map_err(|err| err.to_string())
            });

        match result {
            Ok(()) => log::debug!("Saved {} messages to local storage", messages.len()),
            Err(err) => {
                log::warn!("Failed to save chat history to local storage: {err}");
                self.clear();
            }
        }
    }

    pub fn append(&self, message: ChatMessage, ai_role: Option<&str>) {
        self.append_at(message, ai_role, now_ms());
    }

    pub fn append_at(&self, message: ChatMessage, ai_role: Option<&str>, now_ms: i64) {
        let mut messages = self
            .load_at(now_ms)
            .map(|history| history.messages)
            .unwrap_or_default();
        messages.push(message);
        self.save_at(&messages, ai_role, now_ms);
    }

    pub fn clear(&self) {
        if let Err(err) = self.store.remove(CHAT_HISTORY_KEY) {
            log::warn!("Failed to remove chat history from local storage: {err}");
        }
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
