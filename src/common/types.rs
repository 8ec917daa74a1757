use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

// The history endpoint reports assistant turns as "assistant"; anything that
// is not "user" is shown as the assistant.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "user" { Role::User } else { Role::Ai })
    }
}

/// One chat turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: now_iso(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }
}

/// Snapshot persisted under the `chatHistory` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Epoch milliseconds of the last write.
    pub timestamp: i64,
    #[serde(rename = "aiRole", default)]
    pub ai_role: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// ISO-8601 UTC timestamp with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_role_from_server_history_reads_as_ai() {
        let raw = r#"[{"role":"user","content":"q","timestamp":"t"},
                      {"role":"assistant","content":"a","timestamp":"t"}]"#;
        let messages: Vec<ChatMessage> = serde_json::from_str(raw).unwrap();
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Ai);
        assert_eq!(
            serde_json::to_value(&messages[1]).unwrap()["role"],
            serde_json::json!("ai")
        );
    }

    #[test]
    fn cache_entry_uses_camel_case_role_key() {
        let entry = CacheEntry {
            messages: vec![],
            timestamp: 42,
            ai_role: Some("code_expert".into()),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["aiRole"], "code_expert");

        let parsed: CacheEntry = serde_json::from_str(r#"{"timestamp": 7}"#).unwrap();
        assert!(parsed.messages.is_empty());
        assert_eq!(parsed.ai_role, None);
    }

    #[test]
    fn theme_toggles_and_parses() {
        assert_eq!(Theme::default().toggled(), Theme::Dark);
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("sepia"), None);
    }
}
