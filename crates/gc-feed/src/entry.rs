use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One request-log row as reported by the gateway.
///
/// The feed cache relies on `id` alone for identity; every other field is
/// display payload that may change between head polls (e.g. a pending
/// request completing and getting its token counts filled in).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    /// Seconds since the UNIX epoch.
    #[serde(default)]
    pub created_at: i64,
    /// Log category as reported by the gateway (see [`LogEntry::kind_label`]).
    #[serde(default, rename = "type")]
    pub kind: i32,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token_name: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub completion_tokens: i64,
    /// Charge for this request, in the gateway's quota unit.
    #[serde(default)]
    pub quota: i64,
    /// Free-form detail line (error messages, admin notes).
    #[serde(default)]
    pub content: String,
}

impl LogEntry {
    /// Creation time in the viewer's timezone, if the timestamp is valid.
    pub fn created_local(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp(self.created_at, 0).map(|dt| dt.with_timezone(&Local))
    }

    /// Short label for the gateway's log category codes.
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            1 => "topup",
            2 => "consume",
            3 => "manage",
            4 => "system",
            5 => "error",
            _ => "unknown",
        }
    }
}
