use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque record identifier. The export tools emit both string and numeric
/// ids, so both survive normalization verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Integer(i64),
}

impl RecordId {
    /// Builds an id from a raw field value. Empty strings and non-scalar
    /// values yield no id; the record is skipped upstream.
    pub fn from_value(value: &Value) -> Option<RecordId> {
        match value {
            Value::String(s) if !s.is_empty() => Some(RecordId::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(RecordId::Integer),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Text(s) => write!(f, "{}", s),
            RecordId::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// One creator in canonical output shape. Derived fields (`email`, `price`,
/// `engagement`, `profile_url`) are best-effort; their absence is never an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRecord {
    pub identifier: RecordId,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement: Option<String>,
    pub follower_count: i64,
    pub profile_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_views: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub recent_items_count: u64,
}

/// Counters and records from one pipeline run. `duplicates` stays 0 unless a
/// dedup store was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub accepted: usize,
    pub filtered: usize,
    pub duplicates: usize,
    pub min_followers: i64,
    pub max_followers: i64,
    pub processed_records: Vec<CreatorRecord>,
}
