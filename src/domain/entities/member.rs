use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Party member entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub is_host: bool,
    /// Epoch milliseconds
    pub joined_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Member {
    pub fn new(id: String, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            is_host,
            joined_at: chrono::Utc::now().timestamp_millis(),
            avatar: None,
        }
    }

    /// Create the host member for a new party
    pub fn new_host(name: &str) -> Self {
        Self::new(Uuid::new_v4().to_string(), name.to_string(), true)
    }

    /// Create a guest member joining an existing party
    pub fn new_guest(name: &str) -> Self {
        Self::new(Uuid::new_v4().to_string(), name.to_string(), false)
    }
}
