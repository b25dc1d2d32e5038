use serde::{Deserialize, Serialize};

use super::Meta;

/// A connected viewer. Identity and equality are by `session_id`, which is
/// stable for the lifetime of a single connection (a viewer reconnecting
/// gets a new `session_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub level: i32,
    #[serde(rename = "lastInputAt", default)]
    pub last_input_at: i64,
    #[serde(rename = "connectedAt", default)]
    pub connected_at: i64,
    #[serde(default)]
    pub disabled: bool,
    #[serde(rename = "groupID", default = "super::default_id_owned")]
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.session_id == other.session_id
    }
}
impl Eq for Participant {}

impl PartialOrd for Participant {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Participant {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.session_id.cmp(&other.session_id)
    }
}
