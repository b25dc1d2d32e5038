use serde::{Deserialize, Serialize};

use super::Meta;

/// A named set of participants bound to a single scene. Identity and
/// equality are by `group_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "groupID")]
    pub group_id: String,
    #[serde(rename = "sceneID", default = "super::default_id_owned")]
    pub scene_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl Group {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            scene_id: super::DEFAULT_ID.to_string(),
            meta: None,
            etag: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.group_id == super::DEFAULT_ID
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id
    }
}
impl Eq for Group {}

impl PartialOrd for Group {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Group {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.group_id.cmp(&other.group_id)
    }
}
