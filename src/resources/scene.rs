use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::control::Control;
use super::group::Group;
use super::Meta;

/// A named container of controls. Identity and equality are by `scene_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(rename = "sceneID")]
    pub scene_id: String,
    #[serde(default)]
    pub groups: BTreeSet<Group>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl Scene {
    pub fn new(scene_id: impl Into<String>) -> Self {
        Self {
            scene_id: scene_id.into(),
            groups: BTreeSet::new(),
            controls: Vec::new(),
            meta: None,
            etag: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.scene_id == super::DEFAULT_ID
    }
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.scene_id == other.scene_id
    }
}
impl Eq for Scene {}

impl PartialOrd for Scene {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Scene {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.scene_id.cmp(&other.scene_id)
    }
}
