use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::position::{CanvasSize, ControlPosition};
use super::Meta;

/// A UI element a participant can interact with. Kind-specific attributes
/// live in [`ControlAttributes`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    #[serde(rename = "controlID")]
    pub control_id: String,
    #[serde(rename = "sceneID")]
    pub scene_id: String,
    #[serde(flatten)]
    pub attributes: ControlAttributes,
    #[serde(default)]
    pub disabled: bool,
    /// At most one entry per [`CanvasSize`]; adding a position for an
    /// existing size replaces it, see [`Control::set_position`].
    #[serde(default, rename = "position")]
    pub positions: BTreeMap<CanvasSize, ControlPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl Control {
    pub fn new(control_id: impl Into<String>, scene_id: impl Into<String>, attributes: ControlAttributes) -> Self {
        Self {
            control_id: control_id.into(),
            scene_id: scene_id.into(),
            attributes,
            disabled: false,
            positions: BTreeMap::new(),
            meta: None,
            etag: None,
        }
    }

    /// Inserts `position`, replacing any existing entry for the same
    /// [`CanvasSize`] — at most one position per canvas size.
    pub fn set_position(&mut self, position: ControlPosition) {
        self.positions.insert(position.canvas_size, position);
    }

    pub fn kind(&self) -> ControlKindTag {
        self.attributes.kind()
    }
}

impl PartialEq for Control {
    fn eq(&self, other: &Self) -> bool {
        self.control_id == other.control_id
    }
}
impl Eq for Control {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKindTag {
    Button,
    Joystick,
    Label,
    Textbox,
}

/// Kind-specific attributes for a [`Control`], tagged on the wire by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ControlAttributes {
    Button {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key_code: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tooltip: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        progress: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cooldown: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background_color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background_image: Option<String>,
    },
    Joystick {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sample_rate: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        angle: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intensity: Option<f64>,
    },
    Label {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_size: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_color: Option<String>,
        #[serde(default)]
        bold: bool,
        #[serde(default)]
        italic: bool,
        #[serde(default)]
        underline: bool,
    },
    Textbox {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        submit_text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost: Option<i64>,
        #[serde(default)]
        has_submit: bool,
        #[serde(default)]
        multiline: bool,
    },
}

impl ControlAttributes {
    pub fn kind(&self) -> ControlKindTag {
        match self {
            Self::Button { .. } => ControlKindTag::Button,
            Self::Joystick { .. } => ControlKindTag::Joystick,
            Self::Label { .. } => ControlKindTag::Label,
            Self::Textbox { .. } => ControlKindTag::Textbox,
        }
    }
}

/// Convenience constructors mirroring the four wire kinds.
pub type ControlKind = ControlAttributes;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::position::CanvasSize;

    #[test]
    fn at_most_one_position_per_canvas_size() {
        let mut control = Control::new(
            "b1",
            "s1",
            ControlAttributes::Button {
                key_code: None,
                text: Some("Go".into()),
                tooltip: None,
                cost: None,
                progress: None,
                cooldown: None,
                background_color: None,
                text_color: None,
                border_color: None,
                background_image: None,
            },
        );
        control.set_position(ControlPosition {
            canvas_size: CanvasSize::Small,
            width: 10.0,
            height: 10.0,
            x: 0.0,
            y: 0.0,
        });
        control.set_position(ControlPosition {
            canvas_size: CanvasSize::Small,
            width: 20.0,
            height: 20.0,
            x: 1.0,
            y: 1.0,
        });
        assert_eq!(control.positions.len(), 1);
        assert_eq!(control.positions[&CanvasSize::Small].width, 20.0);
    }
}
