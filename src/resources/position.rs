use serde::{Deserialize, Serialize};

/// A logical layout target for controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasSize {
    Small,
    Medium,
    Large,
}

/// The placement of a control for one [`CanvasSize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPosition {
    pub canvas_size: CanvasSize,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
}
