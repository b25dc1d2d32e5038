//! The resource model: scenes, groups, controls, participants, and the
//! `sync_if_equal` reconciliation function that copies server-owned mutable
//! fields onto a caller's local copy without touching identity fields.

mod control;
mod group;
mod input;
mod participant;
mod position;
mod scene;
mod sync;

pub use control::{Control, ControlAttributes, ControlKind};
pub use group::Group;
pub use input::{ControlInput, ControlInputEvent};
pub use participant::Participant;
pub use position::{CanvasSize, ControlPosition};
pub use scene::Scene;
pub use sync::SyncIfEqual;

/// Identifier for the reserved default scene and default group.
pub const DEFAULT_ID: &str = "default";

pub(crate) fn default_id_owned() -> String {
    DEFAULT_ID.to_string()
}

pub(crate) type Meta = std::collections::BTreeMap<String, serde_json::Value>;
