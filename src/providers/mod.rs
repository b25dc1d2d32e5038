//! Service providers: thin, typed wrappers over [`crate::correlator::RequestCorrelator`]
//! that enforce the preconditions a well-behaved client checks before ever
//! putting a request on the wire (empty identifiers, the reserved
//! `"default"` scene/group, a control with no position).

mod controls;
mod groups;
mod participants;
mod scenes;

pub use controls::ControlService;
pub use groups::GroupService;
pub use participants::ParticipantService;
pub use scenes::SceneService;
