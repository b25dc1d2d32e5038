//! Async client runtime for the Interactive protocol.
//!
//! [`GameClient`] owns one WebSocket connection and exposes it as a set of
//! typed service providers ([`SceneService`], [`GroupService`],
//! [`ControlService`], [`ParticipantService`]) plus a subscribable event
//! bus ([`GameClient::event_bus`]) for server-pushed notifications and
//! participant input. Build one with [`GameClientBuilder`].

#![forbid(unsafe_code)]

mod builder;
mod client;
mod correlator;
mod discovery;
mod error;
mod events;
mod method;
mod packet;
mod providers;
mod resources;
mod state;
mod throttle;
mod transport;

pub use builder::GameClientBuilder;
pub use client::{GameClient, PROTOCOL_VERSION};
pub use error::{ClientError, CodecError, CorrelatorError, DiscoveryError, ProviderError, ReplyError, TransportError};
pub use events::{EventBus, InteractiveEvent};
pub use method::InteractiveMethod;
pub use providers::{ControlService, GroupService, ParticipantService, SceneService};
pub use resources::{
    CanvasSize, Control, ControlAttributes, ControlInput, ControlInputEvent, ControlKind, ControlPosition, Group,
    Participant, Scene, SyncIfEqual,
};
pub use state::{CompressionScheme, ConnectionPhase};
pub use throttle::{BandwidthThrottle, ThrottleState};
pub use transport::{ConnectHeaders, Transport, TransportEvent};

#[cfg(any(test, feature = "mock-transport"))]
pub use transport::mock::MockTransport;
