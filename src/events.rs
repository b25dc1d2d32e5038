//! Fan-out for server-pushed notifications.
//!
//! Inbound `onXxx` methods (and `giveInput`) are decoded here and handed to
//! a dedicated dispatch task, never run inline on the transport's reader
//! task: a slow or panicking subscriber must not stall frame delivery or
//! the request correlator.

use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, mpsc};

use crate::method::InteractiveMethod;
use crate::packet::InboundMethodPacket;
use crate::resources::{ControlInput, Group, Participant, Scene};

/// A decoded server-pushed notification.
#[derive(Debug, Clone)]
pub enum InteractiveEvent {
    SceneCreate(Scene),
    SceneUpdate(Scene),
    SceneDelete { scene_id: String },
    GroupCreate(Group),
    GroupUpdate(Group),
    GroupDelete { group_id: String },
    ControlCreate(String, Vec<crate::resources::Control>),
    ControlUpdate(String, Vec<crate::resources::Control>),
    ControlDelete { scene_id: String, control_ids: Vec<String> },
    ParticipantJoin(Vec<Participant>),
    ParticipantLeave(Vec<Participant>),
    ParticipantUpdate(Vec<Participant>),
    Ready { is_ready: bool },
    Input { participant_id: String, input: ControlInput },
    IssueMemoryWarning,
    /// A method this build doesn't project into a typed variant; the raw
    /// params are retained so callers can still read it.
    Unrecognized { method: String, params: serde_json::Value },
}

/// Dispatches decoded [`InteractiveEvent`]s to any number of subscribers.
///
/// Backed by `tokio::sync::broadcast` rather than a `Vec` of per-sink
/// channels: every subscriber sees every event, and a lagging subscriber
/// only drops its own oldest events instead of blocking delivery to the
/// others.
pub struct EventBus {
    sender: broadcast::Sender<InteractiveEvent>,
    inbound_tx: mpsc::UnboundedSender<InboundMethodPacket>,
    dispatch_task: tokio::task::JoinHandle<()>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel::<InboundMethodPacket>();
        let dispatch_sender = sender.clone();

        let dispatch_task = tokio::spawn(async move {
            while let Some(packet) = inbound_rx.recv().await {
                let event = decode_event(packet);
                // No subscribers is a normal, not an error, state.
                let _ = dispatch_sender.send(event);
            }
        });

        Self {
            sender,
            inbound_tx,
            dispatch_task,
        }
    }

    /// Subscribes to every future event. Events emitted before the
    /// subscription are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<InteractiveEvent> {
        self.sender.subscribe()
    }

    /// Enqueues a decoded inbound frame for dispatch on the worker task.
    /// Called from the transport's reader loop; never blocks.
    pub fn publish_raw(&self, packet: InboundMethodPacket) {
        let _ = self.inbound_tx.send(packet);
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        self.dispatch_task.abort();
    }
}

fn decode_event(packet: InboundMethodPacket) -> InteractiveEvent {
    let method = packet.method.as_wire_str().to_string();
    match &packet.method {
        InteractiveMethod::OnSceneCreate => decode_one(packet.params, InteractiveEvent::SceneCreate, &method),
        InteractiveMethod::OnSceneUpdate => decode_one(packet.params, InteractiveEvent::SceneUpdate, &method),
        InteractiveMethod::OnSceneDelete => decode_field(packet.params, "sceneID", |scene_id| InteractiveEvent::SceneDelete { scene_id }, &method),
        InteractiveMethod::OnGroupCreate => decode_one(packet.params, InteractiveEvent::GroupCreate, &method),
        InteractiveMethod::OnGroupUpdate => decode_one(packet.params, InteractiveEvent::GroupUpdate, &method),
        InteractiveMethod::OnGroupDelete => decode_field(packet.params, "groupID", |group_id| InteractiveEvent::GroupDelete { group_id }, &method),
        InteractiveMethod::OnControlCreate => decode_control_batch(packet.params, InteractiveEvent::ControlCreate, "onControlCreate"),
        InteractiveMethod::OnControlUpdate => decode_control_batch(packet.params, InteractiveEvent::ControlUpdate, "onControlUpdate"),
        InteractiveMethod::OnControlDelete => decode_control_delete(packet.params),
        InteractiveMethod::OnParticipantJoin => decode_participants(packet.params, InteractiveEvent::ParticipantJoin, "onParticipantJoin"),
        InteractiveMethod::OnParticipantLeave => decode_participants(packet.params, InteractiveEvent::ParticipantLeave, "onParticipantLeave"),
        InteractiveMethod::OnParticipantUpdate => decode_participants(packet.params, InteractiveEvent::ParticipantUpdate, "onParticipantUpdate"),
        InteractiveMethod::OnReady => decode_field(packet.params, "isReady", |is_ready: bool| InteractiveEvent::Ready { is_ready }, "onReady"),
        InteractiveMethod::GiveInput => decode_input(packet.params),
        InteractiveMethod::IssueMemoryWarning => InteractiveEvent::IssueMemoryWarning,
        _ => InteractiveEvent::Unrecognized {
            method,
            params: packet.params,
        },
    }
}

fn decode_one<T: DeserializeOwned>(params: serde_json::Value, wrap: fn(T) -> InteractiveEvent, method: &str) -> InteractiveEvent {
    match serde_json::from_value(params.clone()) {
        Ok(value) => wrap(value),
        Err(err) => {
            tracing::warn!(%method, error = %err, "failed to decode event payload");
            InteractiveEvent::Unrecognized {
                method: method.to_string(),
                params,
            }
        }
    }
}

fn decode_field<T: DeserializeOwned>(
    params: serde_json::Value,
    field: &str,
    wrap: impl FnOnce(T) -> InteractiveEvent,
    method: &str,
) -> InteractiveEvent {
    match params.get(field).cloned().map(serde_json::from_value) {
        Some(Ok(value)) => wrap(value),
        _ => {
            tracing::warn!(%method, %field, "event payload missing or malformed field");
            InteractiveEvent::Unrecognized {
                method: method.to_string(),
                params,
            }
        }
    }
}

fn decode_control_batch(
    params: serde_json::Value,
    wrap: fn(String, Vec<crate::resources::Control>) -> InteractiveEvent,
    method: &str,
) -> InteractiveEvent {
    let scene_id = params.get("sceneID").and_then(serde_json::Value::as_str).map(str::to_string);
    let controls = params
        .get("controls")
        .cloned()
        .map(serde_json::from_value::<Vec<crate::resources::Control>>);
    match (scene_id, controls) {
        (Some(scene_id), Some(Ok(controls))) => wrap(scene_id, controls),
        _ => {
            tracing::warn!(%method, "control batch event missing sceneID or controls");
            InteractiveEvent::Unrecognized {
                method: method.to_string(),
                params,
            }
        }
    }
}

fn decode_control_delete(params: serde_json::Value) -> InteractiveEvent {
    let scene_id = params.get("sceneID").and_then(serde_json::Value::as_str).map(str::to_string);
    let control_ids = params
        .get("controlIDs")
        .cloned()
        .map(serde_json::from_value::<Vec<String>>);
    match (scene_id, control_ids) {
        (Some(scene_id), Some(Ok(control_ids))) => InteractiveEvent::ControlDelete { scene_id, control_ids },
        _ => {
            tracing::warn!("onControlDelete event missing sceneID or controlIDs");
            InteractiveEvent::Unrecognized {
                method: "onControlDelete".to_string(),
                params,
            }
        }
    }
}

fn decode_participants(
    params: serde_json::Value,
    wrap: fn(Vec<Participant>) -> InteractiveEvent,
    method: &str,
) -> InteractiveEvent {
    let participants = params
        .get("participants")
        .cloned()
        .map(serde_json::from_value::<Vec<Participant>>);
    match participants {
        Some(Ok(participants)) => wrap(participants),
        _ => {
            tracing::warn!(%method, "participant batch event missing or malformed participants");
            InteractiveEvent::Unrecognized {
                method: method.to_string(),
                params,
            }
        }
    }
}

fn decode_input(params: serde_json::Value) -> InteractiveEvent {
    let participant_id = params
        .get("participantID")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    let input = serde_json::from_value::<ControlInput>(params.clone());
    match (participant_id, input) {
        (Some(participant_id), Ok(input)) => InteractiveEvent::Input { participant_id, input },
        _ => {
            tracing::warn!("giveInput event missing participantID or malformed input");
            InteractiveEvent::Unrecognized {
                method: "giveInput".to_string(),
                params,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn packet(method: InteractiveMethod, params: serde_json::Value) -> InboundMethodPacket {
        InboundMethodPacket {
            id: None,
            method,
            params,
            discard: false,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_dispatched_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        bus.publish_raw(packet(InteractiveMethod::OnReady, json!({"isReady": true})));
        let event = rx.recv().await.unwrap();
        matches!(event, InteractiveEvent::Ready { is_ready: true });
    }

    #[tokio::test]
    async fn unrecognized_method_becomes_unrecognized_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        bus.publish_raw(packet(InteractiveMethod::Unknown("onSomethingNew".into()), json!({})));
        let event = rx.recv().await.unwrap();
        match event {
            InteractiveEvent::Unrecognized { method, .. } => assert_eq!(method, "onSomethingNew"),
            other => panic!("expected Unrecognized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_payload_becomes_unrecognized_not_a_panic() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        bus.publish_raw(packet(InteractiveMethod::OnSceneDelete, json!({"wrongField": 1})));
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, InteractiveEvent::Unrecognized { .. }));
    }
}
