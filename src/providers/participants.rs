use std::sync::Arc;

use serde_json::json;

use crate::correlator::RequestCorrelator;
use crate::error::ProviderError;
use crate::method::InteractiveMethod;
use crate::resources::{Participant, DEFAULT_ID};

/// `getAllParticipants` / `getActiveParticipants` / `updateParticipants` /
/// `ready`.
pub struct ParticipantService {
    correlator: Arc<RequestCorrelator>,
}

impl ParticipantService {
    pub fn new(correlator: Arc<RequestCorrelator>) -> Self {
        Self { correlator }
    }

    pub async fn get_all(&self) -> Result<Vec<Participant>, ProviderError> {
        let result = self
            .correlator
            .call(InteractiveMethod::GetAllParticipants, json!({}), false)
            .await?;
        Ok(serde_json::from_value::<ParticipantsPayload>(result)?.participants)
    }

    /// Participants whose `last_input_at` is at or after `since_epoch_ms`.
    pub async fn get_active(&self, since_epoch_ms: i64) -> Result<Vec<Participant>, ProviderError> {
        let result = self
            .correlator
            .call(
                InteractiveMethod::GetActiveParticipants,
                json!({ "since": since_epoch_ms }),
                false,
            )
            .await?;
        Ok(serde_json::from_value::<ParticipantsPayload>(result)?.participants)
    }

    /// An empty `groupID` on any participant is silently rewritten to
    /// `"default"` before the call goes out, mirroring the same quirk
    /// [`crate::providers::GroupService::update`] preserves for scenes.
    pub async fn update(&self, mut participants: Vec<Participant>) -> Result<Vec<Participant>, ProviderError> {
        for participant in &mut participants {
            if participant.group_id.is_empty() {
                participant.group_id = DEFAULT_ID.to_string();
            }
        }
        let result = self
            .correlator
            .call(
                InteractiveMethod::UpdateParticipants,
                json!({ "participants": participants }),
                false,
            )
            .await?;
        Ok(serde_json::from_value::<ParticipantsPayload>(result)?.participants)
    }

    /// Tells the server the integration has finished its handshake and is
    /// ready to receive participants and input (or, with `is_ready =
    /// false`, that it is temporarily pausing input).
    pub async fn ready(&self, is_ready: bool) -> Result<(), ProviderError> {
        self.correlator
            .call(InteractiveMethod::Ready, json!({ "isReady": is_ready }), false)
            .await?;
        Ok(())
    }
}

#[derive(serde::Deserialize)]
struct ParticipantsPayload {
    #[serde(default)]
    participants: Vec<Participant>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throttle::BandwidthThrottle;
    use crate::transport::mock::MockTransport;
    use std::time::Duration;

    #[tokio::test]
    async fn ready_sends_the_flag_and_ignores_the_result_shape() {
        let transport = Arc::new(MockTransport::new());
        let correlator = Arc::new(RequestCorrelator::new(
            transport.clone(),
            Arc::new(BandwidthThrottle::new()),
            Duration::from_millis(50),
        ));
        let service = ParticipantService::new(correlator);
        let _ = service.ready(true).await;
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("\"isReady\":true"));
    }

    #[tokio::test]
    async fn empty_group_id_is_rewritten_to_default_on_update() {
        let transport = Arc::new(MockTransport::new());
        let correlator = Arc::new(RequestCorrelator::new(
            transport.clone(),
            Arc::new(BandwidthThrottle::new()),
            Duration::from_millis(50),
        ));
        let service = ParticipantService::new(correlator);
        let participant: Participant = serde_json::from_value(serde_json::json!({
            "sessionID": "s1", "userID": "u1", "username": "alice", "groupID": ""
        }))
        .unwrap();
        let _ = service.update(vec![participant]).await;
        let sent = transport.sent.lock().unwrap();
        assert!(sent[0].contains("\"groupID\":\"default\""));
    }
}
