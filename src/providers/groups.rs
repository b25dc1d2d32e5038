use std::sync::Arc;

use serde_json::json;

use crate::correlator::RequestCorrelator;
use crate::error::{CorrelatorError, ProviderError, ReplyError};
use crate::method::InteractiveMethod;
use crate::resources::{Group, DEFAULT_ID};

/// `createGroups` / `getGroups` / `updateGroups` / `deleteGroup`.
pub struct GroupService {
    correlator: Arc<RequestCorrelator>,
}

impl GroupService {
    pub fn new(correlator: Arc<RequestCorrelator>) -> Self {
        Self { correlator }
    }

    pub async fn get_groups(&self) -> Result<Vec<Group>, ProviderError> {
        let result = self
            .correlator
            .call(InteractiveMethod::GetGroups, json!({}), false)
            .await?;
        Ok(serde_json::from_value::<GroupsPayload>(result)?.groups)
    }

    pub async fn create(&self, groups: Vec<Group>) -> Result<Vec<Group>, ProviderError> {
        for group in &groups {
            if group.group_id.is_empty() {
                return Err(ProviderError::EmptyIdentifier);
            }
            if group.is_default() {
                return Err(ProviderError::DefaultReserved);
            }
        }
        let result = self
            .correlator
            .call(InteractiveMethod::CreateGroups, json!({ "groups": groups }), false)
            .await?;
        Ok(serde_json::from_value::<GroupsPayload>(result)?.groups)
    }

    /// An empty `sceneID` on any group is silently rewritten to `"default"`
    /// before the call goes out, rather than rejected: this mirrors a
    /// quirk of the server's own `updateGroups` handling that callers have
    /// come to depend on.
    pub async fn update(&self, mut groups: Vec<Group>) -> Result<Vec<Group>, ProviderError> {
        for group in &mut groups {
            if group.scene_id.is_empty() {
                group.scene_id = DEFAULT_ID.to_string();
            }
        }
        let result = self
            .correlator
            .call(InteractiveMethod::UpdateGroups, json!({ "groups": groups }), false)
            .await?;
        Ok(serde_json::from_value::<GroupsPayload>(result)?.groups)
    }

    /// Deletes `group_id`, reassigning its participants to
    /// `reassign_group_id` (defaulting to `"default"`). Mirrors
    /// [`crate::providers::SceneService::delete`]'s tie-breaks: deleting
    /// `"default"` is rejected with code `4018`, reassigning to the group
    /// being deleted with code `4010` — both surfaced as the same
    /// [`ReplyError`] shape the service itself would return, without
    /// reaching the wire.
    pub async fn delete(&self, group_id: &str, reassign_group_id: Option<&str>) -> Result<(), ProviderError> {
        if group_id == DEFAULT_ID {
            return Err(default_reserved_error());
        }
        let reassign = reassign_group_id.unwrap_or(DEFAULT_ID);
        if reassign == group_id {
            return Err(reassign_to_self_error());
        }
        self.correlator
            .call(
                InteractiveMethod::DeleteGroup,
                json!({ "groupID": group_id, "reassignGroupID": reassign }),
                false,
            )
            .await?;
        Ok(())
    }
}

fn default_reserved_error() -> ProviderError {
    ProviderError::Correlator(CorrelatorError::Reply(ReplyError {
        code: 4018,
        message: "cannot delete the default group".to_string(),
        path: None,
    }))
}

fn reassign_to_self_error() -> ProviderError {
    ProviderError::Correlator(CorrelatorError::Reply(ReplyError {
        code: 4010,
        message: "cannot reassign a deleted group's participants to the group being deleted".to_string(),
        path: None,
    }))
}

#[derive(serde::Deserialize)]
struct GroupsPayload {
    #[serde(default)]
    groups: Vec<Group>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throttle::BandwidthThrottle;
    use crate::transport::mock::MockTransport;
    use std::time::Duration;

    fn service() -> (GroupService, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let correlator = Arc::new(RequestCorrelator::new(
            transport.clone(),
            Arc::new(BandwidthThrottle::new()),
            Duration::from_millis(200),
        ));
        (GroupService::new(correlator), transport)
    }

    #[tokio::test]
    async fn deleting_the_default_group_is_rejected_locally() {
        let (service, transport) = service();
        let err = service.delete("default", None).await.unwrap_err();
        match err {
            ProviderError::Correlator(CorrelatorError::Reply(reply_error)) => {
                assert_eq!(reply_error.code, 4018);
            }
            other => panic!("expected a 4018 reply error, got {other:?}"),
        }
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reassigning_a_deleted_group_to_itself_is_rejected_locally() {
        let (service, transport) = service();
        let err = service.delete("squad-a", Some("squad-a")).await.unwrap_err();
        match err {
            ProviderError::Correlator(CorrelatorError::Reply(reply_error)) => {
                assert_eq!(reply_error.code, 4010);
            }
            other => panic!("expected a 4010 reply error, got {other:?}"),
        }
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn creating_a_group_named_default_is_rejected_locally() {
        let (service, _transport) = service();
        let err = service.create(vec![Group::new("default")]).await.unwrap_err();
        assert!(matches!(err, ProviderError::DefaultReserved));
    }

    #[tokio::test]
    async fn empty_scene_id_is_rewritten_to_default_on_update() {
        let (service, transport) = service();
        let mut group = Group::new("squad-a");
        group.scene_id = String::new();
        let _ = service.update(vec![group]).await;
        let sent = transport.sent.lock().unwrap();
        assert!(sent[0].contains("\"sceneID\":\"default\""));
    }
}
