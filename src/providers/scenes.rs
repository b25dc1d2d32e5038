use std::sync::Arc;

use serde_json::json;

use crate::correlator::RequestCorrelator;
use crate::error::{CorrelatorError, ProviderError, ReplyError};
use crate::method::InteractiveMethod;
use crate::resources::{Scene, DEFAULT_ID};

/// `createScenes` / `getScenes` / `updateScenes` / `deleteScene`.
pub struct SceneService {
    correlator: Arc<RequestCorrelator>,
}

impl SceneService {
    pub fn new(correlator: Arc<RequestCorrelator>) -> Self {
        Self { correlator }
    }

    pub async fn get_scenes(&self) -> Result<Vec<Scene>, ProviderError> {
        let result = self
            .correlator
            .call(InteractiveMethod::GetScenes, json!({}), false)
            .await?;
        Ok(serde_json::from_value::<ScenesPayload>(result)?.scenes)
    }

    pub async fn create(&self, scenes: Vec<Scene>) -> Result<Vec<Scene>, ProviderError> {
        for scene in &scenes {
            if scene.scene_id.is_empty() {
                return Err(ProviderError::EmptyIdentifier);
            }
            if scene.is_default() {
                return Err(ProviderError::DefaultReserved);
            }
        }
        let result = self
            .correlator
            .call(InteractiveMethod::CreateScenes, json!({ "scenes": scenes }), false)
            .await?;
        Ok(serde_json::from_value::<ScenesPayload>(result)?.scenes)
    }

    pub async fn update(&self, scenes: Vec<Scene>) -> Result<Vec<Scene>, ProviderError> {
        let result = self
            .correlator
            .call(InteractiveMethod::UpdateScenes, json!({ "scenes": scenes }), false)
            .await?;
        Ok(serde_json::from_value::<ScenesPayload>(result)?.scenes)
    }

    /// Deletes `scene_id`, reassigning its groups and controls to
    /// `reassign_scene_id` (defaulting to `"default"` when `None`). Two
    /// cases are rejected before ever reaching the wire, each surfaced as
    /// the same [`ReplyError`] shape the service itself would return:
    /// deleting `"default"` (code `4018`), and reassigning a scene's
    /// contents to the scene being deleted (code `4010`).
    pub async fn delete(&self, scene_id: &str, reassign_scene_id: Option<&str>) -> Result<(), ProviderError> {
        if scene_id == DEFAULT_ID {
            return Err(default_reserved_error());
        }
        let reassign = reassign_scene_id.unwrap_or(DEFAULT_ID);
        if reassign == scene_id {
            return Err(reassign_to_self_error());
        }
        self.correlator
            .call(
                InteractiveMethod::DeleteScene,
                json!({ "sceneID": scene_id, "reassignSceneID": reassign }),
                false,
            )
            .await?;
        Ok(())
    }
}

#[derive(serde::Deserialize)]
struct ScenesPayload {
    #[serde(default)]
    scenes: Vec<Scene>,
}

fn default_reserved_error() -> ProviderError {
    ProviderError::Correlator(CorrelatorError::Reply(ReplyError {
        code: 4018,
        message: "cannot delete the default scene".to_string(),
        path: None,
    }))
}

fn reassign_to_self_error() -> ProviderError {
    ProviderError::Correlator(CorrelatorError::Reply(ReplyError {
        code: 4010,
        message: "cannot reassign a deleted scene's contents to the scene being deleted".to_string(),
        path: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Scene;
    use crate::throttle::BandwidthThrottle;
    use crate::transport::mock::MockTransport;
    use std::time::Duration;

    fn service() -> (SceneService, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let correlator = Arc::new(RequestCorrelator::new(
            transport.clone(),
            Arc::new(BandwidthThrottle::new()),
            Duration::from_millis(200),
        ));
        (SceneService::new(correlator), transport)
    }

    #[tokio::test]
    async fn creating_the_default_scene_is_rejected_locally() {
        let (service, transport) = service();
        let err = service.create(vec![Scene::new("default")]).await.unwrap_err();
        assert!(matches!(err, ProviderError::DefaultReserved));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_the_default_scene_is_rejected_locally() {
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
    async fn reassigning_a_deleted_scene_to_itself_is_rejected_locally() {
        let (service, transport) = service();
        let err = service.delete("arena", Some("arena")).await.unwrap_err();
        match err {
            ProviderError::Correlator(CorrelatorError::Reply(reply_error)) => {
                assert_eq!(reply_error.code, 4010);
            }
            other => panic!("expected a 4010 reply error, got {other:?}"),
        }
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_scene_id_is_rejected_locally() {
        let (service, _transport) = service();
        let err = service.create(vec![Scene::new("")]).await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyIdentifier));
    }
}
