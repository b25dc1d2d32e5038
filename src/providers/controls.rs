use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use crate::correlator::RequestCorrelator;
use crate::error::ProviderError;
use crate::method::InteractiveMethod;
use crate::resources::Control;

use super::scenes::SceneService;

/// `createControls` / `updateControls` / `deleteControls`. Reads go
/// through [`SceneService::get_scenes`] and flatten each scene's
/// `controls`, since the wire protocol has no scene-spanning `getControls`
/// call of its own.
pub struct ControlService {
    correlator: Arc<RequestCorrelator>,
}

impl ControlService {
    pub fn new(correlator: Arc<RequestCorrelator>) -> Self {
        Self { correlator }
    }

    pub async fn get_controls(&self, scenes: &SceneService) -> Result<Vec<Control>, ProviderError> {
        Ok(scenes
            .get_scenes()
            .await?
            .into_iter()
            .flat_map(|scene| scene.controls)
            .collect())
    }

    /// Creates `controls`, grouped by `scene_id` into one `createControls`
    /// call per scene (the wire call is scene-scoped). Rejects up front,
    /// before any call is sent, if any control has no position: the
    /// server would reject it anyway and a partial multi-scene send would
    /// leave some scenes updated and others not.
    pub async fn create(&self, controls: Vec<Control>) -> Result<Vec<Control>, ProviderError> {
        for control in &controls {
            if control.positions.is_empty() {
                return Err(ProviderError::PositionRequired(control.control_id.clone()));
            }
        }

        let mut by_scene: BTreeMap<String, Vec<Control>> = BTreeMap::new();
        for control in controls {
            by_scene.entry(control.scene_id.clone()).or_default().push(control);
        }

        let mut created = Vec::new();
        for (scene_id, scene_controls) in by_scene {
            let result = self
                .correlator
                .call(
                    InteractiveMethod::CreateControls,
                    json!({ "sceneID": scene_id, "controls": scene_controls }),
                    false,
                )
                .await?;
            created.extend(serde_json::from_value::<ControlsPayload>(result)?.controls);
        }
        Ok(created)
    }

    pub async fn update(&self, controls: Vec<Control>) -> Result<Vec<Control>, ProviderError> {
        let mut by_scene: BTreeMap<String, Vec<Control>> = BTreeMap::new();
        for control in controls {
            by_scene.entry(control.scene_id.clone()).or_default().push(control);
        }

        let mut updated = Vec::new();
        for (scene_id, scene_controls) in by_scene {
            let result = self
                .correlator
                .call(
                    InteractiveMethod::UpdateControls,
                    json!({ "sceneID": scene_id, "controls": scene_controls }),
                    false,
                )
                .await?;
            updated.extend(serde_json::from_value::<ControlsPayload>(result)?.controls);
        }
        Ok(updated)
    }

    pub async fn delete(&self, scene_id: &str, control_ids: Vec<String>) -> Result<(), ProviderError> {
        self.correlator
            .call(
                InteractiveMethod::DeleteControls,
                json!({ "sceneID": scene_id, "controlIDs": control_ids }),
                false,
            )
            .await?;
        Ok(())
    }
}

#[derive(serde::Deserialize)]
struct ControlsPayload {
    #[serde(default)]
    controls: Vec<Control>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{CanvasSize, Control, ControlAttributes, ControlPosition};
    use crate::throttle::BandwidthThrottle;
    use crate::transport::mock::MockTransport;
    use std::time::Duration;

    fn service() -> (ControlService, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let correlator = Arc::new(RequestCorrelator::new(
            transport.clone(),
            Arc::new(BandwidthThrottle::new()),
            Duration::from_millis(200),
        ));
        (ControlService::new(correlator), transport)
    }

    fn label_control(id: &str, scene_id: &str) -> Control {
        Control::new(
            id,
            scene_id,
            ControlAttributes::Label {
                text: Some("hi".into()),
                text_size: None,
                text_color: None,
                bold: false,
                italic: false,
                underline: false,
            },
        )
    }

    #[tokio::test]
    async fn control_without_a_position_is_rejected_before_any_send() {
        let (service, transport) = service();
        let control = label_control("c1", "s1");
        let err = service.create(vec![control]).await.unwrap_err();
        assert!(matches!(err, ProviderError::PositionRequired(id) if id == "c1"));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_groups_controls_by_scene_into_separate_calls() {
        let (service, transport) = service();
        let mut a = label_control("c1", "s1");
        a.set_position(ControlPosition {
            canvas_size: CanvasSize::Small,
            width: 10.0,
            height: 10.0,
            x: 0.0,
            y: 0.0,
        });
        let mut b = label_control("c2", "s2");
        b.set_position(ControlPosition {
            canvas_size: CanvasSize::Small,
            width: 10.0,
            height: 10.0,
            x: 0.0,
            y: 0.0,
        });

        // Both calls time out (nothing replies), but each scene still gets
        // its own createControls frame on the wire.
        let _ = service.create(vec![a, b]).await;
        assert_eq!(transport.sent.lock().unwrap().len(), 2);
    }
}
