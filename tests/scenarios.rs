mod common;

use std::time::Duration;

use common::{connected_client, error_reply_json, method_json, reply_json};
use interactive_client::{ControlInputEvent, InteractiveEvent, Scene};
use serde_json::json;

#[tokio::test]
async fn happy_path_create_scene_round_trips_through_the_wire() {
    let (client, transport) = connected_client().await;

    let create = tokio::spawn({
        let client = client.clone();
        async move { client.scenes().create(vec![Scene::new("lobby")]).await }
    });

    while transport.sent.lock().unwrap().len() < 2 {
        tokio::task::yield_now().await;
    }
    transport.push_text(reply_json(2, json!({"scenes": [{"sceneID": "lobby"}]})));

    let created = create.await.unwrap().expect("create should succeed");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].scene_id, "lobby");
}

#[tokio::test]
async fn duplicate_scene_surfaces_as_a_reply_error() {
    let (client, transport) = connected_client().await;

    let create = tokio::spawn({
        let client = client.clone();
        async move { client.scenes().create(vec![Scene::new("lobby")]).await }
    });

    while transport.sent.lock().unwrap().len() < 2 {
        tokio::task::yield_now().await;
    }
    transport.push_text(error_reply_json(2, 4011, "a scene with that id already exists"));

    let err = create.await.unwrap().unwrap_err();
    match err {
        interactive_client::ProviderError::Correlator(interactive_client::CorrelatorError::Reply(reply)) => {
            assert_eq!(reply.code, 4011);
        }
        other => panic!("expected a duplicate-scene reply error, got {other:?}"),
    }
}

#[tokio::test]
async fn deleting_the_default_scene_never_reaches_the_wire() {
    let (client, transport) = connected_client().await;
    let sent_before = transport.sent.lock().unwrap().len();

    let err = client.scenes().delete("default", None).await.unwrap_err();
    match err {
        interactive_client::ProviderError::Correlator(interactive_client::CorrelatorError::Reply(reply)) => {
            assert_eq!(reply.code, 4018);
        }
        other => panic!("expected a 4018 reply error, got {other:?}"),
    }
    assert_eq!(transport.sent.lock().unwrap().len(), sent_before);
}

#[tokio::test]
async fn throttled_method_is_rejected_without_sending_a_frame() {
    let (client, transport) = connected_client().await;
    let sent_before = transport.sent.lock().unwrap().len();

    let set_throttle = tokio::spawn({
        let client = client.clone();
        async move { client.set_bandwidth_throttle("getTime", 0.0, 0.0).await }
    });
    while transport.sent.lock().unwrap().len() < sent_before + 1 {
        tokio::task::yield_now().await;
    }
    transport.push_text(reply_json(2, json!({})));
    set_throttle.await.unwrap().expect("setBandwidthThrottle should be acked");

    let result = client.get_time().await;
    assert!(result.is_err());
    // Exactly one new frame went out: the setBandwidthThrottle call
    // above. getTime itself was throttled locally before ever being sent.
    assert_eq!(transport.sent.lock().unwrap().len(), sent_before + 1);
}

#[tokio::test]
async fn connection_loss_fails_every_pending_request() {
    let (client, transport) = connected_client().await;

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.get_time().await }
    });

    while transport.sent.lock().unwrap().len() < 2 {
        tokio::task::yield_now().await;
    }
    transport.push_close(Some(1006), "abnormal closure");

    let err = call.await.unwrap().unwrap_err();
    assert!(matches!(err, interactive_client::ClientError::Correlator(_)));
    assert_eq!(client.connection_phase(), interactive_client::ConnectionPhase::Disconnected);
}

#[tokio::test]
async fn participant_input_is_dispatched_on_the_event_bus() {
    let (client, _transport) = connected_client().await;
    let mut events = client.event_bus();

    _transport.push_text(method_json(
        "giveInput",
        json!({"participantID": "p1", "controlID": "joy1", "event": "move", "x": 0.25, "y": -0.75}),
    ));

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("event should arrive within the timeout")
        .expect("event bus should not be closed");

    match event {
        InteractiveEvent::Input { participant_id, input } => {
            assert_eq!(participant_id, "p1");
            assert_eq!(input.control_id, "joy1");
            match input.event {
                ControlInputEvent::Move { x, y } => {
                    assert_eq!(x, 0.25);
                    assert_eq!(y, -0.75);
                }
                other => panic!("expected a move event, got {other:?}"),
            }
        }
        other => panic!("expected an Input event, got {other:?}"),
    }
}
