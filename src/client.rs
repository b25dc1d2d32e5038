//! The game client façade: the single entry point that owns the
//! connection, the request correlator, the event bus, and the service
//! providers built on top of them.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;
use tokio::sync::broadcast;

use crate::builder::GameClientBuilder;
use crate::correlator::RequestCorrelator;
use crate::discovery;
use crate::error::ClientError;
use crate::events::{EventBus, InteractiveEvent};
use crate::method::InteractiveMethod;
use crate::packet::DecodedFrame;
use crate::providers::{ControlService, GroupService, ParticipantService, SceneService};
use crate::state::{CompressionScheme, ConnectionPhase, StateManager};
use crate::throttle::{BandwidthThrottle, ThrottleState};
use crate::transport::{ConnectHeaders, Transport, WebSocketTransport};

/// Wire protocol version this build speaks, sent as `X-Protocol-Version`
/// during the WebSocket upgrade.
pub const PROTOCOL_VERSION: &str = "2.0";

/// The async client runtime for the Interactive protocol. Cheaply cloned
/// (every field is an `Arc`); clones share one connection.
#[derive(Clone)]
pub struct GameClient {
    transport: Arc<dyn Transport>,
    correlator: Arc<RequestCorrelator>,
    throttle: Arc<BandwidthThrottle>,
    state: Arc<StateManager>,
    events: Arc<EventBus>,
    reader_task: Arc<tokio::task::JoinHandle<()>>,
    scenes: Arc<SceneService>,
    groups: Arc<GroupService>,
    controls: Arc<ControlService>,
    participants: Arc<ParticipantService>,
}

impl GameClient {
    pub(crate) async fn connect(builder: GameClientBuilder) -> Result<Self, ClientError> {
        let state = Arc::new(StateManager::new());
        state.set_phase(ConnectionPhase::Connecting);

        let transport: Arc<dyn Transport> = match builder.transport_override.clone() {
            Some(transport) => transport,
            None => {
                let host = match &builder.host {
                    Some(host) => host.clone(),
                    None => {
                        let discovery_url = builder
                            .discovery_url
                            .clone()
                            .ok_or(ClientError::InvalidConfig)?;
                        let http = reqwest::Client::new();
                        let hosts = discovery::discover_hosts(&http, &discovery_url).await?;
                        hosts
                            .into_iter()
                            .next()
                            .map(|candidate| candidate.address)
                            .ok_or(ClientError::Discovery(crate::error::DiscoveryError::NoHostsFound))?
                    }
                };

                let headers = ConnectHeaders {
                    authorization: builder.authorization.clone(),
                    x_protocol_version: PROTOCOL_VERSION.to_string(),
                    x_interactive_version: builder.project_version_id.clone(),
                    x_interactive_sharecode: builder.sharecode.clone(),
                };
                Arc::new(WebSocketTransport::connect(&host, headers, builder.connect_timeout).await?)
            }
        };
        state.set_phase(ConnectionPhase::Handshaking);

        let throttle = Arc::new(BandwidthThrottle::new());
        let correlator = Arc::new(RequestCorrelator::new(
            transport.clone(),
            throttle.clone(),
            builder.request_timeout,
        ));
        let events = Arc::new(EventBus::new(builder.event_bus_capacity));

        let reader_task = Arc::new(spawn_reader(transport.clone(), correlator.clone(), events.clone(), state.clone()));

        correlator
            .call(
                InteractiveMethod::Hello,
                json!({ "clientID": builder.client_id }),
                false,
            )
            .await
            .map_err(ClientError::Correlator)?;
        state.set_phase(ConnectionPhase::Established);

        Ok(Self {
            scenes: Arc::new(SceneService::new(correlator.clone())),
            groups: Arc::new(GroupService::new(correlator.clone())),
            controls: Arc::new(ControlService::new(correlator.clone())),
            participants: Arc::new(ParticipantService::new(correlator.clone())),
            transport,
            correlator,
            throttle,
            state,
            events,
            reader_task,
        })
    }

    pub fn scenes(&self) -> &SceneService {
        &self.scenes
    }

    pub fn groups(&self) -> &GroupService {
        &self.groups
    }

    pub fn controls(&self) -> &ControlService {
        &self.controls
    }

    pub fn participants(&self) -> &ParticipantService {
        &self.participants
    }

    /// Subscribes to server-pushed notifications and participant input.
    pub fn event_bus(&self) -> broadcast::Receiver<InteractiveEvent> {
        self.events.subscribe()
    }

    pub fn connection_phase(&self) -> ConnectionPhase {
        self.state.phase()
    }

    /// `getTime`: returns the server's current time estimate, refreshing
    /// the locally cached clock offset as a side effect. The offset is
    /// `serverTime - localTime`, sampled from the local wall clock at the
    /// moment the reply is received, so it absorbs however long the round
    /// trip itself took.
    pub async fn get_time(&self) -> Result<i64, ClientError> {
        let result = self
            .correlator
            .call(InteractiveMethod::GetTime, json!({}), false)
            .await
            .map_err(ClientError::Correlator)?;
        let local_now_ms = now_epoch_ms();
        let server_time_ms = result
            .get("time")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| ClientError::Correlator(crate::error::CorrelatorError::Codec(crate::error::CodecError::MissingType)))?;
        self.state.set_clock_offset_ms(server_time_ms - local_now_ms);
        Ok(server_time_ms)
    }

    /// `ready(true)`, the handshake that tells the server this integration
    /// is prepared to receive participants and input.
    pub async fn ready(&self) -> Result<(), ClientError> {
        self.participants.ready(true).await.map_err(ClientError::Provider)
    }

    pub async fn set_compression(&self, scheme: CompressionScheme) -> Result<(), ClientError> {
        if !scheme.is_supported() {
            return Err(ClientError::InvalidConfig);
        }
        self.correlator
            .call(
                InteractiveMethod::SetCompression,
                json!({ "scheme": scheme.as_wire_str() }),
                false,
            )
            .await
            .map_err(ClientError::Correlator)?;
        self.state.set_compression(scheme);
        Ok(())
    }

    pub async fn set_bandwidth_throttle(&self, method: &str, capacity: f64, refill_per_sec: f64) -> Result<(), ClientError> {
        self.correlator
            .call(
                InteractiveMethod::SetBandwidthThrottle,
                json!({ "method": method, "capacity": capacity, "refillPerSec": refill_per_sec }),
                false,
            )
            .await
            .map_err(ClientError::Correlator)?;
        self.throttle.set_bandwidth_throttle(method, capacity, refill_per_sec);
        Ok(())
    }

    /// The throttle state this client is enforcing locally, which mirrors
    /// what the server last pushed via `setBandwidthThrottle`.
    pub fn get_throttle_state(&self) -> std::collections::HashMap<String, ThrottleState> {
        self.throttle.get_throttle_state()
    }

    pub async fn get_memory_stats(&self) -> Result<serde_json::Value, ClientError> {
        self.correlator
            .call(InteractiveMethod::GetMemoryStats, json!({}), false)
            .await
            .map_err(ClientError::Correlator)
    }

    /// Gracefully closes the connection: fails any still-pending requests,
    /// closes the transport, and stops the reader task.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.state.set_phase(ConnectionPhase::Closing);
        self.transport.close().await?;
        self.correlator.fail_all(None, "client disconnected".to_string()).await;
        self.state.set_phase(ConnectionPhase::Disconnected);
        Ok(())
    }
}

impl Drop for GameClient {
    fn drop(&mut self) {
        // Only abort once the last clone is dropped; Arc makes that the
        // point where `strong_count` would otherwise go to zero anyway,
        // so this just ensures the reader task doesn't outlive every
        // handle to the client.
        if Arc::strong_count(&self.reader_task) == 1 {
            self.reader_task.abort();
        }
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn spawn_reader(
    transport: Arc<dyn Transport>,
    correlator: Arc<RequestCorrelator>,
    events: Arc<EventBus>,
    state: Arc<StateManager>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match transport.recv().await {
                Some(crate::transport::TransportEvent::Text(text)) => {
                    let frames = match crate::packet::decode_frame(&text) {
                        Ok(frames) => frames,
                        Err(err) => {
                            tracing::warn!(error = %err, "dropping unparseable frame");
                            continue;
                        }
                    };
                    for frame in frames {
                        match frame {
                            DecodedFrame::Reply(reply) => correlator.complete(reply).await,
                            DecodedFrame::Inbound(inbound) => events.publish_raw(inbound),
                        }
                    }
                }
                Some(crate::transport::TransportEvent::Closed { code, reason }) => {
                    state.set_phase(ConnectionPhase::Disconnected);
                    correlator.fail_all(code, reason).await;
                    break;
                }
                None => {
                    state.set_phase(ConnectionPhase::Disconnected);
                    correlator.fail_all(None, "transport stream ended".to_string()).await;
                    break;
                }
            }
        }
    })
}
