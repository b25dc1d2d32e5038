use std::time::Duration;

use thiserror::Error;

/// Errors surfaced while encoding or decoding a wire frame.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("frame element had no recognizable `type` field")]
    MissingType,
    #[error("control kind `{0}` is not one of button/joystick/label/textbox")]
    UnknownControlKind(String),
}

/// Errors surfaced by host discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no hosts were returned by the discovery endpoint")]
    NoHostsFound,
    #[error("discovery request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("discovery response was not valid JSON: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Errors surfaced by the transport adapter.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid websocket URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("connect to `{url}` timed out after {timeout:?}")]
    ConnectTimeout { url: String, timeout: Duration },
    #[error("websocket handshake failed: {0}")]
    Handshake(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("invalid connect header value for `{name}`")]
    InvalidHeader { name: &'static str },
    #[error("websocket connection closed: code={code:?} reason={reason}")]
    Closed { code: Option<u16>, reason: String },
    #[error("websocket transport error: {0}")]
    Io(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("send channel to the writer task is closed")]
    WriterClosed,
}

/// The structured `{code, message, path}` error a reply packet may carry.
#[derive(Debug, Clone, Error)]
#[error("interactive service error {code}: {message}")]
pub struct ReplyError {
    pub code: i32,
    pub message: String,
    pub path: Option<String>,
}

/// Errors surfaced by the request correlator.
#[derive(Debug, Error)]
pub enum CorrelatorError {
    #[error("outbound admission rejected by the bandwidth throttle for method `{0}`")]
    Throttled(String),
    #[error(transparent)]
    Reply(#[from] ReplyError),
    #[error("no reply received within {0:?}")]
    NoReply(Duration),
    #[error("connection closed: code={code:?} reason={reason}")]
    ConnectionClosed { code: Option<u16>, reason: String },
    #[error("request was cancelled")]
    Cancelled,
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("correlator's pending-entry channel was dropped")]
    ChannelClosed,
}

/// Local preconditions enforced by the service providers before a request is
/// even sent.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("control `{0}` has no positions and would be rejected by the server")]
    PositionRequired(String),
    #[error("identifier must not be empty")]
    EmptyIdentifier,
    #[error("`default` cannot be created, deleted, or reassigned to itself")]
    DefaultReserved,
    #[error(transparent)]
    Correlator(#[from] CorrelatorError),
    #[error("failed to decode reply payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Top-level error type returned from the game client façade.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error(transparent)]
    Connection(#[from] TransportError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Correlator(#[from] CorrelatorError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("client is not connected")]
    NotConnected,
    #[error("project_version_id and client_id are required")]
    InvalidConfig,
}
