//! A consuming builder for [`crate::client::GameClient`]: every
//! configuration method takes `self` by value and returns `Self`, so the
//! call chain reads top to bottom and a half-configured builder can never
//! be reused by accident.

use std::sync::Arc;
use std::time::Duration;

use crate::client::GameClient;
use crate::correlator::DEFAULT_REQUEST_TIMEOUT;
use crate::error::ClientError;
use crate::transport::{Transport, DEFAULT_CONNECT_TIMEOUT};

/// Builds a [`GameClient`]. Construct with [`GameClientBuilder::new`],
/// configure with the `with_*` methods, then call
/// [`GameClientBuilder::connect`].
pub struct GameClientBuilder {
    pub(crate) project_version_id: String,
    pub(crate) client_id: String,
    pub(crate) authorization: Option<String>,
    pub(crate) sharecode: Option<String>,
    pub(crate) discovery_url: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) connect_timeout: Duration,
    pub(crate) request_timeout: Duration,
    pub(crate) event_bus_capacity: usize,
    pub(crate) transport_override: Option<Arc<dyn Transport>>,
}

impl GameClientBuilder {
    /// `project_version_id` and `client_id` are required by every call the
    /// server accepts and can't be defaulted.
    pub fn new(project_version_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            project_version_id: project_version_id.into(),
            client_id: client_id.into(),
            authorization: None,
            sharecode: None,
            discovery_url: None,
            host: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            event_bus_capacity: 256,
            transport_override: None,
        }
    }

    pub fn authorization(mut self, token: impl Into<String>) -> Self {
        self.authorization = Some(token.into());
        self
    }

    /// Sets `X-Interactive-Sharecode`, sent during the WebSocket upgrade
    /// when the integration is joining via a shared session code rather
    /// than the project's own credentials.
    pub fn sharecode(mut self, sharecode: impl Into<String>) -> Self {
        self.sharecode = Some(sharecode.into());
        self
    }

    /// Overrides host discovery with a fixed host, skipping the discovery
    /// round trip entirely. Mutually exclusive with `discovery_url` in
    /// practice; when both are set, `host` wins.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn discovery_url(mut self, url: impl Into<String>) -> Self {
        self.discovery_url = Some(url.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The number of not-yet-dispatched events the event bus buffers per
    /// subscriber before a slow subscriber starts missing old events.
    pub fn event_bus_capacity(mut self, capacity: usize) -> Self {
        self.event_bus_capacity = capacity;
        self
    }

    /// Supplies a pre-built [`Transport`] instead of dialing a real
    /// WebSocket, skipping discovery and the connect timeout entirely.
    /// Intended for tests against [`crate::transport::mock::MockTransport`],
    /// but any `Transport` implementation works — the client is
    /// transport-agnostic by design.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport_override = Some(transport);
        self
    }

    /// Resolves a host (via `host` if set, else discovery), opens the
    /// WebSocket connection, and performs the `hello` handshake.
    pub async fn connect(self) -> Result<GameClient, ClientError> {
        if self.project_version_id.is_empty() || self.client_id.is_empty() {
            return Err(ClientError::InvalidConfig);
        }
        GameClient::connect(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chain_retains_every_configured_field() {
        let builder = GameClientBuilder::new("pv1", "client1")
            .authorization("token")
            .sharecode("abcd1234")
            .host("wss://example.test")
            .connect_timeout(Duration::from_secs(5))
            .request_timeout(Duration::from_secs(3))
            .event_bus_capacity(64);
        assert_eq!(builder.project_version_id, "pv1");
        assert_eq!(builder.client_id, "client1");
        assert_eq!(builder.authorization.as_deref(), Some("token"));
        assert_eq!(builder.sharecode.as_deref(), Some("abcd1234"));
        assert_eq!(builder.host.as_deref(), Some("wss://example.test"));
        assert_eq!(builder.connect_timeout, Duration::from_secs(5));
        assert_eq!(builder.request_timeout, Duration::from_secs(3));
        assert_eq!(builder.event_bus_capacity, 64);
    }
}
