//! The abstract duplex channel the correlator and event bus run over, and
//! the WebSocket implementation used in production.
//!
//! Modeled on a stdio JSON-RPC transport: one dedicated task owns the
//! socket write half and serializes every outbound frame through an
//! `mpsc::unbounded_channel`, so no mutex is needed around the writer.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::TransportError;

/// Default time budget for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// A single inbound event off the wire: either a text frame or notice that
/// the remote end closed the connection.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Text(String),
    Closed { code: Option<u16>, reason: String },
}

/// The duplex channel the rest of the client runs over. Swappable for
/// tests via [`crate::transport::mock::MockTransport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one text frame.
    async fn send(&self, text: String) -> Result<(), TransportError>;

    /// Receives the next inbound event, or `None` once the stream is
    /// exhausted and no further events will arrive. Takes `&self` (not
    /// `&mut self`) so the transport can live behind a single `Arc` shared
    /// between the correlator's sender and the client's reader loop; only
    /// one caller is expected to actually poll this at a time.
    async fn recv(&self) -> Option<TransportEvent>;

    /// Closes the connection, if it is not already closed.
    async fn close(&self) -> Result<(), TransportError>;
}

/// Headers sent during the WebSocket upgrade request.
#[derive(Debug, Clone)]
pub struct ConnectHeaders {
    /// The bearer token, unframed. `connect` wraps it as
    /// `Bearer <token>` unless it already starts with `XBL3.0`, in which
    /// case it is sent as-is.
    pub authorization: Option<String>,
    pub x_protocol_version: String,
    pub x_interactive_version: String,
    pub x_interactive_sharecode: Option<String>,
}

fn authorization_header_value(token: &str) -> String {
    if token.starts_with("XBL3.0") {
        token.to_string()
    } else {
        format!("Bearer {token}")
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Production transport over `tokio-tungstenite`.
pub struct WebSocketTransport {
    writer: mpsc::UnboundedSender<Message>,
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<TransportEvent>>,
    writer_task: tokio::task::JoinHandle<()>,
    reader_task: tokio::task::JoinHandle<()>,
}

impl WebSocketTransport {
    /// Connects to `url`, sending `headers` during the upgrade, bounded by
    /// `connect_timeout`.
    pub async fn connect(
        url: &str,
        headers: ConnectHeaders,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut request = url
            .into_client_request()
            .map_err(|source| TransportError::InvalidUrl {
                url: url.to_string(),
                source,
            })?;
        {
            let request_headers = request.headers_mut();
            if let Some(auth) = &headers.authorization {
                request_headers.insert(
                    "Authorization",
                    authorization_header_value(auth)
                        .parse()
                        .map_err(|_| TransportError::InvalidHeader { name: "Authorization" })?,
                );
            }
            request_headers.insert(
                "X-Protocol-Version",
                headers
                    .x_protocol_version
                    .parse()
                    .map_err(|_| TransportError::InvalidHeader { name: "X-Protocol-Version" })?,
            );
            request_headers.insert(
                "X-Interactive-Version",
                headers
                    .x_interactive_version
                    .parse()
                    .map_err(|_| TransportError::InvalidHeader { name: "X-Interactive-Version" })?,
            );
            if let Some(sharecode) = &headers.x_interactive_sharecode {
                request_headers.insert(
                    "X-Interactive-Sharecode",
                    sharecode
                        .parse()
                        .map_err(|_| TransportError::InvalidHeader { name: "X-Interactive-Sharecode" })?,
                );
            }
        }

        let connect_future = tokio_tungstenite::connect_async(request);
        let (stream, _response) = tokio::time::timeout(connect_timeout, connect_future)
            .await
            .map_err(|_| TransportError::ConnectTimeout {
                url: url.to_string(),
                timeout: connect_timeout,
            })?
            .map_err(TransportError::Handshake)?;

        Ok(Self::from_stream(stream))
    }

    fn from_stream(stream: WsStream) -> Self {
        let (sink, mut source) = stream.split();
        let (writer_tx, mut writer_rx) = mpsc::unbounded_channel::<Message>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<TransportEvent>();

        let mut sink = sink;
        let writer_task = tokio::spawn(async move {
            while let Some(message) = writer_rx.recv().await {
                if let Err(err) = sink.send(message).await {
                    tracing::warn!(error = %err, "websocket write failed, writer task exiting");
                    break;
                }
            }
        });

        let reader_task = tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if inbound_tx.send(TransportEvent::Text(text.to_string())).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        let _ = inbound_tx.send(close_event(frame));
                        break;
                    }
                    Ok(_) => continue,
                    Err(err) => {
                        tracing::warn!(error = %err, "websocket read failed");
                        let _ = inbound_tx.send(TransportEvent::Closed {
                            code: None,
                            reason: err.to_string(),
                        });
                        break;
                    }
                }
            }
        });

        Self {
            writer: writer_tx,
            inbound: tokio::sync::Mutex::new(inbound_rx),
            writer_task,
            reader_task,
        }
    }
}

fn close_event(frame: Option<CloseFrame>) -> TransportEvent {
    match frame {
        Some(frame) => TransportEvent::Closed {
            code: Some(frame.code.into()),
            reason: frame.reason.to_string(),
        },
        None => TransportEvent::Closed {
            code: None,
            reason: String::new(),
        },
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&self, text: String) -> Result<(), TransportError> {
        self.writer
            .send(Message::Text(text.into()))
            .map_err(|_| TransportError::WriterClosed)
    }

    async fn recv(&self) -> Option<TransportEvent> {
        self.inbound.lock().await.recv().await
    }

    async fn close(&self) -> Result<(), TransportError> {
        let _ = self.writer.send(Message::Close(None));
        Ok(())
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.writer_task.abort();
        self.reader_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_token_is_wrapped_as_bearer() {
        assert_eq!(authorization_header_value("abc123"), "Bearer abc123");
    }

    #[test]
    fn xbl_token_is_sent_raw() {
        assert_eq!(authorization_header_value("XBL3.0 x=...;y=..."), "XBL3.0 x=...;y=...");
    }
}

#[cfg(any(test, feature = "mock-transport"))]
pub mod mock {
    //! An in-memory [`Transport`] for tests, mirroring the harness pattern
    //! used against the other reference transport-agnostic clients in this
    //! ecosystem: a queue of canned inbound frames plus a record of what
    //! was sent. Backed by an unbounded channel rather than a plain
    //! `VecDeque` so `recv` waits for a frame that hasn't been pushed yet
    //! instead of treating "nothing queued right now" as end-of-stream;
    //! only dropping the last sender (or an explicit `push_close`) ends
    //! the reader loop.
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::{Transport, TransportEvent};
    use crate::error::TransportError;

    pub struct MockTransport {
        incoming_tx: mpsc::UnboundedSender<TransportEvent>,
        incoming_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<TransportEvent>>,
        pub sent: Arc<Mutex<Vec<String>>>,
        closed: Arc<AtomicBool>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
            Self {
                incoming_tx,
                incoming_rx: tokio::sync::Mutex::new(incoming_rx),
                sent: Arc::new(Mutex::new(Vec::new())),
                closed: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn push_text(&self, text: impl Into<String>) {
            let _ = self.incoming_tx.send(TransportEvent::Text(text.into()));
        }

        pub fn push_close(&self, code: Option<u16>, reason: impl Into<String>) {
            let _ = self.incoming_tx.send(TransportEvent::Closed {
                code,
                reason: reason.into(),
            });
        }

        pub fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, text: String) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(text);
            Ok(())
        }

        async fn recv(&self) -> Option<TransportEvent> {
            self.incoming_rx.lock().await.recv().await
        }

        async fn close(&self) -> Result<(), TransportError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}
