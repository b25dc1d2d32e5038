//! Request/reply correlation over the wire: assigns ids, tracks pending
//! calls, and resolves or fails them as replies (or a connection loss)
//! arrive.
//!
//! A `HashMap<id, oneshot::Sender<..>>` guarded by one mutex, an atomic
//! counter for ids, and a dedicated writer task fed by an unbounded
//! channel so sends never contend with each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{oneshot, Mutex};

use crate::error::{CorrelatorError, ReplyError};
use crate::method::InteractiveMethod;
use crate::packet::{MethodPacket, PacketType, ReplyPacket};
use crate::throttle::BandwidthThrottle;
use crate::transport::Transport;

/// Default time budget for a single request/reply round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

type PendingMap = Mutex<HashMap<u32, oneshot::Sender<Result<Value, ReplyError>>>>;

/// Tracks in-flight requests and hands out ids.
pub struct RequestCorrelator {
    transport: Arc<dyn Transport>,
    pending: Arc<PendingMap>,
    next_id: AtomicU32,
    next_seq: AtomicU32,
    throttle: Arc<BandwidthThrottle>,
    request_timeout: Duration,
}

impl RequestCorrelator {
    pub fn new(transport: Arc<dyn Transport>, throttle: Arc<BandwidthThrottle>, request_timeout: Duration) -> Self {
        Self {
            transport,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU32::new(1),
            next_seq: AtomicU32::new(1),
            throttle,
            request_timeout,
        }
    }

    /// Sends `method`/`params` and waits for its reply, subject to the
    /// bandwidth throttle and the request timeout. `discard` marks a call
    /// whose reply (if any) the caller has already decided to ignore;
    /// the server is still told so it can skip work it knows is wasted.
    pub async fn call(
        &self,
        method: InteractiveMethod,
        params: Value,
        discard: bool,
    ) -> Result<Value, CorrelatorError> {
        let wire_method = method.as_wire_str().to_string();
        let id = self.allocate_id().await;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        let packet = MethodPacket {
            id,
            kind: PacketType::Method,
            method,
            params,
            discard,
            seq,
        };
        let encoded = crate::packet::encode_method(&packet)?;

        if !self.throttle.try_admit(&wire_method, encoded.len() as f64) {
            return Err(CorrelatorError::Throttled(wire_method));
        }

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        if let Err(err) = self.transport.send(encoded).await {
            self.pending.lock().await.remove(&id);
            return Err(CorrelatorError::ConnectionClosed {
                code: None,
                reason: err.to_string(),
            });
        }

        if discard {
            self.pending.lock().await.remove(&id);
            return Ok(Value::Null);
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(reply_error))) => Err(CorrelatorError::Reply(reply_error)),
            Ok(Err(_canceled)) => Err(CorrelatorError::ChannelClosed),
            Err(_elapsed) => {
                self.pending.lock().await.remove(&id);
                Err(CorrelatorError::NoReply(self.request_timeout))
            }
        }
    }

    /// Resolves (or fails) the pending entry matching `reply.id`, if any.
    /// Called from the reader task as replies arrive.
    pub async fn complete(&self, reply: ReplyPacket) {
        let mut pending = self.pending.lock().await;
        if let Some(sender) = pending.remove(&reply.id) {
            let outcome = match reply.error {
                Some(wire_error) => Err(ReplyError {
                    code: wire_error.code,
                    message: wire_error.message,
                    path: wire_error.path,
                }),
                None => Ok(reply.result.unwrap_or(Value::Null)),
            };
            let _ = sender.send(outcome);
        } else {
            tracing::warn!(id = reply.id, "reply for unknown or already-resolved request id");
        }
    }

    /// Fails every currently pending request with a connection-loss error.
    /// Called once when the transport reports it has closed.
    pub async fn fail_all(&self, code: Option<u16>, reason: String) {
        let mut pending = self.pending.lock().await;
        for (_, sender) in pending.drain() {
            let _ = sender.send(Err(ReplyError {
                code: code.map(i32::from).unwrap_or(-1),
                message: reason.clone(),
                path: None,
            }));
        }
    }

    /// Finds the first free slot starting at the current counter, wrapping
    /// on overflow rather than panicking — ids are scoped to one
    /// connection's lifetime and 2^32 concurrent-in-flight is never
    /// reached in practice, but the search still has to terminate safely.
    async fn allocate_id(&self) -> u32 {
        let pending = self.pending.lock().await;
        loop {
            let candidate = self.next_id.fetch_add(1, Ordering::Relaxed);
            if candidate != 0 && !pending.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}
