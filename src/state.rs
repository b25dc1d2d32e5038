//! Connection lifecycle, server-clock synchronization, and the
//! compression scheme registry.

use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};

/// The connection's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Disconnected,
    Connecting,
    Handshaking,
    Established,
    Closing,
}

impl ConnectionPhase {
    fn as_u8(self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::Connecting => 1,
            Self::Handshaking => 2,
            Self::Established => 3,
            Self::Closing => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Handshaking,
            3 => Self::Established,
            4 => Self::Closing,
            _ => Self::Disconnected,
        }
    }
}

/// A compression scheme the wire codec may use. Only `Text` (no
/// compression) is implemented; the other variants reserve the registry
/// slot the server's `setCompression` negotiation can select into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
    Text,
    Gzip,
    Deflate,
}

impl CompressionScheme {
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }

    pub fn from_wire_str(raw: &str) -> Option<Self> {
        match raw {
            "text" => Some(Self::Text),
            "gzip" => Some(Self::Gzip),
            "deflate" => Some(Self::Deflate),
            _ => None,
        }
    }

    /// Whether this build can actually encode/decode frames in this
    /// scheme. Only `Text` is implemented today.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Tracks connection phase, the offset between local and server clocks,
/// and the negotiated compression scheme.
pub struct StateManager {
    phase: AtomicU8,
    /// `server_time - local_time`, in milliseconds, as of the last
    /// `getTime` round trip.
    clock_offset_ms: AtomicI64,
    compression: std::sync::Mutex<CompressionScheme>,
}

impl StateManager {
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(ConnectionPhase::Disconnected.as_u8()),
            clock_offset_ms: AtomicI64::new(0),
            compression: std::sync::Mutex::new(CompressionScheme::Text),
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        ConnectionPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn set_phase(&self, phase: ConnectionPhase) {
        self.phase.store(phase.as_u8(), Ordering::SeqCst);
    }

    /// Records the offset learned from a `getTime` round trip: the
    /// server's reported time minus this client's local time when the
    /// reply was received.
    pub fn set_clock_offset_ms(&self, offset_ms: i64) {
        self.clock_offset_ms.store(offset_ms, Ordering::SeqCst);
    }

    /// The server's current time estimate, derived from the last known
    /// offset and the local clock.
    pub fn server_time_ms(&self, local_now_ms: i64) -> i64 {
        local_now_ms + self.clock_offset_ms.load(Ordering::SeqCst)
    }

    pub fn compression(&self) -> CompressionScheme {
        *self.compression.lock().expect("compression mutex poisoned")
    }

    pub fn set_compression(&self, scheme: CompressionScheme) {
        *self.compression.lock().expect("compression mutex poisoned") = scheme;
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
