//! Client-side presence context.
//!
//! One `PresenceContext` owns the view of a single realtime connection: it
//! performs the handshake whenever the transport (re)opens, tracks the
//! online roster and recent notifications, and reports the connection
//! lifecycle to the embedding UI. The transport itself is injected, so the
//! whole state machine can be driven in tests without any network.

pub mod context;
pub mod liveness;
pub mod runner;
pub mod transport;

pub use context::{Command, ConnectionState, PresenceContext};
pub use liveness::{HttpLivenessProbe, LivenessProbe, LIVENESS_INTERVAL};
pub use transport::{ReconnectPolicy, Transport, TransportError, TransportEvent};
