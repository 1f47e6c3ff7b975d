//! Single-subscriber session management for the plotcast protocol.
//!
//! At most one subscriber endpoint is active at a time. A `CONNECT`
//! control message installs it (last writer wins), a `DISCONNECT` or any
//! transport failure while sending to it removes it. The publisher loop
//! and the control receiver share one [`Session`]; the subscriber target
//! behind it is the only mutable state.

pub mod session;
pub mod sink;
pub mod target;

pub use session::Session;
pub use sink::DatagramSink;
pub use target::TargetHandle;
