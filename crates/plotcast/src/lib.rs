//! UDP telemetry publisher.
//!
//! Generates a synthetic signal and streams it to a single subscriber:
//! high-rate binary sample packets plus one text-line scalar per batch,
//! negotiated over a separate control socket (`CONNECT`/`DISCONNECT`).
//! The protocol pieces live in `plotcast-wire` and `plotcast-session`;
//! this crate wires them to real sockets and a tick loop.

pub mod control;
pub mod logging;
pub mod netinfo;
pub mod publisher;
pub mod source;
