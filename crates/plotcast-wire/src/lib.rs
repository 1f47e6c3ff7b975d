//! Wire codec for the plotcast telemetry protocol.
//!
//! Three independent wire formats share one data socket:
//! - Binary sample packets: an ASCII header followed by two `f32` bounds
//!   and raw little-endian `u16` samples (see [`codec`]).
//! - Text lines: one human-readable scalar update per line (see [`line`]).
//! - Control messages and acks: colon-delimited ASCII commands received on
//!   the control socket (see [`control`]).
//!
//! Everything here is a pure function over byte slices. No I/O, no state.

pub mod codec;
pub mod control;
pub mod error;
pub mod line;
pub mod quant;

pub use codec::{decode_packet, encode_packet, SamplePacket, PACKET_START, PACKET_TERMINATOR, UNIT_MARKER};
pub use control::{connected_ack, disconnected_ack, parse_control, ControlCommand};
pub use error::{Result, WireError};
pub use line::encode_text_line;
pub use quant::{dequantize, quantize_u16, ZERO_SPAN_MIDPOINT};
