use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::BytesMut;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use plotcast_session::{DatagramSink, Session};
use plotcast_wire::{encode_packet, encode_text_line, quantize_u16, SamplePacket};

use crate::source::SampleSource;

/// Everything the publisher loop needs to know about what it emits.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Variable name carried by binary sample packets.
    pub raw_var: String,
    /// Variable name carried by text-line updates.
    pub text_var: String,
    /// Optional unit suffix for binary packets.
    pub unit: Option<String>,
    /// Milliseconds between consecutive samples within a batch.
    pub step_ms: u32,
    /// Batches per second.
    pub send_rate: u32,
}

/// Drive periodic emission until the token is cancelled.
///
/// Every tick with a connected subscriber pulls one batch, quantizes it,
/// sends it as a binary packet, then echoes the batch's first raw sample
/// as a text line stamped with wall-clock millis. Idle ticks do nothing:
/// the base timestamp and the source both stand still until the next
/// CONNECT. A failed send drops the subscriber and aborts the tick.
pub async fn run<S, D>(
    session: Arc<Session<D>>,
    mut source: S,
    config: PublisherConfig,
    shutdown: CancellationToken,
) where
    S: SampleSource,
    D: DatagramSink,
{
    let period = Duration::from_secs_f64(1.0 / f64::from(config.send_rate.max(1)));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ts0: u64 = 0;
    let mut buf = BytesMut::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if !session.is_active() {
            continue;
        }

        let samples = source.next_batch();
        if samples.is_empty() {
            continue;
        }

        let (values, min, max) = quantize_u16(&samples);
        ts0 += samples.len() as u64 * u64::from(config.step_ms);

        let packet = SamplePacket {
            var: config.raw_var.clone(),
            ts0,
            step_ms: config.step_ms,
            values,
            min,
            max,
            unit: config.unit.clone(),
        };
        buf.clear();
        encode_packet(&packet, &mut buf);

        if !session.send_to_target(&buf) {
            // Demoted mid-tick; skip the text line too.
            continue;
        }

        let line = encode_text_line(&config.text_var, now_ms(), samples[0]);
        session.send_to_target(&line);
    }

    debug!("publisher loop stopped");
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
