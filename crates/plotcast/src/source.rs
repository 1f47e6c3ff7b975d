//! Sample sources feeding the publisher loop.

/// Supplies one batch of float samples per publisher tick.
///
/// Implementations must return promptly; the publisher calls this from its
/// timer loop and has no way to wait out a stalled source.
pub trait SampleSource: Send {
    fn next_batch(&mut self) -> Vec<f32>;
}

/// Synthetic sine generator.
///
/// Each batch covers one period, `points` samples over `[0, 2π)` with the
/// endpoint excluded, and the phase advances a little per batch so the
/// waveform scrolls for connected viewers. The phase only moves when a
/// batch is actually pulled, i.e. while a subscriber is connected.
pub struct SineSource {
    points: usize,
    amplitude: f32,
    phase: f32,
}

impl SineSource {
    const PHASE_STEP: f32 = 0.05;

    pub fn new(points: usize) -> Self {
        Self {
            points,
            amplitude: 1.0,
            phase: 0.0,
        }
    }
}

impl SampleSource for SineSource {
    fn next_batch(&mut self) -> Vec<f32> {
        let n = self.points;
        let batch = (0..n)
            .map(|i| {
                let t = i as f32 / n as f32 * std::f32::consts::TAU;
                self.amplitude * (t + self.phase).sin()
            })
            .collect();
        self.phase += Self::PHASE_STEP;
        batch
    }
}
