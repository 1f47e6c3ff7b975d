//! Fixed-point quantization of float samples into 16-bit wire values.

/// Value every sample maps to when the batch has zero span (all samples
/// equal), where the quantization divisor would otherwise be zero.
pub const ZERO_SPAN_MIDPOINT: u16 = 32768;

/// Quantize float samples to `u16` and return `(values, min, max)`.
///
/// Each value is `round((s - min) / (max - min) * 65535)` clamped to
/// `[0, 65535]`, so the global minimum maps to 0 and the global maximum to
/// 65535. A constant batch (`max == min`) maps every sample to
/// [`ZERO_SPAN_MIDPOINT`]. An empty batch yields an empty vector with
/// `min = max = 0.0`.
pub fn quantize_u16(samples: &[f32]) -> (Vec<u16>, f32, f32) {
    let Some(&first) = samples.first() else {
        return (Vec::new(), 0.0, 0.0);
    };

    let (min, max) = samples
        .iter()
        .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));

    let span = max - min;
    if span == 0.0 {
        return (vec![ZERO_SPAN_MIDPOINT; samples.len()], min, max);
    }

    let values = samples
        .iter()
        .map(|&s| ((s - min) / span * 65535.0).round().clamp(0.0, 65535.0) as u16)
        .collect();

    (values, min, max)
}

/// Reconstruct the approximate float a quantized value came from.
pub fn dequantize(value: u16, min: f32, max: f32) -> f32 {
    min + f32::from(value) / 65535.0 * (max - min)
}
