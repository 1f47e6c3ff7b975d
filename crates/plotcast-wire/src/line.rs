//! Single-scalar text updates, the low-rate sibling of the binary stream.

/// Encode one text-line update: `>{var}:{ts_ms}:{value}|g\n`.
///
/// The value always carries exactly six fractional digits, never scientific
/// notation, so line-oriented consumers can parse it with a fixed format.
pub fn encode_text_line(var: &str, ts_ms: u64, value: f32) -> Vec<u8> {
    format!(">{var}:{ts_ms}:{value:.6}|g\n").into_bytes()
}
