use bytes::{BufMut, BytesMut};

use crate::error::{Result, WireError};

/// First byte of every binary sample packet.
pub const PACKET_START: u8 = b'<';

/// Separates the sample payload from the optional ASCII unit suffix.
pub const UNIT_MARKER: [u8; 2] = [0xC2, 0xA7];

/// Fixed packet terminator: `|g` + CR + LF.
pub const PACKET_TERMINATOR: [u8; 4] = *b"|g\r\n";

/// One batch of quantized samples with everything a subscriber needs to
/// reconstruct the original floats.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePacket {
    /// Variable name announced in the header.
    pub var: String,
    /// Base timestamp of the first sample (milliseconds).
    pub ts0: u64,
    /// Milliseconds between consecutive samples.
    pub step_ms: u32,
    /// Quantized samples; dequantize with `min`/`max`.
    pub values: Vec<u16>,
    pub min: f32,
    pub max: f32,
    /// Optional unit suffix (e.g. "V").
    pub unit: Option<String>,
}

impl SamplePacket {
    /// The total wire size of this packet.
    pub fn wire_size(&self) -> usize {
        let header = 1 + self.var.len() + 1 + digits(self.ts0) + 1 + digits(self.step_ms as u64) + 1;
        let unit = self
            .unit
            .as_ref()
            .map_or(0, |u| UNIT_MARKER.len() + u.len());
        header + 8 + 2 * self.values.len() + unit + PACKET_TERMINATOR.len()
    }
}

fn digits(mut n: u64) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Encode a sample packet into the wire format.
///
/// Wire layout (floats and u16 values little-endian):
/// ```text
/// ┌─────────────────────────┬──────────┬──────────┬──────────────┬──────────────────┬──────────┐
/// │ ASCII header            │ min      │ max      │ samples      │ 0xC2 0xA7 + unit │ |g\r\n   │
/// │ <var:ts0;step;          │ (f32 LE) │ (f32 LE) │ (2B LE each) │ (optional)       │          │
/// └─────────────────────────┴──────────┴──────────┴──────────────┴──────────────────┴──────────┘
/// ```
///
/// Encoding has no error outcomes; the caller is responsible for having
/// quantized the samples into 16-bit range already.
pub fn encode_packet(packet: &SamplePacket, dst: &mut BytesMut) {
    dst.reserve(packet.wire_size());
    dst.put_u8(PACKET_START);
    dst.put_slice(packet.var.as_bytes());
    dst.put_u8(b':');
    dst.put_slice(packet.ts0.to_string().as_bytes());
    dst.put_u8(b';');
    dst.put_slice(packet.step_ms.to_string().as_bytes());
    dst.put_u8(b';');
    dst.put_f32_le(packet.min);
    dst.put_f32_le(packet.max);
    for &value in &packet.values {
        dst.put_u16_le(value);
    }
    if let Some(unit) = &packet.unit {
        dst.put_slice(&UNIT_MARKER);
        dst.put_slice(unit.as_bytes());
    }
    dst.put_slice(&PACKET_TERMINATOR);
}

/// Decode a complete sample packet from a datagram.
///
/// Exact inverse of [`encode_packet`]. The input must be one whole packet;
/// UDP preserves datagram boundaries so no streaming/partial handling is
/// needed here.
pub fn decode_packet(src: &[u8]) -> Result<SamplePacket> {
    // Smallest well-formed packet: "<v:0;0;" + 8 float bytes + terminator.
    if src.len() < 7 + 8 + PACKET_TERMINATOR.len() {
        return Err(WireError::Truncated { len: src.len() });
    }

    let rest = match src.split_first() {
        Some((&PACKET_START, rest)) => rest,
        _ => {
            return Err(WireError::InvalidHeader(
                "missing '<' start byte".to_string(),
            ))
        }
    };

    let (var, rest) = take_field(rest, b':')?;
    let (ts0, rest) = take_field(rest, b';')?;
    let (step_ms, rest) = take_field(rest, b';')?;

    let var = header_str(var)?.to_string();
    let ts0: u64 = header_str(ts0)?
        .parse()
        .map_err(|_| WireError::InvalidHeader("non-numeric base timestamp".to_string()))?;
    let step_ms: u32 = header_str(step_ms)?
        .parse()
        .map_err(|_| WireError::InvalidHeader("non-numeric step".to_string()))?;

    let body = rest
        .strip_suffix(&PACKET_TERMINATOR)
        .ok_or(WireError::MissingTerminator)?;
    if body.len() < 8 {
        return Err(WireError::Truncated { len: src.len() });
    }

    let min = f32::from_le_bytes(body[0..4].try_into().unwrap());
    let max = f32::from_le_bytes(body[4..8].try_into().unwrap());

    let (value_bytes, unit) = split_unit(&body[8..])?;
    let values = value_bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(SamplePacket {
        var,
        ts0,
        step_ms,
        values,
        min,
        max,
        unit: unit.map(str::to_string),
    })
}

fn take_field(buf: &[u8], delim: u8) -> Result<(&[u8], &[u8])> {
    let pos = buf.iter().position(|&b| b == delim).ok_or_else(|| {
        WireError::InvalidHeader(format!("missing '{}' delimiter", delim as char))
    })?;
    Ok((&buf[..pos], &buf[pos + 1..]))
}

fn header_str(field: &[u8]) -> Result<&str> {
    std::str::from_utf8(field)
        .map_err(|_| WireError::InvalidHeader("non-UTF8 header field".to_string()))
}

/// Split the post-float body into sample bytes and an optional unit.
///
/// The unit marker bytes can also occur inside sample data, so the split
/// takes the last marker that leaves a whole number of u16 samples before
/// it and a non-empty printable-ASCII unit after it.
fn split_unit(tail: &[u8]) -> Result<(&[u8], Option<&str>)> {
    let mut search = tail;
    while let Some(pos) = search.windows(2).rposition(|w| w == UNIT_MARKER) {
        let unit = &tail[pos + UNIT_MARKER.len()..];
        if pos % 2 == 0 && !unit.is_empty() && unit.iter().all(|b| b.is_ascii_graphic()) {
            // All bytes verified ASCII graphic above.
            let unit = std::str::from_utf8(unit).unwrap();
            return Ok((&tail[..pos], Some(unit)));
        }
        search = &search[..pos];
    }

    if tail.len() % 2 != 0 {
        return Err(WireError::OddPayload(tail.len()));
    }
    Ok((tail, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(packet: &SamplePacket) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_packet(packet, &mut buf);
        buf
    }

    #[test]
    fn test_encode_decode_roundtrip_with_unit() {
        let packet = SamplePacket {
            var: "pressure".to_string(),
            ts0: 1024,
            step_ms: 5,
            values: vec![0, 1, 512, 65535],
            min: -3.5,
            max: 7.25,
            unit: Some("Pa".to_string()),
        };

        let buf = encode(&packet);
        assert_eq!(buf.len(), packet.wire_size());

        let decoded = decode_packet(&buf).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_encode_decode_roundtrip_without_unit() {
        let packet = SamplePacket {
            var: "t".to_string(),
            ts0: 0,
            step_ms: 1,
            values: vec![42],
            min: 0.0,
            max: 1.0,
            unit: None,
        };

        let decoded = decode_packet(&encode(&packet)).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_known_wire_layout() {
        // Samples [-1, 0, 1] quantize to [0, 32768, 65535].
        let packet = SamplePacket {
            var: "x".to_string(),
            ts0: 0,
            step_ms: 1,
            values: vec![0, 32768, 65535],
            min: -1.0,
            max: 1.0,
            unit: Some("V".to_string()),
        };

        let buf = encode(&packet);

        let mut expected = Vec::new();
        expected.extend_from_slice(b"<x:0;1;");
        expected.extend_from_slice(&(-1.0f32).to_le_bytes());
        expected.extend_from_slice(&1.0f32.to_le_bytes());
        expected.extend_from_slice(&[0x00, 0x00, 0x00, 0x80, 0xFF, 0xFF]);
        expected.extend_from_slice(&UNIT_MARKER);
        expected.extend_from_slice(b"V");
        expected.extend_from_slice(&PACKET_TERMINATOR);

        assert_eq!(buf.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_marker_bytes_inside_samples_without_unit() {
        // 0xA7C2 encodes as the unit marker byte sequence; with nothing
        // after it, the decoder must treat it as sample data.
        let packet = SamplePacket {
            var: "m".to_string(),
            ts0: 7,
            step_ms: 2,
            values: vec![u16::from_le_bytes(UNIT_MARKER), 9],
            min: 0.0,
            max: 2.0,
            unit: None,
        };

        let decoded = decode_packet(&encode(&packet)).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_decode_truncated() {
        let result = decode_packet(b"<x:0;1;");
        assert!(matches!(result, Err(WireError::Truncated { .. })));
    }

    #[test]
    fn test_decode_missing_terminator() {
        let packet = SamplePacket {
            var: "x".to_string(),
            ts0: 0,
            step_ms: 1,
            values: vec![1, 2, 3],
            min: 0.0,
            max: 1.0,
            unit: None,
        };
        let mut buf = encode(&packet);
        buf.truncate(buf.len() - 1);

        let result = decode_packet(&buf);
        assert!(matches!(result, Err(WireError::MissingTerminator)));
    }

    #[test]
    fn test_decode_missing_start_byte() {
        let packet = SamplePacket {
            var: "x".to_string(),
            ts0: 0,
            step_ms: 1,
            values: vec![1, 2, 3],
            min: 0.0,
            max: 1.0,
            unit: None,
        };
        let buf = encode(&packet);

        let result = decode_packet(&buf[1..]);
        assert!(matches!(result, Err(WireError::InvalidHeader(_))));
    }

    #[test]
    fn test_decode_non_numeric_timestamp() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"<x:abc;1;");
        buf.extend_from_slice(&[0u8; 8]);
        buf.extend_from_slice(&[1, 0]);
        buf.extend_from_slice(&PACKET_TERMINATOR);

        let result = decode_packet(&buf);
        assert!(matches!(result, Err(WireError::InvalidHeader(_))));
    }

    #[test]
    fn test_decode_odd_payload() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"<x:0;1;");
        buf.extend_from_slice(&[0u8; 8]);
        buf.extend_from_slice(&[1, 0, 2]); // 3 bytes of sample data
        buf.extend_from_slice(&PACKET_TERMINATOR);

        let result = decode_packet(&buf);
        assert!(matches!(result, Err(WireError::OddPayload(3))));
    }

    #[test]
    fn test_wire_size_matches_encoding() {
        let packet = SamplePacket {
            var: "long_variable_name".to_string(),
            ts0: 123456789,
            step_ms: 100,
            values: vec![0; 512],
            min: -1.0,
            max: 1.0,
            unit: Some("mV".to_string()),
        };
        assert_eq!(encode(&packet).len(), packet.wire_size());
    }
}
