use base64::Engine;
use base64::engine::general_purpose::STANDARD;

type TextDecoder = fn(&str) -> Option<Vec<u8>>;

/// Decode attempts for string payloads, first success wins.
const TEXT_DECODERS: &[TextDecoder] = &[decode_base58, decode_base64];

fn decode_base58(s: &str) -> Option<Vec<u8>> {
    bs58::decode(s).into_vec().ok()
}

fn decode_base64(s: &str) -> Option<Vec<u8>> {
    STANDARD.decode(s).ok()
}

/// Decode a textual payload: Base58, then Base64, then the raw UTF-8 bytes.
///
/// Never fails; the last step always produces output.
pub fn decode_text(s: &str) -> Vec<u8> {
    TEXT_DECODERS
        .iter()
        .find_map(|decode| decode(s))
        .unwrap_or_else(|| s.as_bytes().to_vec())
}

/// Normalize a JSON payload value into bytes.
///
/// Accepts a string, an array of byte values, or the `{"type":"Buffer","data":[..]}`
/// shape a JavaScript `Buffer` serializes to. Anything else yields an empty vec.
pub fn normalize(value: &serde_json::Value) -> Vec<u8> {
    match value {
        serde_json::Value::String(s) => decode_text(s),
        serde_json::Value::Array(items) => bytes_from_array(items).unwrap_or_default(),
        serde_json::Value::Object(obj) => match (obj.get("type"), obj.get("data")) {
            (Some(serde_json::Value::String(kind)), Some(serde_json::Value::Array(items)))
                if kind == "Buffer" =>
            {
                bytes_from_array(items).unwrap_or_default()
            }
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn bytes_from_array(items: &[serde_json::Value]) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    #[test]
    fn base58_text_decodes_to_bytes() {
        let bytes = [0x20, 0x4f, 0x65, 0x8b, 0x19, 0x06, 0x62, 0x0f, 0x01];
        let encoded = bs58::encode(bytes).into_string();
        assert_eq!(decode_text(&encoded), bytes.to_vec());
    }

    #[test]
    fn falls_back_to_base64_outside_base58_alphabet() {
        // 'I' and 'l' are excluded from the Base58 alphabet.
        assert_eq!(
            decode_text("IE9lixkGYg8="),
            vec![0x20, 0x4f, 0x65, 0x8b, 0x19, 0x06, 0x62, 0x0f]
        );
    }

    #[test]
    fn falls_back_to_utf8_when_nothing_decodes() {
        assert_eq!(decode_text("not base64!"), b"not base64!".to_vec());
    }

    #[test]
    fn empty_string_is_empty_bytes() {
        assert!(decode_text("").is_empty());
    }

    #[test]
    fn leading_ones_become_leading_zero_bytes() {
        assert_eq!(decode_text("111"), vec![0, 0, 0]);
        assert_eq!(bs58::encode([0u8, 0, 1]).into_string(), "112");
        assert_eq!(decode_text("112"), vec![0, 0, 1]);
    }

    #[test]
    fn base58_round_trip_random_inputs() {
        let mut state = 0x5eed_u64;
        for _ in 0..500 {
            let len = (lcg_next(&mut state) % 48) as usize;
            let leading_zeros = (lcg_next(&mut state) % 4) as usize;
            let mut bytes = vec![0u8; leading_zeros];
            bytes.extend((0..len).map(|_| (lcg_next(&mut state) >> 33) as u8));

            let encoded = bs58::encode(&bytes).into_string();
            assert!(
                encoded.starts_with(&"1".repeat(leading_zeros)),
                "leading zeros must encode as '1': {encoded}"
            );
            assert_eq!(decode_text(&encoded), bytes, "round trip failed: {encoded}");
        }
    }

    #[test]
    fn normalizes_byte_arrays_and_buffers() {
        let raw = serde_json::json!([32, 79, 101]);
        assert_eq!(normalize(&raw), vec![32, 79, 101]);

        let buffer = serde_json::json!({"type": "Buffer", "data": [32, 79, 101]});
        assert_eq!(normalize(&buffer), vec![32, 79, 101]);
    }

    #[test]
    fn raw_and_base58_sources_normalize_identically() {
        let bytes: Vec<u8> = (0..=255).collect();
        let from_rpc = serde_json::json!(bytes);
        let from_stream = serde_json::Value::String(bs58::encode(&bytes).into_string());
        assert_eq!(normalize(&from_rpc), normalize(&from_stream));
    }

    #[test]
    fn unsupported_shapes_yield_empty() {
        assert!(normalize(&serde_json::Value::Null).is_empty());
        assert!(normalize(&serde_json::json!(42)).is_empty());
        assert!(normalize(&serde_json::json!({"data": [1, 2]})).is_empty());
        assert!(normalize(&serde_json::json!([1, 256])).is_empty());
        assert!(normalize(&serde_json::json!([1, "x"])).is_empty());
    }
}
