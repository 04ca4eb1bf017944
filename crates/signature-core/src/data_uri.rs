//! `data:` URI encoding and decoding for rasterized signatures

use crate::error::CompositeError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Decoded contents of a `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Encode bytes as `data:<mime>;base64,<payload>`
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Decode a base64 `data:` URI back into its media type and raw bytes
pub fn decode(uri: &str) -> Result<DataUri, CompositeError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CompositeError::InvalidDataUri("missing data: prefix".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CompositeError::InvalidDataUri("missing payload separator".to_string()))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| CompositeError::InvalidDataUri("payload is not base64".to_string()))?;

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| CompositeError::InvalidDataUri(format!("bad base64: {}", e)))?;

    Ok(DataUri {
        mime: mime.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_png_prefix() {
        let uri = encode("image/png", &[0x89, 0x50, 0x4E, 0x47]);
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(uri.ends_with("iVBORw=="));
    }

    #[test]
    fn test_decode_png() {
        let decoded = decode("data:image/png;base64,iVBORw==").unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.bytes, vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_decode_rejects_missing_prefix() {
        let err = decode("image/png;base64,AAAA").unwrap_err();
        assert!(matches!(err, CompositeError::InvalidDataUri(_)));
    }

    #[test]
    fn test_decode_rejects_missing_comma() {
        assert!(decode("data:image/png;base64").is_err());
    }

    #[test]
    fn test_decode_rejects_plain_payload() {
        assert!(decode("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(decode("data:image/png;base64,@@@@").is_err());
    }

    proptest! {
        #[test]
        fn decode_recovers_encoded_bytes(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let uri = encode("image/png", &bytes);
            let decoded = decode(&uri).unwrap();
            prop_assert_eq!(decoded.mime, "image/png");
            prop_assert_eq!(decoded.bytes, bytes);
        }
    }
}
