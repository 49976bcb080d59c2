//! Signed token wire codec.
//!
//! Wire form: `base64url(JSON(header)).base64url(JSON(payload)).base64url(signature)`,
//! every segment URL-safe base64 without padding. The signature covers the
//! ASCII bytes of the first two segments joined by `.`, exactly as they
//! appear on the wire.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::claims::Header;
use super::claims::Payload;
use super::claims::ALGORITHM;
use super::errors::JwtError;
use super::keys::KeyProvider;

const SEGMENT_COUNT: usize = 3;

/// Structural view of a token: decoded segments, signature not yet checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub header: Header,
    pub payload: Payload,
    pub signature: Vec<u8>,
}

/// Serialize, sign and assemble a token.
///
/// # Errors
/// * `EncodingFailed` - Serialization or signing failed
pub fn encode(header: &Header, payload: &Payload, keys: &KeyProvider) -> Result<String, JwtError> {
    let header_json =
        serde_json::to_vec(header).map_err(|e| JwtError::EncodingFailed(e.to_string()))?;
    let payload_json =
        serde_json::to_vec(payload).map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(payload_json)
    );
    let signature = keys.sign(signing_input.as_bytes())?;

    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Split and decode a token without checking its signature.
///
/// Never trust the payload returned here for authorization decisions;
/// use [`verify`] first.
///
/// # Errors
/// * `MalformedToken` - Not three segments, a segment is not base64url,
///   or header/payload is not the expected JSON shape
pub fn decode(token: &str) -> Result<DecodedToken, JwtError> {
    let [header, payload, signature] = split(token)?;

    let header: Header = serde_json::from_slice(&decode_segment(header, "header")?)
        .map_err(|e| JwtError::MalformedToken(format!("header is not valid JSON: {}", e)))?;
    let payload: Payload = serde_json::from_slice(&decode_segment(payload, "payload")?)
        .map_err(|e| JwtError::MalformedToken(format!("payload is not valid JSON: {}", e)))?;
    let signature = decode_segment(signature, "signature")?;

    Ok(DecodedToken {
        header,
        payload,
        signature,
    })
}

/// Check a token's signature against the provider's public key.
///
/// # Errors
/// * `MalformedToken` - See [`decode`]
/// * `InvalidSignature` - Unsupported algorithm tag or signature mismatch
pub fn verify(token: &str, keys: &KeyProvider) -> Result<(), JwtError> {
    let decoded = decode(token)?;

    if decoded.header.alg != ALGORITHM {
        return Err(JwtError::InvalidSignature);
    }

    let signing_input = match token.rfind('.') {
        Some(index) => &token[..index],
        None => return Err(JwtError::MalformedToken("missing signature".to_string())),
    };

    keys.verify(signing_input.as_bytes(), &decoded.signature)
}

fn split(token: &str) -> Result<[&str; SEGMENT_COUNT], JwtError> {
    let segments: Vec<&str> = token.split('.').collect();

    match segments.as_slice() {
        &[header, payload, signature] => Ok([header, payload, signature]),
        _ => Err(JwtError::MalformedToken(format!(
            "expected {} segments, got {}",
            SEGMENT_COUNT,
            segments.len()
        ))),
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, JwtError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| JwtError::MalformedToken(format!("{} is not base64url: {}", name, e)))
}
