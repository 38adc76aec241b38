//! Serialized form of an [`OperationHandle`] for reattachment.
//!
//! The byte form is opaque to callers. The base64 form wraps it for places
//! that only store text.

use crate::error::Result;
use crate::protocol::OperationHandle;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Serialize a handle to opaque bytes.
pub fn encode(handle: &OperationHandle) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(handle)?)
}

/// Rebuild a handle from the bytes of [`encode`].
pub fn decode(bytes: &[u8]) -> Result<OperationHandle> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Serialize a handle to base64 text.
pub fn encode_base64(handle: &OperationHandle) -> Result<String> {
    Ok(BASE64.encode(encode(handle)?))
}

/// Rebuild a handle from the text of [`encode_base64`].
pub fn decode_base64(text: &str) -> Result<OperationHandle> {
    decode(&BASE64.decode(text.trim())?)
}
