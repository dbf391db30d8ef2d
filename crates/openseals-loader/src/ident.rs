use openseals_core::HashId;

use crate::error::LoaderError;

/// Parses a hash identifier from either hex or bech32 structured
/// form, trying hex first (the common case in test fixtures).
pub fn parse_hash_id(s: &str) -> Result<HashId, LoaderError> {
    if let Ok(id) = HashId::from_hex(s) {
        return Ok(id);
    }
    let (_, bytes) = openseals_bech32::decode(s)
        .map_err(|e| LoaderError::InvalidIdentifier { value: s.to_string(), reason: e.to_string() })?;
    HashId::from_bytes(bytes)
        .map_err(|e| LoaderError::InvalidIdentifier { value: s.to_string(), reason: e.to_string() })
}
