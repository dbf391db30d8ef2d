//! Content-addressed identifier encoding. Kept as its own crate so
//! `openseals-core` never depends on a specific bech32 implementation
//! version: the core hands out raw digest bytes, this crate formats
//! them.

use bech32::{self, FromBase32, ToBase32, Variant};
use thiserror::Error;

/// The human-readable prefixes used by OpenSeals content-addressed
/// identifiers.
pub mod hrp {
    pub const SCHEMA_LONG: &str = "oss";
    pub const SCHEMA_SHORT: &str = "sm";
    pub const PROOF_LONG: &str = "osp";
    pub const PROOF_SHORT: &str = "pf";
    pub const BITCOIN_MAINNET: &str = "bc";
    pub const BITCOIN_TESTNET: &str = "tb";
}

#[derive(Debug, Error)]
pub enum Bech32Error {
    #[error("bech32 encode failed: {0}")]
    Encode(#[from] bech32::Error),
    #[error("bech32 string carries human-readable prefix '{found}', expected '{expected}'")]
    UnexpectedHrp { expected: String, found: String },
}

/// Encodes `data` under human-readable prefix `hrp` using bech32
/// (BIP-173) with 5-bit grouping.
pub fn encode(hrp: &str, data: &[u8]) -> Result<String, Bech32Error> {
    Ok(bech32::encode(hrp, data.to_base32(), Variant::Bech32)?)
}

/// Decodes a bech32 string, returning its human-readable prefix and
/// raw byte payload.
pub fn decode(s: &str) -> Result<(String, Vec<u8>), Bech32Error> {
    let (hrp, data, _variant) = bech32::decode(s)?;
    let bytes = Vec::<u8>::from_base32(&data)?;
    Ok((hrp, bytes))
}

/// Decodes a bech32 string, requiring it to carry the given
/// human-readable prefix.
pub fn decode_with_hrp(s: &str, expected_hrp: &str) -> Result<Vec<u8>, Bech32Error> {
    let (hrp, bytes) = decode(s)?;
    if hrp != expected_hrp {
        return Err(Bech32Error::UnexpectedHrp { expected: expected_hrp.to_string(), found: hrp });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_id_round_trips() {
        let digest = [7u8; 32];
        let encoded = encode(hrp::SCHEMA_LONG, &digest).unwrap();
        let decoded = decode_with_hrp(&encoded, hrp::SCHEMA_LONG).unwrap();
        assert_eq!(decoded, digest);
    }

    #[test]
    fn wrong_hrp_is_rejected() {
        let digest = [1u8; 32];
        let encoded = encode(hrp::PROOF_LONG, &digest).unwrap();
        assert!(decode_with_hrp(&encoded, hrp::SCHEMA_LONG).is_err());
    }
}
