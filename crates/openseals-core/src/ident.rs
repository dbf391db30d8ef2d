//! Identifier and key value types: semantic versions, fixed-length
//! hash identifiers, compressed public keys, and transaction outpoints.

use std::fmt;

use crate::codec::{self, FlagToken};
use crate::error::CodecError;

/// A semantic version triple, serialized as `varint(major) || minor ||
/// patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    pub major: u64,
    pub minor: u8,
    pub patch: u8,
}

impl SemVer {
    pub fn new(major: u64, minor: u8, patch: u8) -> Self {
        Self { major, minor, patch }
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        codec::write_varint(out, self.major);
        out.push(self.minor);
        out.push(self.patch);
    }

    pub fn deserialize(cur: &mut &[u8]) -> Result<Self, CodecError> {
        let major = codec::read_varint(cur)?;
        let minor = take_one(cur)?;
        let patch = take_one(cur)?;
        Ok(Self { major, minor, patch })
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for SemVer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        let major = parts
            .next()
            .ok_or("missing major version")?
            .parse()
            .map_err(|_| "invalid major version")?;
        let minor = parts
            .next()
            .ok_or("missing minor version")?
            .parse()
            .map_err(|_| "invalid minor version")?;
        let patch = parts
            .next()
            .ok_or("missing patch version")?
            .parse()
            .map_err(|_| "invalid patch version")?;
        Ok(Self { major, minor, patch })
    }
}

fn take_one(cur: &mut &[u8]) -> Result<u8, CodecError> {
    if cur.is_empty() {
        return Err(CodecError::UnexpectedEof { offset: 0, needed: 1 });
    }
    let b = cur[0];
    *cur = &cur[1..];
    Ok(b)
}

/// A fixed-length hash identifier: 20 bytes (ripemd-160 / hash160) or
/// 32 bytes (sha-256 / sha-256d). Construction accepts raw bytes, a
/// hex string, or zero (the all-zero sentinel used for an
/// absent-but-required slot).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashId(Vec<u8>);

impl HashId {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, CodecError> {
        let bytes = bytes.into();
        match bytes.len() {
            20 | 32 => Ok(Self(bytes)),
            n => Err(CodecError::FixedWidthMismatch { expected: 32, found: n }),
        }
    }

    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let bytes = hex::decode(s).map_err(|_| CodecError::FixedWidthMismatch {
            expected: s.len() / 2,
            found: 0,
        })?;
        Self::from_bytes(bytes)
    }

    pub fn zero(len: usize) -> Self {
        Self(vec![0u8; len])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    pub fn deserialize(cur: &mut &[u8], len: usize) -> Result<Self, CodecError> {
        if cur.len() < len {
            return Err(CodecError::UnexpectedEof { offset: 0, needed: len - cur.len() });
        }
        let (head, tail) = cur.split_at(len);
        *cur = tail;
        Ok(Self(head.to_vec()))
    }

    pub fn sha256d(data: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let first = Sha256::digest(data);
        let second = Sha256::digest(first);
        Self(second.to_vec())
    }

    pub fn hash160(data: &[u8]) -> Self {
        use ripemd::Ripemd160;
        use sha2::{Digest, Sha256};
        let sha = Sha256::digest(data);
        let ripe = Ripemd160::digest(sha);
        Self(ripe.to_vec())
    }
}

impl fmt::Display for HashId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// A 33-byte compressed SEC1 public key. The leading byte is part of
/// the encoded value, not a separate tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PubKey([u8; 33]);

impl PubKey {
    pub fn from_bytes(bytes: [u8; 33]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Writes `0x00` if `key` is absent, else the 33-byte key verbatim.
    pub fn serialize_optional(key: Option<&PubKey>, out: &mut Vec<u8>) {
        match key {
            None => out.push(0x00),
            Some(k) => out.extend_from_slice(&k.0),
        }
    }

    /// Peeks the leading byte: `0x00` yields `None` without consuming
    /// the remainder; any other value consumes a full 33-byte key.
    pub fn deserialize_optional(cur: &mut &[u8]) -> Result<Option<PubKey>, CodecError> {
        if cur.is_empty() {
            return Err(CodecError::UnexpectedEof { offset: 0, needed: 1 });
        }
        if cur[0] == 0x00 {
            *cur = &cur[1..];
            return Ok(None);
        }
        if cur.len() < 33 {
            return Err(CodecError::UnexpectedEof { offset: 0, needed: 33 - cur.len() });
        }
        let (head, tail) = cur.split_at(33);
        *cur = tail;
        let mut arr = [0u8; 33];
        arr.copy_from_slice(head);
        Ok(Some(PubKey(arr)))
    }
}

/// A transaction outpoint: `(txid, vout)`. Long form always carries a
/// txid; short form (used inside seal encodings) may omit it, flagged
/// by a [`codec::FlagToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub txid: Option<HashId>,
    pub vout: u64,
}

impl OutPoint {
    pub fn new(txid: HashId, vout: u64) -> Self {
        Self { txid: Some(txid), vout }
    }

    /// Long form: 32-byte txid then `varint(vout)`. Txid must be
    /// present.
    pub fn serialize_long(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let txid = self.txid.as_ref().ok_or(CodecError::FixedWidthMismatch {
            expected: 32,
            found: 0,
        })?;
        txid.serialize(out);
        codec::write_varint(out, self.vout);
        Ok(())
    }

    pub fn deserialize_long(cur: &mut &[u8]) -> Result<Self, CodecError> {
        let txid = HashId::deserialize(cur, 32)?;
        let vout = codec::read_varint(cur)?;
        Ok(Self { txid: Some(txid), vout })
    }

    /// Short form: `flag_varint((vout, txid_omitted))`, with the 32-byte
    /// txid following iff it was not flagged as omitted. By convention
    /// in this implementation, `flag == 1` means the txid is omitted.
    pub fn serialize_short(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let omitted = self.txid.is_none();
        codec::write_flag_varint(out, self.vout, omitted)?;
        if !omitted {
            self.txid.as_ref().unwrap().serialize(out);
        }
        Ok(())
    }

    pub fn deserialize_short(cur: &mut &[u8]) -> Result<Self, CodecError> {
        let (vout, omitted) = codec::read_flag_varint(cur)?;
        let txid = if omitted { None } else { Some(HashId::deserialize(cur, 32)?) };
        Ok(Self { txid, vout })
    }

    /// Reads a short-form outpoint from an already-peeked token,
    /// used by the seal-sequence reader which must distinguish a
    /// short outpoint from the `EOL`/`EOF` in-band signals sharing
    /// the same leading byte space.
    pub fn from_token(token: FlagToken, cur: &mut &[u8]) -> Result<Self, CodecError> {
        match token {
            FlagToken::Value(vout, omitted) => {
                let txid = if omitted { None } else { Some(HashId::deserialize(cur, 32)?) };
                Ok(Self { txid, vout })
            }
            FlagToken::Eol | FlagToken::Eof => {
                Err(CodecError::FixedWidthMismatch { expected: 1, found: 0 })
            }
        }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.txid {
            Some(txid) => write!(f, "{txid}:{}", self.vout),
            None => write!(f, "?:{}", self.vout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semver_round_trips() {
        let v = SemVer::new(12, 3, 255);
        let mut buf = Vec::new();
        v.serialize(&mut buf);
        let mut cur = buf.as_slice();
        assert_eq!(SemVer::deserialize(&mut cur).unwrap(), v);
    }

    #[test]
    fn semver_parses_from_str() {
        let v: SemVer = "1.2.3".parse().unwrap();
        assert_eq!(v, SemVer::new(1, 2, 3));
    }

    #[test]
    fn hash_id_zero_sentinel() {
        let z = HashId::zero(32);
        assert!(z.is_zero());
        assert_eq!(z.len(), 32);
    }

    #[test]
    fn hash_id_sha256d_is_stable() {
        let a = HashId::sha256d(b"openseals");
        let b = HashId::sha256d(b"openseals");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn pubkey_optional_round_trip_absent() {
        let mut buf = Vec::new();
        PubKey::serialize_optional(None, &mut buf);
        assert_eq!(buf, vec![0x00]);
        let mut cur = buf.as_slice();
        assert_eq!(PubKey::deserialize_optional(&mut cur).unwrap(), None);
    }

    #[test]
    fn pubkey_optional_round_trip_present() {
        let key = PubKey::from_bytes([7u8; 33]);
        let mut buf = Vec::new();
        PubKey::serialize_optional(Some(&key), &mut buf);
        assert_eq!(buf.len(), 33);
        let mut cur = buf.as_slice();
        assert_eq!(PubKey::deserialize_optional(&mut cur).unwrap(), Some(key));
    }

    #[test]
    fn outpoint_long_form_requires_txid() {
        let op = OutPoint { txid: None, vout: 0 };
        assert!(op.serialize_long(&mut Vec::new()).is_err());
    }

    #[test]
    fn outpoint_short_form_round_trip_with_txid() {
        let op = OutPoint::new(HashId::sha256d(b"tx"), 3);
        let mut buf = Vec::new();
        op.serialize_short(&mut buf).unwrap();
        let mut cur = buf.as_slice();
        assert_eq!(OutPoint::deserialize_short(&mut cur).unwrap(), op);
    }

    #[test]
    fn outpoint_short_form_round_trip_without_txid() {
        let op = OutPoint { txid: None, vout: 9 };
        let mut buf = Vec::new();
        op.serialize_short(&mut buf).unwrap();
        let mut cur = buf.as_slice();
        let decoded = OutPoint::deserialize_short(&mut cur).unwrap();
        assert_eq!(decoded.txid, None);
        assert_eq!(decoded.vout, 9);
    }
}
