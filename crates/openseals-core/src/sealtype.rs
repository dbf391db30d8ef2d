//! Seal type declarations: what state (if any) a seal of a given type
//! carries.

use std::fmt;
use std::str::FromStr;

use crate::codec;
use crate::error::{CodecError, SchemaError};

/// The state shape a seal type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SealKind {
    /// No state.
    None,
    /// A varint-encoded amount.
    Balance,
}

impl SealKind {
    pub fn tag(self) -> u8 {
        match self {
            SealKind::None => 0,
            SealKind::Balance => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, SchemaError> {
        match tag {
            0 => Ok(SealKind::None),
            1 => Ok(SealKind::Balance),
            other => Err(SchemaError::Validation {
                reason: format!("unknown seal-type tag {other}"),
            }),
        }
    }
}

impl fmt::Display for SealKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if *self == SealKind::None { "none" } else { "balance" })
    }
}

impl FromStr for SealKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SealKind::None),
            "balance" => Ok(SealKind::Balance),
            other => Err(SchemaError::Validation { reason: format!("unknown seal kind '{other}'") }),
        }
    }
}

/// A named seal type declared by a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SealType {
    pub name: String,
    pub kind: SealKind,
}

impl SealType {
    pub fn new(name: impl Into<String>, kind: SealKind) -> Self {
        Self { name: name.into(), kind }
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        codec::write_str(out, &self.name);
        out.push(self.kind.tag());
    }

    pub fn deserialize(cur: &mut &[u8]) -> Result<Self, SchemaError> {
        let name = codec::read_str(cur).map_err(SchemaError::Codec)?;
        if cur.is_empty() {
            return Err(SchemaError::Codec(CodecError::UnexpectedEof { offset: 0, needed: 1 }));
        }
        let tag = cur[0];
        *cur = &cur[1..];
        Ok(Self { name, kind: SealKind::from_tag(tag)? })
    }

    /// Writes a seal's state: a varint amount for `balance`, nothing
    /// for `none`.
    pub fn encode_state(&self, out: &mut Vec<u8>, amount: Option<u64>) -> Result<(), SchemaError> {
        match self.kind {
            SealKind::None => Ok(()),
            SealKind::Balance => {
                let amount = amount.ok_or_else(|| SchemaError::Validation {
                    reason: format!("seal type '{}' requires a balance amount", self.name),
                })?;
                codec::write_varint(out, amount);
                Ok(())
            }
        }
    }

    pub fn decode_state(&self, cur: &mut &[u8]) -> Result<Option<u64>, SchemaError> {
        match self.kind {
            SealKind::None => Ok(None),
            SealKind::Balance => Ok(Some(codec::read_varint(cur).map_err(SchemaError::Codec)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_type_round_trips() {
        let st = SealType::new("holder", SealKind::Balance);
        let mut buf = Vec::new();
        st.serialize(&mut buf);
        let mut cur = buf.as_slice();
        assert_eq!(SealType::deserialize(&mut cur).unwrap(), st);
    }

    #[test]
    fn balance_state_round_trips() {
        let st = SealType::new("holder", SealKind::Balance);
        let mut buf = Vec::new();
        st.encode_state(&mut buf, Some(1000)).unwrap();
        let mut cur = buf.as_slice();
        assert_eq!(st.decode_state(&mut cur).unwrap(), Some(1000));
    }

    #[test]
    fn none_state_is_empty() {
        let st = SealType::new("marker", SealKind::None);
        let mut buf = Vec::new();
        st.encode_state(&mut buf, None).unwrap();
        assert!(buf.is_empty());
    }
}
