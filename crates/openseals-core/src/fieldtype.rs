//! Field type declarations: the 17 primitive value kinds a schema may
//! assign to a field, and their wire encoding.

use std::fmt;
use std::str::FromStr;

use crate::codec;
use crate::error::{CodecError, SchemaError};
use crate::ident::{HashId, OutPoint, PubKey};
use crate::value::Value;

/// One of the 17 primitive value kinds a [`FieldType`] may declare.
/// `Ecdsa` is reserved: it has a wire tag but no value representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Vi,
    Fvi,
    Str,
    Bytes,
    Sha256,
    Sha256d,
    Ripmd160,
    Hash160,
    OutPoint,
    SOutPoint,
    PubKey,
    Ecdsa,
}

impl FieldKind {
    pub fn tag(self) -> u8 {
        match self {
            FieldKind::U8 => 0x01,
            FieldKind::U16 => 0x02,
            FieldKind::U32 => 0x03,
            FieldKind::U64 => 0x04,
            FieldKind::I8 => 0x05,
            FieldKind::I16 => 0x06,
            FieldKind::I32 => 0x07,
            FieldKind::I64 => 0x08,
            FieldKind::Vi => 0x09,
            FieldKind::Fvi => 0x0a,
            FieldKind::Str => 0x0b,
            FieldKind::Bytes => 0x0c,
            FieldKind::Sha256 => 0x10,
            FieldKind::Sha256d => 0x11,
            FieldKind::Ripmd160 => 0x12,
            FieldKind::Hash160 => 0x13,
            FieldKind::OutPoint => 0x20,
            FieldKind::SOutPoint => 0x21,
            FieldKind::PubKey => 0x30,
            FieldKind::Ecdsa => 0x31,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, SchemaError> {
        Ok(match tag {
            0x01 => FieldKind::U8,
            0x02 => FieldKind::U16,
            0x03 => FieldKind::U32,
            0x04 => FieldKind::U64,
            0x05 => FieldKind::I8,
            0x06 => FieldKind::I16,
            0x07 => FieldKind::I32,
            0x08 => FieldKind::I64,
            0x09 => FieldKind::Vi,
            0x0a => FieldKind::Fvi,
            0x0b => FieldKind::Str,
            0x0c => FieldKind::Bytes,
            0x10 => FieldKind::Sha256,
            0x11 => FieldKind::Sha256d,
            0x12 => FieldKind::Ripmd160,
            0x13 => FieldKind::Hash160,
            0x20 => FieldKind::OutPoint,
            0x21 => FieldKind::SOutPoint,
            0x30 => FieldKind::PubKey,
            0x31 => FieldKind::Ecdsa,
            other => {
                return Err(SchemaError::Validation {
                    reason: format!("unknown field-type tag 0x{other:02x}"),
                })
            }
        })
    }

    /// Whether an optional [`crate::typeref::TypeRef`] bound may target
    /// a field of this kind: fixed-width integers have no absence
    /// sentinel and are rejected by schema validation.
    pub fn supports_optional(self) -> bool {
        !matches!(
            self,
            FieldKind::U8
                | FieldKind::U16
                | FieldKind::U32
                | FieldKind::U64
                | FieldKind::I8
                | FieldKind::I16
                | FieldKind::I32
                | FieldKind::I64
                | FieldKind::Vi
                | FieldKind::OutPoint
                | FieldKind::SOutPoint
                | FieldKind::Ecdsa
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::U64 => "u64",
            FieldKind::I8 => "i8",
            FieldKind::I16 => "i16",
            FieldKind::I32 => "i32",
            FieldKind::I64 => "i64",
            FieldKind::Vi => "vi",
            FieldKind::Fvi => "fvi",
            FieldKind::Str => "str",
            FieldKind::Bytes => "bytes",
            FieldKind::Sha256 => "sha256",
            FieldKind::Sha256d => "sha256d",
            FieldKind::Ripmd160 => "ripmd160",
            FieldKind::Hash160 => "hash160",
            FieldKind::OutPoint => "outpoint",
            FieldKind::SOutPoint => "soutpoint",
            FieldKind::PubKey => "pubkey",
            FieldKind::Ecdsa => "ecdsa",
        };
        write!(f, "{s}")
    }
}

impl FromStr for FieldKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "u8" => FieldKind::U8,
            "u16" => FieldKind::U16,
            "u32" => FieldKind::U32,
            "u64" => FieldKind::U64,
            "i8" => FieldKind::I8,
            "i16" => FieldKind::I16,
            "i32" => FieldKind::I32,
            "i64" => FieldKind::I64,
            "vi" => FieldKind::Vi,
            "fvi" => FieldKind::Fvi,
            "str" => FieldKind::Str,
            "bytes" => FieldKind::Bytes,
            "sha256" => FieldKind::Sha256,
            "sha256d" => FieldKind::Sha256d,
            "ripmd160" => FieldKind::Ripmd160,
            "hash160" => FieldKind::Hash160,
            "outpoint" => FieldKind::OutPoint,
            "soutpoint" => FieldKind::SOutPoint,
            "pubkey" => FieldKind::PubKey,
            "ecdsa" => FieldKind::Ecdsa,
            other => {
                return Err(SchemaError::Validation { reason: format!("unknown field kind '{other}'") })
            }
        })
    }
}

/// A named field type declared by a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldType {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), kind }
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        codec::write_str(out, &self.name);
        out.push(self.kind.tag());
    }

    pub fn deserialize(cur: &mut &[u8]) -> Result<Self, SchemaError> {
        let name = codec::read_str(cur).map_err(SchemaError::Codec)?;
        let tag = read_one(cur).map_err(SchemaError::Codec)?;
        Ok(Self { name, kind: FieldKind::from_tag(tag)? })
    }

    /// Writes one value of this field's kind.
    pub fn encode_value(&self, out: &mut Vec<u8>, value: &Value) -> Result<(), SchemaError> {
        match (self.kind, value) {
            (FieldKind::U8, Value::U8(v)) => out.push(*v),
            (FieldKind::U16, Value::U16(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (FieldKind::U32, Value::U32(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (FieldKind::U64, Value::U64(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (FieldKind::I8, Value::I8(v)) => out.push(*v as u8),
            (FieldKind::I16, Value::I16(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (FieldKind::I32, Value::I32(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (FieldKind::I64, Value::I64(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (FieldKind::Vi, Value::Vi(v)) => codec::write_varint(out, *v),
            (FieldKind::Fvi, Value::Fvi(v)) => codec::write_flag_varint(out, *v, false)
                .map_err(SchemaError::Codec)?,
            (FieldKind::Str, Value::Str(v)) => codec::write_str(out, v),
            (FieldKind::Bytes, Value::Bytes(v)) => codec::write_bytes(out, v),
            (FieldKind::Sha256, Value::Sha256(v))
            | (FieldKind::Sha256d, Value::Sha256d(v))
            | (FieldKind::Ripmd160, Value::Ripmd160(v))
            | (FieldKind::Hash160, Value::Hash160(v)) => v.serialize(out),
            (FieldKind::OutPoint, Value::OutPoint(v)) => {
                v.serialize_long(out).map_err(SchemaError::Codec)?
            }
            (FieldKind::SOutPoint, Value::SOutPoint(v)) => {
                v.serialize_short(out).map_err(SchemaError::Codec)?
            }
            (FieldKind::PubKey, Value::PubKey(v)) => out.extend_from_slice(v.as_bytes()),
            _ => {
                return Err(SchemaError::Validation {
                    reason: format!("value does not match field kind {}", self.kind),
                })
            }
        }
        Ok(())
    }

    /// Reads one value of this field's kind.
    pub fn decode_value(&self, cur: &mut &[u8]) -> Result<Value, SchemaError> {
        Ok(match self.kind {
            FieldKind::U8 => Value::U8(read_one(cur).map_err(SchemaError::Codec)?),
            FieldKind::U16 => Value::U16(u16::from_le_bytes(read_n(cur, 2)?.try_into().unwrap())),
            FieldKind::U32 => Value::U32(u32::from_le_bytes(read_n(cur, 4)?.try_into().unwrap())),
            FieldKind::U64 => Value::U64(u64::from_le_bytes(read_n(cur, 8)?.try_into().unwrap())),
            FieldKind::I8 => Value::I8(read_one(cur).map_err(SchemaError::Codec)? as i8),
            FieldKind::I16 => Value::I16(i16::from_le_bytes(read_n(cur, 2)?.try_into().unwrap())),
            FieldKind::I32 => Value::I32(i32::from_le_bytes(read_n(cur, 4)?.try_into().unwrap())),
            FieldKind::I64 => Value::I64(i64::from_le_bytes(read_n(cur, 8)?.try_into().unwrap())),
            FieldKind::Vi => Value::Vi(codec::read_varint(cur).map_err(SchemaError::Codec)?),
            FieldKind::Fvi => {
                let (v, _) = codec::read_flag_varint(cur).map_err(SchemaError::Codec)?;
                Value::Fvi(v)
            }
            FieldKind::Str => Value::Str(codec::read_str(cur).map_err(SchemaError::Codec)?),
            FieldKind::Bytes => Value::Bytes(codec::read_bytes(cur).map_err(SchemaError::Codec)?),
            FieldKind::Sha256 => Value::Sha256(HashId::deserialize(cur, 32).map_err(SchemaError::Codec)?),
            FieldKind::Sha256d => {
                Value::Sha256d(HashId::deserialize(cur, 32).map_err(SchemaError::Codec)?)
            }
            FieldKind::Ripmd160 => {
                Value::Ripmd160(HashId::deserialize(cur, 20).map_err(SchemaError::Codec)?)
            }
            FieldKind::Hash160 => {
                Value::Hash160(HashId::deserialize(cur, 20).map_err(SchemaError::Codec)?)
            }
            FieldKind::OutPoint => {
                Value::OutPoint(OutPoint::deserialize_long(cur).map_err(SchemaError::Codec)?)
            }
            FieldKind::SOutPoint => {
                Value::SOutPoint(OutPoint::deserialize_short(cur).map_err(SchemaError::Codec)?)
            }
            FieldKind::PubKey => {
                let bytes = read_n(cur, 33)?;
                let mut arr = [0u8; 33];
                arr.copy_from_slice(bytes);
                Value::PubKey(PubKey::from_bytes(arr))
            }
            FieldKind::Ecdsa => {
                return Err(SchemaError::Validation {
                    reason: "ecdsa field kind has no value representation".into(),
                })
            }
        })
    }

    /// Writes the absence sentinel for this field's kind (see the
    /// table of per-kind sentinels). Only called for kinds where
    /// [`FieldKind::supports_optional`] is true.
    pub fn encode_absent(&self, out: &mut Vec<u8>) -> Result<(), SchemaError> {
        match self.kind {
            FieldKind::Str | FieldKind::Bytes => out.push(0x00),
            FieldKind::Fvi => out.push(codec::EOF),
            FieldKind::Sha256 | FieldKind::Sha256d => codec::write_zero_pad(out, 32),
            FieldKind::Ripmd160 | FieldKind::Hash160 => codec::write_zero_pad(out, 20),
            FieldKind::PubKey => out.push(0x00),
            other => {
                return Err(SchemaError::Validation {
                    reason: format!("field kind {other} has no absence sentinel"),
                })
            }
        }
        Ok(())
    }

    /// Reads either an absence sentinel or a present value for an
    /// optional-bound field, returning `None` for the former.
    pub fn decode_optional(&self, cur: &mut &[u8]) -> Result<Option<Value>, SchemaError> {
        match self.kind {
            FieldKind::PubKey => Ok(PubKey::deserialize_optional(cur)
                .map_err(SchemaError::Codec)?
                .map(Value::PubKey)),
            FieldKind::Fvi => {
                match codec::read_flag_varint_token(cur).map_err(SchemaError::Codec)? {
                    codec::FlagToken::Eof => Ok(None),
                    codec::FlagToken::Value(v, _) => Ok(Some(Value::Fvi(v))),
                    codec::FlagToken::Eol => Err(SchemaError::Codec(CodecError::FixedWidthMismatch {
                        expected: 1,
                        found: 0,
                    })),
                }
            }
            FieldKind::Str | FieldKind::Bytes => {
                let bytes = codec::read_bytes(cur).map_err(SchemaError::Codec)?;
                if bytes.is_empty() {
                    Ok(None)
                } else if self.kind == FieldKind::Str {
                    Ok(Some(Value::Str(String::from_utf8(bytes).map_err(CodecError::from)?)))
                } else {
                    Ok(Some(Value::Bytes(bytes)))
                }
            }
            FieldKind::Sha256 | FieldKind::Sha256d | FieldKind::Ripmd160 | FieldKind::Hash160 => {
                let len = if matches!(self.kind, FieldKind::Sha256 | FieldKind::Sha256d) {
                    32
                } else {
                    20
                };
                let id = HashId::deserialize(cur, len).map_err(SchemaError::Codec)?;
                if id.is_zero() {
                    Ok(None)
                } else {
                    Ok(Some(match self.kind {
                        FieldKind::Sha256 => Value::Sha256(id),
                        FieldKind::Sha256d => Value::Sha256d(id),
                        FieldKind::Ripmd160 => Value::Ripmd160(id),
                        FieldKind::Hash160 => Value::Hash160(id),
                        _ => unreachable!(),
                    }))
                }
            }
            other => Err(SchemaError::Validation {
                reason: format!("field kind {other} cannot be optional"),
            }),
        }
    }
}

fn read_one(cur: &mut &[u8]) -> Result<u8, CodecError> {
    if cur.is_empty() {
        return Err(CodecError::UnexpectedEof { offset: 0, needed: 1 });
    }
    let b = cur[0];
    *cur = &cur[1..];
    Ok(b)
}

fn read_n<'a>(cur: &mut &'a [u8], n: usize) -> Result<&'a [u8], SchemaError> {
    if cur.len() < n {
        return Err(SchemaError::Codec(CodecError::UnexpectedEof {
            offset: 0,
            needed: n - cur.len(),
        }));
    }
    let (head, tail) = cur.split_at(n);
    *cur = tail;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_round_trips() {
        let ft = FieldType::new("title", FieldKind::Str);
        let mut buf = Vec::new();
        ft.serialize(&mut buf);
        let mut cur = buf.as_slice();
        assert_eq!(FieldType::deserialize(&mut cur).unwrap(), ft);
    }

    #[test]
    fn str_value_round_trips() {
        let ft = FieldType::new("title", FieldKind::Str);
        let mut buf = Vec::new();
        ft.encode_value(&mut buf, &Value::Str("hello".into())).unwrap();
        let mut cur = buf.as_slice();
        assert_eq!(ft.decode_value(&mut cur).unwrap(), Value::Str("hello".into()));
    }

    #[test]
    fn fixed_width_kind_rejects_optional() {
        assert!(!FieldKind::U64.supports_optional());
        assert!(FieldKind::Str.supports_optional());
    }

    #[test]
    fn optional_str_absent_round_trip() {
        let ft = FieldType::new("note", FieldKind::Str);
        let mut buf = Vec::new();
        ft.encode_absent(&mut buf).unwrap();
        let mut cur = buf.as_slice();
        assert_eq!(ft.decode_optional(&mut cur).unwrap(), None);
    }

    #[test]
    fn optional_fvi_absent_round_trip() {
        let ft = FieldType::new("amount", FieldKind::Fvi);
        let mut buf = Vec::new();
        ft.encode_absent(&mut buf).unwrap();
        assert_eq!(buf, vec![codec::EOF]);
        let mut cur = buf.as_slice();
        assert_eq!(ft.decode_optional(&mut cur).unwrap(), None);
    }

    #[test]
    fn optional_pubkey_present_not_confused_with_absent() {
        let ft = FieldType::new("signer", FieldKind::PubKey);
        let key = Value::PubKey(PubKey::from_bytes([9u8; 33]));
        let mut buf = Vec::new();
        match &key {
            Value::PubKey(k) => PubKey::serialize_optional(Some(k), &mut buf),
            _ => unreachable!(),
        }
        let mut cur = buf.as_slice();
        assert_eq!(ft.decode_optional(&mut cur).unwrap(), Some(key));
    }
}
