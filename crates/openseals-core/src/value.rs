//! The typed value carried by a resolved [`crate::fieldtype::FieldType`].

use std::fmt;

use crate::ident::{HashId, OutPoint, PubKey};

/// A value instance of one of the 17 primitive field kinds
/// ([`crate::fieldtype::FieldKind`]). `Ecdsa` is a reserved kind with
/// no value representation: schemas may declare fields of that kind,
/// but no value can be constructed or transcoded for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Vi(u64),
    Fvi(u64),
    Str(String),
    Bytes(Vec<u8>),
    Sha256(HashId),
    Sha256d(HashId),
    Ripmd160(HashId),
    Hash160(HashId),
    OutPoint(OutPoint),
    SOutPoint(OutPoint),
    PubKey(PubKey),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::Vi(v) => write!(f, "{v}"),
            Value::Fvi(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "{}", hex::encode(v)),
            Value::Sha256(v) | Value::Sha256d(v) | Value::Ripmd160(v) | Value::Hash160(v) => {
                write!(f, "{v}")
            }
            Value::OutPoint(v) | Value::SOutPoint(v) => write!(f, "{v}"),
            Value::PubKey(v) => write!(f, "{}", hex::encode(v.as_bytes())),
        }
    }
}
