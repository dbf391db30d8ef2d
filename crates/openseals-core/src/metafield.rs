//! Schema-bound metadata values: a [`MetaField`] carries both the
//! structured (human-authored) string form and the typed, wire-ready
//! form of one field instance, plus a back-reference to the schema
//! [`FieldType`] it was resolved against.

use crate::error::SchemaError;
use crate::fieldtype::{FieldKind, FieldType};
use crate::ident::{HashId, OutPoint, PubKey};
use crate::schema::Schema;
use crate::value::Value;

/// One field value belonging to a proof, bound to a schema's field
/// type by name.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaField {
    pub type_name: String,
    pub value_str: Option<String>,
    pub value_typed: Option<Value>,
    pub field_type_index: Option<usize>,
}

impl MetaField {
    /// Builds a field from its human-authored string form, resolving
    /// and parsing it against `schema` immediately.
    pub fn from_str_value(
        type_name: impl Into<String>,
        value_str: impl Into<String>,
        schema: &Schema,
    ) -> Result<Self, SchemaError> {
        let type_name = type_name.into();
        let value_str = value_str.into();
        let (index, ft) = schema
            .field_type_by_name(&type_name)
            .ok_or_else(|| SchemaError::UnknownFieldType(type_name.clone()))?;
        let value_typed = parse_field_value(ft, &value_str)?;
        Ok(Self {
            type_name,
            value_str: Some(value_str),
            value_typed: Some(value_typed),
            field_type_index: Some(index),
        })
    }

    /// Builds a field directly from an already-typed value, resolving
    /// its name/index against `schema`.
    pub fn from_value(
        type_name: impl Into<String>,
        value: Value,
        schema: &Schema,
    ) -> Result<Self, SchemaError> {
        let type_name = type_name.into();
        let (index, _) = schema
            .field_type_by_name(&type_name)
            .ok_or_else(|| SchemaError::UnknownFieldType(type_name.clone()))?;
        Ok(Self {
            type_name,
            value_str: None,
            value_typed: Some(value),
            field_type_index: Some(index),
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.field_type_index.is_some() && self.value_typed.is_some()
    }
}

/// Parses a human-authored string into a typed value for the given
/// field type. This is the structured-form counterpart to
/// [`FieldType::decode_value`].
pub fn parse_field_value(ft: &FieldType, s: &str) -> Result<Value, SchemaError> {
    let invalid = |reason: String| SchemaError::Validation { reason };
    Ok(match ft.kind {
        FieldKind::U8 => Value::U8(s.parse().map_err(|_| invalid(format!("invalid u8: '{s}'")))?),
        FieldKind::U16 => Value::U16(s.parse().map_err(|_| invalid(format!("invalid u16: '{s}'")))?),
        FieldKind::U32 => Value::U32(s.parse().map_err(|_| invalid(format!("invalid u32: '{s}'")))?),
        FieldKind::U64 | FieldKind::Vi => {
            Value::U64(s.parse().map_err(|_| invalid(format!("invalid integer: '{s}'")))?)
        }
        FieldKind::I8 => Value::I8(s.parse().map_err(|_| invalid(format!("invalid i8: '{s}'")))?),
        FieldKind::I16 => Value::I16(s.parse().map_err(|_| invalid(format!("invalid i16: '{s}'")))?),
        FieldKind::I32 => Value::I32(s.parse().map_err(|_| invalid(format!("invalid i32: '{s}'")))?),
        FieldKind::I64 => Value::I64(s.parse().map_err(|_| invalid(format!("invalid i64: '{s}'")))?),
        FieldKind::Fvi => Value::Fvi(s.parse().map_err(|_| invalid(format!("invalid fvi: '{s}'")))?),
        FieldKind::Str => Value::Str(s.to_string()),
        FieldKind::Bytes => {
            Value::Bytes(hex::decode(s).map_err(|_| invalid(format!("invalid hex bytes: '{s}'")))?)
        }
        FieldKind::Sha256 => Value::Sha256(HashId::from_hex(s).map_err(|_| invalid(format!("invalid sha256: '{s}'")))?),
        FieldKind::Sha256d => {
            Value::Sha256d(HashId::from_hex(s).map_err(|_| invalid(format!("invalid sha256d: '{s}'")))?)
        }
        FieldKind::Ripmd160 => {
            Value::Ripmd160(HashId::from_hex(s).map_err(|_| invalid(format!("invalid ripmd160: '{s}'")))?)
        }
        FieldKind::Hash160 => {
            Value::Hash160(HashId::from_hex(s).map_err(|_| invalid(format!("invalid hash160: '{s}'")))?)
        }
        FieldKind::OutPoint => Value::OutPoint(parse_outpoint(s)?),
        FieldKind::SOutPoint => Value::SOutPoint(parse_outpoint(s)?),
        FieldKind::PubKey => {
            let bytes = hex::decode(s).map_err(|_| invalid(format!("invalid pubkey hex: '{s}'")))?;
            if bytes.len() != 33 {
                return Err(invalid(format!("pubkey must be 33 bytes, got {}", bytes.len())));
            }
            let mut arr = [0u8; 33];
            arr.copy_from_slice(&bytes);
            Value::PubKey(PubKey::from_bytes(arr))
        }
        FieldKind::Ecdsa => return Err(invalid("ecdsa fields have no string form".into())),
    })
}

/// Parses an outpoint from its structured string form: `txid:vout`, or
/// `?:vout` for a short-form outpoint with the txid omitted.
pub fn parse_outpoint(s: &str) -> Result<OutPoint, SchemaError> {
    let (txid, vout) = s
        .rsplit_once(':')
        .ok_or_else(|| SchemaError::Validation { reason: format!("invalid outpoint: '{s}'") })?;
    let vout: u64 = vout
        .parse()
        .map_err(|_| SchemaError::Validation { reason: format!("invalid outpoint vout: '{s}'") })?;
    if txid == "?" {
        return Ok(OutPoint { txid: None, vout });
    }
    let txid = HashId::from_hex(txid)
        .map_err(|_| SchemaError::Validation { reason: format!("invalid outpoint txid: '{s}'") })?;
    Ok(OutPoint { txid: Some(txid), vout })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::SemVer;
    use crate::sealtype::{SealKind, SealType};
    use crate::prooftype::ProofType;
    use crate::typeref::{Bounds, TypeRef};

    fn schema() -> Schema {
        let mut s = Schema::new("Asset", SemVer::new(1, 0, 0));
        s.field_types.push(FieldType::new("title", FieldKind::Str));
        s.field_types.push(FieldType::new("amount", FieldKind::U64));
        s.seal_types.push(SealType::new("holder", SealKind::Balance));
        s.proof_types.push(ProofType::new(
            "issue",
            vec![TypeRef::new("title", Bounds::Single)],
            vec![TypeRef::new("holder", Bounds::Many)],
        ));
        s.resolve().unwrap();
        s
    }

    #[test]
    fn resolves_field_by_name() {
        let schema = schema();
        let mf = MetaField::from_str_value("title", "Gold Bar", &schema).unwrap();
        assert_eq!(mf.value_typed, Some(Value::Str("Gold Bar".into())));
        assert_eq!(mf.field_type_index, Some(0));
    }

    #[test]
    fn parses_integer_field() {
        let schema = schema();
        let mf = MetaField::from_str_value("amount", "42", &schema).unwrap();
        assert_eq!(mf.value_typed, Some(Value::U64(42)));
    }

    #[test]
    fn unknown_field_name_is_an_error() {
        let schema = schema();
        assert!(MetaField::from_str_value("nope", "x", &schema).is_err());
    }

    #[test]
    fn outpoint_parses_long_and_short_forms() {
        let short = parse_outpoint("?:5").unwrap();
        assert_eq!(short.txid, None);
        let hex_txid = "aa".repeat(32);
        let long = parse_outpoint(&format!("{hex_txid}:1")).unwrap();
        assert!(long.txid.is_some());
    }
}
