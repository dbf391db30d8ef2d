//! A seal: the earmarked output a proof transfers state onto, bound
//! to a schema's seal type by name.

use crate::error::SchemaError;
use crate::ident::OutPoint;
use crate::schema::Schema;

/// One seal belonging to a proof.
#[derive(Debug, Clone, PartialEq)]
pub struct Seal {
    pub type_name: String,
    pub outpoint: OutPoint,
    pub seal_type_index: Option<usize>,
    pub amount: Option<u64>,
}

impl Seal {
    /// Builds a seal from its structured (human-authored) state,
    /// resolving the seal type name against `schema`.
    pub fn from_dict_state(
        type_name: impl Into<String>,
        outpoint: OutPoint,
        amount: Option<u64>,
        schema: &Schema,
    ) -> Result<Self, SchemaError> {
        let type_name = type_name.into();
        let (index, seal_type) = schema
            .seal_type_by_name(&type_name)
            .ok_or_else(|| SchemaError::UnknownSealType(type_name.clone()))?;
        if matches!(seal_type.kind, crate::sealtype::SealKind::Balance) && amount.is_none() {
            return Err(SchemaError::Validation {
                reason: format!("seal type '{type_name}' requires an amount"),
            });
        }
        Ok(Self { type_name, outpoint, seal_type_index: Some(index), amount })
    }

    pub fn is_resolved(&self) -> bool {
        self.seal_type_index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldtype::{FieldKind, FieldType};
    use crate::ident::{HashId, SemVer};
    use crate::prooftype::ProofType;
    use crate::sealtype::{SealKind, SealType};
    use crate::typeref::{Bounds, TypeRef};

    fn schema() -> Schema {
        let mut s = Schema::new("Asset", SemVer::new(1, 0, 0));
        s.field_types.push(FieldType::new("title", FieldKind::Str));
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
    fn resolves_seal_by_name() {
        let schema = schema();
        let op = OutPoint::new(HashId::sha256d(b"tx"), 0);
        let seal = Seal::from_dict_state("holder", op, Some(1000), &schema).unwrap();
        assert_eq!(seal.seal_type_index, Some(0));
        assert_eq!(seal.amount, Some(1000));
    }

    #[test]
    fn balance_seal_without_amount_is_an_error() {
        let schema = schema();
        let op = OutPoint::new(HashId::sha256d(b"tx"), 0);
        assert!(Seal::from_dict_state("holder", op, None, &schema).is_err());
    }
}
