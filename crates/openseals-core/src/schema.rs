//! The schema: an ordered aggregation of field, seal, and proof type
//! tables, with internal name-to-index resolution, validation, and a
//! canonical serialization whose digest is the schema's identity.

use crate::codec;
use crate::error::SchemaError;
use crate::fieldtype::FieldType;
use crate::ident::{HashId, SemVer};
use crate::prooftype::ProofType;
use crate::sealtype::SealType;
use crate::typeref::TypeRef;

/// A versioned data-definition document: the field, seal, and proof
/// type tables legal under it.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub version: SemVer,
    pub prev_schema: HashId,
    pub field_types: Vec<FieldType>,
    pub seal_types: Vec<SealType>,
    pub proof_types: Vec<ProofType>,
}

impl Schema {
    pub fn new(name: impl Into<String>, version: SemVer) -> Self {
        Self {
            name: name.into(),
            version,
            prev_schema: HashId::zero(32),
            field_types: Vec::new(),
            seal_types: Vec::new(),
            proof_types: Vec::new(),
        }
    }

    /// Canonical serialization, per the fixed field order:
    /// name, version, prev_schema, field_types, seal_types, proof_types.
    pub fn serialize(&self) -> Result<Vec<u8>, SchemaError> {
        let mut out = Vec::new();
        codec::write_str(&mut out, &self.name);
        self.version.serialize(&mut out);
        if self.prev_schema.len() != 32 {
            return Err(SchemaError::Validation { reason: "prev_schema must be 32 bytes".into() });
        }
        self.prev_schema.serialize(&mut out);
        codec::write_vector(&mut out, &self.field_types, |o, ft| ft.serialize(o));
        codec::write_vector(&mut out, &self.seal_types, |o, st| st.serialize(o));

        codec::write_varint(&mut out, self.proof_types.len() as u64);
        for pt in &self.proof_types {
            pt.serialize(&mut out)?;
        }
        Ok(out)
    }

    pub fn deserialize(cur: &mut &[u8]) -> Result<Self, SchemaError> {
        let name = codec::read_str(cur).map_err(SchemaError::Codec)?;
        let version = SemVer::deserialize(cur).map_err(SchemaError::Codec)?;
        let prev_schema = HashId::deserialize(cur, 32).map_err(SchemaError::Codec)?;

        let field_types = codec::read_vector(cur, FieldType::deserialize)?;
        let seal_types = codec::read_vector(cur, SealType::deserialize)?;

        let count = codec::read_varint(cur).map_err(SchemaError::Codec)?;
        let mut proof_types = Vec::with_capacity(count.min(4096) as usize);
        for i in 0..count {
            proof_types.push(ProofType::deserialize(cur, i != 0)?);
        }

        let mut schema = Self { name, version, prev_schema, field_types, seal_types, proof_types };
        schema.resolve()?;
        Ok(schema)
    }

    /// Binds every [`TypeRef`] in every proof type to its target in
    /// the field- or seal-type table, filling in whichever of
    /// `ref_name`/`type_index` is missing and checking consistency
    /// when both are present. Idempotent.
    pub fn resolve(&mut self) -> Result<(), SchemaError> {
        let field_types = self.field_types.clone();
        let seal_types = self.seal_types.clone();
        for pt in &mut self.proof_types {
            for r in pt.fields.iter_mut() {
                resolve_ref(r, &field_types, "fields", |t| &t.name)?;
            }
            if let Some(unseals) = pt.unseals.as_mut() {
                for r in unseals.iter_mut() {
                    resolve_ref(r, &seal_types, "unseals", |t| &t.name)?;
                }
            }
            for r in pt.seals.iter_mut() {
                resolve_ref(r, &seal_types, "seals", |t| &t.name)?;
            }
        }
        Ok(())
    }

    /// Schema-level structural invariants, checked independently of
    /// resolution.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.proof_types.is_empty() {
            return Err(SchemaError::Validation { reason: "schema declares no proof types".into() });
        }
        for (i, pt) in self.proof_types.iter().enumerate() {
            if i == 0 {
                if pt.unseals.is_some() {
                    return Err(SchemaError::Validation {
                        reason: format!("root proof type '{}' must not declare unseals", pt.name),
                    });
                }
            } else if pt.unseals.is_none() {
                return Err(SchemaError::Validation {
                    reason: format!("non-root proof type '{}' must declare unseals", pt.name),
                });
            }
            for r in &pt.fields {
                if r.bounds == crate::typeref::Bounds::Optional {
                    let idx = r.type_index.ok_or_else(|| SchemaError::InternalReference {
                        kind: "field",
                        name: r.ref_name.clone(),
                        section: format!("proof type '{}'", pt.name),
                    })?;
                    let ft = self.field_types.get(idx).ok_or_else(|| SchemaError::InternalReference {
                        kind: "field",
                        name: r.ref_name.clone(),
                        section: format!("proof type '{}'", pt.name),
                    })?;
                    if !ft.kind.supports_optional() {
                        return Err(SchemaError::Validation {
                            reason: format!(
                                "field '{}' of kind {} cannot be declared optional",
                                ft.name, ft.kind
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn field_type_by_name(&self, name: &str) -> Option<(usize, &FieldType)> {
        self.field_types.iter().enumerate().find(|(_, t)| t.name == name)
    }

    pub fn seal_type_by_name(&self, name: &str) -> Option<(usize, &SealType)> {
        self.seal_types.iter().enumerate().find(|(_, t)| t.name == name)
    }

    pub fn proof_type_by_name(&self, name: &str) -> Option<(usize, &ProofType)> {
        self.proof_types.iter().enumerate().find(|(_, t)| t.name == name)
    }

    /// The schema's content-addressed identity: sha-256d of its
    /// canonical serialization.
    pub fn digest(&self) -> Result<HashId, SchemaError> {
        Ok(HashId::sha256d(&self.serialize()?))
    }
}

fn resolve_ref<T>(
    r: &mut TypeRef,
    table: &[T],
    section: &'static str,
    name_of: impl Fn(&T) -> &String,
) -> Result<(), SchemaError> {
    match r.type_index {
        Some(idx) => {
            let target = table.get(idx).ok_or_else(|| SchemaError::InternalReference {
                kind: "type",
                name: r.ref_name.clone(),
                section: section.into(),
            })?;
            if r.ref_name.is_empty() {
                r.ref_name = name_of(target).clone();
            } else if &r.ref_name != name_of(target) {
                return Err(SchemaError::InternalReference {
                    kind: "type",
                    name: r.ref_name.clone(),
                    section: section.into(),
                });
            }
        }
        None => {
            let idx = table.iter().position(|t| name_of(t) == &r.ref_name).ok_or_else(|| {
                SchemaError::InternalReference {
                    kind: "type",
                    name: r.ref_name.clone(),
                    section: section.into(),
                }
            })?;
            r.type_index = Some(idx);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldtype::FieldKind;
    use crate::sealtype::SealKind;
    use crate::typeref::Bounds;

    fn minimal_schema() -> Schema {
        let mut schema = Schema::new("Asset", SemVer::new(1, 0, 0));
        schema.field_types.push(FieldType::new("title", FieldKind::Str));
        schema.seal_types.push(SealType::new("holder", SealKind::Balance));
        schema.proof_types.push(ProofType::new(
            "issue",
            vec![TypeRef::new("title", Bounds::Single)],
            vec![TypeRef::new("holder", Bounds::Many)],
        ));
        schema
    }

    #[test]
    fn resolve_binds_names_to_indices() {
        let mut schema = minimal_schema();
        schema.resolve().unwrap();
        assert_eq!(schema.proof_types[0].fields[0].type_index, Some(0));
        assert_eq!(schema.proof_types[0].seals[0].type_index, Some(0));
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut schema = minimal_schema();
        schema.resolve().unwrap();
        let after_first = schema.clone();
        schema.resolve().unwrap();
        assert_eq!(schema, after_first);
    }

    #[test]
    fn validate_rejects_schema_without_proof_types() {
        let schema = Schema::new("Empty", SemVer::new(1, 0, 0));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_root_without_unseals() {
        let mut schema = minimal_schema();
        schema.proof_types.push(ProofType::new("transfer", vec![], vec![]));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn schema_round_trips_through_wire() {
        let mut schema = minimal_schema();
        schema.resolve().unwrap();
        schema.validate().unwrap();
        let bytes = schema.serialize().unwrap();
        let decoded = Schema::deserialize(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded.name, schema.name);
        assert_eq!(decoded.serialize().unwrap(), bytes);
    }

    #[test]
    fn digest_is_stable_across_builds() {
        let mut a = minimal_schema();
        a.resolve().unwrap();
        let mut b = minimal_schema();
        b.resolve().unwrap();
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    }
}
