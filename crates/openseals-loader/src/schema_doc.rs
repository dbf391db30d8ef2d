//! Structured (YAML/JSON) schema documents → [`openseals_core::Schema`].
//!
//! Mirrors the CSDL parser's shape: a raw serde struct using
//! `IndexMap` to preserve declaration order (order matters here the
//! same way it matters for CSDL field ordering — it becomes on-wire
//! type-table order), translated field-by-field into the owned core
//! types.

use indexmap::IndexMap;
use openseals_core::ident::SemVer;
use openseals_core::prooftype::ProofType;
use openseals_core::schema::Schema;
use openseals_core::sealtype::{SealKind, SealType};
use openseals_core::typeref::{Bounds, TypeRef};
use openseals_core::{FieldKind, FieldType};
use serde::Deserialize;

use crate::error::LoaderError;
use crate::ident::parse_hash_id;

#[derive(Debug, Deserialize)]
struct SchemaRaw {
    name: String,
    schema_ver: String,
    #[serde(default)]
    prev_schema: Option<String>,
    field_types: IndexMap<String, String>,
    seal_types: IndexMap<String, String>,
    proof_types: IndexMap<String, ProofTypeRaw>,
}

#[derive(Debug, Deserialize)]
struct ProofTypeRaw {
    #[serde(default)]
    fields: IndexMap<String, String>,
    #[serde(default)]
    seals: IndexMap<String, String>,
    #[serde(default)]
    unseals: Option<IndexMap<String, String>>,
}

/// Parses a schema document from YAML text.
pub fn parse_yaml(text: &str) -> Result<Schema, LoaderError> {
    let raw: SchemaRaw = serde_yaml::from_str(text)?;
    build(raw)
}

/// Parses a schema document from JSON text.
pub fn parse_json(text: &str) -> Result<Schema, LoaderError> {
    let raw: SchemaRaw = serde_json::from_str(text)?;
    build(raw)
}

fn build(raw: SchemaRaw) -> Result<Schema, LoaderError> {
    let version: SemVer = raw
        .schema_ver
        .parse()
        .map_err(|e: String| LoaderError::InvalidIdentifier { value: raw.schema_ver.clone(), reason: e })?;

    let mut schema = Schema::new(raw.name, version);
    if let Some(prev) = raw.prev_schema {
        schema.prev_schema = parse_hash_id(&prev)?;
    }

    for (name, kind) in &raw.field_types {
        let kind: FieldKind = kind.parse().map_err(LoaderError::Schema)?;
        schema.field_types.push(FieldType::new(name.clone(), kind));
    }
    for (name, kind) in &raw.seal_types {
        let kind: SealKind = kind.parse().map_err(LoaderError::Schema)?;
        schema.seal_types.push(SealType::new(name.clone(), kind));
    }

    for (name, pt) in raw.proof_types {
        let fields = parse_refs(&pt.fields)?;
        let seals = parse_refs(&pt.seals)?;
        let mut proof_type = ProofType::new(name, fields, seals);
        if let Some(unseals) = &pt.unseals {
            proof_type = proof_type.with_unseals(parse_refs(unseals)?);
        }
        schema.proof_types.push(proof_type);
    }

    schema.resolve()?;
    schema.validate()?;
    Ok(schema)
}

fn parse_refs(map: &IndexMap<String, String>) -> Result<Vec<TypeRef>, LoaderError> {
    let mut refs = Vec::with_capacity(map.len());
    for (ref_name, bounds) in map {
        let bounds: Bounds = bounds.parse().map_err(LoaderError::Schema)?;
        refs.push(TypeRef::new(ref_name.clone(), bounds));
    }
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
name: Asset
schema_ver: "1.0.0"
field_types:
  title: str
  amount: u64
seal_types:
  holder: balance
proof_types:
  issue:
    fields:
      title: single
    seals:
      holder: many
  transfer:
    fields: {}
    seals:
      holder: many
    unseals:
      holder: many
"#;

    #[test]
    fn parses_minimal_schema() {
        let schema = parse_yaml(SAMPLE).unwrap();
        assert_eq!(schema.name, "Asset");
        assert_eq!(schema.field_types.len(), 2);
        assert_eq!(schema.proof_types.len(), 2);
    }

    #[test]
    fn field_type_order_is_preserved() {
        let schema = parse_yaml(SAMPLE).unwrap();
        assert_eq!(schema.field_types[0].name, "title");
        assert_eq!(schema.field_types[1].name, "amount");
    }

    #[test]
    fn rejects_non_root_proof_type_missing_unseals() {
        let bad = SAMPLE.replace("    unseals:\n      holder: many\n", "");
        assert!(parse_yaml(&bad).is_err());
    }
}
