//! Structured (YAML/JSON) proof documents → [`openseals_core::Proof`].

use indexmap::IndexMap;
use openseals_core::ident::{OutPoint, PubKey};
use openseals_core::metafield::{parse_outpoint, MetaField};
use openseals_core::proof::{Proof, ProofFormat};
use openseals_core::ProofError;
use openseals_core::schema::Schema;
use openseals_core::seal::Seal;
use serde::Deserialize;

use crate::error::LoaderError;
use crate::ident::parse_hash_id;

#[derive(Debug, Deserialize)]
struct ProofRaw {
    ver: u64,
    format: String,
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    network: Option<u16>,
    #[serde(default)]
    root: Option<String>,
    type_name: String,
    #[serde(default)]
    pubkey: Option<String>,
    #[serde(default)]
    parents: Option<Vec<String>>,
    #[serde(default)]
    txid: Option<String>,
    #[serde(default)]
    fields: IndexMap<String, String>,
    #[serde(default)]
    seals: Vec<SealRaw>,
}

#[derive(Debug, Deserialize)]
struct SealRaw {
    type_name: String,
    outpoint: String,
    #[serde(default)]
    amount: Option<u64>,
}

/// Parses a proof document from YAML text, resolving every named
/// reference against `schema`.
pub fn parse_yaml(text: &str, schema: &Schema) -> Result<Proof, LoaderError> {
    let raw: ProofRaw = serde_yaml::from_str(text)?;
    build(raw, schema)
}

/// Parses a proof document from JSON text, resolving every named
/// reference against `schema`.
pub fn parse_json(text: &str, schema: &Schema) -> Result<Proof, LoaderError> {
    let raw: ProofRaw = serde_json::from_str(text)?;
    build(raw, schema)
}

fn build(raw: ProofRaw, schema: &Schema) -> Result<Proof, LoaderError> {
    let format = match raw.format.as_str() {
        "root" => {
            let network = raw.network.ok_or(LoaderError::MissingKey("network"))?;
            ProofFormat::Root { network }
        }
        "upgrade" => ProofFormat::Upgrade,
        "ordinary" => ProofFormat::Ordinary,
        other => {
            return Err(LoaderError::InvalidIdentifier {
                value: other.to_string(),
                reason: "format must be one of root, upgrade, ordinary".into(),
            })
        }
    };

    if raw.root.is_some() && !matches!(format, ProofFormat::Root { .. }) {
        return Err(LoaderError::Proof(ProofError::ExtraField {
            field: "root",
            context: "non-root proof document",
        }));
    }

    let schema_id = raw.schema.as_deref().map(parse_hash_id).transpose()?;
    let root: Option<OutPoint> = raw
        .root
        .as_deref()
        .map(|s| parse_outpoint(s).map_err(LoaderError::Schema))
        .transpose()?;

    let (type_no, _) = schema
        .proof_type_by_name(&raw.type_name)
        .ok_or_else(|| openseals_core::SchemaError::UnknownProofType(raw.type_name.clone()))?;

    let pubkey = raw
        .pubkey
        .as_deref()
        .map(|s| -> Result<PubKey, LoaderError> {
            let bytes = hex::decode(s)
                .map_err(|_| LoaderError::InvalidIdentifier { value: s.to_string(), reason: "invalid hex".into() })?;
            let arr: [u8; 33] = bytes
                .try_into()
                .map_err(|_| LoaderError::InvalidIdentifier { value: s.to_string(), reason: "expected 33 bytes".into() })?;
            Ok(PubKey::from_bytes(arr))
        })
        .transpose()?;

    let parents = raw
        .parents
        .map(|ps| ps.iter().map(|s| parse_hash_id(s)).collect::<Result<Vec<_>, _>>())
        .transpose()?;
    let txid = raw.txid.as_deref().map(parse_hash_id).transpose()?;

    let fields = raw
        .fields
        .iter()
        .map(|(name, value)| MetaField::from_str_value(name.clone(), value.clone(), schema))
        .collect::<Result<Vec<_>, _>>()?;

    let seals = raw
        .seals
        .into_iter()
        .map(|s| {
            let outpoint = parse_outpoint(&s.outpoint)?;
            Seal::from_dict_state(s.type_name, outpoint, s.amount, schema)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let proof = Proof {
        ver: raw.ver,
        format,
        schema: schema_id,
        root,
        type_no: type_no as u8,
        pubkey,
        seals,
        fields,
        parents,
        txid,
        raw_state: Vec::new(),
        raw_metadata: Vec::new(),
    };
    proof.validate()?;
    Ok(proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_doc;

    const SCHEMA: &str = r#"
name: Asset
schema_ver: "1.0.0"
field_types:
  title: str
seal_types:
  holder: balance
proof_types:
  issue:
    fields:
      title: single
    seals:
      holder: many
"#;

    const PROOF: &str = r#"
ver: 1
format: root
schema: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
network: 1
root: "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb:0"
type_name: issue
fields:
  title: "Gold Bar"
seals:
  - type_name: holder
    outpoint: "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc:1"
    amount: 1000
"#;

    #[test]
    fn parses_root_proof_against_schema() {
        let schema = schema_doc::parse_yaml(SCHEMA).unwrap();
        let proof = parse_yaml(PROOF, &schema).unwrap();
        assert_eq!(proof.ver, 1);
        assert_eq!(proof.seals[0].amount, Some(1000));
        assert_eq!(proof.fields[0].value_str.as_deref(), Some("Gold Bar"));
    }

    #[test]
    fn round_trips_through_wire_after_parsing() {
        let schema = schema_doc::parse_yaml(SCHEMA).unwrap();
        let proof = parse_yaml(PROOF, &schema).unwrap();
        let bytes = proof.serialize(&schema).unwrap();
        let decoded = openseals_core::Proof::decode(&mut bytes.as_slice(), Some(&schema)).unwrap();
        assert_eq!(decoded.serialize(&schema).unwrap(), bytes);
    }

    #[test]
    fn rejects_root_field_on_non_root_document() {
        let schema = schema_doc::parse_yaml(SCHEMA).unwrap();
        let text = PROOF.replace("format: root", "format: ordinary");
        let err = parse_yaml(&text, &schema).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Proof(openseals_core::ProofError::ExtraField { field: "root", .. })
        ));
    }

    #[test]
    fn rejects_txid_without_parents() {
        let schema = schema_doc::parse_yaml(SCHEMA).unwrap();
        let text = format!(
            "{PROOF}txid: \"dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd\"\n"
        );
        let err = parse_yaml(&text, &schema).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Proof(openseals_core::ProofError::InconsistentPruning)
        ));
    }
}
