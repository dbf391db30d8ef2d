//! The proof codec: header (version, optional schema/network/root),
//! body (proof type, seal sequence, sealed-state blob, metadata
//! blob), and tail (optional public key, prunable parent/txid
//! references).

use crate::codec::{self, FlagToken};
use crate::error::{CodecError, ProofError};
use crate::fieldtype::FieldType;
use crate::ident::{HashId, OutPoint, PubKey};
use crate::metafield::MetaField;
use crate::schema::Schema;
use crate::seal::Seal;
use crate::typeref::Bounds;

/// The header shape a proof carries. `Ordinary` proofs (including
/// burns, which are `Ordinary`/`Upgrade` proofs with zero seals) carry
/// no schema section at all — they are decoded in the context of a
/// schema already known to the caller from the proof's ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofFormat {
    Root { network: u16 },
    Upgrade,
    Ordinary,
}

impl ProofFormat {
    fn has_schema_section(self) -> bool {
        !matches!(self, ProofFormat::Ordinary)
    }
}

/// A single proof instance under a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Proof {
    pub ver: u64,
    pub format: ProofFormat,
    /// Present iff `format` carries a schema section. All-zero means
    /// "schema unchanged" on an `Upgrade` proof.
    pub schema: Option<HashId>,
    /// Present only for `Root`.
    pub root: Option<OutPoint>,
    pub type_no: u8,
    pub pubkey: Option<PubKey>,
    pub seals: Vec<Seal>,
    pub fields: Vec<MetaField>,
    pub parents: Option<Vec<HashId>>,
    pub txid: Option<HashId>,
    pub raw_state: Vec<u8>,
    pub raw_metadata: Vec<u8>,
}

impl Proof {
    pub fn is_burn(&self) -> bool {
        self.seals.is_empty()
    }

    pub fn is_pruned(&self) -> bool {
        self.txid.is_none() && self.parents.is_none()
    }

    pub fn serialize(&self, schema: &Schema) -> Result<Vec<u8>, ProofError> {
        self.validate()?;
        let mut out = Vec::new();
        self.serialize_header(&mut out)?;
        self.serialize_body(&mut out, schema)?;
        self.serialize_tail(&mut out);
        Ok(out)
    }

    fn serialize_header(&self, out: &mut Vec<u8>) -> Result<(), ProofError> {
        let has_section = self.format.has_schema_section();
        codec::write_flag_varint(out, self.ver, has_section).map_err(ProofError::Codec)?;
        if has_section {
            let schema_id = self
                .schema
                .clone()
                .unwrap_or_else(|| HashId::zero(32));
            schema_id.serialize(out);
            match self.format {
                ProofFormat::Root { network } => codec::write_varint(out, network as u64),
                ProofFormat::Upgrade => codec::write_varint(out, 0),
                ProofFormat::Ordinary => unreachable!(),
            }
            if let ProofFormat::Root { .. } = self.format {
                let root = self.root.as_ref().ok_or(ProofError::MissingRequired {
                    field: "root",
                    context: "root proof header",
                })?;
                root.serialize_long(out).map_err(ProofError::Codec)?;
            }
        }
        Ok(())
    }

    fn serialize_body(&self, out: &mut Vec<u8>, schema: &Schema) -> Result<(), ProofError> {
        out.push(self.type_no);

        let proof_type = schema
            .proof_types
            .get(self.type_no as usize)
            .ok_or(ProofError::ProofTypeOutOfRange {
                index: self.type_no,
                available: schema.proof_types.len(),
            })?;

        let mut sorted: Vec<&Seal> = self.seals.iter().collect();
        sorted.sort_by_key(|s| s.seal_type_index.unwrap_or(usize::MAX));

        let mut current = 0usize;
        for seal in &sorted {
            let idx = seal.seal_type_index.ok_or(ProofError::MissingRequired {
                field: "seal_type_index",
                context: "seal sequence",
            })?;
            while current < idx {
                out.push(codec::EOL);
                current += 1;
            }
            seal.outpoint.serialize_short(out).map_err(ProofError::Codec)?;
        }
        out.push(codec::EOF);

        let mut state_buf = Vec::new();
        for seal in &sorted {
            let idx = seal.seal_type_index.unwrap();
            let seal_type = schema.seal_types.get(idx).ok_or_else(|| {
                ProofError::Schema(crate::error::SchemaError::UnknownSealType(seal.type_name.clone()))
            })?;
            seal_type.encode_state(&mut state_buf, seal.amount)?;
        }
        codec::write_bytes(out, &state_buf);

        let mut meta_buf = Vec::new();
        for field_ref in &proof_type.fields {
            let idx = field_ref.type_index.ok_or(ProofError::MissingRequired {
                field: "field_type_index",
                context: "proof type field list",
            })?;
            let ft = schema.field_types.get(idx).ok_or_else(|| {
                ProofError::Schema(crate::error::SchemaError::UnknownFieldType(
                    field_ref.ref_name.clone(),
                ))
            })?;
            let matching: Vec<&MetaField> = self
                .fields
                .iter()
                .filter(|f| f.field_type_index == Some(idx))
                .collect();
            encode_field_group(&mut meta_buf, ft, field_ref.bounds, &matching)?;
        }
        codec::write_bytes(out, &meta_buf);

        Ok(())
    }

    fn serialize_tail(&self, out: &mut Vec<u8>) {
        PubKey::serialize_optional(self.pubkey.as_ref(), out);
        let mut flag = 0u8;
        if self.txid.is_some() {
            flag |= 0x01;
        }
        if self.parents.is_some() {
            flag |= 0x02;
        }
        out.push(flag);
        if let Some(txid) = &self.txid {
            txid.serialize(out);
        }
        if let Some(parents) = &self.parents {
            codec::write_vector(out, parents, |o, p| p.serialize(o));
        }
    }

    /// Decodes a proof. When `schema` is supplied, seal amounts and
    /// metadata fields are reconstituted into typed values; otherwise
    /// only the header, seal outpoints/type indices, and raw state/
    /// metadata blobs are recovered.
    pub fn decode(cur: &mut &[u8], schema: Option<&Schema>) -> Result<Self, ProofError> {
        let (ver, has_section) = codec::read_flag_varint(cur).map_err(ProofError::Codec)?;
        let mut schema_id = None;
        let mut root = None;
        let format;
        if has_section {
            let id = HashId::deserialize(cur, 32).map_err(ProofError::Codec)?;
            let network = codec::read_varint(cur).map_err(ProofError::Codec)?;
            schema_id = Some(id);
            if network == 0 {
                format = ProofFormat::Upgrade;
            } else {
                format = ProofFormat::Root { network: network as u16 };
                root = Some(OutPoint::deserialize_long(cur).map_err(ProofError::Codec)?);
            }
        } else {
            format = ProofFormat::Ordinary;
        }

        if cur.is_empty() {
            return Err(ProofError::Codec(CodecError::UnexpectedEof { offset: 0, needed: 1 }));
        }
        let type_no = cur[0];
        *cur = &cur[1..];

        let mut seals = Vec::new();
        let mut current_type = 0usize;
        loop {
            match codec::read_flag_varint_token(cur).map_err(ProofError::Codec)? {
                FlagToken::Eol => current_type += 1,
                FlagToken::Eof => break,
                token @ FlagToken::Value(..) => {
                    let outpoint = OutPoint::from_token(token, cur).map_err(ProofError::Codec)?;
                    let type_name = schema
                        .and_then(|s| s.seal_types.get(current_type))
                        .map(|t| t.name.clone())
                        .unwrap_or_default();
                    seals.push(Seal {
                        type_name,
                        outpoint,
                        seal_type_index: Some(current_type),
                        amount: None,
                    });
                }
            }
        }

        let raw_state = codec::read_bytes(cur).map_err(ProofError::Codec)?;
        if let Some(schema) = schema {
            let mut state_cur = raw_state.as_slice();
            for seal in &mut seals {
                let idx = seal.seal_type_index.unwrap();
                let seal_type = schema.seal_types.get(idx).ok_or_else(|| {
                    ProofError::Schema(crate::error::SchemaError::UnknownSealType(
                        seal.type_name.clone(),
                    ))
                })?;
                seal.amount = seal_type.decode_state(&mut state_cur)?;
            }
        }

        let raw_metadata = codec::read_bytes(cur).map_err(ProofError::Codec)?;
        let mut fields = Vec::new();
        if let Some(schema) = schema {
            let proof_type = schema.proof_types.get(type_no as usize).ok_or(
                ProofError::ProofTypeOutOfRange { index: type_no, available: schema.proof_types.len() },
            )?;
            let mut meta_cur = raw_metadata.as_slice();
            for field_ref in &proof_type.fields {
                let idx = field_ref.type_index.ok_or(ProofError::MissingRequired {
                    field: "field_type_index",
                    context: "proof type field list",
                })?;
                let ft = schema.field_types.get(idx).ok_or_else(|| {
                    ProofError::Schema(crate::error::SchemaError::UnknownFieldType(
                        field_ref.ref_name.clone(),
                    ))
                })?;
                decode_field_group(&mut meta_cur, ft, field_ref.bounds, idx, &mut fields)?;
            }
            if !meta_cur.is_empty() {
                return Err(ProofError::UnparsedTrailing(meta_cur.len()));
            }
        }

        let pubkey = PubKey::deserialize_optional(cur).map_err(ProofError::Codec)?;
        if cur.is_empty() {
            return Err(ProofError::Codec(CodecError::UnexpectedEof { offset: 0, needed: 1 }));
        }
        let prunable = cur[0];
        *cur = &cur[1..];
        let txid = if prunable & 0x01 != 0 {
            Some(HashId::deserialize(cur, 32).map_err(ProofError::Codec)?)
        } else {
            None
        };
        let parents = if prunable & 0x02 != 0 {
            Some(codec::read_vector(cur, |c| HashId::deserialize(c, 32))?)
        } else {
            None
        };

        let proof = Self {
            ver,
            format,
            schema: schema_id,
            root,
            type_no,
            pubkey,
            seals,
            fields,
            parents,
            txid,
            raw_state,
            raw_metadata,
        };
        proof.validate()?;
        Ok(proof)
    }

    /// Structural invariants beyond what header/body decoding alone
    /// enforces: `root` may only be present on a `Root` proof, and a
    /// proof is either fully pruned (`txid`/`parents` both absent) or
    /// fully unpruned (both present) — never a mix of the two.
    pub fn validate(&self) -> Result<(), ProofError> {
        match self.format {
            ProofFormat::Root { .. } => {
                if self.root.is_none() {
                    return Err(ProofError::MissingRequired {
                        field: "root",
                        context: "root proof header",
                    });
                }
            }
            ProofFormat::Upgrade | ProofFormat::Ordinary => {
                if self.root.is_some() {
                    return Err(ProofError::ExtraField {
                        field: "root",
                        context: "non-root proof header",
                    });
                }
            }
        }
        if self.txid.is_some() != self.parents.is_some() {
            return Err(ProofError::InconsistentPruning);
        }
        Ok(())
    }
}

fn encode_field_group(
    out: &mut Vec<u8>,
    ft: &FieldType,
    bounds: Bounds,
    matching: &[&MetaField],
) -> Result<(), ProofError> {
    let values: Vec<_> = matching.iter().filter_map(|f| f.value_typed.as_ref()).collect();
    match bounds {
        Bounds::Single => {
            let v = values.first().ok_or(ProofError::MissingRequired {
                field: "field",
                context: "single-cardinality field",
            })?;
            ft.encode_value(out, v)?;
        }
        Bounds::Double => {
            if values.len() != 2 {
                return Err(ProofError::MissingRequired { field: "field", context: "double-cardinality field" });
            }
            for v in values {
                ft.encode_value(out, v)?;
            }
        }
        Bounds::Optional => {
            if values.is_empty() {
                ft.encode_absent(out)?;
            } else {
                ft.encode_value(out, values[0])?;
            }
        }
        Bounds::Any | Bounds::Many => {
            if bounds == Bounds::Many && values.is_empty() {
                return Err(ProofError::MissingRequired { field: "field", context: "many-cardinality field" });
            }
            codec::write_varint(out, values.len() as u64);
            for v in values {
                ft.encode_value(out, v)?;
            }
        }
    }
    Ok(())
}

fn decode_field_group(
    cur: &mut &[u8],
    ft: &FieldType,
    bounds: Bounds,
    field_type_index: usize,
    out: &mut Vec<MetaField>,
) -> Result<(), ProofError> {
    let mut push = |value| {
        out.push(MetaField {
            type_name: ft.name.clone(),
            value_str: None,
            value_typed: Some(value),
            field_type_index: Some(field_type_index),
        });
    };
    match bounds {
        Bounds::Single => push(ft.decode_value(cur)?),
        Bounds::Double => {
            push(ft.decode_value(cur)?);
            push(ft.decode_value(cur)?);
        }
        Bounds::Optional => {
            if let Some(v) = ft.decode_optional(cur)? {
                push(v);
            }
        }
        Bounds::Any | Bounds::Many => {
            let count = codec::read_varint(cur).map_err(ProofError::Codec)?;
            for _ in 0..count {
                push(ft.decode_value(cur)?);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldtype::FieldKind;
    use crate::ident::SemVer;
    use crate::prooftype::ProofType;
    use crate::sealtype::SealKind;
    use crate::typeref::TypeRef;

    fn schema() -> Schema {
        let mut s = Schema::new("Asset", SemVer::new(1, 0, 0));
        s.field_types.push(FieldType::new("title", FieldKind::Str));
        s.seal_types.push(crate::sealtype::SealType::new("holder", SealKind::Balance));
        s.proof_types.push(ProofType::new(
            "issue",
            vec![TypeRef::new("title", Bounds::Single)],
            vec![TypeRef::new("holder", Bounds::Many)],
        ));
        s.resolve().unwrap();
        s
    }

    fn sample_root_proof(schema: &Schema) -> Proof {
        let op = OutPoint::new(HashId::sha256d(b"root-tx"), 0);
        let seal = Seal::from_dict_state(
            "holder",
            OutPoint::new(HashId::sha256d(b"seal-tx"), 1),
            Some(1000),
            schema,
        )
        .unwrap();
        let field = MetaField::from_str_value("title", "X", schema).unwrap();
        Proof {
            ver: 1,
            format: ProofFormat::Root { network: 0x01 },
            schema: Some(schema.digest().unwrap()),
            root: Some(op),
            type_no: 0,
            pubkey: None,
            seals: vec![seal],
            fields: vec![field],
            parents: None,
            txid: None,
            raw_state: Vec::new(),
            raw_metadata: Vec::new(),
        }
    }

    #[test]
    fn root_proof_round_trips() {
        let schema = schema();
        let proof = sample_root_proof(&schema);
        let bytes = proof.serialize(&schema).unwrap();
        let decoded = Proof::decode(&mut bytes.as_slice(), Some(&schema)).unwrap();
        assert_eq!(decoded.serialize(&schema).unwrap(), bytes);
        assert_eq!(decoded.seals[0].amount, Some(1000));
        assert_eq!(decoded.fields[0].value_typed, Some(crate::value::Value::Str("X".into())));
    }

    #[test]
    fn burn_proof_has_no_seals() {
        let schema = schema();
        let mut proof = sample_root_proof(&schema);
        proof.seals.clear();
        assert!(proof.is_burn());
        let bytes = proof.serialize(&schema).unwrap();
        let decoded = Proof::decode(&mut bytes.as_slice(), Some(&schema)).unwrap();
        assert!(decoded.is_burn());
    }

    #[test]
    fn pruned_proof_round_trips_with_empty_prunable_byte() {
        let schema = schema();
        let proof = sample_root_proof(&schema);
        assert!(proof.is_pruned());
        let bytes = proof.serialize(&schema).unwrap();
        let decoded = Proof::decode(&mut bytes.as_slice(), Some(&schema)).unwrap();
        assert!(decoded.is_pruned());
    }

    #[test]
    fn unpruned_proof_round_trips_txid_and_parents() {
        let schema = schema();
        let mut proof = sample_root_proof(&schema);
        proof.txid = Some(HashId::sha256d(b"anchor"));
        proof.parents = Some(vec![HashId::sha256d(b"parent-1")]);
        let bytes = proof.serialize(&schema).unwrap();
        let decoded = Proof::decode(&mut bytes.as_slice(), Some(&schema)).unwrap();
        assert_eq!(decoded.txid, proof.txid);
        assert_eq!(decoded.parents, proof.parents);
    }

    #[test]
    fn validate_rejects_mismatched_pruning() {
        let schema = schema();
        let mut proof = sample_root_proof(&schema);
        proof.txid = Some(HashId::sha256d(b"anchor"));
        proof.parents = None;
        assert!(matches!(proof.validate(), Err(ProofError::InconsistentPruning)));
    }

    #[test]
    fn validate_rejects_root_field_on_non_root_format() {
        let schema = schema();
        let mut proof = sample_root_proof(&schema);
        proof.format = ProofFormat::Ordinary;
        assert!(matches!(proof.validate(), Err(ProofError::ExtraField { field: "root", .. })));
    }

    #[test]
    fn validate_rejects_missing_root_on_root_format() {
        let schema = schema();
        let mut proof = sample_root_proof(&schema);
        proof.root = None;
        assert!(matches!(proof.validate(), Err(ProofError::MissingRequired { field: "root", .. })));
    }

    #[test]
    fn decode_rejects_trailing_metadata_bytes() {
        let schema = schema();
        let proof = sample_root_proof(&schema);
        let mut bytes = proof.serialize(&schema).unwrap();

        // Tail is pubkey-absent(1 byte) + prunable flag(1 byte), since this
        // proof has no pubkey/txid/parents. The metadata blob directly
        // precedes it: a one-byte length prefix (content is `varint(1) +
        // "X"`, i.e. 2 bytes) holding the single `title` field.
        let tail_len = 2;
        let meta_prefix_pos = bytes.len() - tail_len - 2 - 1;
        assert_eq!(bytes[meta_prefix_pos], 2, "expected a 2-byte metadata blob");
        bytes[meta_prefix_pos] = 4;
        bytes.splice(meta_prefix_pos + 1 + 2..meta_prefix_pos + 1 + 2, [0xAB, 0xCD]);

        let err = Proof::decode(&mut bytes.as_slice(), Some(&schema)).unwrap_err();
        assert!(matches!(err, ProofError::UnparsedTrailing(2)));
    }

    #[test]
    fn decode_without_schema_recovers_header_and_seal_outpoints() {
        let schema = schema();
        let proof = sample_root_proof(&schema);
        let bytes = proof.serialize(&schema).unwrap();
        let decoded = Proof::decode(&mut bytes.as_slice(), None).unwrap();
        assert_eq!(decoded.seals.len(), 1);
        assert_eq!(decoded.seals[0].amount, None);
        assert!(decoded.fields.is_empty());
    }

    #[test]
    fn seal_sequence_skips_empty_type_slots_with_eol() {
        let mut schema = schema();
        schema.seal_types.push(crate::sealtype::SealType::new("escrow", SealKind::None));
        schema.proof_types[0]
            .seals
            .push(TypeRef::new("escrow", Bounds::Many));
        schema.resolve().unwrap();

        let mut proof = sample_root_proof(&schema);
        let escrow_seal = Seal::from_dict_state(
            "escrow",
            OutPoint::new(HashId::sha256d(b"escrow-tx"), 0),
            None,
            &schema,
        )
        .unwrap();
        proof.seals.push(escrow_seal);

        let bytes = proof.serialize(&schema).unwrap();
        let decoded = Proof::decode(&mut bytes.as_slice(), Some(&schema)).unwrap();
        assert_eq!(decoded.seals.len(), 2);
        assert_eq!(decoded.seals[1].seal_type_index, Some(1));
    }
}
