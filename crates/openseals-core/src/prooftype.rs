//! Proof type declarations: the fields, seals, and (for non-root
//! types) unsealed predecessor types a proof of this type carries.

use crate::codec;
use crate::error::SchemaError;
use crate::typeref::TypeRef;

/// A named proof type. `unseals` is required for every non-root proof
/// type and forbidden on the schema's first (root) proof type.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofType {
    pub name: String,
    pub unseals: Option<Vec<TypeRef>>,
    pub fields: Vec<TypeRef>,
    pub seals: Vec<TypeRef>,
}

impl ProofType {
    pub fn new(name: impl Into<String>, fields: Vec<TypeRef>, seals: Vec<TypeRef>) -> Self {
        Self { name: name.into(), unseals: None, fields, seals }
    }

    pub fn with_unseals(mut self, unseals: Vec<TypeRef>) -> Self {
        self.unseals = Some(unseals);
        self
    }

    pub fn serialize(&self, out: &mut Vec<u8>) -> Result<(), SchemaError> {
        codec::write_str(out, &self.name);
        write_type_refs(out, &self.fields)?;
        write_type_refs(out, self.unseals.as_deref().unwrap_or(&[]))?;
        write_type_refs(out, &self.seals)?;
        Ok(())
    }

    /// Deserializes a proof type. `has_unseals` distinguishes the
    /// schema's root proof type (no `unseals`) from every other proof
    /// type (an empty-but-present `unseals` vector is legal and
    /// distinct from "root").
    pub fn deserialize(cur: &mut &[u8], has_unseals: bool) -> Result<Self, SchemaError> {
        let name = codec::read_str(cur).map_err(SchemaError::Codec)?;
        let fields = read_type_refs(cur)?;
        let unseals_vec = read_type_refs(cur)?;
        let seals = read_type_refs(cur)?;
        Ok(Self {
            name,
            unseals: if has_unseals { Some(unseals_vec) } else { None },
            fields,
            seals,
        })
    }
}

fn write_type_refs(out: &mut Vec<u8>, refs: &[TypeRef]) -> Result<(), SchemaError> {
    codec::write_varint(out, refs.len() as u64);
    for r in refs {
        r.serialize(out)?;
    }
    Ok(())
}

fn read_type_refs(cur: &mut &[u8]) -> Result<Vec<TypeRef>, SchemaError> {
    let len = codec::read_varint(cur).map_err(SchemaError::Codec)?;
    let mut out = Vec::with_capacity(len.min(4096) as usize);
    for _ in 0..len {
        out.push(TypeRef::deserialize(cur)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeref::Bounds;

    #[test]
    fn root_proof_type_has_no_unseals() {
        let mut pt = ProofType::new(
            "issue",
            vec![TypeRef { ref_name: "title".into(), bounds: Bounds::Single, type_index: Some(0) }],
            vec![TypeRef { ref_name: "holder".into(), bounds: Bounds::Many, type_index: Some(0) }],
        );
        let mut buf = Vec::new();
        pt.serialize(&mut buf).unwrap();
        let mut cur = buf.as_slice();
        let decoded = ProofType::deserialize(&mut cur, false).unwrap();
        assert!(decoded.unseals.is_none());
        assert_eq!(decoded.fields.len(), 1);
        assert_eq!(decoded.seals.len(), 1);
        pt.name = decoded.name;
    }

    #[test]
    fn non_root_proof_type_round_trips_unseals() {
        let pt = ProofType::new("transfer", vec![], vec![]).with_unseals(vec![TypeRef {
            ref_name: "holder".into(),
            bounds: Bounds::Many,
            type_index: Some(0),
        }]);
        let mut buf = Vec::new();
        pt.serialize(&mut buf).unwrap();
        let mut cur = buf.as_slice();
        let decoded = ProofType::deserialize(&mut cur, true).unwrap();
        assert_eq!(decoded.unseals.unwrap().len(), 1);
    }
}
