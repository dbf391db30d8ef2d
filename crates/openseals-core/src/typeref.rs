//! Type references: a named pointer into a schema's field- or
//! seal-type table, carrying a cardinality bound.

use std::fmt;

use crate::codec;
use crate::error::{CodecError, SchemaError};

/// Cardinality bound on a [`TypeRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bounds {
    /// 0 or 1.
    Optional,
    /// Exactly 1.
    Single,
    /// Exactly 2.
    Double,
    /// 0 or more.
    Any,
    /// 1 or more.
    Many,
}

impl Bounds {
    pub fn min(self) -> u8 {
        match self {
            Bounds::Optional | Bounds::Any => 0,
            Bounds::Single => 1,
            Bounds::Double => 2,
            Bounds::Many => 1,
        }
    }

    pub fn max(self) -> u8 {
        match self {
            Bounds::Optional => 1,
            Bounds::Single => 1,
            Bounds::Double => 2,
            Bounds::Any | Bounds::Many => 255,
        }
    }

    pub fn is_fixed(self) -> bool {
        matches!(self, Bounds::Single | Bounds::Double)
    }

    pub fn is_variable(self) -> bool {
        matches!(self, Bounds::Any | Bounds::Many)
    }

    pub fn from_min_max(min: u8, max: u8) -> Result<Self, SchemaError> {
        Ok(match (min, max) {
            (0, 1) => Bounds::Optional,
            (1, 1) => Bounds::Single,
            (2, 2) => Bounds::Double,
            (0, 255) => Bounds::Any,
            (1, 255) => Bounds::Many,
            (min, max) => {
                return Err(SchemaError::Validation {
                    reason: format!("unsupported cardinality bound ({min}, {max})"),
                })
            }
        })
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Bounds::Optional => "optional",
            Bounds::Single => "single",
            Bounds::Double => "double",
            Bounds::Any => "any",
            Bounds::Many => "many",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Bounds {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optional" => Ok(Bounds::Optional),
            "single" => Ok(Bounds::Single),
            "double" => Ok(Bounds::Double),
            "any" => Ok(Bounds::Any),
            "many" => Ok(Bounds::Many),
            other => Err(SchemaError::Validation { reason: format!("unknown cardinality '{other}'") }),
        }
    }
}

/// A reference by name to a field or seal type, with a cardinality
/// bound. Before [`crate::schema::Schema::resolve`] runs,
/// `type_index` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub ref_name: String,
    pub bounds: Bounds,
    pub type_index: Option<usize>,
}

impl TypeRef {
    pub fn new(ref_name: impl Into<String>, bounds: Bounds) -> Self {
        Self { ref_name: ref_name.into(), bounds, type_index: None }
    }

    pub fn is_resolved(&self) -> bool {
        self.type_index.is_some()
    }

    pub fn serialize(&self, out: &mut Vec<u8>) -> Result<(), SchemaError> {
        let index = self.type_index.ok_or_else(|| SchemaError::InternalReference {
            kind: "type",
            name: self.ref_name.clone(),
            section: "serialize".into(),
        })?;
        codec::write_varint(out, index as u64);
        out.push(self.bounds.min());
        out.push(self.bounds.max());
        Ok(())
    }

    /// Deserializes a TypeRef carrying only its numeric index; the
    /// name is filled in later by looking the index up in the
    /// relevant schema table.
    pub fn deserialize(cur: &mut &[u8]) -> Result<Self, SchemaError> {
        let index = codec::read_varint(cur).map_err(SchemaError::Codec)? as usize;
        if cur.len() < 2 {
            return Err(SchemaError::Codec(CodecError::UnexpectedEof {
                offset: 0,
                needed: 2 - cur.len(),
            }));
        }
        let min = cur[0];
        let max = cur[1];
        *cur = &cur[2..];
        let bounds = Bounds::from_min_max(min, max)?;
        Ok(Self { ref_name: String::new(), bounds, type_index: Some(index) })
    }
}
