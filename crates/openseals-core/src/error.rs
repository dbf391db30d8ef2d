//! Error taxonomy for the codec, type/schema model, and proof model.
//!
//! Mirrors the component-local enum-per-concern split: primitive-codec
//! failures never carry schema context, schema failures never carry
//! wire-offset context, and so on.

use thiserror::Error;

/// Failures from the primitive wire codec (varint, flag-varint, length
/// prefixes, fixed-width identifiers).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of input at offset {offset}, needed {needed} more byte(s)")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("flag-varint value {value} exceeds the maximum representable magnitude (2^32 - 1)")]
    ValueOutOfRange { value: u64 },

    #[error("length prefix {len} exceeds the remaining input ({remaining} byte(s))")]
    LengthExceedsInput { len: u64, remaining: usize },

    #[error("expected {expected} byte(s) for a fixed-width value, found {found}")]
    FixedWidthMismatch { expected: usize, found: usize },

    #[error("invalid UTF-8 in string field: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("{0} trailing byte(s) left after decoding")]
    TrailingBytes(usize),
}

/// Failures resolving or validating a [`crate::schema::Schema`].
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unresolved {kind} reference '{name}' in {section}")]
    InternalReference {
        kind: &'static str,
        name: String,
        section: String,
    },

    #[error("schema validation failed: {reason}")]
    Validation { reason: String },

    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),

    #[error("unknown seal type '{0}'")]
    UnknownSealType(String),

    #[error("unknown proof type '{0}'")]
    UnknownProofType(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Failures decoding, encoding, or validating a [`crate::proof::Proof`].
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("missing required field '{field}' in {context}")]
    MissingRequired { field: &'static str, context: &'static str },

    #[error("unexpected field '{field}' present in {context}")]
    ExtraField { field: &'static str, context: &'static str },

    #[error("{0} unparsed byte(s) remain after decoding the proof body")]
    UnparsedTrailing(usize),

    #[error("a proof with parents must also carry a txid, and vice versa")]
    InconsistentPruning,

    #[error("proof type index {index} is out of range for schema with {available} proof type(s)")]
    ProofTypeOutOfRange { index: u8, available: usize },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
