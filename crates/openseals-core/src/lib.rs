//! Schema-driven binary consensus codec for OpenSeals: single-use-seal
//! proofs anchored to Bitcoin-style transactions.
//!
//! This crate owns the wire format only. It has no notion of a
//! network, a transaction, or a signature scheme beyond storing
//! opaque key material — callers supply schemas and proofs as typed
//! values and get back bytes whose hash is their identity, or the
//! reverse.

pub mod codec;
pub mod error;
pub mod fieldtype;
pub mod ident;
pub mod metafield;
pub mod prooftype;
pub mod proof;
pub mod schema;
pub mod seal;
pub mod sealtype;
pub mod typeref;
pub mod value;

pub use error::{CodecError, ProofError, SchemaError};
pub use fieldtype::{FieldKind, FieldType};
pub use ident::{HashId, OutPoint, PubKey, SemVer};
pub use metafield::MetaField;
pub use prooftype::ProofType;
pub use proof::{Proof, ProofFormat};
pub use schema::Schema;
pub use seal::Seal;
pub use sealtype::{SealKind, SealType};
pub use typeref::{Bounds, TypeRef};
pub use value::Value;
