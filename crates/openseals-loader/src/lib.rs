//! Structured-document front end for OpenSeals: translates nested
//! YAML/JSON mappings into the core's typed [`openseals_core::Schema`]
//! and [`openseals_core::Proof`] values. The core never parses a
//! document format itself; this crate is the adapter.

pub mod error;
mod ident;
pub mod proof_doc;
pub mod schema_doc;

pub use error::LoaderError;
pub use ident::parse_hash_id;
