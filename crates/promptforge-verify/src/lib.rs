//! # promptforge-verify
//!
//! Record verification for promptforge.
//!
//! This crate provides [`engine::SchemaVerifier`], which implements the
//! [`promptforge_core::traits::Verifier`] trait. Candidates are checked in
//! three passes:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Sections**: each optional section present in the candidate against
//!    its own schema, with failures scoped to the section name.
//! 3. **Cross-field**: named checks registered by record modules.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use promptforge_contracts::verify::FieldFailure;
//! use promptforge_verify::engine::SchemaVerifier;
//!
//! let mut verifier = SchemaVerifier::new();
//! verifier.register_check("non-empty-name", Box::new(|candidate| {
//!     match candidate["name"].as_str() {
//!         Some("") => Some(FieldFailure::new("name", "name must not be empty")),
//!         _ => None,
//!     }
//! }));
//! ```

pub mod engine;

pub use engine::{CheckFn, SchemaVerifier};
