//! # promptforge-records
//!
//! The record kinds promptforge can generate.
//!
//! 1. **Character**: a profile of name, verbs, adjectives, and four
//!    categories of emoji-tagged traits. Written as one aggregate artifact per
//!    run.
//! 2. **Negotiation scenario**: parties, conflict and negotiable points,
//!    walkaway conditions, and the optional `strategies` and `tactics`
//!    sections. Written as one artifact per scenario.
//!
//! Each kind pairs a serde struct tree with the JSON Schema that describes
//! it, and implements `GeneratedRecord` so the batch driver can produce it.

pub mod character;
pub mod negotiation;
pub mod samples;

pub use character::Character;
pub use negotiation::{install_checks, NegotiationScenario};
