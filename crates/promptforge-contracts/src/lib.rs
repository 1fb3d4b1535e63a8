//! # promptforge-contracts
//!
//! Shared types, reports, and errors for the promptforge generation pipeline.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod artifact;
pub mod batch;
pub mod chat;
pub mod error;
pub mod generation;
pub mod verify;
