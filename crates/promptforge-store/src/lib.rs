//! # promptforge-store
//!
//! Artifact persistence for promptforge.
//!
//! ## Overview
//!
//! The batch driver hands every validated record set to an `ArtifactSink`.
//! This crate names the file, encodes the `{ "<wrapper>": [...] }` document
//! and returns a receipt carrying the SHA-256 of the exact bytes written.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use promptforge_core::traits::ArtifactSink;
//! use promptforge_store::FileArtifactStore;
//!
//! let store = FileArtifactStore::new("out");
//! let receipt = store.persist(&artifact)?;
//! println!("{} ({})", receipt.path.display(), receipt.sha256);
//! ```

pub mod document;
pub mod file;
pub mod memory;
pub mod naming;

pub use file::FileArtifactStore;
pub use memory::InMemoryArtifactStore;
pub use naming::{file_name, sanitize_title};
