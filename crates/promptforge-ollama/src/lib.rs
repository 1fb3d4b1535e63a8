//! # promptforge-ollama
//!
//! [`OllamaClient`] implements `promptforge_core::traits::ModelClient` over
//! Ollama's `/api/chat` endpoint using a blocking `reqwest` client. The
//! record's JSON Schema is passed as the `format` constraint.

pub mod client;

pub use client::{normalize_base_url, OllamaClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
