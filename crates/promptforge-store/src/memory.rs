//! In-memory implementation of `ArtifactSink`.
//!
//! `InMemoryArtifactStore` keeps every written document keyed by file name,
//! behind an `Arc<Mutex<_>>` so clones observe the same state. Names are
//! resolved as the filesystem store resolves them: an aggregate rewrite
//! replaces its document, a repeated title gets a numbered name. Tests and dry
//! runs use it in place of `FileArtifactStore`.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use serde_json::Value;
use tracing::debug;

use promptforge_contracts::{
    artifact::{Artifact, ArtifactReceipt},
    error::{ForgeError, ForgeResult},
};
use promptforge_core::traits::ArtifactSink;

use crate::{document, naming};

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryState {
    /// `(file name, document)` in first-write order.
    pub(crate) files: Vec<(String, Value)>,
    /// Total `persist` calls that succeeded, replacements included.
    pub(crate) writes: usize,
    /// Number of upcoming writes that fail with a storage error.
    pub(crate) fail_next: usize,
}

// ── Public store ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryArtifactStore {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` writes fail with `ForgeError::Storage`.
    pub fn fail_next(&self, n: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next = n;
        }
    }

    /// Snapshot of every stored `(file name, document)`.
    pub fn files(&self) -> Vec<(String, Value)> {
        self.state
            .lock()
            .map(|state| state.files.clone())
            .unwrap_or_default()
    }

    /// Total successful writes, including replacements.
    pub fn writes(&self) -> usize {
        self.state.lock().map(|state| state.writes).unwrap_or_default()
    }
}

impl ArtifactSink for InMemoryArtifactStore {
    fn persist(&self, artifact: &Artifact) -> ForgeResult<ArtifactReceipt> {
        let mut state = self.state.lock().map_err(|e| ForgeError::Storage {
            reason: format!("artifact store lock poisoned: {e}"),
        })?;

        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(ForgeError::Storage {
                reason: "simulated write failure".to_string(),
            });
        }

        let bytes = document::encode(artifact)?;
        let name = naming::unique_file_name(&artifact.name, |candidate| {
            state.files.iter().any(|(existing, _)| existing == candidate)
        });
        let doc = artifact.document();

        match state.files.iter().position(|(existing, _)| *existing == name) {
            Some(i) => state.files[i].1 = doc,
            None => state.files.push((name.clone(), doc)),
        }
        state.writes += 1;

        debug!(name = %name, records = artifact.records.len(), "artifact stored in memory");

        Ok(ArtifactReceipt {
            path: PathBuf::from(name),
            records: artifact.records.len(),
            sha256: document::sha256_hex(&bytes),
        })
    }
}
