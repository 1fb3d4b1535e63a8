//! Persisted artifact descriptors.
//!
//! The batch driver hands an `Artifact` to the sink after every successful
//! item; the sink decides the concrete file name from the `ArtifactName`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a record kind is laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactLayout {
    /// One file per run, rewritten with every record produced so far.
    /// Named `<prefix>_<timestamp>.json`.
    Aggregate { prefix: String },
    /// One file per record, named from the record's title.
    PerRecord,
}

/// The naming input for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactName {
    /// `<prefix>_<YYYYMMDD_HHMMSS>.json`, timestamp fixed at run start.
    Aggregate {
        prefix: String,
        started_at: DateTime<Utc>,
    },
    /// `<sanitized title>_<YYYYMMDD_HHMMSS>.json`.
    Titled {
        title: String,
        created_at: DateTime<Utc>,
    },
}

/// A set of validated records ready to be written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: ArtifactName,
    /// Top-level key wrapping the record array ("students", "scenarios").
    pub wrapper_key: String,
    /// Records in production order, already serialized in schema order.
    pub records: Vec<serde_json::Value>,
}

impl Artifact {
    /// The JSON document written to disk: `{ "<wrapper_key>": [records…] }`.
    pub fn document(&self) -> serde_json::Value {
        let mut doc = serde_json::Map::new();
        doc.insert(
            self.wrapper_key.clone(),
            serde_json::Value::Array(self.records.clone()),
        );
        serde_json::Value::Object(doc)
    }
}

/// Proof that an artifact reached durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReceipt {
    pub path: PathBuf,
    /// Number of records in the written document.
    pub records: usize,
    /// SHA-256 (hex) of the exact bytes written.
    pub sha256: String,
}
