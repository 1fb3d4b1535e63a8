//! Core trait definitions for the generation pipeline.
//!
//! These traits are the seams between the pipeline and its collaborators:
//!
//! - `ModelClient`: untrusted text source (a hosted language model)
//! - `Verifier`: trusted checker for extracted candidates
//! - `ArtifactSink`: durable storage for validated records
//! - `Sleeper`: the blocking delay used between attempts
//! - `GeneratedRecord`: a record kind the pipeline can produce
//!
//! The generator and batch driver only ever talk to these traits, so tests
//! can script every collaborator.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use promptforge_contracts::{
    artifact::{Artifact, ArtifactLayout, ArtifactReceipt},
    chat::{ChatRequest, ModelReply, PromptSpec},
    error::ForgeResult,
    verify::{RecordSchema, ValidationReport},
};

/// The model call boundary.
///
/// Implementations must classify their own failures: transport and
/// connectivity problems are returned as `ForgeError::Connection`, anything
/// else as `ForgeError::Generation`. The generator never inspects message
/// text to guess the kind.
pub trait ModelClient: Send + Sync {
    /// Issue one blocking chat request and return the reply text.
    fn chat(&self, request: &ChatRequest) -> ForgeResult<ModelReply>;
}

/// Validates extracted JSON candidates against a `RecordSchema`.
///
/// Each method runs one phase and returns a report. `Err` is reserved for
/// problems with the verifier itself, not for invalid candidates.
pub trait Verifier: Send + Sync {
    /// Structural validation of the whole candidate against the top-level
    /// schema.
    fn verify(&self, candidate: &Value, schema: &RecordSchema) -> ForgeResult<ValidationReport>;

    /// Independent validation of each optional section present in the
    /// candidate. Absent sections are listed in `missing_optional`.
    fn verify_sections(
        &self,
        candidate: &Value,
        schema: &RecordSchema,
    ) -> ForgeResult<ValidationReport>;

    /// Named cross-field checks listed in `schema.checks`.
    fn check(&self, candidate: &Value, schema: &RecordSchema) -> ForgeResult<ValidationReport>;
}

/// Durable storage for validated records.
pub trait ArtifactSink: Send + Sync {
    /// Write `artifact`, replacing any previous artifact with the same name.
    fn persist(&self, artifact: &Artifact) -> ForgeResult<ArtifactReceipt>;
}

/// A blocking delay between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// A record kind the pipeline can generate.
///
/// The typed struct tree and `schema()` must describe the same shape.
pub trait GeneratedRecord: Serialize + DeserializeOwned + Clone + Send {
    /// Singular name used in logs and console output ("character").
    const KIND: &'static str;

    /// Top-level key wrapping the record array in artifacts.
    const WRAPPER_KEY: &'static str;

    /// The schema candidates are validated against.
    fn schema() -> RecordSchema;

    /// The prompt sent on every attempt.
    fn prompt() -> PromptSpec;

    /// How records of this kind are laid out on disk.
    fn layout() -> ArtifactLayout;

    /// Title used to name per-record artifacts.
    fn title(&self) -> Option<&str> {
        None
    }
}
