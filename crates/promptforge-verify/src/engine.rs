//! Schema-based record verifier for promptforge.
//!
//! `SchemaVerifier` implements the `Verifier` trait from `promptforge-core`.
//! A candidate goes through three passes:
//!
//! 1. **Structural**: the whole candidate against `RecordSchema::json_schema`.
//!    Optional sections are only `object | null` at this level.
//! 2. **Sections**: every optional section that is present and non-null is
//!    validated against its own schema. Failures are scoped to the section
//!    name so one bad tactic does not read as a broken record.
//! 3. **Cross-field checks**: named functions registered with
//!    `register_check`, for constraints JSON Schema cannot express.
//!
//! All failures of a pass are collected before returning.

use std::collections::HashMap;

use jsonschema::error::ValidationErrorKind;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use promptforge_contracts::{
    error::{ForgeError, ForgeResult},
    verify::{FieldFailure, RecordSchema, ValidationReport},
};
use promptforge_core::traits::Verifier;

/// A caller-supplied cross-field check.
///
/// Receives the whole candidate. Returns `Some(failure)` when the check
/// fails, `None` otherwise.
pub type CheckFn = Box<dyn Fn(&Value) -> Option<FieldFailure> + Send + Sync>;

/// The promptforge record verifier.
pub struct SchemaVerifier {
    /// Named cross-field checks provided by record modules.
    checks: HashMap<String, CheckFn>,
}

impl SchemaVerifier {
    /// Create a verifier with no checks registered.
    pub fn new() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Register a cross-field check under `name`.
    ///
    /// The name must match a `CrossFieldCheck::check_id` in the schemas that
    /// use it. Registering the same name twice replaces the earlier check.
    pub fn register_check(&mut self, name: impl Into<String>, f: CheckFn) {
        self.checks.insert(name.into(), f);
    }

    /// Run every phase and decode the typed record.
    ///
    /// The candidate is not modified, so validating a valid record again
    /// yields an identical record.
    pub fn validate_record<R: DeserializeOwned>(
        &self,
        candidate: &Value,
        schema: &RecordSchema,
    ) -> ForgeResult<R> {
        self.verify(candidate, schema)?.into_result()?;
        self.verify_sections(candidate, schema)?.into_result()?;
        self.check(candidate, schema)?.into_result()?;

        serde_json::from_value(candidate.clone()).map_err(|e| ForgeError::SchemaValidation {
            field: "$".to_string(),
            detail: e.to_string(),
        })
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Validate `instance` against `json_schema`, returning `(path, message)`
    /// pairs. Paths are dotted and relative to `instance`; `"$"` is the root.
    fn structural_failures(
        schema_id: &str,
        json_schema: &Value,
        instance: &Value,
    ) -> ForgeResult<Vec<(String, String)>> {
        let validator = jsonschema::validator_for(json_schema).map_err(|e| ForgeError::Config {
            reason: format!("invalid JSON Schema document '{schema_id}': {e}"),
        })?;

        Ok(validator
            .iter_errors(instance)
            .map(|error| {
                let mut segments = pointer_segments(&error.instance_path.to_string());
                if let ValidationErrorKind::Required { property } = &error.kind {
                    if let Some(name) = property.as_str() {
                        segments.push(name.to_string());
                    }
                }
                (dotted(&segments), error.to_string())
            })
            .collect())
    }
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Verifier for SchemaVerifier {
    fn verify(&self, candidate: &Value, schema: &RecordSchema) -> ForgeResult<ValidationReport> {
        let failures: Vec<FieldFailure> =
            Self::structural_failures(&schema.schema_id, &schema.json_schema, candidate)?
                .into_iter()
                .map(|(field, message)| {
                    warn!(schema_id = %schema.schema_id, %field, %message, "structural validation failure");
                    FieldFailure::new(field, message)
                })
                .collect();

        debug!(
            schema_id = %schema.schema_id,
            passed = failures.is_empty(),
            failure_count = failures.len(),
            "structural validation complete"
        );
        Ok(ValidationReport::from_failures(failures))
    }

    fn verify_sections(
        &self,
        candidate: &Value,
        schema: &RecordSchema,
    ) -> ForgeResult<ValidationReport> {
        let mut failures = Vec::new();
        let mut missing = Vec::new();

        for section in &schema.sections {
            match candidate.get(&section.field) {
                None | Some(Value::Null) => missing.push(section.field.clone()),
                Some(value) => {
                    let inner = Self::structural_failures(&schema.schema_id, &section.json_schema, value)?;
                    for (path, message) in inner {
                        warn!(
                            schema_id = %schema.schema_id,
                            section = %section.field,
                            %path,
                            %message,
                            "section validation failure"
                        );
                        failures.push(FieldFailure::new(
                            section.field.clone(),
                            format!("{path}: {message}"),
                        ));
                    }
                }
            }
        }

        if !missing.is_empty() {
            warn!(
                schema_id = %schema.schema_id,
                missing = %missing.join(", "),
                "optional fields missing"
            );
        }

        let mut report = ValidationReport::from_failures(failures);
        report.missing_optional = missing;
        Ok(report)
    }

    fn check(&self, candidate: &Value, schema: &RecordSchema) -> ForgeResult<ValidationReport> {
        let mut failures = Vec::new();

        for check in &schema.checks {
            debug!(
                check_id = %check.check_id,
                description = %check.description,
                "evaluating cross-field check"
            );

            // An unregistered name is itself a failure so misconfigured
            // schemas surface immediately.
            let failure = match self.checks.get(check.check_id.as_str()) {
                Some(f) => f(candidate),
                None => Some(FieldFailure::new(
                    check.check_id.clone(),
                    format!("no check registered under '{}'", check.check_id),
                )),
            };

            if let Some(failure) = failure {
                warn!(
                    check_id = %check.check_id,
                    field = %failure.field,
                    message = %failure.message,
                    "cross-field check failed"
                );
                failures.push(failure);
            }
        }

        Ok(ValidationReport::from_failures(failures))
    }
}

/// Split a JSON pointer ("/parties/0/name") into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn dotted(segments: &[String]) -> String {
    if segments.is_empty() {
        "$".to_string()
    } else {
        segments.join(".")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
