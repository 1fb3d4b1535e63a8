//! Record schema and validation report types.
//!
//! A `RecordSchema` pairs the JSON Schema of a record with the optional
//! sections that are validated in a second, independent pass, and the named
//! cross-field checks that run last.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ForgeError;

/// The full description a candidate record is checked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Unique identifier for this schema (e.g. "negotiation-scenario-v1").
    pub schema_id: String,
    /// Top-level JSON Schema. Optional sections appear here only as
    /// `object | null`; their shape lives in `sections`.
    pub json_schema: Value,
    /// Optional sub-trees validated separately whenever present.
    pub sections: Vec<OptionalSection>,
    /// Named cross-field checks evaluated after both structural phases.
    pub checks: Vec<CrossFieldCheck>,
}

impl RecordSchema {
    /// The schema descriptor sent to the model: the top-level schema with
    /// every optional section's full shape spliced into `properties`.
    pub fn model_format(&self) -> Value {
        let mut format = self.json_schema.clone();
        if let Some(props) = format.get_mut("properties").and_then(Value::as_object_mut) {
            for section in &self.sections {
                props.insert(section.field.clone(), section.json_schema.clone());
            }
        }
        format
    }
}

/// An optional top-level field with its own schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionalSection {
    /// Top-level property name, e.g. "tactics".
    pub field: String,
    pub json_schema: Value,
}

/// A named cross-field check resolved by the verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossFieldCheck {
    /// Name of the registered check function.
    pub check_id: String,
    /// Human-readable description for logs.
    pub description: String,
}

/// Outcome of one validation phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only if no failures were collected.
    pub passed: bool,
    /// All failures collected during the phase. Empty on pass.
    pub failures: Vec<FieldFailure>,
    /// Optional sections that were absent or null.
    pub missing_optional: Vec<String>,
}

impl ValidationReport {
    pub fn from_failures(failures: Vec<FieldFailure>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
            missing_optional: Vec::new(),
        }
    }

    /// Convert a failing report into a `SchemaValidation` error.
    ///
    /// A single failing field is named directly; several are joined with
    /// ", " after de-duplication, in the order they were found.
    pub fn into_result(self) -> Result<(), ForgeError> {
        if self.passed {
            return Ok(());
        }
        let mut fields: Vec<&str> = Vec::new();
        for failure in &self.failures {
            if !fields.contains(&failure.field.as_str()) {
                fields.push(failure.field.as_str());
            }
        }
        let detail = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.field, f.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ForgeError::SchemaValidation {
            field: fields.join(", "),
            detail,
        })
    }
}

/// A single failure within a `ValidationReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
    /// Dotted field path ("parties.0.authorityLevel") or section name.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
