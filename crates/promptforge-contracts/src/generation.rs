//! Generation-loop states and per-attempt records.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// The states one generation passes through.
///
/// `Requesting → Extracting → Validating → Succeeded` is the happy path. A
/// failure in any of the first three moves to `Retrying` while attempts
/// remain and to `Failed` once they are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    Requesting,
    Extracting,
    Validating,
    Succeeded,
    Retrying,
    Failed,
}

impl std::fmt::Display for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GenerationState::Requesting => "requesting",
            GenerationState::Extracting => "extracting",
            GenerationState::Validating => "validating",
            GenerationState::Succeeded => "succeeded",
            GenerationState::Retrying => "retrying",
            GenerationState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What happened on one attempt of the generation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub attempt: u32,
    /// The state the attempt failed in, or `Succeeded`.
    pub reached: GenerationState,
    /// Classification of the failure, absent on success.
    pub error_kind: Option<ErrorKind>,
    /// The failure message, absent on success.
    pub error: Option<String>,
    /// How long the loop slept after this attempt, if it retried.
    pub backoff: Option<Duration>,
    pub finished_at: DateTime<Utc>,
}

/// A validated record together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Generated<R> {
    pub record: R,
    /// Number of model calls made, including the successful one.
    pub attempts: u32,
    /// Every attempt in order.
    pub trace: Vec<AttemptRecord>,
}

impl<R> Generated<R> {
    /// The delays slept between attempts, in order.
    pub fn backoffs(&self) -> Vec<Duration> {
        self.trace.iter().filter_map(|a| a.backoff).collect()
    }
}
