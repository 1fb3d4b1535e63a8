//! The generation loop: one record out of an unreliable model.
//!
//! Each attempt runs the full chain
//!
//!   Requesting → Extracting → Validating → Succeeded
//!
//! and any failure moves the loop to `Retrying` (sleep `unit × base^attempt`,
//! try again) or, once `max_retries` attempts have failed, to `Failed`, where
//! the last error is returned unchanged. There is no partial or default
//! record: a generation either validates completely or fails.

use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use promptforge_contracts::{
    chat::{ChatRequest, PromptSpec},
    error::{ForgeError, ForgeResult},
    generation::{AttemptRecord, Generated, GenerationState},
    verify::RecordSchema,
};

use crate::{
    backoff::{Backoff, CancelFlag},
    extract::extract_json,
    traits::{GeneratedRecord, ModelClient, Sleeper, Verifier},
};

/// Drives single-record generation against a model.
///
/// The generator owns its collaborators; construct one per process and
/// reuse it for every item of a batch.
pub struct Generator {
    client: Box<dyn ModelClient>,
    verifier: Box<dyn Verifier>,
    sleeper: Box<dyn Sleeper>,
    backoff: Backoff,
    cancel: CancelFlag,
}

impl Generator {
    pub fn new(
        client: Box<dyn ModelClient>,
        verifier: Box<dyn Verifier>,
        sleeper: Box<dyn Sleeper>,
        backoff: Backoff,
    ) -> Self {
        Self {
            client,
            verifier,
            sleeper,
            backoff,
            cancel: CancelFlag::new(),
        }
    }

    /// Stop retrying once `cancel` is set.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Generate one validated record of kind `R`.
    ///
    /// Makes at most `max_retries` model calls (a value of 0 is treated as
    /// 1). On success the returned `Generated` carries the attempt trace,
    /// including every backoff slept. On exhaustion the error of the final
    /// attempt is returned.
    pub fn generate<R: GeneratedRecord>(
        &self,
        prompt: &PromptSpec,
        max_retries: u32,
    ) -> ForgeResult<Generated<R>> {
        let max_retries = max_retries.max(1);
        let schema = R::schema();
        let request = prompt.to_request(schema.model_format());

        let mut trace: Vec<AttemptRecord> = Vec::new();
        let mut last_error: Option<ForgeError> = None;

        for attempt in 1..=max_retries {
            if self.cancel.is_cancelled() {
                info!(kind = R::KIND, attempt, "generation cancelled before attempt");
                return Err(last_error.unwrap_or_else(|| ForgeError::Generation {
                    reason: "cancelled before the first attempt".to_string(),
                }));
            }

            debug!(
                kind = R::KIND,
                attempt,
                max_retries,
                "sending request to model"
            );

            match self.attempt::<R>(&request, &schema) {
                Ok(record) => {
                    trace.push(AttemptRecord {
                        attempt,
                        reached: GenerationState::Succeeded,
                        error_kind: None,
                        error: None,
                        backoff: None,
                        finished_at: Utc::now(),
                    });
                    if attempt > 1 {
                        info!(kind = R::KIND, attempt, "generation succeeded after retry");
                    }
                    return Ok(Generated {
                        record,
                        attempts: attempt,
                        trace,
                    });
                }
                Err((reached, err)) => {
                    let retrying = attempt < max_retries;
                    let backoff = retrying.then(|| self.backoff.delay(attempt));

                    trace.push(AttemptRecord {
                        attempt,
                        reached,
                        error_kind: Some(err.kind()),
                        error: Some(err.to_string()),
                        backoff,
                        finished_at: Utc::now(),
                    });

                    match backoff {
                        Some(delay) => {
                            warn!(
                                kind = R::KIND,
                                attempt,
                                state = %reached,
                                error_kind = %err.kind(),
                                error = %err,
                                delay_secs = delay.as_secs_f64(),
                                "attempt failed, retrying"
                            );
                            debug!(state = %GenerationState::Retrying, "backing off");
                            self.sleeper.sleep(delay);
                        }
                        None => {
                            error!(
                                kind = R::KIND,
                                attempts = max_retries,
                                state = %GenerationState::Failed,
                                error_kind = %err.kind(),
                                error = %err,
                                "generation failed after all attempts"
                            );
                        }
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ForgeError::Generation {
            reason: "no generation attempt was made".to_string(),
        }))
    }

    /// One pass through request, extraction, and validation. A failure is
    /// tagged with the state it happened in.
    fn attempt<R: GeneratedRecord>(
        &self,
        request: &ChatRequest,
        schema: &RecordSchema,
    ) -> Result<R, (GenerationState, ForgeError)> {
        let started = Instant::now();
        let reply = self
            .client
            .chat(request)
            .map_err(|e| (GenerationState::Requesting, e))?;
        debug!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            "model request completed"
        );
        debug!(raw = %reply.content, "raw model response");

        let extracted =
            extract_json(&reply.content).map_err(|e| (GenerationState::Extracting, e))?;

        self.validate::<R>(extracted.value, schema)
            .map_err(|e| (GenerationState::Validating, e))
    }

    /// Structural validation, section validation, cross-field checks, then
    /// the typed decode.
    fn validate<R: GeneratedRecord>(&self, candidate: Value, schema: &RecordSchema) -> ForgeResult<R> {
        self.verifier.verify(&candidate, schema)?.into_result()?;
        self.verifier.verify_sections(&candidate, schema)?.into_result()?;
        self.verifier.check(&candidate, schema)?.into_result()?;

        serde_json::from_value::<R>(candidate).map_err(|e| ForgeError::SchemaValidation {
            field: "$".to_string(),
            detail: e.to_string(),
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
