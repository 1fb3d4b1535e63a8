//! The batch driver: N independent generations, persisted one by one.
//!
//! Each item gets an outer retry budget wrapped around the generator's own
//! retries. A success is persisted before the next item starts. An item that
//! exhausts its outer budget ends the whole run; later items are never
//! attempted. Statistics are produced for every outcome.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info, warn};

use promptforge_contracts::{
    artifact::{Artifact, ArtifactLayout, ArtifactName, ArtifactReceipt},
    batch::{BatchReport, BatchStats, BatchStatus},
    chat::{PromptSpec, RunId},
    error::{ForgeError, ForgeResult},
};

use crate::{
    generator::Generator,
    traits::{ArtifactSink, GeneratedRecord},
};

/// Retry budgets for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Outer attempts per item.
    pub item_retries: u32,
    /// `max_retries` passed to the generator on every outer attempt.
    pub inner_retries: u32,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            item_retries: 3,
            inner_retries: 3,
        }
    }
}

/// Progress notifications for the operator console.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    ItemStarted { item: u32, total: u32 },
    ItemRetrying { item: u32, attempt: u32, max_attempts: u32, error: ForgeError },
    ItemPersisted { item: u32, receipt: ArtifactReceipt },
    ItemFailed { item: u32, attempts: u32, error: ForgeError },
    Cancelled { generated: u32 },
}

/// Observer callback for `BatchEvent`s.
pub type ProgressFn = Box<dyn Fn(&BatchEvent) + Send + Sync>;

enum ItemOutcome<R> {
    Persisted(R),
    Failed(ForgeError),
    Cancelled,
}

/// Mutable bookkeeping for one run.
struct RunState<R> {
    run_id: RunId,
    started_at: DateTime<Utc>,
    records: Vec<R>,
    persisted: Vec<Value>,
    artifacts: Vec<ArtifactReceipt>,
    stats: BatchStats,
}

/// Runs batches of generations through a `Generator`.
pub struct BatchDriver {
    generator: Generator,
    sink: Box<dyn ArtifactSink>,
    settings: BatchSettings,
    progress: Option<ProgressFn>,
}

impl BatchDriver {
    pub fn new(generator: Generator, sink: Box<dyn ArtifactSink>, settings: BatchSettings) -> Self {
        Self {
            generator,
            sink,
            settings,
            progress: None,
        }
    }

    /// Register a callback for progress events.
    pub fn on_progress(mut self, f: ProgressFn) -> Self {
        self.progress = Some(f);
        self
    }

    /// Generate `n` records of kind `R`, persisting each success.
    pub fn run<R: GeneratedRecord>(&self, n: u32) -> BatchReport<R> {
        let clock = Instant::now();
        let mut run = RunState {
            run_id: RunId::new(),
            started_at: Utc::now(),
            records: Vec::new(),
            persisted: Vec::new(),
            artifacts: Vec::new(),
            stats: BatchStats {
                requested: n,
                ..BatchStats::default()
            },
        };
        let prompt = R::prompt();

        info!(
            run_id = %run.run_id,
            kind = R::KIND,
            requested = n,
            "starting batch"
        );

        let mut status = BatchStatus::Completed;
        for item in 1..=n {
            if self.cancelled() {
                status = BatchStatus::Cancelled;
                break;
            }

            info!(run_id = %run.run_id, kind = R::KIND, item, total = n, "generating item");
            self.emit(BatchEvent::ItemStarted { item, total: n });

            match self.run_item::<R>(item, &prompt, &mut run) {
                ItemOutcome::Persisted(record) => {
                    run.records.push(record);
                    run.stats.generated += 1;
                }
                ItemOutcome::Failed(err) => {
                    status = BatchStatus::Aborted { item, error: err };
                    break;
                }
                ItemOutcome::Cancelled => {
                    status = BatchStatus::Cancelled;
                    break;
                }
            }
        }

        run.stats.elapsed = clock.elapsed();

        if status == BatchStatus::Cancelled {
            info!(
                run_id = %run.run_id,
                elapsed_secs = run.stats.elapsed.as_secs_f64(),
                partial_completion = run.stats.generated,
                "operation cancelled by user"
            );
            self.emit(BatchEvent::Cancelled {
                generated: run.stats.generated,
            });
        }

        info!(
            run_id = %run.run_id,
            kind = R::KIND,
            total_secs = run.stats.elapsed.as_secs_f64(),
            requested = run.stats.requested,
            generated = run.stats.generated,
            total_attempts = run.stats.attempts,
            model_calls = run.stats.model_calls,
            success_rate = format!("{:.1}%", run.stats.success_rate()),
            exit_code = status.exit_code(),
            "batch finished"
        );

        BatchReport {
            records: run.records,
            artifacts: run.artifacts,
            stats: run.stats,
            status,
        }
    }

    /// Outer retry loop for one item.
    fn run_item<R: GeneratedRecord>(
        &self,
        item: u32,
        prompt: &PromptSpec,
        run: &mut RunState<R>,
    ) -> ItemOutcome<R> {
        let item_clock = Instant::now();
        let max_attempts = self.settings.item_retries.max(1);
        let mut attempts = 0;

        loop {
            if self.cancelled() {
                return ItemOutcome::Cancelled;
            }
            run.stats.attempts += 1;

            let result = match self
                .generator
                .generate::<R>(prompt, self.settings.inner_retries)
            {
                Ok(generated) => {
                    run.stats.model_calls += generated.attempts;
                    self.persist(&generated.record, run)
                        .map(|receipt| (generated.record, receipt))
                }
                Err(err) => {
                    run.stats.model_calls += self.settings.inner_retries.max(1);
                    Err(err)
                }
            };

            match result {
                Ok((record, receipt)) => {
                    info!(
                        run_id = %run.run_id,
                        item,
                        elapsed_secs = item_clock.elapsed().as_secs_f64(),
                        path = %receipt.path.display(),
                        sha256 = %receipt.sha256,
                        "item generated and saved"
                    );
                    run.artifacts.push(receipt.clone());
                    self.emit(BatchEvent::ItemPersisted { item, receipt });
                    return ItemOutcome::Persisted(record);
                }
                Err(err) => {
                    if self.cancelled() {
                        return ItemOutcome::Cancelled;
                    }
                    attempts += 1;
                    error!(
                        run_id = %run.run_id,
                        item,
                        attempt = attempts,
                        max_attempts,
                        error_kind = %err.kind(),
                        error = %err,
                        "item attempt failed"
                    );

                    if attempts < max_attempts {
                        self.emit(BatchEvent::ItemRetrying {
                            item,
                            attempt: attempts,
                            max_attempts,
                            error: err,
                        });
                        let delay = self.generator.backoff().delay(attempts);
                        warn!(item, delay_secs = delay.as_secs_f64(), "retrying item");
                        self.generator.sleeper().sleep(delay);
                    } else {
                        error!(
                            run_id = %run.run_id,
                            item,
                            attempts,
                            "failed to generate item after all attempts"
                        );
                        self.emit(BatchEvent::ItemFailed {
                            item,
                            attempts,
                            error: err.clone(),
                        });
                        return ItemOutcome::Failed(err);
                    }
                }
            }
        }
    }

    /// Write the artifact for a freshly generated record.
    ///
    /// Aggregate layouts rewrite the run's single file with every record so
    /// far; per-record layouts write a new titled file.
    fn persist<R: GeneratedRecord>(
        &self,
        record: &R,
        run: &mut RunState<R>,
    ) -> ForgeResult<ArtifactReceipt> {
        let value = serde_json::to_value(record).map_err(|e| ForgeError::Storage {
            reason: format!("failed to serialize {}: {e}", R::KIND),
        })?;

        let (name, records) = match R::layout() {
            ArtifactLayout::Aggregate { prefix } => {
                let mut records = run.persisted.clone();
                records.push(value.clone());
                (
                    ArtifactName::Aggregate {
                        prefix,
                        started_at: run.started_at,
                    },
                    records,
                )
            }
            ArtifactLayout::PerRecord => (
                ArtifactName::Titled {
                    title: record.title().unwrap_or(R::KIND).to_string(),
                    created_at: Utc::now(),
                },
                vec![value.clone()],
            ),
        };

        let artifact = Artifact {
            name,
            wrapper_key: R::WRAPPER_KEY.to_string(),
            records,
        };
        let receipt = self.sink.persist(&artifact).inspect_err(|e| {
            error!(kind = R::KIND, error = %e, "failed to save artifact");
        })?;
        run.persisted.push(value);
        Ok(receipt)
    }

    fn cancelled(&self) -> bool {
        self.generator.cancel_flag().is_cancelled()
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(progress) = &self.progress {
            progress(&event);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use promptforge_contracts::{
        artifact::{Artifact, ArtifactName, ArtifactReceipt},
        batch::BatchStatus,
        error::{ForgeError, ForgeResult},
    };

    use crate::{
        backoff::{Backoff, CancelFlag},
        generator::{
            tests::{
                connection_refused, valid_note, Note, RecordingSleeper, RequiredFieldsVerifier,
                ScriptedClient,
            },
            Generator,
        },
        traits::ArtifactSink,
    };

    use super::{BatchDriver, BatchEvent, BatchSettings};

    /// Keeps every artifact in memory; optionally fails the first N writes.
    #[derive(Clone, Default)]
    struct MemorySink {
        written: Arc<Mutex<Vec<Artifact>>>,
        fail_writes: Arc<Mutex<u32>>,
    }

    impl ArtifactSink for MemorySink {
        fn persist(&self, artifact: &Artifact) -> ForgeResult<ArtifactReceipt> {
            let mut fail = self.fail_writes.lock().unwrap();
            if *fail > 0 {
                *fail -= 1;
                return Err(ForgeError::Storage {
                    reason: "disk full".to_string(),
                });
            }
            let mut written = self.written.lock().unwrap();
            written.push(artifact.clone());
            let stem = match &artifact.name {
                ArtifactName::Titled { title, .. } => title.clone(),
                ArtifactName::Aggregate { prefix, .. } => prefix.clone(),
            };
            Ok(ArtifactReceipt {
                path: PathBuf::from(format!("{stem}-{}.json", written.len())),
                records: artifact.records.len(),
                sha256: "0".repeat(64),
            })
        }
    }

    fn driver(
        script: Vec<ForgeResult<String>>,
        sink: MemorySink,
        sleeper: RecordingSleeper,
        cancel: CancelFlag,
    ) -> BatchDriver {
        let generator = Generator::new(
            Box::new(ScriptedClient::new(script)),
            Box::new(RequiredFieldsVerifier),
            Box::new(sleeper),
            Backoff::default(),
        )
        .with_cancel(cancel);
        BatchDriver::new(generator, Box::new(sink), BatchSettings::default())
    }

    #[test]
    fn completed_batch_persists_every_item() {
        let sink = MemorySink::default();
        let driver = driver(
            vec![valid_note(), valid_note()],
            sink.clone(),
            RecordingSleeper::default(),
            CancelFlag::new(),
        );

        let report = driver.run::<Note>(2);

        assert_eq!(report.status, BatchStatus::Completed);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.artifacts.len(), 2);
        assert_eq!(report.stats.generated, 2);
        assert_eq!(report.stats.attempts, 2);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(sink.written.lock().unwrap()[0].wrapper_key, "notes");
    }

    #[test]
    fn exhausted_item_aborts_the_run() {
        let sink = MemorySink::default();
        // Item 1 succeeds; item 2 fails on all 3 × 3 model calls.
        let mut script = vec![valid_note()];
        script.extend((0..9).map(|_| connection_refused()));
        script.push(valid_note()); // never reached
        let driver = driver(script, sink.clone(), RecordingSleeper::default(), CancelFlag::new());

        let report = driver.run::<Note>(3);

        match &report.status {
            BatchStatus::Aborted { item, error } => {
                assert_eq!(*item, 2);
                assert!(matches!(error, ForgeError::Connection { .. }));
            }
            other => panic!("expected Aborted, got {:?}", other),
        }
        assert_eq!(report.exit_code(), 1);
        assert_eq!(sink.written.lock().unwrap().len(), 1);
        assert_eq!(report.stats.attempts, 4);
        assert_eq!(report.stats.model_calls, 10);
    }

    #[test]
    fn failed_write_counts_as_an_outer_attempt() {
        let sink = MemorySink::default();
        *sink.fail_writes.lock().unwrap() = 1;
        let sleeper = RecordingSleeper::default();
        let driver = driver(
            vec![valid_note(), valid_note()],
            sink.clone(),
            sleeper.clone(),
            CancelFlag::new(),
        );

        let report = driver.run::<Note>(1);

        assert_eq!(report.status, BatchStatus::Completed);
        assert_eq!(report.stats.attempts, 2);
        assert_eq!(*sleeper.slept.lock().unwrap(), vec![Duration::from_secs(2)]);
    }

    #[test]
    fn progress_events_include_retry_notices() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let captured = events.clone();
        let mut script: Vec<_> = (0..3).map(|_| connection_refused()).collect();
        script.push(valid_note());
        let driver = driver(
            script,
            MemorySink::default(),
            RecordingSleeper::default(),
            CancelFlag::new(),
        )
        .on_progress(Box::new(move |event| {
            captured.lock().unwrap().push(format!("{:?}", event));
        }));

        let report = driver.run::<Note>(1);

        assert_eq!(report.status, BatchStatus::Completed);
        let events = events.lock().unwrap();
        assert!(events[0].starts_with("ItemStarted"));
        assert!(events.iter().any(|e| e.starts_with("ItemRetrying")));
        assert!(events.last().unwrap().starts_with("ItemPersisted"));
    }

    #[test]
    fn cancelled_run_stops_before_next_item() {
        let cancel = CancelFlag::new();
        let sink = MemorySink::default();
        let trigger = cancel.clone();
        let driver = driver(
            vec![valid_note(), valid_note()],
            sink.clone(),
            RecordingSleeper::default(),
            cancel,
        )
        .on_progress(Box::new(move |event| {
            if let BatchEvent::ItemPersisted { .. } = event {
                trigger.cancel();
            }
        }));

        let report = driver.run::<Note>(2);

        assert_eq!(report.status, BatchStatus::Cancelled);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.records.len(), 1);
        assert_eq!(sink.written.lock().unwrap().len(), 1);
    }
}
