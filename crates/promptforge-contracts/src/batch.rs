//! Batch outcome and statistics types.
//!
//! `BatchReport` is what the driver returns whether the run completed,
//! terminated early, or was cancelled. Statistics are always populated.

use std::time::Duration;

use serde::Serialize;

use crate::{artifact::ArtifactReceipt, error::ForgeError};

/// How a batch run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every requested item was generated and persisted.
    Completed,
    /// An item exhausted its outer retry budget; later items were not tried.
    Aborted {
        /// 1-based index of the failing item.
        item: u32,
        error: ForgeError,
    },
    /// The operator interrupted the run. Persisted artifacts are kept.
    Cancelled,
}

impl BatchStatus {
    /// Process exit code for this outcome. Only an aborted run is non-zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            BatchStatus::Completed | BatchStatus::Cancelled => 0,
            BatchStatus::Aborted { .. } => 1,
        }
    }
}

/// Aggregate statistics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStats {
    pub requested: u32,
    pub generated: u32,
    /// Outer attempts across all items.
    pub attempts: u32,
    /// Model calls across all items, counting the loop's own retries.
    pub model_calls: u32,
    #[serde(with = "secs")]
    pub elapsed: Duration,
}

impl BatchStats {
    /// Percentage of outer attempts that produced a record. Zero when no
    /// attempt was made.
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            f64::from(self.generated) / f64::from(self.attempts) * 100.0
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone)]
pub struct BatchReport<R> {
    /// Records generated, in order.
    pub records: Vec<R>,
    /// One receipt per artifact write, in order.
    pub artifacts: Vec<ArtifactReceipt>,
    pub stats: BatchStats,
    pub status: BatchStatus,
}

impl<R> BatchReport<R> {
    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}
