//! # promptforge-core
//!
//! The generation pipeline for promptforge.
//!
//! This crate provides:
//! - The collaborator traits (`ModelClient`, `Verifier`, `ArtifactSink`,
//!   `Sleeper`, `GeneratedRecord`)
//! - [`extract::extract_json`], the ordered JSON recovery chain
//! - The [`Generator`] retry loop and the [`BatchDriver`] around it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use promptforge_core::{Backoff, BatchDriver, BatchSettings, Generator};
//!
//! let generator = Generator::new(client, verifier, sleeper, Backoff::default());
//! let report = BatchDriver::new(generator, sink, BatchSettings::default()).run::<Character>(5);
//! ```

pub mod backoff;
pub mod batch;
pub mod extract;
pub mod generator;
pub mod traits;

pub use backoff::{Backoff, CancelFlag, ThreadSleeper};
pub use batch::{BatchDriver, BatchEvent, BatchSettings, ProgressFn};
pub use generator::Generator;
