//! Core pipeline for turning a long-form video into a ranked, scored set
//! of short-form clip candidates.
//!
//! The crate is organized around a small set of independently testable
//! components, wired together by the [`orchestrator`]:
//!
//! - [`checkpoint`] persists and resumes per-source pipeline state.
//! - [`segmentation`] derives candidate clip windows from a transcript.
//! - [`prefilter`] cheaply ranks candidates before the expensive remote
//!   scoring pass.
//! - [`scoring`] batches candidates to a remote model, with retry,
//!   backoff, a local-scoring circuit breaker, and state-spill on
//!   extended rate limiting.
//! - [`validator`] removes overlapping and near-duplicate clips from the
//!   final set.
//! - [`diagnostics`] reports structured progress and failure events.
//! - [`cancellation`] offers a cooperative flag the scoring engine checks
//!   between remote calls and sleeps.
//!
//! Decoding audio and running ASR are out of scope; callers supply their
//! own [`external::AudioExtractor`] and [`external::Transcriber`]
//! implementations.

pub mod cancellation;
pub mod checkpoint;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod external;
pub mod model;
pub mod orchestrator;
pub mod prefilter;
pub mod scoring;
pub mod segmentation;
pub mod validator;

pub use cancellation::CancellationToken;
pub use config::{ModelConfig, PipelineConfig, PreflightConfig, SegmentationConfig, ValidatorConfig};
pub use error::{Error, Result};
pub use external::{AudioExtractor, ExternalError, Transcriber};
pub use orchestrator::Orchestrator;
