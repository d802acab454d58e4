//! musegen — train an autoregressive transformer on tokenized music and
//! sample new sequences from it.
//!
//! The crate is organised in the same layered shape as the data pipeline:
//!
//!   Corpus (integer token sequences)
//!       │
//!       ▼
//!   SequenceWindower   → fixed-length overlapping training windows
//!       │
//!       ▼
//!   BatchScheduler     → per-epoch shuffle + fixed-size batches
//!       │
//!       ▼
//!   WindowBatcher      → (batch, seq_len) integer tensors
//!       │
//!       ▼
//!   Trainer            → forward, backward, clip, step, stop-loss check
//!       │
//!       ▼
//!   Checkpointer       → one artifact: model + optimizer state
//!
//! Generation is a separate flow: start token → nucleus sampling →
//! `Vec<Token>`.
//!
//! Layer rules: `domain` is plain Rust (no Burn, no I/O), `data` turns the
//! corpus into tensors, `ml` is the only layer that imports Burn model and
//! optimizer types, `infra` owns persistence and metrics.

#![recursion_limit = "256"]

pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;

pub use domain::corpus::{Corpus, Sequence, Token};
pub use domain::dictionary::{Dictionary, VocabSize, PAD_TOKEN, START_TOKEN};
pub use error::{Error, Result};
pub use infra::checkpoint::Checkpointer;
pub use infra::metrics::{EpochMetrics, MetricsLogger};
pub use ml::model::{MusicGenModel, MusicGenModelConfig};
pub use ml::trainer::{StopReason, TrainConfig, Trainer, TrainingReport};
