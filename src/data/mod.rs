// ============================================================
// Data Pipeline
// ============================================================
// Everything between the raw corpus and the tensors the model
// consumes, in this order:
//
//   Corpus (Vec<Vec<Token>>)
//       │
//       ▼
//   SequenceWindower  → fixed-length overlapping windows
//       │
//       ▼
//   BatchScheduler    → per-epoch shuffle + fixed-size batches
//       │
//       ▼
//   WindowBatcher     → [batch, seq_len] integer tensors
//
// Each module is responsible for exactly one step, so each step
// is independently testable.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Slides a fixed-size frame over left-padded sequences
pub mod windower;

/// Shuffles windows and partitions them into batches, once per epoch
pub mod scheduler;

/// Stacks a batch of windows into a 2-D integer tensor
pub mod batcher;

/// One fixed-length training input of exactly `max_sequence_length` tokens.
pub type Window = Vec<crate::domain::corpus::Token>;
