// ============================================================
// Crate Errors
// ============================================================
// Every fallible path in the crate funnels into this enum so
// callers can match on the failure kind instead of parsing
// strings.
//
// Reference: Rust Book §9 (Error Handling)

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A hyperparameter failed fail-fast validation before training began.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The corpus produced zero training windows, so an epoch mean loss
    /// would be undefined.
    #[error("corpus contains no trainable tokens")]
    EmptyCorpus,

    /// No checkpoint artifact exists at the resolved path.
    #[error("checkpoint not found at '{0}'")]
    ArtifactNotFound(PathBuf),

    /// A batch loss became non-finite; continuing would corrupt the
    /// parameters. `epoch` is 1-based, matching the training log lines.
    #[error("loss diverged to {loss} during epoch {epoch}")]
    Divergence { epoch: usize, loss: f64 },

    /// Token sampling could not draw from the filtered distribution.
    #[error("sampling failed: {0}")]
    Sampling(String),

    /// Burn failed to (de)serialize a model or optimizer record.
    #[error("record serialization failed: {0}")]
    Record(#[from] burn::record::RecorderError),

    /// The checkpoint container could not be encoded.
    #[error("checkpoint encoding failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The checkpoint container could not be decoded.
    #[error("checkpoint decoding failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
