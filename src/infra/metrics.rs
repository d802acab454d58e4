// ============================================================
// Metrics Logger
// ============================================================
// Records one CSV row per epoch so a run's learning curve can
// be plotted afterwards. Pure reporting: nothing in training
// reads this file back.
//
// Output file: {dir}/metrics.csv
//
//   epoch,mean_loss,elapsed_secs
//   1,3.124500,12.4
//   2,2.890100,24.9
//
// Reference: Rust Book §12 (I/O and File Handling)

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One row of metrics data for a single training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean loss over all batches of the epoch
    pub mean_loss: f64,

    /// Wall-clock seconds since training started
    pub elapsed_secs: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, mean_loss: f64, elapsed: Duration) -> Self {
        Self {
            epoch,
            mean_loss,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }
}

/// Appends epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and write the CSV header if the file does not
    /// exist yet, so a rerun appends to the existing log.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,mean_loss,elapsed_secs")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(f, "{},{:.6},{:.1}", m.epoch, m.mean_loss, m.elapsed_secs)?;

        tracing::debug!("Logged epoch {} metrics: mean_loss={:.4}", m.epoch, m.mean_loss);
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
