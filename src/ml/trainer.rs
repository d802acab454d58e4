// ============================================================
// Training Loop
// ============================================================
// Drives the whole recipe: per epoch, re-window the corpus and
// reshuffle the windows into batches; per batch, forward to get
// the scalar loss, backward, clip the global gradient norm,
// apply one Adam step, and record the loss; at the epoch
// boundary, compare the mean loss against the stop-loss
// threshold and either stop early or continue until the
// configured epoch count is exhausted.
//
// Training mode is a property of the backend type: the trainer
// is built over an Autodiff backend (dropout active, gradients
// tracked), and generation goes through model.valid(), which
// returns the evaluation-mode model on the inner backend. There
// is no hidden mutable train/eval flag to flip.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use burn::{
    module::{AutodiffModule, ModuleVisitor, ParamId},
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data::{batcher::WindowBatcher, scheduler::BatchScheduler, windower::SequenceWindower};
use crate::domain::corpus::{Corpus, Token};
use crate::domain::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::infra::checkpoint::Checkpointer;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{MusicGenModel, MusicGenModelConfig};
use crate::ml::sampler;

/// Cap on the L2 norm of the WHOLE gradient vector (all parameters
/// jointly), applied between backward and every optimizer step. The sole
/// guard against unstable updates. Note this is a single norm across the
/// model, not a per-tensor cap: many tensors each under the cap can still
/// jointly exceed it.
const GRAD_CLIP_NORM: f64 = 0.5;

pub type MusicOptimizer<B> = OptimizerAdaptor<Adam, MusicGenModel<B>, B>;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialisable so a run can be
// recorded next to its checkpoint and replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub max_sequence_length:  usize,
    pub batch_size:           usize,
    pub epochs:               usize,
    /// Epoch-mean loss at or below this value stops training early.
    pub stop_loss:            f64,
    pub learning_rate:        f64,
    /// Emit a mean-loss observation every this many batches. Pure
    /// reporting; never drives a control decision.
    pub report_every_batches: usize,
    /// Fixed seed for the per-epoch window shuffle; None seeds from
    /// entropy.
    pub shuffle_seed:         Option<u64>,
    pub dim:                  usize,
    pub depth:                usize,
    pub heads:                usize,
    pub dropout:              f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_sequence_length:  512,
            batch_size:           4,
            epochs:               10,
            stop_loss:            0.1,
            learning_rate:        2e-4,
            report_every_batches: 10,
            shuffle_seed:         None,
            dim:                  512,
            depth:                6,
            heads:                8,
            dropout:              0.1,
        }
    }
}

impl TrainConfig {
    /// Fail fast on hyperparameters that would make training undefined.
    /// Runs before any model is built.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".into()));
        }
        if self.max_sequence_length < 2 {
            return Err(Error::Config(
                "max_sequence_length must be at least 2 to form an input/target pair".into(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::Config("learning_rate must be positive and finite".into()));
        }
        if self.report_every_batches == 0 {
            return Err(Error::Config("report_every_batches must be positive".into()));
        }
        Ok(())
    }
}

/// Why a training run ended. Both are normal termination, not failure.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// All configured epochs ran without the mean loss reaching the
    /// stop-loss threshold.
    EpochsCompleted,
    /// An epoch's mean loss reached the threshold; remaining epochs were
    /// skipped. `epoch` is 1-based, matching the log lines and metrics.
    StopLossReached { epoch: usize, mean_loss: f64 },
}

/// Summary of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub epochs_run:   usize,
    /// Mean loss per completed epoch, in order.
    pub epoch_losses: Vec<f64>,
    pub stop:         StopReason,
    pub elapsed:      Duration,
}

// ─── Trainer ──────────────────────────────────────────────────────────────────
/// Owns the model, the optimizer, and the data pipeline for one training
/// recipe. `B` must be an autodiff backend; the device is injected at
/// construction and every tensor the trainer creates lands on it.
pub struct Trainer<B: AutodiffBackend> {
    config:    TrainConfig,
    model:     MusicGenModel<B>,
    optim:     MusicOptimizer<B>,
    windower:  SequenceWindower,
    scheduler: BatchScheduler,
    batcher:   WindowBatcher<B>,
    device:    B::Device,
    metrics:   Option<MetricsLogger>,
}

impl<B: AutodiffBackend> Trainer<B> {
    /// Validate the configuration and build the model and optimizer.
    /// The dictionary collaborator supplies the vocabulary cardinality;
    /// token 0 is assumed reserved as the pad/start sentinel.
    pub fn new(config: TrainConfig, dictionary: &impl Dictionary, device: B::Device) -> Result<Self> {
        config.validate()?;

        let model = MusicGenModelConfig::new(dictionary.size(), config.max_sequence_length)
            .with_dim(config.dim)
            .with_depth(config.depth)
            .with_heads(config.heads)
            .with_dropout(config.dropout)
            .init(&device);

        // Gradient clipping happens in train_step, on the assembled
        // GradientsParams, so the norm is taken over all parameters
        // jointly. Burn's per-optimizer GradientClippingConfig clips each
        // tensor independently, which is a different operation.
        let optim = AdamConfig::new().init();

        let windower = SequenceWindower::new(config.max_sequence_length);
        let scheduler = match config.shuffle_seed {
            Some(seed) => BatchScheduler::seeded(config.batch_size, seed),
            None => BatchScheduler::new(config.batch_size),
        };
        let batcher = WindowBatcher::new(device.clone());

        tracing::info!(
            "Model ready: {} layers, dim={}, vocab={}",
            config.depth,
            config.dim,
            dictionary.size()
        );

        Ok(Self {
            config,
            model,
            optim,
            windower,
            scheduler,
            batcher,
            device,
            metrics: None,
        })
    }

    /// Attach a per-epoch CSV metrics log.
    pub fn with_metrics(mut self, metrics: MetricsLogger) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run the full training loop over the corpus.
    ///
    /// Per epoch: fresh windowing, reshuffled batching, one optimizer
    /// step per batch, then the stop-loss check on the epoch mean.
    pub fn train(&mut self, corpus: &Corpus) -> Result<TrainingReport> {
        if corpus.total_tokens() == 0 {
            return Err(Error::EmptyCorpus);
        }

        let start = Instant::now();
        let mut epoch_losses: Vec<f64> = Vec::with_capacity(self.config.epochs);

        for epoch in 0..self.config.epochs {
            tracing::info!("Training epoch {}.", epoch + 1);

            // Windowing is deterministic; the shuffle below is what
            // changes from epoch to epoch.
            let windows = self.windower.windows(corpus);
            let batches = self.scheduler.epoch_batches(windows);
            tracing::debug!("Number of batches: {}", batches.len());

            let mut batch_losses: Vec<f64> = Vec::with_capacity(batches.len());
            let mut report_losses: Vec<f64> = Vec::new();

            for (index, batch) in batches.iter().enumerate() {
                let loss_value = self.train_step(batch, epoch + 1)?;
                batch_losses.push(loss_value);
                report_losses.push(loss_value);

                if (index + 1) % self.config.report_every_batches == 0 {
                    let mean = report_losses.iter().sum::<f64>() / report_losses.len() as f64;
                    tracing::info!(
                        "Batch {}/{}: mean loss over last {} batches is {:.4}.",
                        index + 1,
                        batches.len(),
                        report_losses.len(),
                        mean
                    );
                    report_losses.clear();
                }
            }

            let epoch_mean = batch_losses.iter().sum::<f64>() / batch_losses.len() as f64;
            epoch_losses.push(epoch_mean);

            if let Some(metrics) = &self.metrics {
                metrics.log(&EpochMetrics::new(epoch + 1, epoch_mean, start.elapsed()))?;
            }

            if epoch_mean <= self.config.stop_loss {
                tracing::info!(
                    "Loss of {:.4} was lower than stop loss of {:.4}. Stopping training.",
                    epoch_mean,
                    self.config.stop_loss
                );
                return Ok(TrainingReport {
                    epochs_run: epoch + 1,
                    epoch_losses,
                    stop: StopReason::StopLossReached {
                        epoch: epoch + 1,
                        mean_loss: epoch_mean,
                    },
                    elapsed: start.elapsed(),
                });
            }

            tracing::info!(
                "Loss after epoch {} is {:.4}. Running time: {:.1}s",
                epoch + 1,
                epoch_mean,
                start.elapsed().as_secs_f64()
            );
        }

        Ok(TrainingReport {
            epochs_run: self.config.epochs,
            epoch_losses,
            stop: StopReason::EpochsCompleted,
            elapsed: start.elapsed(),
        })
    }

    /// Forward, backward, clip, step. Returns the batch's scalar loss.
    /// `epoch_number` is 1-based, matching the log lines.
    fn train_step(&mut self, batch: &[crate::data::Window], epoch_number: usize) -> Result<f64> {
        let tensor = self.batcher.batch(batch);

        let loss = self.model.forward_loss(tensor);
        let loss_value: f64 = loss.clone().into_scalar().elem();

        if !loss_value.is_finite() {
            return Err(Error::Divergence {
                epoch: epoch_number,
                loss: loss_value,
            });
        }

        // Backward, clip the global norm, then one Adam update. Gradients
        // are consumed by the step, so there is no separate zeroing.
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        let grads = clip_global_norm(&self.model, grads, GRAD_CLIP_NORM);
        self.model = self
            .optim
            .step(self.config.learning_rate, self.model.clone(), grads);

        Ok(loss_value)
    }

    /// Generate `output_length` tokens with the evaluation-mode model
    /// (dropout inert, no gradient tracking). Fixed temperature 1.0 and
    /// nucleus threshold 0.9; the seed is the reserved start token.
    /// Draws from an entropy-seeded RNG; use [`Trainer::generate_with_rng`]
    /// for a reproducible run.
    pub fn generate(&self, output_length: usize) -> Result<Vec<Token>> {
        self.generate_with_rng(output_length, &mut StdRng::from_entropy())
    }

    /// [`Trainer::generate`] with a caller-supplied RNG, mirroring the
    /// reseedable window shuffle: the same model, seed, and length replay
    /// the same tokens.
    pub fn generate_with_rng(&self, output_length: usize, rng: &mut impl rand::Rng) -> Result<Vec<Token>> {
        if output_length == 0 {
            return Err(Error::Config("output_length must be positive".into()));
        }

        let model = self.model.valid();
        sampler::generate(&model, output_length, &self.device, rng)
    }

    /// Persist {model parameters, optimizer state} to `path` plus the
    /// checkpoint suffix.
    pub fn save_checkpoint(&self, path: &str) -> Result<()> {
        Checkpointer::save(path, &self.model, &self.optim)
    }

    /// Replace the model parameters with the ones stored at `path`.
    /// Optimizer state present in the artifact is NOT restored into the
    /// live optimizer; see `Checkpointer::load`.
    pub fn load_checkpoint(&mut self, path: &str) -> Result<()> {
        self.model = Checkpointer::load(path, self.model.clone(), &self.device)?;
        Ok(())
    }

    /// The current model, for evaluation-mode uses beyond this trainer.
    pub fn model(&self) -> &MusicGenModel<B> {
        &self.model
    }
}

// ─── Global gradient-norm clipping ────────────────────────────────────────────
// The norm is the L2 norm of all parameter gradients concatenated into
// one vector: sqrt(Σ over params of Σ g²). When it exceeds `max_norm`,
// every gradient is scaled by max_norm / norm, so the joint update
// magnitude is bounded while gradient directions are preserved. The
// model's parameter tree is walked with a ModuleVisitor (the same
// mechanism GradientsParams::from_grads uses), since gradient tensors
// have mixed ranks.

/// L2 norm of the whole gradient vector across all parameters.
fn global_grad_norm<B: AutodiffBackend>(
    model: &MusicGenModel<B>,
    grads: &GradientsParams,
) -> f64 {
    let mut visitor = SquaredNormAccumulator::<B> {
        grads,
        sum_squares: 0.0,
        _backend: PhantomData,
    };
    model.visit(&mut visitor);
    visitor.sum_squares.sqrt()
}

/// Scale all gradients by max_norm / norm whenever the global norm
/// exceeds `max_norm`; otherwise pass them through untouched.
fn clip_global_norm<B: AutodiffBackend>(
    model: &MusicGenModel<B>,
    mut grads: GradientsParams,
    max_norm: f64,
) -> GradientsParams {
    let norm = global_grad_norm(model, &grads);
    if norm <= max_norm || norm == 0.0 {
        return grads;
    }

    let mut visitor = GradientScaler::<B> {
        grads: &mut grads,
        scale: max_norm / norm,
        _backend: PhantomData,
    };
    model.visit(&mut visitor);
    grads
}

struct SquaredNormAccumulator<'a, B: AutodiffBackend> {
    grads: &'a GradientsParams,
    sum_squares: f64,
    _backend: PhantomData<B>,
}

impl<'a, B: AutodiffBackend> ModuleVisitor<B> for SquaredNormAccumulator<'a, B> {
    fn visit_float<const D: usize>(&mut self, id: ParamId, _tensor: &Tensor<B, D>) {
        if let Some(grad) = self.grads.get::<B::InnerBackend, D>(id) {
            let sum: f64 = grad.powf_scalar(2.0).sum().into_scalar().elem();
            self.sum_squares += sum;
        }
    }
}

struct GradientScaler<'a, B: AutodiffBackend> {
    grads: &'a mut GradientsParams,
    scale: f64,
    _backend: PhantomData<B>,
}

impl<'a, B: AutodiffBackend> ModuleVisitor<B> for GradientScaler<'a, B> {
    fn visit_float<const D: usize>(&mut self, id: ParamId, _tensor: &Tensor<B, D>) {
        if let Some(grad) = self.grads.remove::<B::InnerBackend, D>(id) {
            self.grads.register(id, grad.mul_scalar(self.scale));
        }
    }
}
