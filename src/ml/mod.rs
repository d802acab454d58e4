// ============================================================
// ML Layer (Burn)
// ============================================================
// This layer contains ALL Burn model and optimizer specific
// code. No other layer imports Burn modules directly — only
// this one (the batcher touches the tensor API, nothing more).
//
// What's in this layer:
//
//   model.rs   — decoder-only transformer built from Burn's
//                building blocks: token + position embeddings,
//                masked multi-head self-attention, GELU
//                feed-forward, layer norms, vocabulary head.
//                forward_loss does the shift-by-one split so
//                the training loop never constructs targets.
//
//   sampler.rs — evaluation-mode autoregressive generation:
//                nucleus (top-p) sampling with a fixed
//                temperature from a single start token.
//
//   trainer.rs — the training loop: epochs, batches, forward,
//                backward, gradient clipping, optimizer step,
//                loss aggregation, periodic reporting, early
//                stopping on the stop-loss threshold.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// Decoder-only transformer architecture glue
pub mod model;

/// Nucleus-sampling generation
pub mod sampler;

/// Training loop and configuration
pub mod trainer;
