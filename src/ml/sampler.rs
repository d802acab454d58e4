// ============================================================
// Sampler — autoregressive generation
// ============================================================
// Generates a token sequence one step at a time: feed the
// running context through the model, take the logits of the
// last position, temperature-scale, softmax, truncate to the
// nucleus (smallest set of tokens whose probability mass
// reaches top-p), and draw from the renormalised head.
//
// The seed is a single start token (0 by the dictionary
// convention) and is excluded from the returned sequence, so
// the caller gets exactly `output_length` generated tokens.
//
// The model passed in must be an evaluation-mode model
// (a plain-backend model, e.g. obtained via `model.valid()`),
// so dropout is inert and no gradients are tracked.
//
// Reference: Holtzman et al. (2020) The Curious Case of
//            Neural Text Degeneration (nucleus sampling)

use std::cmp::Ordering;

use burn::prelude::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::domain::corpus::Token;
use crate::domain::dictionary::START_TOKEN;
use crate::error::{Error, Result};
use crate::ml::model::MusicGenModel;

/// Fixed sampling temperature.
pub const TEMPERATURE: f64 = 1.0;

/// Fixed nucleus (top-p) threshold.
pub const TOP_P: f32 = 0.9;

/// Generate `output_length` tokens from the start-token seed.
pub fn generate<B: Backend>(
    model: &MusicGenModel<B>,
    output_length: usize,
    device: &B::Device,
    rng: &mut impl Rng,
) -> Result<Vec<Token>> {
    let mut tokens: Vec<Token> = vec![START_TOKEN];

    for _ in 0..output_length {
        // The context window is capped at the model's trained length.
        let start = tokens.len().saturating_sub(model.max_seq_len);
        let context: Vec<i32> = tokens[start..].iter().map(|&t| t as i32).collect();
        let context_len = context.len();

        let input = Tensor::<B, 1, Int>::from_ints(context.as_slice(), device)
            .reshape([1, context_len]);

        let logits = model.forward(input); // [1, context_len, vocab]
        let [_, _, vocab] = logits.dims();

        let last = logits
            .slice([0..1, context_len - 1..context_len, 0..vocab])
            .reshape([vocab]);

        let probs = burn::tensor::activation::softmax(last / TEMPERATURE, 0);
        let probs: Vec<f32> = probs
            .into_data()
            .to_vec()
            .map_err(|e| Error::Sampling(format!("{e:?}")))?;

        let next = sample_top_p(&probs, TOP_P, rng)?;
        tokens.push(next as Token);
    }

    // Drop the seed: only produced tokens are returned.
    Ok(tokens.split_off(1))
}

/// Draw one index from the nucleus of the distribution: the highest
/// probability tokens whose cumulative mass first reaches `top_p`
/// (always at least one), renormalised by the weighted draw itself.
fn sample_top_p(probs: &[f32], top_p: f32, rng: &mut impl Rng) -> Result<usize> {
    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| probs[b].partial_cmp(&probs[a]).unwrap_or(Ordering::Equal));

    let mut cumulative = 0.0f32;
    let mut keep = 0;
    for &i in &order {
        cumulative += probs[i];
        keep += 1;
        if cumulative >= top_p {
            break;
        }
    }

    let nucleus = &order[..keep];
    let weights: Vec<f32> = nucleus.iter().map(|&i| probs[i]).collect();
    let dist = WeightedIndex::new(&weights).map_err(|e| Error::Sampling(e.to_string()))?;

    Ok(nucleus[dist.sample(rng)])
}
