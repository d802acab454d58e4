use burn::{
    nn::{
        attention::{generate_autoregressive_mask, MhaInput, MultiHeadAttention,
            MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct MusicGenModelConfig {
    pub num_tokens:  usize,
    pub max_seq_len: usize,
    #[config(default = 512)]
    pub dim: usize,
    #[config(default = 6)]
    pub depth: usize,
    #[config(default = 8)]
    pub heads: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl MusicGenModelConfig {
    /// Build the model on the given device. The device is injected here
    /// once; everything downstream inherits it from the parameters.
    pub fn init<B: Backend>(&self, device: &B::Device) -> MusicGenModel<B> {
        let token_embedding    = EmbeddingConfig::new(self.num_tokens, self.dim).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.dim).init(device);
        let layers: Vec<DecoderBlock<B>> = (0..self.depth)
            .map(|_| self.build_decoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.dim).init(device);
        let vocab_head = LinearConfig::new(self.dim, self.num_tokens).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        MusicGenModel {
            token_embedding, position_embedding, layers,
            final_norm, vocab_head, dropout,
            max_seq_len: self.max_seq_len,
        }
    }

    fn build_decoder_block<B: Backend>(&self, device: &B::Device) -> DecoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.dim, self.heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.dim, self.dim * 4).init(device);
        let ffn_linear2 = LinearConfig::new(self.dim * 4, self.dim).init(device);
        let norm1   = LayerNormConfig::new(self.dim).init(device);
        let norm2   = LayerNormConfig::new(self.dim).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        DecoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> DecoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>, causal_mask: Tensor<B, 3, Bool>) -> Tensor<B, 3> {
        let attn_output = self.self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_attn(causal_mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

/// Decoder-only autoregressive transformer over a fixed token vocabulary.
/// Each position may only attend to itself and earlier positions.
#[derive(Module, Debug)]
pub struct MusicGenModel<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<DecoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub vocab_head:         Linear<B>,
    pub dropout:            Dropout,
    pub max_seq_len:        usize,
}

impl<B: Backend> MusicGenModel<B> {
    /// tokens: [batch, seq_len] → next-token logits: [batch, seq_len, vocab]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = tokens.dims();
        let device = tokens.device();

        let tok_emb = self.token_embedding.forward(tokens);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let causal_mask = generate_autoregressive_mask::<B>(batch_size, seq_len, &device);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, causal_mask.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, dim]

        self.vocab_head.forward(x) // [batch, seq_len, vocab]
    }

    /// Training entry point: takes a whole window batch and returns the
    /// scalar cross-entropy loss. The shift-by-one input/target split
    /// happens here, inside the model, so the training loop never builds
    /// targets: positions 0..M-1 predict positions 1..M.
    pub fn forward_loss(&self, batch: Tensor<B, 2, Int>) -> Tensor<B, 1>
    where
        B: AutodiffBackend,
    {
        let [batch_size, seq_len] = batch.dims();

        let inputs  = batch.clone().slice([0..batch_size, 0..seq_len - 1]);
        let targets = batch.slice([0..batch_size, 1..seq_len]);

        let logits = self.forward(inputs);
        let [_, _, vocab] = logits.dims(); // [batch, seq_len-1, vocab]

        let flat = batch_size * (seq_len - 1);
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        ce.forward(logits.reshape([flat, vocab]), targets.reshape([flat]))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn tiny_config() -> MusicGenModelConfig {
        MusicGenModelConfig::new(12, 6)
            .with_dim(16)
            .with_depth(1)
            .with_heads(2)
            .with_dropout(0.0)
    }

    #[test]
    fn test_forward_logit_shape() {
        let device = Default::default();
        let model: MusicGenModel<NdArray> = tiny_config().init(&device);

        let tokens = Tensor::<NdArray, 1, Int>::from_ints(
            [0, 1, 2, 3, 4, 5, 0, 6, 7, 8, 9, 10].as_slice(),
            &device,
        )
        .reshape([2, 6]);

        let logits = model.forward(tokens);
        assert_eq!(logits.dims(), [2, 6, 12]);
    }

    #[test]
    fn test_forward_loss_is_finite_scalar() {
        let device = Default::default();
        let model: MusicGenModel<TestBackend> = tiny_config().init(&device);

        let batch = Tensor::<TestBackend, 1, Int>::from_ints(
            [0, 0, 1, 2, 3, 4, 0, 0, 5, 6, 7, 8].as_slice(),
            &device,
        )
        .reshape([2, 6]);

        let loss = model.forward_loss(batch);
        let value: f64 = loss.into_scalar().elem();
        assert!(value.is_finite());
        assert!(value > 0.0);
    }
}
