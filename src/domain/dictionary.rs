// ============================================================
// Dictionary — the external vocabulary collaborator
// ============================================================
// The token dictionary is owned by whatever produced the corpus
// (a MIDI tokenizer, a text tokenizer, ...). This crate only
// needs its cardinality, to size the embedding table and the
// vocabulary head, so the collaborator is a one-method trait.
//
// Convention the dictionary must honour: token 0 is reserved as
// the padding / start sentinel. Windowing pads with it and
// generation seeds with it.

use crate::domain::corpus::Token;

/// Padding token used to left-pad sequences before windowing.
pub const PAD_TOKEN: Token = 0;

/// Seed token for generation. Shares the value 0 with [`PAD_TOKEN`]
/// by external convention.
pub const START_TOKEN: Token = 0;

/// Any component that knows the vocabulary cardinality.
///
/// Implementations:
///   - `VocabSize` → a caller that only knows the count
///   - an application's own tokenizer/dictionary type
pub trait Dictionary {
    /// Vocabulary cardinality. Every corpus token must be < `size()`,
    /// and token 0 must be reserved as the pad/start sentinel.
    fn size(&self) -> usize;
}

/// Minimal [`Dictionary`] for callers that only have the vocabulary size.
#[derive(Debug, Clone, Copy)]
pub struct VocabSize(pub usize);

impl Dictionary for VocabSize {
    fn size(&self) -> usize {
        self.0
    }
}
