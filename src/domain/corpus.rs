/// One token: a non-negative index into a fixed vocabulary.
/// Tokens carry no structure beyond their integer value.
pub type Token = u32;

/// One training example (e.g. one tokenized song), immutable once
/// produced by the external tokenizer. May be empty.
pub type Sequence = Vec<Token>;

/// An ordered collection of sequences. Order is irrelevant to training
/// semantics (windows are shuffled every epoch) but iteration is
/// repeatable, so windowing is deterministic given the same corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    songs: Vec<Sequence>,
}

impl Corpus {
    pub fn new(songs: Vec<Sequence>) -> Self {
        Self { songs }
    }

    /// The sequences in insertion order.
    pub fn songs(&self) -> &[Sequence] {
        &self.songs
    }

    /// Number of sequences, including empty ones.
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Total token count across all sequences. A corpus with zero total
    /// tokens produces zero training windows.
    pub fn total_tokens(&self) -> usize {
        self.songs.iter().map(Vec::len).sum()
    }
}

impl From<Vec<Sequence>> for Corpus {
    fn from(songs: Vec<Sequence>) -> Self {
        Self::new(songs)
    }
}
