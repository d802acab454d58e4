// ============================================================
// Sequence Windower
// ============================================================
// Turns variable-length token sequences into fixed-length
// training windows by left-padding and sliding a frame one
// token at a time.
//
// Example with max_sequence_length=2, padding_token=0:
//   Song:    [1, 2, 3]
//   Padded:  [0, 0, 1, 2, 3]
//   Windows: [0,0]  [0,1]  [1,2]      (one per token of the song)
//
// A song of length L always yields exactly L windows: the frame
// starts fully inside the padding and ends one token later each
// step, so every prefix of the song becomes a training input.
// Output is in song-then-position order and is deterministic
// given the corpus order; shuffling happens later, in the
// scheduler.
//
// Reference: Rust Book §8 (Slices)

use crate::data::Window;
use crate::domain::corpus::{Corpus, Token};
use crate::domain::dictionary::PAD_TOKEN;

pub struct SequenceWindower {
    /// Length of every emitted window
    max_sequence_length: usize,
    /// Token used for the left pad (0 by external convention)
    padding_token: Token,
}

impl SequenceWindower {
    /// Create a windower padding with the reserved sentinel token.
    pub fn new(max_sequence_length: usize) -> Self {
        Self::with_padding(max_sequence_length, PAD_TOKEN)
    }

    /// Create a windower with an explicit padding token.
    pub fn with_padding(max_sequence_length: usize, padding_token: Token) -> Self {
        debug_assert!(max_sequence_length > 0, "window length must be positive");
        Self {
            max_sequence_length,
            padding_token,
        }
    }

    /// Produce all windows for the corpus, song by song.
    /// Empty songs contribute nothing. Pure function, no side effects.
    pub fn windows(&self, corpus: &Corpus) -> Vec<Window> {
        let mut windows = Vec::with_capacity(corpus.total_tokens());
        for song in corpus.songs() {
            self.window_song(song, &mut windows);
        }
        windows
    }

    fn window_song(&self, song: &[Token], out: &mut Vec<Window>) {
        if song.is_empty() {
            return;
        }

        let m = self.max_sequence_length;
        let mut padded = vec![self.padding_token; m];
        padded.extend_from_slice(song);

        // padded.len() - m == song.len(), so exactly L frame positions.
        for i in 0..padded.len() - m {
            out.push(padded[i..i + m].to_vec());
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn windower(m: usize) -> SequenceWindower {
        SequenceWindower::new(m)
    }

    #[test]
    fn test_song_of_length_l_yields_l_windows() {
        let corpus = Corpus::new(vec![vec![5, 6, 7, 8, 9]]);
        let windows = windower(3).windows(&corpus);

        assert_eq!(windows.len(), 5);
        for w in &windows {
            assert_eq!(w.len(), 3);
        }
    }

    #[test]
    fn test_sliding_window_invariant() {
        // Consecutive windows from the same song overlap by all but one
        // position: window i's tail equals window i+1's head.
        let corpus = Corpus::new(vec![vec![1, 2, 3, 4, 5, 6]]);
        let windows = windower(4).windows(&corpus);

        for pair in windows.windows(2) {
            assert_eq!(pair[0][1..], pair[1][..3]);
        }
    }

    #[test]
    fn test_empty_song_yields_no_windows() {
        let corpus = Corpus::new(vec![vec![]]);
        assert!(windower(4).windows(&corpus).is_empty());
    }

    #[test]
    fn test_two_song_corpus_exact_output() {
        // Corpus [[1,2,3], [4,5]] with M=2, pad=0:
        //   song 1 padded [0,0,1,2,3] → [0,0] [0,1] [1,2]
        //   song 2 padded [0,0,4,5]   → [0,0] [0,4]
        let corpus = Corpus::new(vec![vec![1, 2, 3], vec![4, 5]]);
        let windows = windower(2).windows(&corpus);

        assert_eq!(
            windows,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![1, 2],
                vec![0, 0],
                vec![0, 4],
            ]
        );
    }

    #[test]
    fn test_custom_padding_token() {
        let corpus = Corpus::new(vec![vec![7]]);
        let windows = SequenceWindower::with_padding(3, 9).windows(&corpus);
        assert_eq!(windows, vec![vec![9, 9, 7]]);
    }
}
