// ============================================================
// Window Batcher
// ============================================================
// Stacks a batch of equal-length windows into a single integer
// tensor of shape [batch, seq_len] on the configured device.
//
// All windows already have length max_sequence_length, so no
// dynamic padding is needed here: flatten row-major, then
// reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::prelude::*;

use crate::data::Window;

/// Converts window batches into model-ready tensors. Holds the target
/// device so tensors land where the model lives (the device is injected
/// once, at construction).
#[derive(Debug, Clone)]
pub struct WindowBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> WindowBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack `windows` into a [batch, seq_len] integer tensor.
    /// Callers never pass an empty batch (the scheduler only emits
    /// non-empty chunks).
    pub fn batch(&self, windows: &[Window]) -> Tensor<B, 2, Int> {
        debug_assert!(!windows.is_empty(), "batch must contain at least one window");

        let rows = windows.len();
        let cols = windows[0].len();

        // [w1_t1 .. w1_tM, w2_t1 .. wN_tM] → [N, M]
        let flat: Vec<i32> = windows
            .iter()
            .flat_map(|w| w.iter().map(|&t| t as i32))
            .collect();

        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device).reshape([rows, cols])
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shape_and_contents() {
        let device = Default::default();
        let batcher = WindowBatcher::<NdArray>::new(device);

        let tensor = batcher.batch(&[vec![0, 1, 2], vec![3, 4, 5]]);
        assert_eq!(tensor.dims(), [2, 3]);

        let values: Vec<i64> = tensor.into_data().to_vec().unwrap();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_single_window_batch() {
        let device = Default::default();
        let batcher = WindowBatcher::<NdArray>::new(device);

        let tensor = batcher.batch(&[vec![9, 9, 9, 9]]);
        assert_eq!(tensor.dims(), [1, 4]);
    }
}
