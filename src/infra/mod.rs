// ============================================================
// Infrastructure Layer
// ============================================================
// Cross-cutting concerns that do not belong to any one business
// layer:
//
//   checkpoint.rs — single-artifact persistence of model and
//                   optimizer state, with the fixed
//                   `_sd_opt.pth` path-suffix convention.
//
//   metrics.rs    — optional per-epoch CSV metrics log for
//                   plotting learning curves after a run.
//
// Reference: Rust Book §9 (Error Handling)
//            Burn Book §5 (Records and Checkpointing)

/// Model + optimizer checkpoint saving and loading
pub mod checkpoint;

/// Per-epoch training metrics CSV logger
pub mod metrics;
