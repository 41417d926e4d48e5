//! `bk-gemm` - Batched dense GEMM with heuristic kernel selection.
//!
//! Computes `C_i = alpha * op(A_i) * op(B_i) + beta * C_i` for a batch of
//! uniform matrices, choosing per call between:
//! - a tiled, double-buffered kernel (accelerator-class backends, large
//!   enough square outputs)
//! - a plain per-item serial kernel (the fallback and correctness baseline)
//! - a registered vendor-library binding
//!
//! The entry point is [`batched_gemm`]; selection policy lives in
//! [`plan`] and is pure with respect to its inputs.

pub mod dblbuf;
pub mod error;
pub mod gemv;
pub mod handle;
pub mod selector;
pub mod serial;
mod tiling;
pub mod vendor;

// Re-export primary types at the crate root for convenience.
pub use dblbuf::DblBufBatchedGemm;
pub use error::{GemmError, Result};
pub use gemv::{batched_gemv, GemvMode};
pub use handle::{GemmAlgo, GemmHandle};
pub use selector::{batched_gemm, plan, KernelPlan};
pub use serial::{ResultsPerThread, SerialBatchedGemm, SerialMode};
pub use vendor::{VendorBatchedGemm, VendorDispatch};
