//! `bk-core` - Batch operand views and device descriptors for batch-kernels.
//!
//! This crate provides:
//! - `BatchMatrix` / `BatchMatrixMut` rank-3 views over batches of uniform
//!   matrices, with validated storage-layout / batch-layout pairings, plus
//!   `BatchVector` / `BatchVectorMut` rank-2 views over batches of vectors
//! - A `Scalar` trait covering plain floats, half precision, and packed
//!   lane types that fuse several batch items per element
//! - `DeviceSpec`, a compute-backend capability descriptor, together with
//!   the tuning table (tile shapes, alpha-application thresholds) keyed on it

pub mod device;
pub mod error;
pub mod layout;
pub mod scalar;
pub mod view;

// Re-export primary types at the crate root for convenience.
pub use device::{DeviceClass, DeviceSpec, Microarch, TileShape};
pub use error::{BatchError, Result};
pub use layout::{BatchLayout, MatrixLayout, Trans};
pub use scalar::{F32x4, Scalar};
pub use view::{BatchMatrix, BatchMatrixMut, BatchVector, BatchVectorMut, MatrixMut, MatrixRef};
