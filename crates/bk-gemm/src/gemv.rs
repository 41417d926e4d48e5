//! Batched matrix-vector multiply:
//! `y_i = alpha * op(A_i) * x_i + beta * y_i`.
//!
//! NoTranspose and Transpose are implemented. The register-blocked variant
//! has no rank-3 kernel, and conjugate transpose is unimplemented; both are
//! reported before any computation.

use crate::error::{GemmError, Result};
use crate::tiling::op_get;
use bk_core::{BatchMatrix, BatchVector, BatchVectorMut, Scalar, Trans};
use rayon::prelude::*;

/// Work mode within one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GemvMode {
    /// Straight dot-product loop per output element.
    Unblocked,
    /// Accepted by the interface; no rank-3 kernel exists for it.
    Blocked,
}

/// Batched multiply of each `op(A_i)` with the vector `x_i`, accumulating
/// into `y_i`. Batch items are independent and run in parallel; y is
/// untouched on any error.
pub fn batched_gemv<S: Scalar>(
    trans: Trans,
    mode: GemvMode,
    alpha: S,
    a: &BatchMatrix<'_, S>,
    x: &BatchVector<'_, S>,
    beta: S,
    y: &mut BatchVectorMut<'_, S>,
) -> Result<()> {
    if trans == Trans::ConjTranspose {
        return Err(GemmError::UnsupportedTranspose);
    }
    if mode == GemvMode::Blocked {
        return Err(GemmError::UnsupportedAlgorithm(
            "register-blocked gemv has no rank-3 kernel".into(),
        ));
    }
    if a.batch_size() != y.batch_size() || x.batch_size() != y.batch_size() {
        return Err(GemmError::BatchSizeMismatch {
            a: a.batch_size(),
            b: x.batch_size(),
            c: y.batch_size(),
        });
    }
    let (m, n) = trans.apply(a.rows(), a.cols());
    if x.len() != n || y.len() != m {
        return Err(GemmError::VectorExtentMismatch {
            m,
            n,
            x_len: x.len(),
            y_len: y.len(),
        });
    }

    let batch = y.batch_size();
    let len = y.len();
    if batch == 0 || len == 0 {
        return Ok(());
    }
    y.as_slice_mut()
        .par_chunks_mut(len)
        .enumerate()
        .for_each(|(bi, yi)| {
            let ai = a.item(bi);
            let xi = x.item(bi);
            for (i, slot) in yi.iter_mut().enumerate() {
                let mut sum = S::zero();
                for (j, &xv) in xi.iter().enumerate() {
                    sum += op_get(&ai, trans, i, j) * xv;
                }
                *slot = alpha * sum + beta * *slot;
            }
        });
    Ok(())
}
