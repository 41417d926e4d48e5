//! Shared tiling and operand-access helpers for the GEMM kernels.

use bk_core::{MatrixRef, Scalar, Trans};

/// Read element (i, j) of `op(X)`.
///
/// Transpose is absorbed here by swapping the geometric axes; no operand is
/// ever materialized in transposed form. Conjugate transpose never reaches
/// the kernels: the selector rejects it before any computation.
#[inline]
pub(crate) fn op_get<S: Scalar>(mat: &MatrixRef<'_, S>, trans: Trans, i: usize, j: usize) -> S {
    match trans {
        Trans::NoTranspose => mat.get(i, j),
        Trans::Transpose => mat.get(j, i),
        Trans::ConjTranspose => unreachable!("conjugate transpose is not implemented"),
    }
}

/// Iterator over `(start, len)` tiles covering `0..extent` in `step`-sized
/// pieces; the final tile is shorter when `extent` is not a multiple.
pub(crate) fn tile_ranges(extent: usize, step: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..extent)
        .step_by(step)
        .map(move |start| (start, step.min(extent - start)))
}
