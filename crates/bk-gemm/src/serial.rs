//! Plain per-item batch GEMM, the correctness baseline and the fallback
//! whenever the tiled path is not selected.

use crate::tiling::op_get;
use bk_core::{BatchMatrix, BatchMatrixMut, MatrixLayout, MatrixMut, MatrixRef, Scalar, Trans};
use rayon::prelude::*;

/// Serial work mode within one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerialMode {
    /// Straight triple loop, no register blocking.
    Unblocked,
    /// Register-blocked inner kernel; faster on backends with enough
    /// registers, a known regression on some microarchitectures.
    Blocked,
}

/// Output granularity assigned to one parallel worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultsPerThread {
    /// One output scalar per worker.
    Rank0,
    /// One whole output matrix per worker.
    Rank2,
}

/// Register block edge for [`SerialMode::Blocked`].
const REG_BLOCK: usize = 4;

/// Per-item batched multiply: `C_i = alpha * op(A_i) * op(B_i) + beta * C_i`.
///
/// Batch items are fully independent and run in parallel; there is no
/// tiling or staging pipeline. Shape and layout contracts are guaranteed by
/// the selector before this kernel runs.
#[derive(Debug, Clone, Copy)]
pub struct SerialBatchedGemm {
    pub trans_a: Trans,
    pub trans_b: Trans,
    pub mode: SerialMode,
    pub results: ResultsPerThread,
}

impl SerialBatchedGemm {
    pub fn invoke<S: Scalar>(
        &self,
        alpha: S,
        a: &BatchMatrix<'_, S>,
        b: &BatchMatrix<'_, S>,
        beta: S,
        c: &mut BatchMatrixMut<'_, S>,
    ) {
        let batch = c.batch_size();
        let rows = c.rows();
        let cols = c.cols();
        let layout = c.layout();
        let item_len = c.item_len();
        if batch == 0 || item_len == 0 {
            return;
        }

        let kernel = *self;
        match self.results {
            // Finest granularity: one worker per output scalar, flattened
            // over batch x M x N.
            ResultsPerThread::Rank0 => {
                let k = self.trans_a.apply(a.rows(), a.cols()).1;
                c.as_slice_mut()
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(idx, slot)| {
                        let bi = idx / item_len;
                        let off = idx % item_len;
                        let (i, j) = match layout {
                            MatrixLayout::RowMajor => (off / cols, off % cols),
                            MatrixLayout::ColMajor => (off % rows, off / rows),
                        };
                        let ai = a.item(bi);
                        let bi_ = b.item(bi);
                        let mut sum = S::zero();
                        for p in 0..k {
                            sum += op_get(&ai, kernel.trans_a, i, p)
                                * op_get(&bi_, kernel.trans_b, p, j);
                        }
                        *slot = alpha * sum + beta * *slot;
                    });
            }
            ResultsPerThread::Rank2 => {
                c.as_slice_mut()
                    .par_chunks_mut(item_len)
                    .enumerate()
                    .for_each(|(bi, chunk)| {
                        let mut ci = MatrixMut::new(chunk, rows, cols, layout);
                        let ai = a.item(bi);
                        let bi_ = b.item(bi);
                        match kernel.mode {
                            SerialMode::Unblocked => {
                                kernel.item_unblocked(alpha, &ai, &bi_, beta, &mut ci)
                            }
                            SerialMode::Blocked => {
                                kernel.item_blocked(alpha, &ai, &bi_, beta, &mut ci)
                            }
                        }
                    });
            }
        }
    }

    fn contraction_len<S: Scalar>(&self, a: &MatrixRef<'_, S>) -> usize {
        self.trans_a.apply(a.rows(), a.cols()).1
    }

    fn item_unblocked<S: Scalar>(
        &self,
        alpha: S,
        a: &MatrixRef<'_, S>,
        b: &MatrixRef<'_, S>,
        beta: S,
        c: &mut MatrixMut<'_, S>,
    ) {
        let k = self.contraction_len(a);
        for i in 0..c.rows() {
            for j in 0..c.cols() {
                let mut sum = S::zero();
                for p in 0..k {
                    sum += op_get(a, self.trans_a, i, p) * op_get(b, self.trans_b, p, j);
                }
                c.set(i, j, alpha * sum + beta * c.get(i, j));
            }
        }
    }

    /// Register-blocked variant: a REG_BLOCK x REG_BLOCK accumulator array
    /// amortizes operand loads across the K loop.
    fn item_blocked<S: Scalar>(
        &self,
        alpha: S,
        a: &MatrixRef<'_, S>,
        b: &MatrixRef<'_, S>,
        beta: S,
        c: &mut MatrixMut<'_, S>,
    ) {
        let m = c.rows();
        let n = c.cols();
        let k = self.contraction_len(a);
        for i0 in (0..m).step_by(REG_BLOCK) {
            let ib = REG_BLOCK.min(m - i0);
            for j0 in (0..n).step_by(REG_BLOCK) {
                let jb = REG_BLOCK.min(n - j0);
                let mut acc = [[S::zero(); REG_BLOCK]; REG_BLOCK];
                for p in 0..k {
                    for (ii, row) in acc.iter_mut().enumerate().take(ib) {
                        let av = op_get(a, self.trans_a, i0 + ii, p);
                        for (jj, slot) in row.iter_mut().enumerate().take(jb) {
                            *slot += av * op_get(b, self.trans_b, p, j0 + jj);
                        }
                    }
                }
                for (ii, row) in acc.iter().enumerate().take(ib) {
                    for (jj, &sum) in row.iter().enumerate().take(jb) {
                        let old = c.get(i0 + ii, j0 + jj);
                        c.set(i0 + ii, j0 + jj, alpha * sum + beta * old);
                    }
                }
            }
        }
    }
}
