//! Tiled, double-buffered batch GEMM, the advanced strategy on
//! accelerator-class backends.
//!
//! Each batch item's MxN output is decomposed into `tile.m x tile.n` tiles;
//! every tile accumulates over K in `tile.k` chunks. Two staging buffers per
//! operand alternate roles so that the next K-chunk is staged while the
//! current one is consumed. One worker owns one batch item's tiles for the
//! whole call; staging buffers are never shared between workers.

use crate::tiling::{op_get, tile_ranges};
use bk_core::{BatchMatrix, BatchMatrixMut, MatrixMut, MatrixRef, Scalar, TileShape, Trans};
use rayon::prelude::*;

/// Double-buffered tiled multiply:
/// `C_i = alpha * op(A_i) * op(B_i) + beta * C_i`.
///
/// No recoverable error handling happens here; shape and layout contracts
/// are guaranteed satisfied by the selector, and a violation that reaches
/// this layer is fatal.
#[derive(Debug, Clone, Copy)]
pub struct DblBufBatchedGemm {
    pub trans_a: Trans,
    pub trans_b: Trans,
    pub tile: TileShape,
    /// Guard every load and store against the true M/N extents. Required
    /// when `c_m` is not a multiple of `tile.m`; out-of-range positions are
    /// skipped, which is numerically equivalent to zero-padding.
    pub bounds_check: bool,
    /// Fold alpha into the final accumulate via fused multiply-add instead
    /// of a separate multiply on the accumulated product.
    pub alpha_in_fma: bool,
}

impl DblBufBatchedGemm {
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
        c.as_slice_mut()
            .par_chunks_mut(item_len)
            .enumerate()
            .for_each(|(bi, chunk)| {
                let mut ci = MatrixMut::new(chunk, rows, cols, layout);
                kernel.item(alpha, &a.item(bi), &b.item(bi), beta, &mut ci);
            });
    }

    fn item<S: Scalar>(
        &self,
        alpha: S,
        a: &MatrixRef<'_, S>,
        b: &MatrixRef<'_, S>,
        beta: S,
        c: &mut MatrixMut<'_, S>,
    ) {
        let m = c.rows();
        let n = c.cols();
        let kdim = self.trans_a.apply(a.rows(), a.cols()).1;
        let TileShape {
            m: tm,
            n: tn,
            k: tk,
        } = self.tile;

        // Current/prefetched staging pairs plus per-tile accumulators; owned
        // exclusively by this worker for the lifetime of the item.
        let mut a_stage = [vec![S::zero(); tm * tk], vec![S::zero(); tm * tk]];
        let mut b_stage = [vec![S::zero(); tk * tn], vec![S::zero(); tk * tn]];
        let mut acc = vec![S::zero(); tm * tn];
        let n_chunks = kdim.div_ceil(tk);

        for (i0, _) in tile_ranges(m, tm) {
            for (j0, _) in tile_ranges(n, tn) {
                acc.fill(S::zero());

                if n_chunks > 0 {
                    self.stage_a(&mut a_stage[0], a, i0, 0, m, kdim);
                    self.stage_b(&mut b_stage[0], b, j0, 0, n, kdim);
                }
                for chunk in 0..n_chunks {
                    let cur = chunk & 1;
                    let k0 = chunk * tk;
                    let k_len = tk.min(kdim - k0);
                    let a_buf = &a_stage[cur];
                    let b_buf = &b_stage[cur];
                    for kk in 0..k_len {
                        for ti in 0..tm {
                            let av = a_buf[ti * tk + kk];
                            let acc_row = &mut acc[ti * tn..ti * tn + tn];
                            let b_row = &b_buf[kk * tn..kk * tn + tn];
                            for (slot, &bv) in acc_row.iter_mut().zip(b_row.iter()) {
                                *slot += av * bv;
                            }
                        }
                    }

                    // Stage the next chunk into the idle buffer. A
                    // cooperating group would do this concurrently with the
                    // consume loop above; one worker serializes the two
                    // phases, with program order standing in for the group
                    // barrier between them.
                    if chunk + 1 < n_chunks {
                        let next_k0 = (chunk + 1) * tk;
                        self.stage_a(&mut a_stage[1 - cur], a, i0, next_k0, m, kdim);
                        self.stage_b(&mut b_stage[1 - cur], b, j0, next_k0, n, kdim);
                    }
                }

                self.write_tile(alpha, beta, &acc, c, i0, j0, m, n);
            }
        }
    }

    /// Stage the `tile.m x tile.k` panel of `op(A)` starting at
    /// `(i0, k0)`. Out-of-range positions stage zeros, so edge tiles behave
    /// exactly like a zero-padded operand.
    fn stage_a<S: Scalar>(
        &self,
        buf: &mut [S],
        a: &MatrixRef<'_, S>,
        i0: usize,
        k0: usize,
        m: usize,
        kdim: usize,
    ) {
        let (tm, tk) = (self.tile.m, self.tile.k);
        for ti in 0..tm {
            let gi = i0 + ti;
            let row_in_range = !self.bounds_check || gi < m;
            for kk in 0..tk {
                let gk = k0 + kk;
                buf[ti * tk + kk] = if row_in_range && gk < kdim {
                    op_get(a, self.trans_a, gi, gk)
                } else {
                    S::zero()
                };
            }
        }
    }

    /// Stage the `tile.k x tile.n` panel of `op(B)` starting at
    /// `(k0, j0)`.
    fn stage_b<S: Scalar>(
        &self,
        buf: &mut [S],
        b: &MatrixRef<'_, S>,
        j0: usize,
        k0: usize,
        n: usize,
        kdim: usize,
    ) {
        let (tn, tk) = (self.tile.n, self.tile.k);
        for kk in 0..tk {
            let gk = k0 + kk;
            let k_in_range = gk < kdim;
            for tj in 0..tn {
                let gj = j0 + tj;
                let col_in_range = !self.bounds_check || gj < n;
                buf[kk * tn + tj] = if k_in_range && col_in_range {
                    op_get(b, self.trans_b, gk, gj)
                } else {
                    S::zero()
                };
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn write_tile<S: Scalar>(
        &self,
        alpha: S,
        beta: S,
        acc: &[S],
        c: &mut MatrixMut<'_, S>,
        i0: usize,
        j0: usize,
        m: usize,
        n: usize,
    ) {
        let (tm, tn) = (self.tile.m, self.tile.n);
        let i_hi = if self.bounds_check { tm.min(m - i0) } else { tm };
        let j_hi = if self.bounds_check { tn.min(n - j0) } else { tn };
        for ti in 0..i_hi {
            for tj in 0..j_hi {
                let prod = acc[ti * tn + tj];
                let old = c.get(i0 + ti, j0 + tj);
                let new = if self.alpha_in_fma {
                    prod.mul_add(alpha, beta * old)
                } else {
                    alpha * prod + beta * old
                };
                c.set(i0 + ti, j0 + tj, new);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::{ResultsPerThread, SerialBatchedGemm, SerialMode};
    use bk_core::BatchMatrix;

    fn reference(
        trans_a: Trans,
        trans_b: Trans,
        alpha: f32,
        a: &BatchMatrix<'_, f32>,
        b: &BatchMatrix<'_, f32>,
        beta: f32,
        c: &mut BatchMatrixMut<'_, f32>,
    ) {
        SerialBatchedGemm {
            trans_a,
            trans_b,
            mode: SerialMode::Unblocked,
            results: ResultsPerThread::Rank2,
        }
        .invoke(alpha, a, b, beta, c);
    }

    fn fill(len: usize, seed: u32) -> Vec<f32> {
        // Small deterministic values keep the f32 comparison tight.
        (0..len)
            .map(|i| (((i as u32).wrapping_mul(2654435761).wrapping_add(seed) >> 16) % 17) as f32 * 0.25 - 2.0)
            .collect()
    }

    fn run_case(
        batch: usize,
        m: usize,
        n: usize,
        k: usize,
        trans_a: Trans,
        trans_b: Trans,
        kernel: DblBufBatchedGemm,
    ) {
        let (a_rows, a_cols) = match trans_a {
            Trans::NoTranspose => (m, k),
            _ => (k, m),
        };
        let (b_rows, b_cols) = match trans_b {
            Trans::NoTranspose => (k, n),
            _ => (n, k),
        };
        let a_data = fill(batch * a_rows * a_cols, 1);
        let b_data = fill(batch * b_rows * b_cols, 2);
        let c_init = fill(batch * m * n, 3);

        let a = BatchMatrix::row_major(&a_data, batch, a_rows, a_cols).unwrap();
        let b = BatchMatrix::row_major(&b_data, batch, b_rows, b_cols).unwrap();

        let mut c_tiled = c_init.clone();
        let mut c_ref = c_init;
        {
            let mut c = BatchMatrixMut::row_major(&mut c_tiled, batch, m, n).unwrap();
            kernel.invoke(1.5, &a, &b, 0.5, &mut c);
        }
        {
            let mut c = BatchMatrixMut::row_major(&mut c_ref, batch, m, n).unwrap();
            reference(trans_a, trans_b, 1.5, &a, &b, 0.5, &mut c);
        }
        let tol = 1e-3 * k as f32;
        for (i, (x, y)) in c_tiled.iter().zip(c_ref.iter()).enumerate() {
            assert!((x - y).abs() <= tol, "element {i}: {x} vs {y}");
        }
    }

    fn default_kernel(trans_a: Trans, trans_b: Trans, bounds_check: bool) -> DblBufBatchedGemm {
        DblBufBatchedGemm {
            trans_a,
            trans_b,
            tile: TileShape { m: 32, n: 32, k: 8 },
            bounds_check,
            alpha_in_fma: false,
        }
    }

    #[test]
    fn test_aligned_no_bounds_check() {
        run_case(
            3,
            32,
            32,
            16,
            Trans::NoTranspose,
            Trans::NoTranspose,
            default_kernel(Trans::NoTranspose, Trans::NoTranspose, false),
        );
    }

    #[test]
    fn test_ragged_shapes_bounds_checked() {
        run_case(
            2,
            33,
            33,
            13,
            Trans::NoTranspose,
            Trans::NoTranspose,
            default_kernel(Trans::NoTranspose, Trans::NoTranspose, true),
        );
        run_case(
            2,
            17,
            9,
            21,
            Trans::NoTranspose,
            Trans::NoTranspose,
            default_kernel(Trans::NoTranspose, Trans::NoTranspose, true),
        );
    }

    #[test]
    fn test_transpose_pairs() {
        for (ta, tb) in [
            (Trans::Transpose, Trans::NoTranspose),
            (Trans::NoTranspose, Trans::Transpose),
            (Trans::Transpose, Trans::Transpose),
        ] {
            run_case(2, 19, 23, 11, ta, tb, default_kernel(ta, tb, true));
        }
    }

    #[test]
    fn test_alpha_in_fma_agrees() {
        let mut kernel = default_kernel(Trans::NoTranspose, Trans::NoTranspose, true);
        kernel.alpha_in_fma = true;
        run_case(2, 40, 40, 24, Trans::NoTranspose, Trans::NoTranspose, kernel);
    }

    #[test]
    fn test_small_k_tile() {
        // K smaller than the K-tile exercises the single-chunk pipeline.
        run_case(
            1,
            32,
            32,
            3,
            Trans::NoTranspose,
            Trans::NoTranspose,
            default_kernel(Trans::NoTranspose, Trans::NoTranspose, false),
        );
    }

    #[test]
    fn test_wide_k_tile_gfx908_shape() {
        let kernel = DblBufBatchedGemm {
            trans_a: Trans::NoTranspose,
            trans_b: Trans::NoTranspose,
            tile: TileShape {
                m: 32,
                n: 32,
                k: 16,
            },
            bounds_check: true,
            alpha_in_fma: false,
        };
        run_case(2, 33, 33, 29, Trans::NoTranspose, Trans::NoTranspose, kernel);
    }
}
