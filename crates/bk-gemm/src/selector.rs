//! Per-call algorithm selection and dispatch.
//!
//! [`plan`] inspects the handle, the output shape, the operand layout, and
//! the target device and picks exactly one kernel instantiation;
//! [`batched_gemm`] validates the operand contract, plans, and invokes.

use crate::dblbuf::DblBufBatchedGemm;
use crate::error::{GemmError, Result};
use crate::handle::{GemmAlgo, GemmHandle};
use crate::serial::{ResultsPerThread, SerialBatchedGemm, SerialMode};
use crate::vendor::VendorDispatch;
use bk_core::{BatchMatrix, BatchMatrixMut, MatrixLayout, Scalar, TileShape, Trans};
use std::any::type_name;

/// One concrete kernel instantiation chosen for a call.
///
/// Planning is pure with respect to (handle, shape, layout, scalar type):
/// identical inputs always yield an identical plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelPlan {
    Serial {
        mode: SerialMode,
        results: ResultsPerThread,
    },
    DoubleBuffered {
        tile: TileShape,
        bounds_check: bool,
        alpha_in_fma: bool,
    },
    Vendor,
}

/// Minimum output-row extent before the tiled path pays off on an
/// accelerator. The threshold depends on C's storage layout because the
/// layout decides which dimension maps to the widest parallel index.
fn dblbuf_in_range(c_layout: MatrixLayout, c_m: usize) -> bool {
    match c_layout {
        MatrixLayout::ColMajor => c_m >= 16,
        MatrixLayout::RowMajor => (24..=32).contains(&c_m) || c_m >= 40,
    }
}

/// Pick the kernel instantiation for an output of `c_m x c_n` with the
/// given storage layout, without executing anything.
pub fn plan<S: Scalar>(
    handle: &GemmHandle,
    c_m: usize,
    c_n: usize,
    c_layout: MatrixLayout,
) -> Result<KernelPlan> {
    let device = handle.device();
    match handle.algo() {
        GemmAlgo::HeuristicSquare => {
            if c_m != c_n {
                return Err(GemmError::NonSquareOutput { c_m, c_n });
            }

            // Per-item granularity: finest on accelerators where plain
            // scalars map one output element per thread; whole items
            // otherwise, and always for packed scalars.
            let results = if !S::IS_PACKED && device.is_accelerator() {
                ResultsPerThread::Rank0
            } else {
                ResultsPerThread::Rank2
            };
            // Serial work mode, per backend class and known regressions.
            let mode = if S::IS_PACKED {
                if device.is_accelerator() || device.is_x86_64() {
                    SerialMode::Blocked
                } else {
                    SerialMode::Unblocked
                }
            } else if device.is_accelerator() || device.prefers_unblocked_serial() {
                SerialMode::Unblocked
            } else {
                SerialMode::Blocked
            };

            if device.is_accelerator() && dblbuf_in_range(c_layout, c_m) {
                let tile = device.tile_shape();
                return Ok(KernelPlan::DoubleBuffered {
                    tile,
                    bounds_check: c_m % tile.m != 0,
                    alpha_in_fma: c_m >= device.alpha_in_fma_threshold(),
                });
            }
            Ok(KernelPlan::Serial { mode, results })
        }
        GemmAlgo::Serial => Ok(KernelPlan::Serial {
            mode: SerialMode::Unblocked,
            results: ResultsPerThread::Rank2,
        }),
        GemmAlgo::SerialRank0 => Ok(KernelPlan::Serial {
            mode: SerialMode::Unblocked,
            results: ResultsPerThread::Rank0,
        }),
        GemmAlgo::DoubleBuffered => Ok(KernelPlan::DoubleBuffered {
            tile: device.tile_shape(),
            bounds_check: true,
            alpha_in_fma: false,
        }),
        GemmAlgo::Vendor => {
            if handle.vendor().is_some() {
                Ok(KernelPlan::Vendor)
            } else {
                Err(GemmError::UnsupportedAlgorithm(format!(
                    "{} requested but no binding is registered",
                    GemmAlgo::Vendor
                )))
            }
        }
    }
}

fn validate<S: Scalar>(
    trans_a: Trans,
    trans_b: Trans,
    a: &BatchMatrix<'_, S>,
    b: &BatchMatrix<'_, S>,
    c: &BatchMatrixMut<'_, S>,
) -> Result<()> {
    if trans_a == Trans::ConjTranspose || trans_b == Trans::ConjTranspose {
        return Err(GemmError::UnsupportedTranspose);
    }
    if a.batch_layout() != c.batch_layout() || b.batch_layout() != c.batch_layout() {
        return Err(GemmError::BatchLayoutMismatch {
            a: a.batch_layout(),
            b: b.batch_layout(),
            c: c.batch_layout(),
        });
    }
    if a.batch_size() != c.batch_size() || b.batch_size() != c.batch_size() {
        return Err(GemmError::BatchSizeMismatch {
            a: a.batch_size(),
            b: b.batch_size(),
            c: c.batch_size(),
        });
    }
    let (m, k) = trans_a.apply(a.rows(), a.cols());
    let (k2, n) = trans_b.apply(b.rows(), b.cols());
    if k != k2 {
        return Err(GemmError::InnerDimMismatch { m, k, k2, n });
    }
    if c.rows() != m || c.cols() != n {
        return Err(GemmError::OutputShapeMismatch {
            m,
            n,
            c_m: c.rows(),
            c_n: c.cols(),
        });
    }
    Ok(())
}

/// Batched multiply: `C_i = alpha * op(A_i) * op(B_i) + beta * C_i` for
/// every batch item.
///
/// Validates the operand contract, selects exactly one kernel per the
/// handle's algorithm, and mutates C in place. A and B are never mutated,
/// and C is untouched on any error. The handle's auto-tuned fields are
/// filled in when the heuristic takes the tiled path.
#[allow(clippy::too_many_arguments)]
pub fn batched_gemm<S: Scalar + VendorDispatch>(
    handle: &mut GemmHandle,
    trans_a: Trans,
    trans_b: Trans,
    alpha: S,
    a: &BatchMatrix<'_, S>,
    b: &BatchMatrix<'_, S>,
    beta: S,
    c: &mut BatchMatrixMut<'_, S>,
) -> Result<()> {
    validate(trans_a, trans_b, a, b, c)?;
    let chosen = plan::<S>(handle, c.rows(), c.cols(), c.layout())?;

    if handle.debug_enabled() {
        log::debug!(
            "batched_gemm: scalar={} packed={} lanes={} device={} batch={} c={}x{} plan={:?}",
            type_name::<S>(),
            S::IS_PACKED,
            S::LANES,
            handle.device(),
            c.batch_size(),
            c.rows(),
            c.cols(),
            chosen,
        );
    }

    match chosen {
        KernelPlan::Serial { mode, results } => {
            SerialBatchedGemm {
                trans_a,
                trans_b,
                mode,
                results,
            }
            .invoke(alpha, a, b, beta, c);
        }
        KernelPlan::DoubleBuffered {
            tile,
            bounds_check,
            alpha_in_fma,
        } => {
            if handle.algo() == GemmAlgo::HeuristicSquare {
                handle.record_team_tuning(8, 8);
            }
            DblBufBatchedGemm {
                trans_a,
                trans_b,
                tile,
                bounds_check,
                alpha_in_fma,
            }
            .invoke(alpha, a, b, beta, c);
        }
        KernelPlan::Vendor => {
            // Checked by `plan`; the slot cannot be empty here.
            let vendor = handle
                .vendor()
                .cloned()
                .ok_or_else(|| GemmError::UnsupportedAlgorithm(GemmAlgo::Vendor.to_string()))?;
            S::vendor_gemm(vendor.as_ref(), trans_a, trans_b, alpha, a, b, beta, c)?;
        }
    }
    Ok(())
}
