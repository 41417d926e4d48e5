//! Seam for vendor-supplied batched-multiply libraries.
//!
//! A binding is registered on the [`GemmHandle`](crate::GemmHandle) and
//! invoked, never reimplemented. Scalar types outside a binding's support
//! matrix surface [`GemmError::UnsupportedAlgorithm`].

use crate::error::{GemmError, Result};
use bk_core::{BatchMatrix, BatchMatrixMut, F32x4, Scalar, Trans};
use half::f16;
use std::fmt::Debug;

/// A vendor-optimized batched GEMM routine.
///
/// Implementations accept the same operand contract as the built-in
/// kernels: `C_i = alpha * op(A_i) * op(B_i) + beta * C_i`, with shapes and
/// layouts already validated by the selector. The default method bodies
/// declare a scalar type unsupported; bindings override what their support
/// matrix covers.
#[allow(clippy::too_many_arguments)]
pub trait VendorBatchedGemm: Send + Sync + Debug {
    /// Binding name, used in error reports.
    fn name(&self) -> &str;

    fn gemm_f32(
        &self,
        _trans_a: Trans,
        _trans_b: Trans,
        _alpha: f32,
        _a: &BatchMatrix<'_, f32>,
        _b: &BatchMatrix<'_, f32>,
        _beta: f32,
        _c: &mut BatchMatrixMut<'_, f32>,
    ) -> Result<()> {
        Err(unsupported_scalar(self.name(), "f32"))
    }

    fn gemm_f64(
        &self,
        _trans_a: Trans,
        _trans_b: Trans,
        _alpha: f64,
        _a: &BatchMatrix<'_, f64>,
        _b: &BatchMatrix<'_, f64>,
        _beta: f64,
        _c: &mut BatchMatrixMut<'_, f64>,
    ) -> Result<()> {
        Err(unsupported_scalar(self.name(), "f64"))
    }
}

fn unsupported_scalar(binding: &str, scalar: &str) -> GemmError {
    GemmError::UnsupportedAlgorithm(format!(
        "vendor-library binding '{binding}' does not support {scalar} operands"
    ))
}

/// Routes a generic scalar type to the matching vendor entry point.
///
/// Implemented for every [`Scalar`] this crate ships; packed and
/// half-precision operands are outside every vendor support matrix here.
#[allow(clippy::too_many_arguments)]
pub trait VendorDispatch: Scalar {
    fn vendor_gemm(
        vendor: &dyn VendorBatchedGemm,
        trans_a: Trans,
        trans_b: Trans,
        alpha: Self,
        a: &BatchMatrix<'_, Self>,
        b: &BatchMatrix<'_, Self>,
        beta: Self,
        c: &mut BatchMatrixMut<'_, Self>,
    ) -> Result<()>;
}

impl VendorDispatch for f32 {
    fn vendor_gemm(
        vendor: &dyn VendorBatchedGemm,
        trans_a: Trans,
        trans_b: Trans,
        alpha: Self,
        a: &BatchMatrix<'_, Self>,
        b: &BatchMatrix<'_, Self>,
        beta: Self,
        c: &mut BatchMatrixMut<'_, Self>,
    ) -> Result<()> {
        vendor.gemm_f32(trans_a, trans_b, alpha, a, b, beta, c)
    }
}

impl VendorDispatch for f64 {
    fn vendor_gemm(
        vendor: &dyn VendorBatchedGemm,
        trans_a: Trans,
        trans_b: Trans,
        alpha: Self,
        a: &BatchMatrix<'_, Self>,
        b: &BatchMatrix<'_, Self>,
        beta: Self,
        c: &mut BatchMatrixMut<'_, Self>,
    ) -> Result<()> {
        vendor.gemm_f64(trans_a, trans_b, alpha, a, b, beta, c)
    }
}

impl VendorDispatch for f16 {
    fn vendor_gemm(
        vendor: &dyn VendorBatchedGemm,
        _trans_a: Trans,
        _trans_b: Trans,
        _alpha: Self,
        _a: &BatchMatrix<'_, Self>,
        _b: &BatchMatrix<'_, Self>,
        _beta: Self,
        _c: &mut BatchMatrixMut<'_, Self>,
    ) -> Result<()> {
        Err(unsupported_scalar(vendor.name(), "f16"))
    }
}

impl VendorDispatch for F32x4 {
    fn vendor_gemm(
        vendor: &dyn VendorBatchedGemm,
        _trans_a: Trans,
        _trans_b: Trans,
        _alpha: Self,
        _a: &BatchMatrix<'_, Self>,
        _b: &BatchMatrix<'_, Self>,
        _beta: Self,
        _c: &mut BatchMatrixMut<'_, Self>,
    ) -> Result<()> {
        Err(unsupported_scalar(vendor.name(), "packed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct EmptyBinding;

    impl VendorBatchedGemm for EmptyBinding {
        fn name(&self) -> &str {
            "empty"
        }
    }

    #[test]
    fn test_defaults_report_unsupported() {
        let binding = EmptyBinding;
        let a_data = vec![0.0f32; 4];
        let b_data = vec![0.0f32; 4];
        let mut c_data = vec![0.0f32; 4];
        let a = BatchMatrix::row_major(&a_data, 1, 2, 2).unwrap();
        let b = BatchMatrix::row_major(&b_data, 1, 2, 2).unwrap();
        let mut c = BatchMatrixMut::row_major(&mut c_data, 1, 2, 2).unwrap();
        let err = binding
            .gemm_f32(
                Trans::NoTranspose,
                Trans::NoTranspose,
                1.0,
                &a,
                &b,
                0.0,
                &mut c,
            )
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(err.to_string().contains("f32"));
    }
}
