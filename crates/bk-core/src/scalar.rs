use half::f16;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul};

/// Element type of a batch operand.
///
/// Covers plain floats, half precision, and packed lane types where one
/// stored element fuses `LANES` independent batch items. All kernel
/// arithmetic goes through this trait, so a packed element flows through the
/// same code paths as a plain one.
pub trait Scalar:
    Copy + Send + Sync + Debug + PartialEq + Add<Output = Self> + Mul<Output = Self> + AddAssign
{
    /// Number of independent batch items fused into one element.
    const LANES: usize;
    /// True for packed lane types; drives the selector's granularity choice.
    const IS_PACKED: bool;

    fn zero() -> Self;
    fn one() -> Self;
    /// `self * a + b`, fused where the type supports it.
    fn mul_add(self, a: Self, b: Self) -> Self;
}

impl Scalar for f32 {
    const LANES: usize = 1;
    const IS_PACKED: bool = false;

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn mul_add(self, a: Self, b: Self) -> Self {
        f32::mul_add(self, a, b)
    }
}

impl Scalar for f64 {
    const LANES: usize = 1;
    const IS_PACKED: bool = false;

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn mul_add(self, a: Self, b: Self) -> Self {
        f64::mul_add(self, a, b)
    }
}

impl Scalar for f16 {
    const LANES: usize = 1;
    const IS_PACKED: bool = false;

    fn zero() -> Self {
        f16::from_f32(0.0)
    }

    fn one() -> Self {
        f16::from_f32(1.0)
    }

    // f16 has no hardware fma here; widen to f32 for the fused step.
    fn mul_add(self, a: Self, b: Self) -> Self {
        f16::from_f32(self.to_f32().mul_add(a.to_f32(), b.to_f32()))
    }
}

/// Four batch items fused into one element, lane-wise arithmetic.
///
/// The packed counterpart of a plain `f32` operand: a rank-3 view of `F32x4`
/// carries four interleaved batch items per stored matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F32x4(pub [f32; 4]);

impl F32x4 {
    pub fn splat(v: f32) -> Self {
        F32x4([v; 4])
    }

    pub fn lanes(&self) -> &[f32; 4] {
        &self.0
    }
}

impl Add for F32x4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut out = [0.0; 4];
        for (o, (a, b)) in out.iter_mut().zip(self.0.iter().zip(rhs.0.iter())) {
            *o = a + b;
        }
        F32x4(out)
    }
}

impl Mul for F32x4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [0.0; 4];
        for (o, (a, b)) in out.iter_mut().zip(self.0.iter().zip(rhs.0.iter())) {
            *o = a * b;
        }
        F32x4(out)
    }
}

impl AddAssign for F32x4 {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += b;
        }
    }
}

impl Scalar for F32x4 {
    const LANES: usize = 4;
    const IS_PACKED: bool = true;

    fn zero() -> Self {
        F32x4([0.0; 4])
    }

    fn one() -> Self {
        F32x4([1.0; 4])
    }

    fn mul_add(self, a: Self, b: Self) -> Self {
        let mut out = [0.0; 4];
        for i in 0..4 {
            out[i] = self.0[i].mul_add(a.0[i], b.0[i]);
        }
        F32x4(out)
    }
}
