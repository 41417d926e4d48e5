use bk_core::{BatchError, BatchLayout};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GemmError {
    #[error("square-heuristic requires square output tiles: c_m({c_m}) != c_n({c_n})")]
    NonSquareOutput { c_m: usize, c_n: usize },
    #[error("conjugate transpose is accepted by the interface but not implemented")]
    UnsupportedTranspose,
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("batch size mismatch: A has {a}, B has {b}, C has {c}")]
    BatchSizeMismatch { a: usize, b: usize, c: usize },
    #[error("batching axis order mismatch: A is {a}, B is {b}, C is {c}")]
    BatchLayoutMismatch {
        a: BatchLayout,
        b: BatchLayout,
        c: BatchLayout,
    },
    #[error("inner dimension mismatch: op(A) is {m}x{k}, op(B) is {k2}x{n}")]
    InnerDimMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("vector extent mismatch: op(A) is {m}x{n} but x has {x_len} elements, y has {y_len}")]
    VectorExtentMismatch {
        m: usize,
        n: usize,
        x_len: usize,
        y_len: usize,
    },
    #[error("output shape mismatch: op(A)*op(B) is {m}x{n} but C is {c_m}x{c_n}")]
    OutputShapeMismatch {
        m: usize,
        n: usize,
        c_m: usize,
        c_n: usize,
    },
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("vendor binding '{name}' failed: {message}")]
    Vendor { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, GemmError>;
