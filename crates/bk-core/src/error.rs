use crate::layout::{BatchLayout, MatrixLayout};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("element count mismatch: view of {dims:?} needs {expected} elements, got {got}")]
    ElementCount {
        dims: [usize; 3],
        expected: usize,
        got: usize,
    },
    #[error("{layout} storage requires {required} batching, got {got}")]
    LayoutPairing {
        layout: MatrixLayout,
        required: BatchLayout,
        got: BatchLayout,
    },
}

pub type Result<T> = std::result::Result<T, BatchError>;
