use std::fmt;

/// Physical element order within one batch item's matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixLayout {
    /// Columns vary fastest; element (i, j) lives at `i * cols + j`.
    RowMajor,
    /// Rows vary fastest; element (i, j) lives at `i + j * rows`.
    ColMajor,
}

impl MatrixLayout {
    /// The batching axis order this storage layout requires.
    ///
    /// Row-major items need the batch axis outermost so that each item stays
    /// a contiguous block; column-major items need it innermost for the same
    /// reason. Any other pairing is rejected at view construction.
    pub fn required_batch_layout(self) -> BatchLayout {
        match self {
            MatrixLayout::RowMajor => BatchLayout::Left,
            MatrixLayout::ColMajor => BatchLayout::Right,
        }
    }
}

impl fmt::Display for MatrixLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixLayout::RowMajor => write!(f, "row-major"),
            MatrixLayout::ColMajor => write!(f, "column-major"),
        }
    }
}

/// Where the batch dimension sits in a rank-3 operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchLayout {
    /// Batch axis leftmost: extents are `(batch, rows, cols)`.
    Left,
    /// Batch axis rightmost: extents are `(rows, cols, batch)`.
    Right,
}

impl fmt::Display for BatchLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchLayout::Left => write!(f, "batch-leftmost"),
            BatchLayout::Right => write!(f, "batch-rightmost"),
        }
    }
}

/// What `op` does to an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trans {
    NoTranspose,
    Transpose,
    /// Accepted by the interface, reported as unsupported before any
    /// computation.
    ConjTranspose,
}

impl Trans {
    /// Effective (rows, cols) of `op(X)` given the stored extents of `X`.
    pub fn apply(self, rows: usize, cols: usize) -> (usize, usize) {
        match self {
            Trans::NoTranspose => (rows, cols),
            Trans::Transpose | Trans::ConjTranspose => (cols, rows),
        }
    }
}
