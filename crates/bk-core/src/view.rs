use crate::error::{BatchError, Result};
use crate::layout::{BatchLayout, MatrixLayout};

/// A read-only rank-3 view over a batch of uniform matrices.
///
/// The extents are always held as `(batch, rows, cols)` regardless of the
/// declared batching axis order; the `BatchLayout` records where the batch
/// axis sits in the caller's array. Construction validates the element count
/// and the storage-layout / batch-layout pairing, so every view that exists
/// satisfies the contract the kernels assume: each batch item is one
/// contiguous `rows * cols` block.
#[derive(Debug, Clone, Copy)]
pub struct BatchMatrix<'a, S> {
    data: &'a [S],
    batch: usize,
    rows: usize,
    cols: usize,
    layout: MatrixLayout,
    batch_layout: BatchLayout,
}

fn check_pairing(layout: MatrixLayout, batch_layout: BatchLayout) -> Result<()> {
    let required = layout.required_batch_layout();
    if batch_layout != required {
        return Err(BatchError::LayoutPairing {
            layout,
            required,
            got: batch_layout,
        });
    }
    Ok(())
}

fn check_len<S>(data: &[S], batch: usize, rows: usize, cols: usize) -> Result<()> {
    let expected = batch * rows * cols;
    if data.len() != expected {
        return Err(BatchError::ElementCount {
            dims: [batch, rows, cols],
            expected,
            got: data.len(),
        });
    }
    Ok(())
}

impl<'a, S: Copy> BatchMatrix<'a, S> {
    /// Create a view with explicit layout and batching axis order.
    ///
    /// `extents` follow the batching axis order: `(batch, rows, cols)` for
    /// `BatchLayout::Left`, `(rows, cols, batch)` for `BatchLayout::Right`.
    pub fn new(
        data: &'a [S],
        extents: [usize; 3],
        layout: MatrixLayout,
        batch_layout: BatchLayout,
    ) -> Result<Self> {
        check_pairing(layout, batch_layout)?;
        let (batch, rows, cols) = match batch_layout {
            BatchLayout::Left => (extents[0], extents[1], extents[2]),
            BatchLayout::Right => (extents[2], extents[0], extents[1]),
        };
        check_len(data, batch, rows, cols)?;
        Ok(BatchMatrix {
            data,
            batch,
            rows,
            cols,
            layout,
            batch_layout,
        })
    }

    /// Row-major batch view with extents `(batch, rows, cols)`.
    pub fn row_major(data: &'a [S], batch: usize, rows: usize, cols: usize) -> Result<Self> {
        Self::new(
            data,
            [batch, rows, cols],
            MatrixLayout::RowMajor,
            BatchLayout::Left,
        )
    }

    /// Column-major batch view with extents `(rows, cols, batch)`.
    pub fn col_major(data: &'a [S], rows: usize, cols: usize, batch: usize) -> Result<Self> {
        Self::new(
            data,
            [rows, cols, batch],
            MatrixLayout::ColMajor,
            BatchLayout::Right,
        )
    }

    pub fn batch_size(&self) -> usize {
        self.batch
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn layout(&self) -> MatrixLayout {
        self.layout
    }

    pub fn batch_layout(&self) -> BatchLayout {
        self.batch_layout
    }

    /// Elements per batch item.
    pub fn item_len(&self) -> usize {
        self.rows * self.cols
    }

    /// 2-D view of batch item `b`.
    pub fn item(&self, b: usize) -> MatrixRef<'a, S> {
        let len = self.item_len();
        MatrixRef {
            data: &self.data[b * len..(b + 1) * len],
            rows: self.rows,
            cols: self.cols,
            layout: self.layout,
        }
    }
}

/// A mutable rank-3 view over a batch of uniform matrices.
#[derive(Debug)]
pub struct BatchMatrixMut<'a, S> {
    data: &'a mut [S],
    batch: usize,
    rows: usize,
    cols: usize,
    layout: MatrixLayout,
    batch_layout: BatchLayout,
}

impl<'a, S: Copy> BatchMatrixMut<'a, S> {
    /// See [`BatchMatrix::new`].
    pub fn new(
        data: &'a mut [S],
        extents: [usize; 3],
        layout: MatrixLayout,
        batch_layout: BatchLayout,
    ) -> Result<Self> {
        check_pairing(layout, batch_layout)?;
        let (batch, rows, cols) = match batch_layout {
            BatchLayout::Left => (extents[0], extents[1], extents[2]),
            BatchLayout::Right => (extents[2], extents[0], extents[1]),
        };
        check_len(data, batch, rows, cols)?;
        Ok(BatchMatrixMut {
            data,
            batch,
            rows,
            cols,
            layout,
            batch_layout,
        })
    }

    pub fn row_major(data: &'a mut [S], batch: usize, rows: usize, cols: usize) -> Result<Self> {
        Self::new(
            data,
            [batch, rows, cols],
            MatrixLayout::RowMajor,
            BatchLayout::Left,
        )
    }

    pub fn col_major(data: &'a mut [S], rows: usize, cols: usize, batch: usize) -> Result<Self> {
        Self::new(
            data,
            [rows, cols, batch],
            MatrixLayout::ColMajor,
            BatchLayout::Right,
        )
    }

    pub fn batch_size(&self) -> usize {
        self.batch
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn layout(&self) -> MatrixLayout {
        self.layout
    }

    pub fn batch_layout(&self) -> BatchLayout {
        self.batch_layout
    }

    pub fn item_len(&self) -> usize {
        self.rows * self.cols
    }

    /// Mutable 2-D view of batch item `b`.
    pub fn item_mut(&mut self, b: usize) -> MatrixMut<'_, S> {
        let len = self.item_len();
        MatrixMut {
            data: &mut self.data[b * len..(b + 1) * len],
            rows: self.rows,
            cols: self.cols,
            layout: self.layout,
        }
    }

    /// The raw element slice; batch item `b` occupies
    /// `[b * item_len() .. (b + 1) * item_len()]`.
    pub fn as_slice_mut(&mut self) -> &mut [S] {
        self.data
    }
}

/// A read-only rank-2 view over a batch of uniform vectors.
///
/// The batch axis is always outermost; each item is one contiguous `len`
/// block, so vectors need no layout/pairing machinery.
#[derive(Debug, Clone, Copy)]
pub struct BatchVector<'a, S> {
    data: &'a [S],
    batch: usize,
    len: usize,
}

impl<'a, S: Copy> BatchVector<'a, S> {
    pub fn new(data: &'a [S], batch: usize, len: usize) -> Result<Self> {
        check_len(data, batch, len, 1)?;
        Ok(BatchVector { data, batch, len })
    }

    pub fn batch_size(&self) -> usize {
        self.batch
    }

    /// Elements per batch item.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slice of batch item `b`.
    pub fn item(&self, b: usize) -> &'a [S] {
        &self.data[b * self.len..(b + 1) * self.len]
    }
}

/// A mutable rank-2 view over a batch of uniform vectors.
#[derive(Debug)]
pub struct BatchVectorMut<'a, S> {
    data: &'a mut [S],
    batch: usize,
    len: usize,
}

impl<'a, S: Copy> BatchVectorMut<'a, S> {
    pub fn new(data: &'a mut [S], batch: usize, len: usize) -> Result<Self> {
        check_len(data, batch, len, 1)?;
        Ok(BatchVectorMut { data, batch, len })
    }

    pub fn batch_size(&self) -> usize {
        self.batch
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mutable slice of batch item `b`.
    pub fn item_mut(&mut self, b: usize) -> &mut [S] {
        &mut self.data[b * self.len..(b + 1) * self.len]
    }

    /// The raw element slice; batch item `b` occupies
    /// `[b * len() .. (b + 1) * len()]`.
    pub fn as_slice_mut(&mut self) -> &mut [S] {
        self.data
    }
}

/// A 2-D view of one batch item.
#[derive(Debug, Clone, Copy)]
pub struct MatrixRef<'a, S> {
    data: &'a [S],
    rows: usize,
    cols: usize,
    layout: MatrixLayout,
}

#[inline]
fn offset(layout: MatrixLayout, rows: usize, cols: usize, i: usize, j: usize) -> usize {
    match layout {
        MatrixLayout::RowMajor => i * cols + j,
        MatrixLayout::ColMajor => i + j * rows,
    }
}

impl<'a, S: Copy> MatrixRef<'a, S> {
    /// Wrap a contiguous `rows * cols` slice.
    pub fn new(data: &'a [S], rows: usize, cols: usize, layout: MatrixLayout) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        MatrixRef {
            data,
            rows,
            cols,
            layout,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> S {
        self.data[offset(self.layout, self.rows, self.cols, i, j)]
    }
}

/// A mutable 2-D view of one batch item.
#[derive(Debug)]
pub struct MatrixMut<'a, S> {
    data: &'a mut [S],
    rows: usize,
    cols: usize,
    layout: MatrixLayout,
}

impl<'a, S: Copy> MatrixMut<'a, S> {
    /// Wrap a contiguous `rows * cols` slice.
    pub fn new(data: &'a mut [S], rows: usize, cols: usize, layout: MatrixLayout) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        MatrixMut {
            data,
            rows,
            cols,
            layout,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> S {
        self.data[offset(self.layout, self.rows, self.cols, i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, v: S) {
        self.data[offset(self.layout, self.rows, self.cols, i, j)] = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_indexing() {
        // 2 items of 2x3, row-major, batch leftmost.
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let v = BatchMatrix::row_major(&data, 2, 2, 3).unwrap();
        assert_eq!(v.batch_size(), 2);
        assert_eq!(v.rows(), 2);
        assert_eq!(v.cols(), 3);
        assert_eq!(v.item(0).get(0, 0), 0.0);
        assert_eq!(v.item(0).get(1, 2), 5.0);
        assert_eq!(v.item(1).get(0, 1), 7.0);
    }

    #[test]
    fn test_col_major_indexing() {
        // 2 items of 2x3, column-major, batch rightmost.
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let v = BatchMatrix::col_major(&data, 2, 3, 2).unwrap();
        assert_eq!(v.batch_size(), 2);
        // Item 0 is data[0..6] in column order: (0,0)=0, (1,0)=1, (0,1)=2 ...
        assert_eq!(v.item(0).get(0, 0), 0.0);
        assert_eq!(v.item(0).get(1, 0), 1.0);
        assert_eq!(v.item(0).get(0, 1), 2.0);
        assert_eq!(v.item(1).get(1, 2), 11.0);
    }

    #[test]
    fn test_rejects_illegal_pairing() {
        let data = vec![0.0f32; 12];
        let err = BatchMatrix::new(
            &data,
            [2, 2, 3],
            MatrixLayout::RowMajor,
            BatchLayout::Right,
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::LayoutPairing { .. }));
        let err = BatchMatrix::new(
            &data,
            [2, 3, 2],
            MatrixLayout::ColMajor,
            BatchLayout::Left,
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::LayoutPairing { .. }));
    }

    #[test]
    fn test_rejects_bad_element_count() {
        let data = vec![0.0f32; 11];
        assert!(matches!(
            BatchMatrix::row_major(&data, 2, 2, 3).unwrap_err(),
            BatchError::ElementCount { expected: 12, .. }
        ));
    }

    #[test]
    fn test_item_mut_roundtrip() {
        let mut data = vec![0.0f32; 12];
        let mut v = BatchMatrixMut::row_major(&mut data, 2, 2, 3).unwrap();
        v.item_mut(1).set(1, 2, 7.5);
        assert_eq!(v.item_mut(1).get(1, 2), 7.5);
        assert_eq!(data[11], 7.5);
    }

    #[test]
    fn test_batch_vector_items() {
        let data: Vec<f32> = (0..10).map(|v| v as f32).collect();
        let v = BatchVector::new(&data, 2, 5).unwrap();
        assert_eq!(v.batch_size(), 2);
        assert_eq!(v.len(), 5);
        assert_eq!(v.item(1), &[5.0, 6.0, 7.0, 8.0, 9.0]);
        assert!(matches!(
            BatchVector::new(&data, 2, 6).unwrap_err(),
            BatchError::ElementCount { expected: 12, .. }
        ));
    }

    #[test]
    fn test_batch_vector_mut_roundtrip() {
        let mut data = vec![0.0f32; 6];
        let mut v = BatchVectorMut::new(&mut data, 3, 2).unwrap();
        v.item_mut(2)[1] = 4.5;
        assert_eq!(data[5], 4.5);
    }

    #[test]
    fn test_col_major_item_is_contiguous() {
        let mut data = vec![0.0f32; 12];
        let mut v = BatchMatrixMut::col_major(&mut data, 2, 3, 2).unwrap();
        assert_eq!(v.item_len(), 6);
        v.item_mut(1).set(0, 0, 1.0);
        assert_eq!(data[6], 1.0);
    }
}
