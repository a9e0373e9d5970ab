use super::{Float, Mismatch, NearlyEqual, Tolerance};
use std::ops::{Index, IndexMut};

/// A dense, runtime-sized matrix stored in row-major order.
///
/// All of the model parameters and the per-iteration working tables (alpha,
/// beta, gamma, and each di-gamma slice) are stored in this type, so rows are
/// contiguous and can be handed to the inner kernels as slices.
#[derive(Clone, PartialEq, Debug)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Matrix<T> {
    /// Creates a new `rows` × `cols` [`Matrix`] with every entry set to
    /// `default`.
    #[inline]
    #[must_use]
    pub fn new(default: T, rows: usize, cols: usize) -> Self {
        Self {
            data: vec![default; rows * cols],
            rows,
            cols,
        }
    }

    /// Builds a [`Matrix`] from nested rows. Returns `None` if the rows are
    /// ragged.
    #[must_use]
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Option<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return None;
            }
            data.extend_from_slice(row);
        }
        Some(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Fills every entry with `value`.
    #[inline]
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Matrix<T> {
    /// The number of rows.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The number of columns.
    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the `(rows, cols)` pair.
    #[inline]
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Retrieves row `i` as a slice.
    ///
    /// ## Panics
    ///
    /// `i` must be less than the number of rows.
    #[inline]
    #[must_use]
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Retrieves row `i` as a mutable slice.
    ///
    /// ## Panics
    ///
    /// `i` must be less than the number of rows.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Retrieves two distinct rows, the first immutably and the second
    /// mutably. Used by the recursions where row `t` depends on row `t ± 1`.
    ///
    /// ## Panics
    ///
    /// `read` and `write` must be distinct and in bounds.
    #[inline]
    pub(crate) fn row_pair_mut(&mut self, read: usize, write: usize) -> (&[T], &mut [T]) {
        assert_ne!(read, write);
        let cols = self.cols;
        if read < write {
            let (head, tail) = self.data.split_at_mut(write * cols);
            (&head[read * cols..(read + 1) * cols], &mut tail[..cols])
        } else {
            let (head, tail) = self.data.split_at_mut(read * cols);
            (&tail[..cols], &mut head[write * cols..(write + 1) * cols])
        }
    }

    /// An iterator over the rows of the matrix.
    #[inline]
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        // `chunks_exact` panics on a chunk size of zero
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// The underlying row-major storage.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Float> Matrix<T> {
    /// The sum of each row.
    #[must_use]
    pub fn row_sums(&self) -> Vec<T> {
        self.iter_rows().map(|r| r.iter().sum()).collect()
    }

    /// Returns the first row (with its sum) that is not a probability
    /// distribution within `tolerance`, or `None` if the matrix is
    /// row-stochastic. Negative or non-finite entries also disqualify a row.
    #[must_use]
    pub fn first_non_stochastic_row(&self, tolerance: T) -> Option<(usize, T)> {
        self.iter_rows().enumerate().find_map(|(i, row)| {
            let sum: T = row.iter().sum();
            let valid_entries = row.iter().all(|&p| p >= T::ZERO && p.is_finite());
            if valid_entries && (sum - T::ONE).abs() <= tolerance {
                None
            } else {
                Some((i, sum))
            }
        })
    }

    /// Whether every row is a probability distribution within `tolerance`.
    #[inline]
    #[must_use]
    pub fn is_row_stochastic(&self, tolerance: T) -> bool {
        self.first_non_stochastic_row(tolerance).is_none()
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    /// Retrieves the entry at `(row, col)`.
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.data[i * self.cols + j]
    }
}

impl<T: Copy, S: NearlyEqual<T>> NearlyEqual<T> for Matrix<S> {
    fn first_mismatch(&self, other: &Self, tolerance: Tolerance<T>) -> Result<(), Mismatch<T>> {
        if self.shape() == other.shape() {
            self.data.first_mismatch(&other.data, tolerance)
        } else {
            Err(Mismatch::Shape)
        }
    }
}
