//! Dense row-major matrices and the small set of element-wise helpers the trainer needs.
//!
//! A [`Matrix`] always carries its shape. Constructors that take caller data validate it and
//! return [`Result`]; arithmetic helpers treat a shape disagreement as programmer error and
//! panic via `assert!` instead of reading out of bounds.

use std::ops::{Index, IndexMut};

use crate::{Error, Result};

/// A `rows x cols` matrix of `f32` stored contiguously in row-major order.
///
/// `data.len() == rows * cols` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// A `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// A `rows x cols` matrix with every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Build a matrix from a flat row-major buffer.
    pub fn from_flat(data: Vec<f32>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::ShapeMismatch(format!(
                "buffer length {} does not match rows * cols ({rows} * {cols})",
                data.len()
            )));
        }
        Ok(Self { data, rows, cols })
    }

    /// Build a matrix from per-row vectors.
    ///
    /// This is a convenience constructor (it copies into contiguous storage). Every row must
    /// have the same, non-zero length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::InvalidData(
                "matrix must have at least one row".to_owned(),
            ));
        }

        let cols = rows[0].len();
        if cols == 0 {
            return Err(Error::InvalidData(
                "matrix rows must not be empty".to_owned(),
            ));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::ShapeMismatch(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns row `r` (shape: `(cols,)`).
    ///
    /// Panics if `r >= rows`.
    #[inline]
    pub fn row(&self, r: usize) -> &[f32] {
        assert!(
            r < self.rows,
            "row {r} out of bounds for {} rows",
            self.rows
        );
        let start = r * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, r: usize) -> &mut [f32] {
        assert!(
            r < self.rows,
            "row {r} out of bounds for {} rows",
            self.rows
        );
        let start = r * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Copies the matrix back out into per-row vectors.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    /// Element-wise `self += rhs`.
    ///
    /// Panics if the shapes differ.
    pub fn add_in_place(&mut self, rhs: &Matrix) {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "cannot add a {:?} matrix into a {:?} matrix",
            rhs.shape(),
            self.shape()
        );
        vec_add(&mut self.data, &rhs.data);
    }

    /// Mean of all `rows * cols` entries. An empty matrix has mean `0`.
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.data.iter().sum();
        sum / self.data.len() as f32
    }

    /// Per-column mean over all rows (shape: `(cols,)`).
    ///
    /// Each entry is divided by the row count as it is accumulated, so a single-row matrix
    /// yields its row unchanged.
    pub fn mean_col(&self) -> Vec<f32> {
        let mut mean = vec![0.0_f32; self.cols];
        if self.rows == 0 {
            return mean;
        }

        let n = self.rows as f32;
        for r in 0..self.rows {
            for (m, &v) in mean.iter_mut().zip(self.row(r)) {
                *m += v / n;
            }
        }
        mean
    }

    /// True if every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &f32 {
        assert!(
            r < self.rows && c < self.cols,
            "index ({r}, {c}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f32 {
        assert!(
            r < self.rows && c < self.cols,
            "index ({r}, {c}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &mut self.data[r * self.cols + c]
    }
}

/// Element-wise `a += b`.
///
/// Panics if the lengths differ.
#[inline]
pub fn vec_add(a: &mut [f32], b: &[f32]) {
    assert_eq!(
        a.len(),
        b.len(),
        "cannot add a vector of len {} into one of len {}",
        b.len(),
        a.len()
    );
    for (x, &y) in a.iter_mut().zip(b) {
        *x += y;
    }
}
