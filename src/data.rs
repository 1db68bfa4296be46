//! Supervised datasets.
//!
//! A [`Dataset`] pairs an input matrix `X` of shape `(len, input_dim)` with a target matrix
//! `Y` of shape `(len, target_dim)`. Both are validated once at construction, so the
//! training loop can rely on the shapes without re-checking them.

use crate::{Error, Matrix, Result};

/// A supervised dataset: inputs (X) and targets (Y).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Matrix,
    targets: Matrix,
}

impl Dataset {
    /// Pair an input matrix with a target matrix.
    ///
    /// Both must be non-empty and have the same number of rows.
    pub fn new(inputs: Matrix, targets: Matrix) -> Result<Self> {
        if inputs.rows() == 0 || inputs.cols() == 0 {
            return Err(Error::InvalidData(format!(
                "inputs must be non-empty, got shape {:?}",
                inputs.shape()
            )));
        }
        if targets.rows() == 0 || targets.cols() == 0 {
            return Err(Error::InvalidData(format!(
                "targets must be non-empty, got shape {:?}",
                targets.shape()
            )));
        }
        if inputs.rows() != targets.rows() {
            return Err(Error::ShapeMismatch(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.rows(),
                targets.rows()
            )));
        }

        Ok(Self { inputs, targets })
    }

    /// Build a dataset from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::ShapeMismatch(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        Self::new(Matrix::from_rows(inputs)?, Matrix::from_rows(targets)?)
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.inputs.rows()
    }

    /// Returns true if there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.rows() == 0
    }

    #[inline]
    /// Returns the per-sample input dimension.
    pub fn input_dim(&self) -> usize {
        self.inputs.cols()
    }

    #[inline]
    /// Returns the per-sample target dimension.
    pub fn target_dim(&self) -> usize {
        self.targets.cols()
    }

    #[inline]
    /// Returns the inputs (X).
    pub fn inputs(&self) -> &Matrix {
        &self.inputs
    }

    #[inline]
    /// Returns the targets (Y).
    pub fn targets(&self) -> &Matrix {
        &self.targets
    }
}
