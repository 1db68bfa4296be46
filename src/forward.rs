//! Forward pass: affine scores followed by an output [`Transform`].
//!
//! For inputs `X` of shape `(N, F)`, weights `W` of shape `(C, F)` and biases `b` of length
//! `C`, the raw score is
//!
//! `score[n][k] = sum_j X[n][j] * W[k][j] + F * b[k]`
//!
//! The bias is accumulated once per input feature, so it contributes `F` times. Training
//! depends on this scaling; keep it when changing the kernel.

use crate::matmul::matmul_a_bt;
use crate::{Matrix, Transform};

/// Forward pass into a freshly allocated `(N, C)` prediction matrix.
///
/// Panics if the shapes disagree (see [`forward_into`]).
pub fn forward(inputs: &Matrix, weights: &Matrix, biases: &[f32], transform: Transform) -> Matrix {
    let mut out = Matrix::zeros(inputs.rows(), weights.rows());
    forward_into(inputs, weights, biases, transform, &mut out);
    out
}

/// Forward pass writing into `out` (overwrite semantics).
///
/// Shape contract:
/// - `weights.cols() == inputs.cols()`
/// - `biases.len() == weights.rows()`
/// - `out.shape() == (inputs.rows(), weights.rows())`
pub fn forward_into(
    inputs: &Matrix,
    weights: &Matrix,
    biases: &[f32],
    transform: Transform,
    out: &mut Matrix,
) {
    affine_scores_into(inputs, weights, biases, out);
    transform.apply(out);
}

/// Raw affine scores (no transform) written into `out`.
pub fn affine_scores_into(inputs: &Matrix, weights: &Matrix, biases: &[f32], out: &mut Matrix) {
    assert_eq!(
        inputs.cols(),
        weights.cols(),
        "inputs have {} features, weights expect {}",
        inputs.cols(),
        weights.cols()
    );
    assert_eq!(
        biases.len(),
        weights.rows(),
        "biases len {} does not match weights rows {}",
        biases.len(),
        weights.rows()
    );
    assert_eq!(
        out.shape(),
        (inputs.rows(), weights.rows()),
        "output is {:?}, expected ({}, {})",
        out.shape(),
        inputs.rows(),
        weights.rows()
    );

    matmul_a_bt(1.0, inputs, weights, out);

    let bias_repeats = inputs.cols() as f32;
    for n in 0..out.rows() {
        for (score, &b) in out.row_mut(n).iter_mut().zip(biases) {
            *score += bias_repeats * b;
        }
    }
}
