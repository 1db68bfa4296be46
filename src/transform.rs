//! Output transforms.
//!
//! The forward pass computes an affine score matrix and then applies a transform to it in
//! place: `pred = transform(score)`. `Log` is the default used by training.

use crate::Matrix;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Element-wise (or row-wise) transform applied to the raw scores.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    /// Leave the scores unchanged.
    Identity,
    /// Natural logarithm of each score.
    ///
    /// There is no domain check: non-positive scores become NaN or `-inf`.
    #[default]
    Log,
    /// Row-wise `exp(v) / sum(exp(row))`.
    ///
    /// Exponentials are taken on the raw scores (no max shift), so very large scores
    /// overflow to `inf`.
    Softmax,
}

impl Transform {
    /// Apply the transform to `scores` in place.
    pub fn apply(self, scores: &mut Matrix) {
        match self {
            Transform::Identity => {}
            Transform::Log => {
                for v in scores.as_mut_slice() {
                    *v = v.ln();
                }
            }
            Transform::Softmax => {
                for r in 0..scores.rows() {
                    softmax_row(scores.row_mut(r));
                }
            }
        }
    }
}

#[inline]
fn softmax_row(row: &mut [f32]) {
    let mut sum = 0.0_f32;
    for v in row.iter_mut() {
        *v = v.exp();
        sum += *v;
    }
    for v in row.iter_mut() {
        *v /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_a_no_op() {
        let mut m = Matrix::from_rows(&[vec![-1.0, 0.0, 2.5]]).unwrap();
        let before = m.clone();
        Transform::Identity.apply(&mut m);
        assert_eq!(m, before);
    }

    #[test]
    fn log_has_no_domain_check() {
        let mut m = Matrix::from_rows(&[vec![1.0, std::f32::consts::E, 0.0, -1.0]]).unwrap();
        Transform::Log.apply(&mut m);
        assert_eq!(m[(0, 0)], 0.0);
        assert!((m[(0, 1)] - 1.0).abs() < 1e-6);
        assert_eq!(m[(0, 2)], f32::NEG_INFINITY);
        assert!(m[(0, 3)].is_nan());
    }

    #[test]
    fn softmax_rows_sum_to_one() {
        let mut m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![0.0, 0.0, 0.0]]).unwrap();
        Transform::Softmax.apply(&mut m);

        for r in 0..m.rows() {
            let sum: f32 = m.row(r).iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
        assert!(m[(0, 2)] > m[(0, 1)] && m[(0, 1)] > m[(0, 0)]);
        assert!((m[(1, 0)] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn default_is_log() {
        assert_eq!(Transform::default(), Transform::Log);
    }
}
