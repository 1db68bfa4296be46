//! Loss diagnostics, parameter gradients, and the in-place SGD update.
//!
//! One backprop step for predictions `P` (`N x C`), inputs `X` (`N x F`) and targets `Y`:
//!
//! - per-entry loss terms from [`crate::loss`]
//! - `grad_W[k][j] = sum_n (-delta[n][k] * X[n][j] / N) * lr`
//! - `grad_b[k] = sum_n (-delta_raw[n][k] / N) * lr`
//! - `W += grad_W`, `b += grad_b`
//!
//! The reported loss and loss derivative are observational only.

use tracing::info;

use crate::loss::loss_terms_into;
use crate::matmul::matmul_at_b;
use crate::matrix::vec_add;
use crate::{Matrix, Model};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Learning rate used when none is configured.
pub const DEFAULT_LR: f32 = 0.1;

/// Scalar diagnostics from one backprop step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Mean loss over all `N * C` entries.
    pub loss: f32,
    /// Mean raw residual `pred - target` over all entries.
    pub loss_derivative: f32,
    /// Mean loss per class (shape: `(C,)`).
    pub class_loss: Vec<f32>,
}

/// Reusable `(N, C)` buffers for the per-entry loss terms.
#[derive(Debug, Clone)]
pub struct BackpropScratch {
    loss: Matrix,
    delta_raw: Matrix,
    delta: Matrix,
}

impl BackpropScratch {
    pub fn new(samples: usize, classes: usize) -> Self {
        Self {
            loss: Matrix::zeros(samples, classes),
            delta_raw: Matrix::zeros(samples, classes),
            delta: Matrix::zeros(samples, classes),
        }
    }

    #[inline]
    pub fn loss(&self) -> &Matrix {
        &self.loss
    }

    #[inline]
    pub fn delta_raw(&self) -> &Matrix {
        &self.delta_raw
    }

    #[inline]
    pub fn delta(&self) -> &Matrix {
        &self.delta
    }
}

/// Parameter updates for a [`Model`] (overwrite semantics).
///
/// These already include the learning rate and sign; applying them is a plain add.
#[derive(Debug, Clone)]
pub struct Gradients {
    d_weights: Matrix,
    d_biases: Vec<f32>,
}

impl Gradients {
    pub fn new(model: &Model) -> Self {
        Self {
            d_weights: Matrix::zeros(model.classes(), model.features()),
            d_biases: vec![0.0; model.classes()],
        }
    }

    #[inline]
    pub fn d_weights(&self) -> &Matrix {
        &self.d_weights
    }

    #[inline]
    pub fn d_biases(&self) -> &[f32] {
        &self.d_biases
    }

    /// True if every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.d_weights.is_finite() && self.d_biases.iter().all(|g| g.is_finite())
    }
}

/// One backprop step with freshly allocated buffers.
///
/// Panics if the shapes disagree (see [`backprop_with`]).
pub fn backprop(
    pred: &Matrix,
    inputs: &Matrix,
    targets: &Matrix,
    model: &mut Model,
    lr: f32,
) -> StepReport {
    let mut scratch = BackpropScratch::new(pred.rows(), pred.cols());
    let mut grads = Gradients::new(model);
    backprop_with(pred, inputs, targets, model, lr, &mut scratch, &mut grads)
}

/// One backprop step reusing `scratch` and `grads`.
///
/// Logs `loss:<mean>` and `loss_derivative:<mean>` at info level, then updates `model` in
/// place. Equivalent to [`step_report`] followed by [`apply_update`].
///
/// Shape contract:
/// - `pred.shape() == targets.shape() == (N, C)`
/// - `inputs.shape() == (N, F)`
/// - `model` is `(C, F)`
/// - `scratch` is built for `(N, C)` and `grads` for `model`
pub fn backprop_with(
    pred: &Matrix,
    inputs: &Matrix,
    targets: &Matrix,
    model: &mut Model,
    lr: f32,
    scratch: &mut BackpropScratch,
    grads: &mut Gradients,
) -> StepReport {
    assert_eq!(
        inputs.rows(),
        pred.rows(),
        "inputs have {} rows, predictions have {}",
        inputs.rows(),
        pred.rows()
    );
    assert_eq!(
        model.classes(),
        pred.cols(),
        "model has {} classes, predictions have {}",
        model.classes(),
        pred.cols()
    );

    let report = step_report(pred, targets, scratch);
    apply_update(inputs, model, lr, scratch, grads);
    report
}

/// First half of a backprop step: fill `scratch` with the loss terms and report their means.
///
/// Logs `loss:<mean>` and `loss_derivative:<mean>` at info level. Does not touch the model.
pub fn step_report(pred: &Matrix, targets: &Matrix, scratch: &mut BackpropScratch) -> StepReport {
    loss_terms_into(
        pred,
        targets,
        &mut scratch.loss,
        &mut scratch.delta_raw,
        &mut scratch.delta,
    );

    let report = StepReport {
        loss: scratch.loss.mean(),
        loss_derivative: scratch.delta_raw.mean(),
        class_loss: scratch.loss.mean_col(),
    };
    info!("loss:{}", report.loss);
    info!("loss_derivative:{}", report.loss_derivative);
    report
}

/// Second half of a backprop step: gradients from the terms in `scratch`, added to `model`.
///
/// `scratch` must hold the terms from [`step_report`] for the same step.
pub fn apply_update(
    inputs: &Matrix,
    model: &mut Model,
    lr: f32,
    scratch: &BackpropScratch,
    grads: &mut Gradients,
) {
    let (samples, classes) = scratch.delta.shape();
    assert_eq!(
        inputs.rows(),
        samples,
        "inputs have {} rows, loss terms have {samples}",
        inputs.rows()
    );
    assert_eq!(
        model.classes(),
        classes,
        "model has {} classes, loss terms have {classes}",
        model.classes()
    );
    assert_eq!(
        model.features(),
        inputs.cols(),
        "model has {} features, inputs have {}",
        model.features(),
        inputs.cols()
    );
    assert_eq!(
        grads.d_weights.shape(),
        model.weights().shape(),
        "grads built for a {:?} model, got {:?}",
        grads.d_weights.shape(),
        model.weights().shape()
    );

    compute_gradients(inputs, scratch, lr, grads);

    let (weights, biases) = model.params_mut();
    weights.add_in_place(&grads.d_weights);
    vec_add(biases, &grads.d_biases);
}

fn compute_gradients(inputs: &Matrix, scratch: &BackpropScratch, lr: f32, grads: &mut Gradients) {
    let samples = inputs.rows();
    if samples == 0 {
        grads.d_weights.as_mut_slice().fill(0.0);
        grads.d_biases.fill(0.0);
        return;
    }
    let scale = -lr / samples as f32;

    // grad_W = scale * delta^T * X
    matmul_at_b(scale, &scratch.delta, inputs, &mut grads.d_weights);

    grads.d_biases.fill(0.0);
    for n in 0..samples {
        for (g, &dr) in grads.d_biases.iter_mut().zip(scratch.delta_raw.row(n)) {
            *g += dr;
        }
    }
    for g in grads.d_biases.iter_mut() {
        *g *= scale;
    }
}
