use tracing::{debug, info};

use crate::backprop::{
    BackpropScratch, DEFAULT_LR, Gradients, StepReport, apply_update, backprop_with, step_report,
};
use crate::{Dataset, Error, Matrix, Model, Result, Transform};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of iterations used when none is configured.
pub const DEFAULT_ITERATIONS: usize = 100;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    /// Fixed number of forward/backprop iterations. There is no early stopping.
    pub iterations: usize,
    pub lr: f32,
    /// Transform applied to the affine scores in the forward pass.
    pub transform: Transform,
    /// Stop with [`Error::NonFiniteValue`] as soon as predictions, the reported loss, or the
    /// updated parameters stop being finite. The model is left as it was before the failing
    /// iteration. When false, NaN/inf propagate silently.
    pub fail_on_non_finite: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            lr: DEFAULT_LR,
            transform: Transform::Log,
            fail_on_non_finite: false,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("iterations must be > 0".to_owned()));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lr must be finite and > 0, got {}",
                self.lr
            )));
        }
        Ok(())
    }
}

/// Per-iteration diagnostics; `steps[i]` belongs to iteration `i`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    pub steps: Vec<StepReport>,
}

impl TrainReport {
    /// Loss of every iteration, in order.
    pub fn losses(&self) -> Vec<f32> {
        self.steps.iter().map(|s| s.loss).collect()
    }

    pub fn final_loss(&self) -> Option<f32> {
        self.steps.last().map(|s| s.loss)
    }
}

/// Reusable buffers for training one model on one dataset shape.
///
/// The prediction matrix is overwritten every iteration; nothing carries over between
/// iterations except the model itself.
#[derive(Debug, Clone)]
pub struct Trainer {
    pub pred: Matrix,
    pub scratch: BackpropScratch,
    pub grads: Gradients,
}

impl Trainer {
    pub fn new(data: &Dataset, model: &Model) -> Self {
        Self {
            pred: Matrix::zeros(data.len(), model.classes()),
            scratch: BackpropScratch::new(data.len(), model.classes()),
            grads: Gradients::new(model),
        }
    }

    /// One forward pass from the current `model` followed by one in-place update.
    pub fn step(
        &mut self,
        data: &Dataset,
        model: &mut Model,
        transform: Transform,
        lr: f32,
    ) -> StepReport {
        model.forward_into(data.inputs(), transform, &mut self.pred);
        backprop_with(
            &self.pred,
            data.inputs(),
            data.targets(),
            model,
            lr,
            &mut self.scratch,
            &mut self.grads,
        )
    }

    /// Like [`Trainer::step`], but checks every intermediate for non-finite values.
    ///
    /// Predictions are checked after the forward pass and the loss before any update, so
    /// those failures leave `model` untouched. If the update itself produces a non-finite
    /// parameter, `model` is restored to its value before this step.
    pub fn try_step(
        &mut self,
        iter: usize,
        data: &Dataset,
        model: &mut Model,
        transform: Transform,
        lr: f32,
    ) -> Result<StepReport> {
        model.forward_into(data.inputs(), transform, &mut self.pred);
        if !self.pred.is_finite() {
            return Err(Error::NonFiniteValue(format!(
                "predictions at iteration {iter}"
            )));
        }

        let report = step_report(&self.pred, data.targets(), &mut self.scratch);
        if !(report.loss.is_finite() && report.loss_derivative.is_finite()) {
            return Err(Error::NonFiniteValue(format!(
                "loss at iteration {iter}: loss={} loss_derivative={}",
                report.loss, report.loss_derivative
            )));
        }

        let before = model.clone();
        apply_update(data.inputs(), model, lr, &self.scratch, &mut self.grads);
        if !model.is_finite() {
            *model = before;
            return Err(Error::NonFiniteValue(format!(
                "parameters after iteration {iter}"
            )));
        }

        Ok(report)
    }
}

/// Train `model` in place on `data`.
///
/// Runs exactly `cfg.iterations` forward/backprop iterations, logging
/// `==========iter:<i>` before each one.
pub fn train(data: &Dataset, model: &mut Model, cfg: &TrainConfig) -> Result<TrainReport> {
    cfg.validate()?;
    check_shapes(data, model)?;

    debug!(
        iterations = cfg.iterations,
        lr = cfg.lr,
        transform = ?cfg.transform,
        samples = data.len(),
        features = data.input_dim(),
        classes = data.target_dim(),
        "training"
    );

    let mut trainer = Trainer::new(data, model);
    let mut report = TrainReport {
        steps: Vec::with_capacity(cfg.iterations),
    };

    for iter in 0..cfg.iterations {
        info!("==========iter:{iter}");
        let step = if cfg.fail_on_non_finite {
            trainer.try_step(iter, data, model, cfg.transform, cfg.lr)?
        } else {
            trainer.step(data, model, cfg.transform, cfg.lr)
        };
        report.steps.push(step);
    }

    debug!(weights = ?model.weights().to_rows(), biases = ?model.biases(), "trained");
    Ok(report)
}

impl Model {
    /// Convenience wrapper around [`train`].
    pub fn fit(&mut self, data: &Dataset, cfg: &TrainConfig) -> Result<TrainReport> {
        train(data, self, cfg)
    }
}

fn check_shapes(data: &Dataset, model: &Model) -> Result<()> {
    if data.input_dim() != model.features() {
        return Err(Error::ShapeMismatch(format!(
            "dataset input_dim {} does not match model features {}",
            data.input_dim(),
            model.features()
        )));
    }
    if data.target_dim() != model.classes() {
        return Err(Error::ShapeMismatch(format!(
            "dataset target_dim {} does not match model classes {}",
            data.target_dim(),
            model.classes()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> (Dataset, Model) {
        let data = Dataset::from_rows(&[vec![1.0, 2.0, 3.0]], &[vec![0.0, 1.0]]).unwrap();
        (data, Model::constant(2, 3, 0.1))
    }

    #[test]
    fn default_config_is_100_iters_lr_0_1_log() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.iterations, 100);
        assert_eq!(cfg.lr, 0.1);
        assert_eq!(cfg.transform, Transform::Log);
        assert!(!cfg.fail_on_non_finite);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_validation() {
        let zero_iters = TrainConfig {
            iterations: 0,
            ..TrainConfig::default()
        };
        assert!(matches!(
            zero_iters.validate(),
            Err(Error::InvalidConfig(_))
        ));

        let bad_lr = TrainConfig {
            lr: f32::NAN,
            ..TrainConfig::default()
        };
        assert!(bad_lr.validate().is_err());
    }

    #[test]
    fn runs_exactly_the_configured_number_of_iterations() {
        let (data, mut model) = demo();
        let cfg = TrainConfig {
            iterations: 7,
            ..TrainConfig::default()
        };
        let report = train(&data, &mut model, &cfg).unwrap();
        assert_eq!(report.steps.len(), 7);
        assert_ne!(model, Model::constant(2, 3, 0.1));
    }

    #[test]
    fn each_iteration_uses_the_updated_model() {
        let (data, mut model) = demo();
        let cfg = TrainConfig {
            iterations: 2,
            ..TrainConfig::default()
        };
        let report = train(&data, &mut model, &cfg).unwrap();

        let (_, mut manual) = demo();
        let mut trainer = Trainer::new(&data, &manual);
        let first = trainer.step(&data, &mut manual, Transform::Log, 0.1);
        let second = trainer.step(&data, &mut manual, Transform::Log, 0.1);

        assert!(first.loss.is_nan());
        assert_eq!(report.steps[1], second);
        assert_eq!(model, manual);
    }

    #[test]
    fn shape_mismatch_is_reported_before_training() {
        let (data, _) = demo();
        let mut wrong_features = Model::new(2, 4);
        assert!(matches!(
            train(&data, &mut wrong_features, &TrainConfig::default()),
            Err(Error::ShapeMismatch(_))
        ));

        let mut wrong_classes = Model::new(3, 3);
        assert!(matches!(
            wrong_classes.fit(&data, &TrainConfig::default()),
            Err(Error::ShapeMismatch(_))
        ));
        assert_eq!(wrong_classes, Model::new(3, 3));
    }

    #[test]
    fn fail_on_non_finite_stops_at_first_nan_loss() {
        let (data, mut model) = demo();
        let before = model.clone();
        let cfg = TrainConfig {
            fail_on_non_finite: true,
            ..TrainConfig::default()
        };
        let err = train(&data, &mut model, &cfg).unwrap_err();
        assert!(matches!(
            err,
            Error::NonFiniteValue(ref msg) if msg.starts_with("loss at iteration 0")
        ));
        assert_eq!(model, before);
    }

    #[test]
    fn fail_on_non_finite_rejects_overflowing_softmax_predictions() {
        // Scores of 200 overflow exp() in f32, so softmax yields inf / inf.
        let data = Dataset::from_rows(&[vec![100.0, 100.0]], &[vec![1.0, 0.0]]).unwrap();
        let mut model = Model::constant(2, 2, 1.0);
        let before = model.clone();
        let cfg = TrainConfig {
            transform: Transform::Softmax,
            fail_on_non_finite: true,
            ..TrainConfig::default()
        };
        let err = train(&data, &mut model, &cfg).unwrap_err();
        assert!(matches!(
            err,
            Error::NonFiniteValue(ref msg) if msg.starts_with("predictions at iteration 0")
        ));
        assert_eq!(model, before);
    }

    #[test]
    fn fail_on_non_finite_restores_model_when_update_overflows() {
        // Score 0.3 keeps loss finite, but the weight gradient is about -4.4e40.
        let data = Dataset::from_rows(&[vec![3.0e38]], &[vec![1.0]]).unwrap();
        let mut model = Model::from_parts(Matrix::filled(1, 1, 1.0e-39), vec![0.0]).unwrap();
        let before = model.clone();
        let cfg = TrainConfig {
            lr: 1000.0,
            transform: Transform::Identity,
            fail_on_non_finite: true,
            ..TrainConfig::default()
        };
        let err = train(&data, &mut model, &cfg).unwrap_err();
        assert!(matches!(
            err,
            Error::NonFiniteValue(ref msg) if msg.starts_with("parameters after iteration 0")
        ));
        assert_eq!(model, before);

        // Without the check the overflow lands in the weights.
        let unchecked = TrainConfig {
            iterations: 1,
            fail_on_non_finite: false,
            ..cfg
        };
        train(&data, &mut model, &unchecked).unwrap();
        assert!(!model.is_finite());
    }

    #[test]
    fn identity_transform_trains_without_nan_for_in_range_scores() {
        let data = Dataset::from_rows(&[vec![0.1, 0.2]], &[vec![1.0]]).unwrap();
        let mut model = Model::constant(1, 2, 0.5);
        let cfg = TrainConfig {
            iterations: 20,
            transform: Transform::Identity,
            fail_on_non_finite: true,
            ..TrainConfig::default()
        };
        let report = train(&data, &mut model, &cfg).unwrap();
        let losses = report.losses();
        assert!(losses.iter().all(|l| l.is_finite()));
        assert!(losses[19] < losses[0]);
    }
}
