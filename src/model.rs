use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::forward::{forward, forward_into};
use crate::{Error, Matrix, Result, Transform};

/// A single linear layer: `weights` of shape `(classes, features)` and one bias per class.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Row-major matrix with shape (classes, features).
    weights: Matrix,
    biases: Vec<f32>,
}

impl Model {
    /// All-zero weights and biases.
    pub fn new(classes: usize, features: usize) -> Self {
        Self::constant(classes, features, 0.0)
    }

    /// Every weight set to `value`, biases zero.
    pub fn constant(classes: usize, features: usize, value: f32) -> Self {
        Self {
            weights: Matrix::filled(classes, features, value),
            biases: vec![0.0; classes],
        }
    }

    /// Build a model from explicit parameters.
    pub fn from_parts(weights: Matrix, biases: Vec<f32>) -> Result<Self> {
        if weights.rows() == 0 || weights.cols() == 0 {
            return Err(Error::InvalidData(format!(
                "weights must be non-empty, got shape {:?}",
                weights.shape()
            )));
        }
        if biases.len() != weights.rows() {
            return Err(Error::ShapeMismatch(format!(
                "biases len {} does not match weights rows {}",
                biases.len(),
                weights.rows()
            )));
        }
        Ok(Self { weights, biases })
    }

    /// Xavier/Glorot uniform weights from a deterministic seed; biases zero.
    pub fn new_with_seed(classes: usize, features: usize, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(classes, features, &mut rng)
    }

    /// Xavier/Glorot uniform weights drawn from `rng`; biases zero.
    pub fn new_with_rng<R: Rng + ?Sized>(
        classes: usize,
        features: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if classes == 0 || features == 0 {
            return Err(Error::InvalidConfig(format!(
                "classes and features must be > 0, got ({classes}, {features})"
            )));
        }

        let limit = (6.0 / (classes + features) as f32).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        let weights: Vec<f32> = (0..classes * features).map(|_| dist.sample(rng)).collect();

        Ok(Self {
            weights: Matrix::from_flat(weights, classes, features)?,
            biases: vec![0.0; classes],
        })
    }

    #[inline]
    pub fn classes(&self) -> usize {
        self.weights.rows()
    }

    #[inline]
    pub fn features(&self) -> usize {
        self.weights.cols()
    }

    #[inline]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    #[inline]
    pub(crate) fn params_mut(&mut self) -> (&mut Matrix, &mut [f32]) {
        (&mut self.weights, &mut self.biases)
    }

    /// True if every weight and bias is finite.
    pub fn is_finite(&self) -> bool {
        self.weights.is_finite() && self.biases.iter().all(|b| b.is_finite())
    }

    /// Forward pass for a batch of inputs of shape `(N, features)`.
    ///
    /// Panics if `inputs.cols() != self.features()`.
    pub fn forward(&self, inputs: &Matrix, transform: Transform) -> Matrix {
        forward(inputs, &self.weights, &self.biases, transform)
    }

    /// Forward pass into a reusable `(N, classes)` buffer.
    pub fn forward_into(&self, inputs: &Matrix, transform: Transform, out: &mut Matrix) {
        forward_into(inputs, &self.weights, &self.biases, transform, out);
    }

    /// Shape-checked inference.
    pub fn predict(&self, inputs: &Matrix, transform: Transform) -> Result<Matrix> {
        if inputs.rows() == 0 {
            return Err(Error::InvalidData("inputs must not be empty".to_owned()));
        }
        if inputs.cols() != self.features() {
            return Err(Error::ShapeMismatch(format!(
                "inputs have {} features, model expects {}",
                inputs.cols(),
                self.features()
            )));
        }
        Ok(self.forward(inputs, transform))
    }
}
