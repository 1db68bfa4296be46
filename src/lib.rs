//! A small single-layer trainer.
//!
//! `rust-linear` fits one linear layer (weights `W` of shape `(classes, features)` plus one
//! bias per class) by plain gradient descent on a per-class binary cross-entropy loss.
//!
//! Each iteration:
//!
//! 1. forward: `pred = transform(X * W^T + F * b)` (see [`forward()`]; `Log` by default)
//! 2. backprop: per-entry loss and residuals, mean loss / residual logged, gradients scaled
//!    by the learning rate and added to `W` and `b` in place (see [`backprop()`])
//!
//! Training runs a fixed number of iterations with no convergence check.
//!
//! # Panics vs `Result`
//!
//! - Low-level hot path (panics on misuse): [`forward::forward`], [`backprop::backprop`],
//!   [`Matrix::add_in_place`], [`matrix::vec_add`]. Shape mismatches are programmer error and
//!   panic via `assert!`.
//! - Checked APIs: [`Matrix::from_rows`], [`Dataset::new`], [`Model::from_parts`],
//!   [`Model::predict`], [`train`]. These validate shapes and return [`Result`].
//!
//! Non-finite values are not checked by default: `ln` of a non-positive score yields NaN
//! and that flows into the loss and, from there, possibly the parameters. Set
//! [`TrainConfig::fail_on_non_finite`] to stop with [`Error::NonFiniteValue`] instead.
//!
//! # Logging
//!
//! The crate emits `tracing` events (`==========iter:<i>`, `loss:<v>`,
//! `loss_derivative:<v>` at info level). Binaries call [`logging::init_logging`].
//!
//! # Quick start
//!
//! ```rust
//! use rust_linear::{Dataset, Model, TrainConfig};
//!
//! # fn main() -> rust_linear::Result<()> {
//! let data = Dataset::from_rows(&[vec![1.0, 2.0, 3.0]], &[vec![0.0, 1.0]])?;
//! let mut model = Model::constant(2, 3, 0.1);
//!
//! let report = model.fit(&data, &TrainConfig::default())?;
//! assert_eq!(report.steps.len(), 100);
//! # Ok(())
//! # }
//! ```

pub mod backprop;
pub mod data;
pub mod error;
pub mod forward;
pub mod logging;
pub mod loss;
pub(crate) mod matmul;
pub mod matrix;
pub mod model;
pub mod train;
pub mod transform;

pub use backprop::{BackpropScratch, Gradients, StepReport, backprop, backprop_with};
pub use data::Dataset;
pub use error::{Error, Result};
pub use forward::{forward, forward_into};
pub use matrix::{Matrix, vec_add};
pub use model::Model;
pub use train::{TrainConfig, TrainReport, Trainer, train};
pub use transform::Transform;
