//! Per-entry loss terms.
//!
//! Every class slot is treated as an independent binary indicator: for a prediction `p` and
//! a target `y` (normally 0 or 1) the loss is
//!
//! `L = -ln(p) * y - ln(1 - p) * (1 - y)`
//!
//! Backprop works from two signals per entry: the raw residual `p - y`, and that residual
//! scaled by `-(1 - p) * p`.

use crate::Matrix;

/// Binary cross-entropy for one entry.
///
/// Outside `(0, 1)` this is NaN or infinite; nothing is clamped. A target of exactly `0` or
/// `1` does not mask a non-finite log on the other side (`inf * 0` is NaN).
#[inline]
pub fn cross_entropy(p: f32, y: f32) -> f32 {
    -p.ln() * y - (1.0 - p).ln() * (1.0 - y)
}

/// Raw residual `p - y`.
#[inline]
pub fn residual(p: f32, y: f32) -> f32 {
    p - y
}

/// Residual weighted by `-(1 - p) * p`.
#[inline]
pub fn weighted_delta(p: f32, residual: f32) -> f32 {
    residual * (-(1.0 - p) * p)
}

/// Fill the three `(N, C)` loss matrices from predictions and targets.
///
/// Overwrite semantics for `loss`, `delta_raw` and `delta`.
///
/// Shape contract: all five matrices share one shape.
pub fn loss_terms_into(
    pred: &Matrix,
    targets: &Matrix,
    loss: &mut Matrix,
    delta_raw: &mut Matrix,
    delta: &mut Matrix,
) {
    let shape = pred.shape();
    assert_eq!(
        targets.shape(),
        shape,
        "targets shape {:?} does not match predictions {:?}",
        targets.shape(),
        shape
    );
    assert_eq!(loss.shape(), shape, "loss buffer shape {:?}", loss.shape());
    assert_eq!(
        delta_raw.shape(),
        shape,
        "delta_raw buffer shape {:?}",
        delta_raw.shape()
    );
    assert_eq!(
        delta.shape(),
        shape,
        "delta buffer shape {:?}",
        delta.shape()
    );

    let entries = pred
        .as_slice()
        .iter()
        .zip(targets.as_slice())
        .zip(loss.as_mut_slice())
        .zip(delta_raw.as_mut_slice())
        .zip(delta.as_mut_slice());

    for ((((&p, &y), l), dr), d) in entries {
        *l = cross_entropy(p, y);
        *dr = residual(p, y);
        *d = weighted_delta(p, *dr);
    }
}
