//! Matrix products used by the forward pass and the weight gradient.
//!
//! Both products go through one strided GEMM kernel:
//! - default: a plain triple loop
//! - optional: the `matrixmultiply` backend (feature `matrixmultiply`)

use crate::Matrix;

/// `out = alpha * a * b^T`, where `a` is `(m, k)`, `b` is `(n, k)` and `out` is `(m, n)`.
///
/// Used for the affine scores `X * W^T`.
pub(crate) fn matmul_a_bt(alpha: f32, a: &Matrix, b: &Matrix, out: &mut Matrix) {
    let (m, k) = a.shape();
    let n = b.rows();
    assert_eq!(
        b.cols(),
        k,
        "inner dimensions differ: a is {:?}, b is {:?}",
        a.shape(),
        b.shape()
    );
    assert_eq!(
        out.shape(),
        (m, n),
        "output is {:?}, expected ({m}, {n})",
        out.shape()
    );
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        out.as_mut_slice().fill(0.0);
        return;
    }

    // b^T[p][j] = b[j][p] lives at j * k + p.
    gemm_f32(
        m,
        n,
        k,
        alpha,
        a.as_slice(),
        k,
        1,
        b.as_slice(),
        1,
        k,
        out.as_mut_slice(),
        n,
        1,
    );
}

/// `out = alpha * a^T * b`, where `a` is `(k, m)`, `b` is `(k, n)` and `out` is `(m, n)`.
///
/// Used for the weight gradient `delta^T * X`.
pub(crate) fn matmul_at_b(alpha: f32, a: &Matrix, b: &Matrix, out: &mut Matrix) {
    let (k, m) = a.shape();
    let n = b.cols();
    assert_eq!(
        b.rows(),
        k,
        "inner dimensions differ: a is {:?}, b is {:?}",
        a.shape(),
        b.shape()
    );
    assert_eq!(
        out.shape(),
        (m, n),
        "output is {:?}, expected ({m}, {n})",
        out.shape()
    );
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        out.as_mut_slice().fill(0.0);
        return;
    }

    // a^T[i][p] = a[p][i] lives at p * m + i.
    gemm_f32(
        m,
        n,
        k,
        alpha,
        a.as_slice(),
        1,
        m,
        b.as_slice(),
        n,
        1,
        out.as_mut_slice(),
        n,
        1,
    );
}

/// `c = alpha * a * b` with arbitrary strides; `c` is overwritten.
#[allow(clippy::too_many_arguments)]
#[inline]
fn gemm_f32(
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    rsa: usize,
    csa: usize,
    b: &[f32],
    rsb: usize,
    csb: usize,
    c: &mut [f32],
    rsc: usize,
    csc: usize,
) {
    debug_assert!(m > 0 && n > 0 && k > 0);
    debug_assert!(a.len() >= (m - 1) * rsa + (k - 1) * csa + 1);
    debug_assert!(b.len() >= (k - 1) * rsb + (n - 1) * csb + 1);
    debug_assert!(c.len() >= (m - 1) * rsc + (n - 1) * csc + 1);

    #[cfg(feature = "matrixmultiply")]
    {
        // SAFETY: the wrappers above check every shape and the debug asserts bound the
        // strided extents, so all pointer offsets stay inside the slices.
        unsafe {
            matrixmultiply::sgemm(
                m,
                k,
                n,
                alpha,
                a.as_ptr(),
                rsa as isize,
                csa as isize,
                b.as_ptr(),
                rsb as isize,
                csb as isize,
                0.0,
                c.as_mut_ptr(),
                rsc as isize,
                csc as isize,
            );
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0_f32;
            let a0 = i * rsa;
            let b0 = j * csb;

            for p in 0..k {
                acc += a[a0 + p * csa] * b[p * rsb + b0];
            }

            c[i * rsc + j * csc] = alpha * acc;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_times_b_transposed() {
        // a: 2x3, b: 2x3 -> a * b^T: 2x2
        let a = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let b = Matrix::from_rows(&[vec![1.0, 0.0, -1.0], vec![0.5, 0.5, 0.5]]).unwrap();
        let mut out = Matrix::zeros(2, 2);
        matmul_a_bt(1.0, &a, &b, &mut out);
        assert_eq!(out.as_slice(), &[-2.0, 3.0, -2.0, 7.5]);
    }

    #[test]
    fn a_transposed_times_b_with_scale() {
        // a: 2x2, b: 2x3 -> a^T * b: 2x3
        let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(&[vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 1.0]]).unwrap();
        let mut out = Matrix::filled(2, 3, 99.0);
        matmul_at_b(0.5, &a, &b, &mut out);
        assert_eq!(out.as_slice(), &[0.5, 1.5, 2.5, 1.0, 2.0, 4.0]);
    }

    #[test]
    #[should_panic]
    fn inner_dimension_mismatch_panics() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 4);
        let mut out = Matrix::zeros(2, 2);
        matmul_a_bt(1.0, &a, &b, &mut out);
    }
}
