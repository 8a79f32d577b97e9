//! Fixed-pattern contractions between the inverse matrix, the data vector and
//! the covariance tensors.
//!
//! Index conventions (AI = A⁻¹, N the order of A):
//!
//! ```text
//! cov_AI[a,b,c,d] = Σ_{i,j,k,l} AI[i,a]·AI[j,b]·AI[k,c]·AI[l,d]·covA[i,j,k,l]
//! cov_x_p1[i,j]   = Σ_{a,b}     d[a]·d[b]·cov_AI[i,a,j,b]
//! cov_x_p2[i,j]   = Σ_{k,l}     AI[i,k]·AI[j,l]·covd[k,l]
//! ```
//!
//! AI enters cov_AI through its first index on every axis; the Lefebvre et al.
//! form AI[a,i]·AI[j,b]·AI[c,k]·AI[l,d] agrees only for a symmetric AI.
//!
//! The first one is evaluated as four successive single-index contractions,
//! O(N⁵) each, instead of the O(N⁸) direct sum.
use itertools::iproduct;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, Array4, Axis};

/// Covariance tensor of AI's entries.
pub(crate) fn inverse_covariance(ai: &DMatrix<f64>, cov_a: &Array4<f64>) -> Array4<f64> {
    (0..4).fold(cov_a.to_owned(), |tensor, axis| {
        mode_product(&tensor, ai, Axis(axis))
    })
}

/// out[.., a, ..] = Σ_i m[i,a]·t[.., i, ..] along `axis`.
fn mode_product(t: &Array4<f64>, m: &DMatrix<f64>, axis: Axis) -> Array4<f64> {
    let mut shape = t.raw_dim();
    shape[axis.index()] = m.ncols();
    let mut out = Array4::<f64>::zeros(shape);
    for a in 0..m.ncols() {
        let mut out_slice = out.index_axis_mut(axis, a);
        for i in 0..m.nrows() {
            out_slice.scaled_add(m[(i, a)], &t.index_axis(axis, i));
        }
    }
    out
}

/// Contribution of AI's uncertainty to cov(x), weighted by the data vector.
pub(crate) fn weighted_pair_contraction(cov_ai: &Array4<f64>, d: &DVector<f64>) -> DMatrix<f64> {
    let n = d.len();
    // w[a,b] = d[a]·d[b]
    let weights = Array2::from_shape_fn((n, n), |(a, b)| d[a] * d[b]);
    DMatrix::from_fn(n, n, |i, j| {
        iproduct!(0..n, 0..n)
            .map(|(a, b)| weights[[a, b]] * cov_ai[[i, a, j, b]])
            .sum::<f64>()
    })
}

/// Contribution of d's uncertainty to cov(x): AI·covd·AIᵗ.
pub(crate) fn sandwich(ai: &DMatrix<f64>, cov_d: &DMatrix<f64>) -> DMatrix<f64> {
    ai * cov_d * ai.transpose()
}
