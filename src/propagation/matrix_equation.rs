//! # Matrix equation with uncertainties
//!
//! Solves x = A⁻¹·d when both A and d carry known covariance and propagates
//! both uncertainties to x to first order (Lefebvre et al., 2000).
//!
//! Inputs:
//! - `A`    : N×N matrix, square and invertible
//! - `d`    : data vector of length N
//! - `covA` : N×N×N×N tensor, covA[i,j,k,l] = Cov(A[i,j], A[k,l])
//! - `covd` : N×N covariance matrix of d
//!
//! The inverse AI is computed at construction. `solve()` computes
//!
//! ```text
//! x        = AI·d
//! cov_AI   = covA contracted with AI on each of its four indices
//! cov_x_p1 = Σ d[a]·d[b]·cov_AI[i,a,j,b]      (uncertainty of AI)
//! cov_x_p2 = AI·covd·AIᵗ                       (uncertainty of d)
//! cov_x    = cov_x_p1 + cov_x_p2
//! ```
//!
//! and caches everything on the instance; later calls return the cached
//! values. The cache is a `OnceCell`, so an instance cannot be shared between
//! threads; use one instance per thread.
//!
//! # Example
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use ndarray::Array4;
//! use properror::propagation::matrix_equation::MatrixEquation;
//!
//! let n = 3;
//! let equation = MatrixEquation::new(
//!     DMatrix::identity(n, n),
//!     DVector::from_vec(vec![0.0, 1.0, 2.0]),
//!     Array4::zeros((n, n, n, n)),
//!     DMatrix::identity(n, n),
//! )
//! .unwrap();
//! let (x, cov_x) = equation.solve();
//! assert_eq!(x, equation.d());
//! assert_eq!(cov_x, &DMatrix::<f64>::identity(n, n));
//! ```
use crate::Utils::logger::init_logger;
use crate::propagation::errors::PropagationError;
use crate::propagation::settings::SolverSettings;
use crate::propagation::tensor_contraction::{
    inverse_covariance, sandwich, weighted_pair_contraction,
};
use crate::propagation::uncertain_value::UncertainValue;
use itertools::iproduct;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use ndarray::Array4;
use std::cell::OnceCell;
use std::time::Instant;

/// Everything `solve()` derives, kept for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixEquationSolution {
    pub x: DVector<f64>,
    pub cov_ai: Array4<f64>,
    pub cov_x_p1: DMatrix<f64>,
    pub cov_x_p2: DMatrix<f64>,
    pub cov_x: DMatrix<f64>,
}

#[derive(Debug, Clone)]
pub struct MatrixEquation {
    a: DMatrix<f64>,
    d: DVector<f64>,
    cov_a: Array4<f64>,
    cov_d: DMatrix<f64>,
    ai: DMatrix<f64>,
    settings: SolverSettings,
    solution: OnceCell<MatrixEquationSolution>,
}

impl MatrixEquation {
    /// Validates the shapes and inverts A with default settings.
    ///
    /// Fails with `DimensionMismatch` before any linear algebra is attempted
    /// and with `SingularMatrix` if A is numerically rank deficient or has no
    /// inverse.
    pub fn new(
        a: DMatrix<f64>,
        d: DVector<f64>,
        cov_a: Array4<f64>,
        cov_d: DMatrix<f64>,
    ) -> Result<Self, PropagationError> {
        Self::with_settings(a, d, cov_a, cov_d, SolverSettings::default())
    }

    pub fn with_settings(
        a: DMatrix<f64>,
        d: DVector<f64>,
        cov_a: Array4<f64>,
        cov_d: DMatrix<f64>,
        settings: SolverSettings,
    ) -> Result<Self, PropagationError> {
        if let Some(level) = settings.level_filter() {
            init_logger(level);
        }
        validate_dimensions(&a, &d, &cov_a, &cov_d)?;
        let n = a.nrows();
        info!("matrix equation of order {}", n);
        if settings.check_symmetry {
            validate_symmetry(&cov_a, &cov_d, settings.symmetry_tolerance)?;
            debug!("covariance symmetry check passed");
        }
        let ai = invert(&a, settings.singularity_tolerance)?;
        debug!("A inverted");
        Ok(Self {
            a,
            d,
            cov_a,
            cov_d,
            ai,
            settings,
            solution: OnceCell::new(),
        })
    }

    /// Solves the equation and returns (x, cov_x).
    ///
    /// The first call does the tensor work; later calls return the cached
    /// result unchanged.
    pub fn solve(&self) -> (&DVector<f64>, &DMatrix<f64>) {
        let solution = self.solution();
        (&solution.x, &solution.cov_x)
    }

    /// Full set of derived quantities, computing them on first use.
    pub fn solution(&self) -> &MatrixEquationSolution {
        if let Some(solution) = self.solution.get() {
            debug!("returning cached solution");
            return solution;
        }
        self.solution.get_or_init(|| self.compute_solution())
    }

    fn compute_solution(&self) -> MatrixEquationSolution {
        let n = self.order();
        let start = Instant::now();
        let x = &self.ai * &self.d;

        let cov_ai = inverse_covariance(&self.ai, &self.cov_a);
        debug!("cov_AI computed in {:?}", start.elapsed());

        let cov_x_p1 = weighted_pair_contraction(&cov_ai, &self.d);
        let cov_x_p2 = sandwich(&self.ai, &self.cov_d);
        let cov_x = &cov_x_p1 + &cov_x_p2;
        info!("solved order {} equation in {:?}", n, start.elapsed());

        MatrixEquationSolution {
            x,
            cov_ai,
            cov_x_p1,
            cov_x_p2,
            cov_x,
        }
    }

    /// One (x[i], sqrt(cov_x[i,i])) pair per solution entry.
    pub fn solution_uncertainties(&self) -> Vec<UncertainValue> {
        let solution = self.solution();
        UncertainValue::from_diagonal(&solution.x, &solution.cov_x)
    }

    /// Correlation matrix of x. Entries involving a zero-variance component are 0.
    pub fn correlation(&self) -> DMatrix<f64> {
        let cov_x = &self.solution().cov_x;
        let n = self.order();
        DMatrix::from_fn(n, n, |i, j| {
            let scale = (cov_x[(i, i)] * cov_x[(j, j)]).sqrt();
            if scale > 0.0 { cov_x[(i, j)] / scale } else { 0.0 }
        })
    }

    pub fn is_solved(&self) -> bool {
        self.solution.get().is_some()
    }

    /// N, the order of A.
    pub fn order(&self) -> usize {
        self.a.nrows()
    }

    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    pub fn d(&self) -> &DVector<f64> {
        &self.d
    }

    pub fn cov_a(&self) -> &Array4<f64> {
        &self.cov_a
    }

    pub fn cov_d(&self) -> &DMatrix<f64> {
        &self.cov_d
    }

    pub fn inverse(&self) -> &DMatrix<f64> {
        &self.ai
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn x(&self) -> Option<&DVector<f64>> {
        self.solution.get().map(|s| &s.x)
    }

    pub fn cov_ai(&self) -> Option<&Array4<f64>> {
        self.solution.get().map(|s| &s.cov_ai)
    }

    pub fn cov_x_p1(&self) -> Option<&DMatrix<f64>> {
        self.solution.get().map(|s| &s.cov_x_p1)
    }

    pub fn cov_x_p2(&self) -> Option<&DMatrix<f64>> {
        self.solution.get().map(|s| &s.cov_x_p2)
    }

    pub fn cov_x(&self) -> Option<&DMatrix<f64>> {
        self.solution.get().map(|s| &s.cov_x)
    }
}

//////////////////////////////////VALIDATION/////////////////////////////////

fn validate_dimensions(
    a: &DMatrix<f64>,
    d: &DVector<f64>,
    cov_a: &Array4<f64>,
    cov_d: &DMatrix<f64>,
) -> Result<(), PropagationError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(PropagationError::dimension_mismatch(
            "A",
            &[n, n],
            &[a.nrows(), a.ncols()],
        ));
    }
    if d.len() != n {
        return Err(PropagationError::dimension_mismatch("d", &[n], &[d.len()]));
    }
    if cov_a.shape() != [n, n, n, n].as_slice() {
        return Err(PropagationError::dimension_mismatch(
            "covA",
            &[n, n, n, n],
            cov_a.shape(),
        ));
    }
    if cov_d.shape() != (n, n) {
        return Err(PropagationError::dimension_mismatch(
            "covd",
            &[n, n],
            &[cov_d.nrows(), cov_d.ncols()],
        ));
    }
    Ok(())
}

/// Pair exchange covA[i,j,k,l] = covA[k,l,i,j] and covd[i,j] = covd[j,i].
///
/// Intra-pair exchange covA[i,j,k,l] = covA[j,i,l,k] only holds for a
/// symmetric A and is not required here.
fn validate_symmetry(
    cov_a: &Array4<f64>,
    cov_d: &DMatrix<f64>,
    tolerance: f64,
) -> Result<(), PropagationError> {
    let n = cov_d.nrows();
    for (i, j, k, l) in iproduct!(0..n, 0..n, 0..n, 0..n) {
        let difference = (cov_a[[i, j, k, l]] - cov_a[[k, l, i, j]]).abs();
        if !(difference <= tolerance) {
            return Err(PropagationError::AsymmetricCovariance {
                what: "covA".to_string(),
                index: vec![i, j, k, l],
                difference,
            });
        }
    }
    for (i, j) in iproduct!(0..n, 0..n) {
        let difference = (cov_d[(i, j)] - cov_d[(j, i)]).abs();
        if !(difference <= tolerance) {
            return Err(PropagationError::AsymmetricCovariance {
                what: "covd".to_string(),
                index: vec![i, j],
                difference,
            });
        }
    }
    Ok(())
}

/// Inverts A, rejecting it as singular when
/// - it has a non-finite entry,
/// - its numerical rank is below N: singular values not exceeding
///   N·ε·σ_max count as zero,
/// - `singularity_tolerance > 0` and |det(A)| <= singularity_tolerance,
/// - the inversion fails or yields non-finite entries.
fn invert(a: &DMatrix<f64>, singularity_tolerance: f64) -> Result<DMatrix<f64>, PropagationError> {
    let n = a.nrows();
    if a.iter().any(|v| !v.is_finite()) {
        warn!("A has non-finite entries");
        return Err(PropagationError::SingularMatrix(
            "A has non-finite entries".to_string(),
        ));
    }
    if n > 0 {
        let rank = numerical_rank(a);
        if rank < n {
            warn!("Matrix is singular. Rank = {} of {}", rank, n);
            return Err(PropagationError::SingularMatrix(format!(
                "numerical rank of A is {} for order {}",
                rank, n
            )));
        }
    }
    if singularity_tolerance > 0.0 {
        let det = a.determinant();
        if det.abs() <= singularity_tolerance {
            warn!("Matrix is singular. Determinant = {:.8}", det);
            return Err(PropagationError::SingularMatrix(format!(
                "|det(A)| = {:e} does not exceed tolerance {:e}",
                det.abs(),
                singularity_tolerance
            )));
        }
    }
    let ai = a.clone().try_inverse().ok_or_else(|| {
        warn!("A has no inverse");
        PropagationError::SingularMatrix("inversion of A failed".to_string())
    })?;
    if ai.iter().any(|v| !v.is_finite()) {
        warn!("inverse of A has non-finite entries");
        return Err(PropagationError::SingularMatrix(
            "inverse of A has non-finite entries".to_string(),
        ));
    }
    Ok(ai)
}

/// Number of singular values above N·ε·σ_max.
fn numerical_rank(a: &DMatrix<f64>) -> usize {
    let singular_values = a.singular_values();
    let sigma_max = singular_values.iter().cloned().fold(0.0, f64::max);
    let threshold = a.nrows().max(a.ncols()) as f64 * f64::EPSILON * sigma_max;
    let rank = singular_values.iter().filter(|&&s| s > threshold).count();
    debug!("singular values of A: max {:e}, rank {}", sigma_max, rank);
    rank
}
