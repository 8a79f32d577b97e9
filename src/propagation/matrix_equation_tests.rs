#[cfg(test)]
mod tests {
    use crate::propagation::errors::PropagationError;
    use crate::propagation::matrix_equation::MatrixEquation;
    use crate::propagation::settings::SolverSettings;
    use approx::{assert_relative_eq, relative_eq};
    use itertools::iproduct;
    use nalgebra::{DMatrix, DVector};
    use ndarray::Array4;

    fn zero_tensor(n: usize) -> Array4<f64> {
        Array4::zeros((n, n, n, n))
    }

    /// Independent entries of A with variance sigma2[i,j]:
    /// covA[i,j,k,l] = sigma2[i,j] if (i,j) == (k,l), else 0.
    fn independent_entries(sigma2: &DMatrix<f64>) -> Array4<f64> {
        let n = sigma2.nrows();
        Array4::from_shape_fn((n, n, n, n), |(i, j, k, l)| {
            if i == k && j == l { sigma2[(i, j)] } else { 0.0 }
        })
    }

    fn non_symmetric_system() -> MatrixEquation {
        let a = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.5, -1.0, 3.0, 0.2, 0.3, 0.7, 2.0]);
        let d = DVector::from_vec(vec![1.0, -2.0, 0.5]);
        let sigma2 = DMatrix::from_fn(3, 3, |i, j| 0.01 * (1 + i + 2 * j) as f64);
        let cov_d = DMatrix::from_row_slice(3, 3, &[0.2, 0.05, 0.0, 0.05, 0.1, 0.02, 0.0, 0.02, 0.3]);
        MatrixEquation::new(a, d, independent_entries(&sigma2), cov_d).unwrap()
    }

    #[test]
    fn test_identity_case() {
        // the scaling study of the reference suite: A = I, covA = 0, covd = I
        for n in 2..12 {
            let d = DVector::from_fn(n, |i, _| i as f64);
            let equation = MatrixEquation::new(
                DMatrix::identity(n, n),
                d.clone(),
                zero_tensor(n),
                DMatrix::identity(n, n),
            )
            .unwrap();
            let (x, cov_x) = equation.solve();
            assert_relative_eq!(x, &d, epsilon = 1e-14);
            assert_relative_eq!(cov_x, &DMatrix::identity(n, n), epsilon = 1e-14);
        }
    }

    #[test]
    fn test_solve_is_cached_and_idempotent() {
        let equation = non_symmetric_system();
        assert!(!equation.is_solved());
        assert!(equation.cov_x().is_none());
        let (x1, cov1) = {
            let (x, cov) = equation.solve();
            (x.clone(), cov.clone())
        };
        assert!(equation.is_solved());
        let (x2, cov2) = equation.solve();
        assert_eq!(&x1, x2);
        assert_eq!(&cov1, cov2);
        // the same allocation is handed out again
        assert!(std::ptr::eq(equation.solve().1, equation.cov_x().unwrap()));
    }

    #[test]
    fn test_additive_decomposition() {
        let equation = non_symmetric_system();
        equation.solve();
        let p1 = equation.cov_x_p1().unwrap();
        let p2 = equation.cov_x_p2().unwrap();
        let cov_x = equation.cov_x().unwrap();
        for (i, j) in iproduct!(0..3, 0..3) {
            assert_eq!(cov_x[(i, j)], p1[(i, j)] + p2[(i, j)]);
        }
        // both contributions are present for this system
        assert!(p1.norm() > 0.0);
        assert!(p2.norm() > 0.0);
    }

    #[test]
    fn test_zero_cov_a_reduces_to_sandwich() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let cov_d = DMatrix::from_row_slice(2, 2, &[0.5, 0.1, 0.1, 0.2]);
        let equation = MatrixEquation::new(
            a.clone(),
            DVector::from_vec(vec![1.0, 2.0]),
            zero_tensor(2),
            cov_d.clone(),
        )
        .unwrap();
        let (_, cov_x) = equation.solve();
        assert_eq!(equation.cov_x_p1().unwrap(), &DMatrix::zeros(2, 2));
        let ai = a.try_inverse().unwrap();
        let expected = &ai * &cov_d * ai.transpose();
        assert_relative_eq!(cov_x, &expected, epsilon = 1e-14);
    }

    #[test]
    fn test_cov_x_is_symmetric() {
        let equation = non_symmetric_system();
        let (_, cov_x) = equation.solve();
        for (i, j) in iproduct!(0..3, 0..3) {
            assert!(relative_eq!(cov_x[(i, j)], cov_x[(j, i)], epsilon = 1e-14));
        }
    }

    #[test]
    fn test_scalar_case_matches_first_order_formula() {
        // x = d/a: var(x) = d²·var(a)/a⁴ + var(d)/a²
        let (a, d, var_a, var_d) = (2.0, 3.0, 0.04, 0.09);
        let mut cov_a = zero_tensor(1);
        cov_a[[0, 0, 0, 0]] = var_a;
        let equation = MatrixEquation::new(
            DMatrix::from_element(1, 1, a),
            DVector::from_element(1, d),
            cov_a,
            DMatrix::from_element(1, 1, var_d),
        )
        .unwrap();
        let (x, cov_x) = equation.solve();
        assert_relative_eq!(x[0], d / a, epsilon = 1e-15);
        let expected = d * d * var_a / a.powi(4) + var_d / (a * a);
        assert_relative_eq!(cov_x[(0, 0)], expected, epsilon = 1e-15);
        let values = equation.solution_uncertainties();
        assert_relative_eq!(values[0].std_dev(), expected.sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_diagonal_matrix_with_uncertain_entries() {
        // A = diag(a0, a1): x_i = d_i / a_i, independent components
        let a = DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, 4.0]));
        let d = DVector::from_vec(vec![1.0, 8.0]);
        let sigma2 = DMatrix::from_row_slice(2, 2, &[0.01, 0.0, 0.0, 0.04]);
        let cov_d = DMatrix::from_diagonal(&DVector::from_vec(vec![0.25, 1.0]));
        let equation = MatrixEquation::new(a, d, independent_entries(&sigma2), cov_d).unwrap();
        let (x, cov_x) = equation.solve();
        assert_relative_eq!(x[0], 0.5);
        assert_relative_eq!(x[1], 2.0);
        assert_relative_eq!(cov_x[(0, 0)], 1.0 * 0.01 / 16.0 + 0.25 / 4.0, epsilon = 1e-15);
        assert_relative_eq!(cov_x[(1, 1)], 64.0 * 0.04 / 256.0 + 1.0 / 16.0, epsilon = 1e-15);
        assert_relative_eq!(cov_x[(0, 1)], 0.0);
        let corr = equation.correlation();
        assert_relative_eq!(corr[(0, 0)], 1.0, epsilon = 1e-15);
        assert_relative_eq!(corr[(0, 1)], 0.0);
    }

    #[test]
    fn test_singular_matrix_is_rejected() {
        let result = MatrixEquation::new(
            DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]),
            DVector::from_vec(vec![1.0, 2.0]),
            zero_tensor(2),
            DMatrix::identity(2, 2),
        );
        match result {
            Err(PropagationError::SingularMatrix(_)) => {}
            other => panic!("expected SingularMatrix, got {:?}", other),
        }
    }

    /// Last row = 0.1·row0 + 0.7·row1, so rank N-1 without an exact zero pivot.
    fn rank_deficient(n: usize) -> DMatrix<f64> {
        let mut a = DMatrix::from_fn(n, n, |i, j| {
            if i == j { 4.0 + i as f64 } else { ((i * 5 + j * 3) % 7) as f64 / 7.0 - 0.3 }
        });
        let dependent = a.row(0) * 0.1 + a.row(1) * 0.7;
        a.set_row(n - 1, &dependent);
        a
    }

    #[test]
    fn test_rank_deficient_matrix_is_rejected_by_default() {
        for n in [3, 5] {
            let result = MatrixEquation::new(
                rank_deficient(n),
                DVector::from_element(n, 1.0),
                zero_tensor(n),
                DMatrix::identity(n, n),
            );
            match result {
                Err(PropagationError::SingularMatrix(_)) => {}
                other => panic!("expected SingularMatrix for n = {}, got {:?}", n, other),
            }
        }
    }

    #[test]
    fn test_rank_check_is_scale_invariant() {
        // tiny but well conditioned: accepted whatever its determinant
        let n = 4;
        let a = DMatrix::<f64>::identity(n, n) * 1e-6;
        let equation = MatrixEquation::new(
            a,
            DVector::from_element(n, 1e-6),
            zero_tensor(n),
            DMatrix::identity(n, n),
        )
        .unwrap();
        let (x, _) = equation.solve();
        assert_relative_eq!(x, &DVector::from_element(n, 1.0), epsilon = 1e-9);
        // the rank-deficient matrix stays singular after scaling
        let scaled = rank_deficient(3) * 1e8;
        let result = MatrixEquation::new(
            scaled,
            DVector::from_element(3, 1.0),
            zero_tensor(3),
            DMatrix::identity(3, 3),
        );
        assert!(matches!(result, Err(PropagationError::SingularMatrix(_))));
    }

    #[test]
    fn test_non_finite_entries_are_rejected() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, f64::NAN, 0.0, 1.0]);
        let result = MatrixEquation::new(a, DVector::zeros(2), zero_tensor(2), DMatrix::identity(2, 2));
        assert!(matches!(result, Err(PropagationError::SingularMatrix(_))));
    }

    #[test]
    fn test_singularity_tolerance_rejects_nearly_singular() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0 + 1e-12]);
        let build = |settings: SolverSettings| {
            MatrixEquation::with_settings(
                a.clone(),
                DVector::from_vec(vec![1.0, 2.0]),
                zero_tensor(2),
                DMatrix::identity(2, 2),
                settings,
            )
        };
        assert!(build(SolverSettings::default()).is_ok());
        let strict = SolverSettings::new().set_singularity_tolerance(1e-9);
        assert!(matches!(build(strict), Err(PropagationError::SingularMatrix(_))));
    }

    #[test]
    fn test_dimension_checks() {
        let a3 = DMatrix::<f64>::identity(3, 3);
        let d3 = DVector::<f64>::zeros(3);
        let cases = vec![
            (DMatrix::zeros(2, 3), d3.clone(), zero_tensor(3), DMatrix::identity(3, 3), "A"),
            (a3.clone(), DVector::zeros(2), zero_tensor(3), DMatrix::identity(3, 3), "d"),
            (a3.clone(), d3.clone(), zero_tensor(2), DMatrix::identity(3, 3), "covA"),
            (a3.clone(), d3.clone(), zero_tensor(3), DMatrix::identity(3, 2), "covd"),
        ];
        for (a, d, cov_a, cov_d, name) in cases {
            match MatrixEquation::new(a, d, cov_a, cov_d) {
                Err(PropagationError::DimensionMismatch { what, .. }) => assert_eq!(what, name),
                other => panic!("expected DimensionMismatch for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_dimension_check_precedes_inversion() {
        // singular A and wrong covA shape: the shape error wins
        let result = MatrixEquation::new(
            DMatrix::zeros(3, 3),
            DVector::zeros(3),
            zero_tensor(2),
            DMatrix::identity(3, 3),
        );
        match result {
            Err(PropagationError::DimensionMismatch { what, expected, found }) => {
                assert_eq!(what, "covA");
                assert_eq!(expected, vec![3, 3, 3, 3]);
                assert_eq!(found, vec![2, 2, 2, 2]);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_optional_symmetry_validation() {
        let mut cov_a = zero_tensor(2);
        cov_a[[0, 1, 1, 0]] = 0.1;
        let build = |settings: SolverSettings, cov_a: Array4<f64>| {
            MatrixEquation::with_settings(
                DMatrix::identity(2, 2),
                DVector::from_vec(vec![1.0, 1.0]),
                cov_a,
                DMatrix::identity(2, 2),
                settings,
            )
        };
        // unchecked by default
        assert!(build(SolverSettings::default(), cov_a.clone()).is_ok());
        let checked = SolverSettings::new().set_symmetry_check(true, 1e-12);
        match build(checked.clone(), cov_a.clone()) {
            Err(PropagationError::AsymmetricCovariance { what, .. }) => assert_eq!(what, "covA"),
            other => panic!("expected AsymmetricCovariance, got {:?}", other),
        }
        cov_a[[1, 0, 0, 1]] = 0.1;
        assert!(build(checked, cov_a).is_ok());
    }

    #[test]
    fn test_inverse_is_available_before_solve() {
        let equation = non_symmetric_system();
        let product = equation.a() * equation.inverse();
        assert_relative_eq!(product, DMatrix::identity(3, 3), epsilon = 1e-12);
        assert_eq!(equation.order(), 3);
        assert!(equation.cov_ai().is_none());
        equation.solve();
        assert_eq!(equation.cov_ai().unwrap().shape(), &[3, 3, 3, 3]);
        assert_eq!(equation.x().unwrap(), &(equation.inverse() * equation.d()));
    }
}
