// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::propagation::jacobian_propagation::{compute_covariance, compute_uncertainties};
use crate::propagation::matrix_equation::MatrixEquation;
use crate::propagation::settings::SolverSettings;
use crate::symbolic::symbolic_engine::Expr;
use nalgebra::{DMatrix, DVector};
use ndarray::Array4;
use std::collections::HashMap;
use std::time::Instant;
use strum_macros::{Display, EnumIter};

#[derive(Debug, PartialEq, Eq, Clone, Copy, EnumIter, Display)]
pub enum PropagationExample {
    /// A = I, covA = 0, covd = I for N = 2..11, timed
    IdentityScaling,
    /// 2×2 system with correlated entries of A and correlated data
    CorrelatedSystem,
    /// a + b + sqrt(c) and sqrt(b + 2c) at a = 100, b = 200, c = 250, d = 500
    TwoFunctions,
}

impl PropagationExample {
    pub fn run(&self) {
        println!("\n______________ {} ______________", self);
        match self {
            PropagationExample::IdentityScaling => identity_scaling(),
            PropagationExample::CorrelatedSystem => correlated_system(),
            PropagationExample::TwoFunctions => two_functions(),
        }
    }
}

fn identity_scaling() {
    for n in 2..12 {
        let d = DVector::from_fn(n, |i, _| i as f64);
        let start = Instant::now();
        let equation = match MatrixEquation::new(
            DMatrix::identity(n, n),
            d,
            Array4::zeros((n, n, n, n)),
            DMatrix::identity(n, n),
        ) {
            Ok(equation) => equation,
            Err(e) => {
                println!("N = {}: {}", n, e);
                continue;
            }
        };
        let (x, cov_x) = equation.solve();
        let elapsed = start.elapsed();
        let max_deviation = (cov_x - DMatrix::<f64>::identity(n, n)).amax();
        println!(
            "N = {:2}  time = {:?}  |x - d| = {:e}  max |cov_x - I| = {:e}",
            n,
            elapsed,
            (x - equation.d()).amax(),
            max_deviation
        );
    }
}

fn correlated_system() {
    let a = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 0.5, 2.0]);
    let d = DVector::from_vec(vec![1.0, 4.0]);
    // entries of A with 1% spread, A[0,0] and A[1,1] fully correlated
    let sigma = DMatrix::from_fn(2, 2, |i, j| 0.01 * a[(i, j)]);
    let cov_a = Array4::from_shape_fn((2, 2, 2, 2), |(i, j, k, l)| {
        let same = i == k && j == l;
        let diagonal_pair = i == j && k == l;
        if same || diagonal_pair {
            sigma[(i, j)] * sigma[(k, l)]
        } else {
            0.0
        }
    });
    let cov_d = DMatrix::from_row_slice(2, 2, &[0.01, 0.005, 0.005, 0.04]);
    let settings = SolverSettings::new()
        .set_symmetry_check(true, 1e-12)
        .set_loglevel("info");
    match MatrixEquation::with_settings(a, d, cov_a, cov_d, settings) {
        Ok(equation) => {
            for (i, value) in equation.solution_uncertainties().iter().enumerate() {
                println!("x[{}] = {:.6}", i, value);
            }
            let solution = equation.solution();
            println!("cov_x_p1 (from A) = {}", solution.cov_x_p1);
            println!("cov_x_p2 (from d) = {}", solution.cov_x_p2);
            println!("correlation = {}", equation.correlation());
        }
        Err(e) => println!("{}", e),
    }
}

fn two_functions() {
    let functions = match Expr::parse_vector_expression(&["a + b + sqrt(c)", "sqrt(b + 2*c)"]) {
        Ok(functions) => functions,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };
    let variables = ["a", "b", "c", "d"];
    let point: HashMap<String, f64> = variables
        .iter()
        .zip([100.0, 200.0, 250.0, 500.0])
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    let covariance = DMatrix::identity(4, 4);
    match compute_uncertainties(&functions, &variables, &point, &covariance) {
        Ok(values) => {
            for (f, value) in functions.iter().zip(values.iter()) {
                println!("{} = {:.6}", f, value);
            }
        }
        Err(e) => println!("{}", e),
    }
    if let Ok(joint) = compute_covariance(&functions, &variables, &point, &covariance) {
        println!("joint covariance = {}", joint.covariance);
    }
}
