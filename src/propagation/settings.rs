use simplelog::LevelFilter;

/// Options for [`MatrixEquation`](crate::propagation::matrix_equation::MatrixEquation).
///
/// With the defaults A is rejected only by the numerical rank test
/// (singular values up to N·ε·σ_max count as zero), covariance inputs are
/// taken as given and no logger is installed.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    /// When positive, A is additionally treated as singular if
    /// |det(A)| <= this value.
    pub singularity_tolerance: f64,
    /// Validate the symmetries of covA and covd at construction.
    pub check_symmetry: bool,
    /// Absolute tolerance for the symmetry check.
    pub symmetry_tolerance: f64,
    /// "off"/"none", "debug", "info", "warn" or "error". `None` leaves the
    /// logger to the caller.
    pub loglevel: Option<String>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            singularity_tolerance: 0.0,
            check_symmetry: false,
            symmetry_tolerance: 1e-10,
            loglevel: None,
        }
    }
}

impl SolverSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_singularity_tolerance(mut self, tolerance: f64) -> Self {
        self.singularity_tolerance = tolerance;
        self
    }

    pub fn set_symmetry_check(mut self, enabled: bool, tolerance: f64) -> Self {
        self.check_symmetry = enabled;
        self.symmetry_tolerance = tolerance;
        self
    }

    pub fn set_loglevel(mut self, loglevel: &str) -> Self {
        self.loglevel = Some(loglevel.to_string());
        self
    }

    /// Level requested by `loglevel`; `None` when logging is switched off or
    /// was never requested.
    pub fn level_filter(&self) -> Option<LevelFilter> {
        let level = self.loglevel.as_deref()?;
        match level {
            "off" | "none" => None,
            "debug" => Some(LevelFilter::Debug),
            "info" => Some(LevelFilter::Info),
            "warn" => Some(LevelFilter::Warn),
            "error" => Some(LevelFilter::Error),
            _ => {
                log::warn!("unknown loglevel '{}', falling back to info", level);
                Some(LevelFilter::Info)
            }
        }
    }
}
