//! Least-squares training.
//!
//! Given observations we build:
//! - the design matrix `X` (one encoded feature row per observation)
//! - the target vector `y` (quality rescaled to 0–1)
//!
//! and solve `β = (XᵗX)⁻¹Xᵗy`. The normal-equation path runs on
//! `crate::math` and follows the configured [`SingularPolicy`] when `XᵗX`
//! cannot be inverted; the SVD path delegates to nalgebra.
//!
//! Everything here returns `Result`. The fail-soft behavior (zero
//! coefficients instead of an error) lives one level up in
//! `models::RegressionModel::train`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::domain::{Observation, SingularPolicy, Solver};
use crate::math::{
    MathError, Matrix, inverse, multiply, multiply_vector, solve_least_squares, transpose,
};
use crate::models::{FEATURE_COUNT, design_matrix};

/// Training is skipped below this many observations.
pub const MIN_TRAINING_ROWS: usize = 10;

/// Quality scores are trained against a 0–1 target.
pub const TARGET_SCALE: f64 = 100.0;

/// One coefficient per feature position.
pub type Coefficients = [f64; FEATURE_COUNT];

/// Solver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FitOptions {
    pub solver: Solver,
    pub singular_policy: SingularPolicy,
}

/// How the coefficients were obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveKind {
    /// `XᵗX` inverted cleanly (or the SVD solve succeeded).
    Exact,
    /// `XᵗX` was singular and the identity stood in for its inverse.
    IdentityFallback,
    /// `XᵗX` was singular and `XᵗX + λI` was inverted instead.
    Regularized { lambda: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub coefficients: Coefficients,
    pub kind: SolveKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    InsufficientData { observations: usize, required: usize },
    /// `XᵗX` could not be inverted (strict mode only).
    Singular,
    Numeric(String),
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::InsufficientData {
                observations,
                required,
            } => write!(
                f,
                "need at least {required} observations to train, got {observations}"
            ),
            FitError::Singular => write!(f, "normal matrix XᵗX is singular"),
            FitError::Numeric(msg) => write!(f, "numeric failure: {msg}"),
        }
    }
}

impl std::error::Error for FitError {}

impl From<MathError> for FitError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Singular { .. } => FitError::Singular,
            other => FitError::Numeric(other.to_string()),
        }
    }
}

/// Fit coefficients, applying the configured singular policy.
pub fn fit(observations: &[Observation], opts: &FitOptions) -> Result<Fit, FitError> {
    check_row_count(observations)?;

    let x = design_matrix(observations)?;
    let y = targets(observations);

    match opts.solver {
        Solver::Normal => solve_normal(&x, &y, opts.singular_policy),
        Solver::Svd => solve_svd(&x, &y),
    }
}

/// Like [`fit`], but an identity fallback is reported as
/// [`FitError::Singular`] rather than accepted.
pub fn fit_strict(observations: &[Observation], opts: &FitOptions) -> Result<Fit, FitError> {
    let fit = fit(observations, opts)?;
    if fit.kind == SolveKind::IdentityFallback {
        return Err(FitError::Singular);
    }
    Ok(fit)
}

fn check_row_count(observations: &[Observation]) -> Result<(), FitError> {
    if observations.len() < MIN_TRAINING_ROWS {
        return Err(FitError::InsufficientData {
            observations: observations.len(),
            required: MIN_TRAINING_ROWS,
        });
    }
    Ok(())
}

fn targets(observations: &[Observation]) -> Vec<f64> {
    observations
        .iter()
        .map(|o| o.signal_quality / TARGET_SCALE)
        .collect()
}

fn solve_normal(x: &Matrix, y: &[f64], policy: SingularPolicy) -> Result<Fit, FitError> {
    let xt = transpose(x);
    let xtx = multiply(&xt, x)?;
    let (xtx_inv, kind) = invert_with_policy(&xtx, policy)?;
    let xty = multiply_vector(&xt, y)?;
    let beta = multiply_vector(&xtx_inv, &xty)?;

    debug!("normal-equation solve finished ({kind:?})");
    Ok(Fit {
        coefficients: to_coefficients(beta)?,
        kind,
    })
}

fn invert_with_policy(
    xtx: &Matrix,
    policy: SingularPolicy,
) -> Result<(Matrix, SolveKind), MathError> {
    let plain = inverse(xtx)?;
    if !plain.fallback {
        return Ok((plain.matrix, SolveKind::Exact));
    }

    match policy {
        SingularPolicy::Identity => Ok((plain.matrix, SolveKind::IdentityFallback)),
        SingularPolicy::Ridge { lambda } => {
            let ridged = inverse(&xtx.add_diagonal(lambda)?)?;
            if ridged.fallback {
                warn!("ridge λ={lambda:e} did not regularize XᵗX; keeping identity fallback");
                Ok((ridged.matrix, SolveKind::IdentityFallback))
            } else {
                Ok((ridged.matrix, SolveKind::Regularized { lambda }))
            }
        }
    }
}

fn solve_svd(x: &Matrix, y: &[f64]) -> Result<Fit, FitError> {
    let beta = solve_least_squares(x, y)
        .ok_or_else(|| FitError::Numeric("SVD least-squares solve failed".to_string()))?;
    Ok(Fit {
        coefficients: to_coefficients(beta)?,
        kind: SolveKind::Exact,
    })
}

fn to_coefficients(beta: Vec<f64>) -> Result<Coefficients, FitError> {
    let len = beta.len();
    let coefficients: Coefficients = beta.try_into().map_err(|_| {
        FitError::Numeric(format!(
            "expected {FEATURE_COUNT} coefficients, solver produced {len}"
        ))
    })?;
    if let Some(idx) = coefficients.iter().position(|c| !c.is_finite()) {
        return Err(FitError::Numeric(format!("coefficient {idx} is not finite")));
    }
    Ok(coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InstrumentReadings, NetworkType};
    use crate::models::encode_observation;

    const TRUE_BETA: Coefficients = [0.3, 0.2, 0.01, -0.004, 0.25, 0.1, -0.3];

    /// Observations whose quality is an exact linear function of the features.
    fn linear_sample(n: usize) -> Vec<Observation> {
        let nets = ["5G", "4G", "LTE", "3G"];
        (0..n)
            .map(|i| {
                let f = i as f64;
                let mut o = Observation {
                    timestamp: None,
                    locality: format!("L{i}"),
                    latitude: 12.9 + 0.013 * f + 0.002 * (f * f),
                    longitude: 77.5 + 0.05 * (f * 1.7).sin(),
                    signal_strength: -120.0 + 6.5 * f,
                    signal_quality: 0.0,
                    data_throughput: (f * 37.0) % 100.0,
                    latency: 10.0 + (f * 53.0) % 200.0,
                    network_type: NetworkType::from(nets[i % nets.len()]),
                    instruments: InstrumentReadings::default(),
                };
                let x = encode_observation(&o);
                let y: f64 = x.iter().zip(TRUE_BETA).map(|(a, b)| a * b).sum();
                o.signal_quality = y * TARGET_SCALE;
                o
            })
            .collect()
    }

    #[test]
    fn below_threshold_is_insufficient() {
        let err = fit(&linear_sample(9), &FitOptions::default()).unwrap_err();
        assert_eq!(
            err,
            FitError::InsufficientData {
                observations: 9,
                required: MIN_TRAINING_ROWS
            }
        );
    }

    #[test]
    fn normal_equation_recovers_exact_linear_relation() {
        let data = linear_sample(30);
        let fit = fit(&data, &FitOptions::default()).unwrap();
        assert_eq!(fit.kind, SolveKind::Exact);

        // Compare in prediction space; latitude/longitude are nearly collinear
        // with the intercept so individual coefficients are poorly conditioned.
        for o in &data {
            let x = encode_observation(o);
            let y: f64 = x.iter().zip(fit.coefficients).map(|(a, b)| a * b).sum();
            assert!(
                (y * TARGET_SCALE - o.signal_quality).abs() < 1e-2,
                "got {} expected {}",
                y * TARGET_SCALE,
                o.signal_quality
            );
        }
    }

    #[test]
    fn svd_agrees_with_normal_equation_in_prediction_space() {
        let data = linear_sample(25);
        let svd = fit(
            &data,
            &FitOptions {
                solver: Solver::Svd,
                ..Default::default()
            },
        )
        .unwrap();
        for o in &data {
            let x = encode_observation(o);
            let y: f64 = x.iter().zip(svd.coefficients).map(|(a, b)| a * b).sum();
            assert!((y * TARGET_SCALE - o.signal_quality).abs() < 1e-2);
        }
    }

    fn identical_rows(n: usize) -> Vec<Observation> {
        let mut data = linear_sample(1);
        data[0].signal_strength = -70.0;
        data[0].signal_quality = 80.0;
        data.into_iter().cycle().take(n).collect()
    }

    #[test]
    fn identical_rows_use_identity_fallback_and_strict_rejects() {
        let data = identical_rows(10);
        let fit = fit(&data, &FitOptions::default()).unwrap();
        assert_eq!(fit.kind, SolveKind::IdentityFallback);

        // With I standing in for the inverse, β = Xᵗy.
        let x = encode_observation(&data[0]);
        for (c, xi) in fit.coefficients.iter().zip(x) {
            assert!((c - 10.0 * 0.8 * xi).abs() < 1e-9);
        }

        assert_eq!(
            fit_strict(&data, &FitOptions::default()),
            Err(FitError::Singular)
        );
    }

    #[test]
    fn ridge_policy_regularizes_identical_rows() {
        let data = identical_rows(10);
        let opts = FitOptions {
            singular_policy: SingularPolicy::Ridge { lambda: 1e-3 },
            ..Default::default()
        };
        let fit = fit_strict(&data, &opts).unwrap();
        assert_eq!(fit.kind, SolveKind::Regularized { lambda: 1e-3 });

        let x = encode_observation(&data[0]);
        let y: f64 = x.iter().zip(fit.coefficients).map(|(a, b)| a * b).sum();
        assert!((y * TARGET_SCALE - 80.0).abs() < 5.0, "got {}", y * TARGET_SCALE);
    }

    #[test]
    fn coefficient_conversion_rejects_bad_vectors() {
        assert!(matches!(to_coefficients(vec![0.0; 3]), Err(FitError::Numeric(_))));
        let mut beta = vec![0.0; FEATURE_COUNT];
        beta[2] = f64::NAN;
        assert!(matches!(to_coefficients(beta), Err(FitError::Numeric(_))));
    }
}
