use crate::fit::FitError;
use crate::math::MathError;
use crate::models::PredictError;

/// Exit code for invalid input files or flags.
pub const EXIT_INPUT: u8 = 2;
/// Exit code when no usable observations remain.
pub const EXIT_NO_DATA: u8 = 3;
/// Exit code for numeric failures surfaced by strict mode.
pub const EXIT_NUMERIC: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match err {
            FitError::InsufficientData { .. } => EXIT_NO_DATA,
            FitError::Singular { .. } | FitError::Numeric(_) => EXIT_NUMERIC,
        };
        AppError::new(code, format!("Training failed: {err}"))
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        AppError::new(EXIT_NUMERIC, format!("Prediction failed: {err}"))
    }
}

impl From<MathError> for AppError {
    fn from(err: MathError) -> Self {
        AppError::new(EXIT_NUMERIC, format!("Matrix error: {err}"))
    }
}
