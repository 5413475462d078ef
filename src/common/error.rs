//! Error types for car_lqr_sim

use std::fmt;

/// Main error type for the simulator
#[derive(Debug)]
pub enum SimError {
    /// Invalid configuration (non-positive-definite weights, bad sample period, ...)
    InvalidParameter(String),
    /// Numerical computation failed (Riccati divergence, singular matrix, ...)
    NumericalError(String),
    /// State or target vector of the wrong length
    DimensionMismatch(String),
    /// I/O error
    IoError(std::io::Error),
    /// Visualization error
    VisualizationError(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            SimError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            SimError::DimensionMismatch(msg) => write!(f, "Dimension mismatch: {}", msg),
            SimError::IoError(e) => write!(f, "I/O error: {}", e),
            SimError::VisualizationError(msg) => write!(f, "Visualization error: {}", msg),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::IoError(e)
    }
}

/// Result type alias for simulator operations
pub type SimResult<T> = Result<T, SimError>;
