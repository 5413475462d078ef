//! Continuous state-space model of the planar car
//!
//! The car is a point mass with decoupled double-integrator dynamics on
//! each axis: position derivative is velocity, velocity derivative is the
//! commanded acceleration. State layout `[x, vx, y, vy]`, input `[ax, ay]`.

use nalgebra::{Matrix2, Matrix4, Matrix4x2, Vector2, Vector4};

/// Continuous-time model matrices (A, B, C, D).
///
/// A and B encode exactly the decoupled double integrators and must not be
/// altered without re-deriving the discretization. C is identity (full
/// state observation) and D is zero (no feedthrough); both are carried
/// through unchanged and unused by the control law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarModel {
    pub a: Matrix4<f64>,
    pub b: Matrix4x2<f64>,
    pub c: Matrix4<f64>,
    pub d: Matrix4x2<f64>,
}

impl CarModel {
    /// Build the model matrices. Constant data, no inputs, no failure modes.
    pub fn new() -> Self {
        let a = Matrix4::new(
            0.0, 1.0, 0.0, 0.0, // x  -> vx
            0.0, 0.0, 0.0, 0.0, // vx -> ax
            0.0, 0.0, 0.0, 1.0, // y  -> vy
            0.0, 0.0, 0.0, 0.0, // vy -> ay
        );

        let b = Matrix4x2::new(
            0.0, 0.0, // x
            1.0, 0.0, // vx
            0.0, 0.0, // y
            0.0, 1.0, // vy
        );

        CarModel {
            a,
            b,
            c: Matrix4::identity(),
            d: Matrix4x2::zeros(),
        }
    }
}

impl Default for CarModel {
    fn default() -> Self {
        Self::new()
    }
}

/// LQR cost weights: diagonal state penalty Q (4x4) and control effort
/// penalty R (2x2). Both must be positive definite for the Riccati solve
/// to be well posed; that precondition is checked at controller
/// construction, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LqrWeights {
    pub q: Matrix4<f64>,
    pub r: Matrix2<f64>,
}

impl LqrWeights {
    pub fn new(q_diag: [f64; 4], r_diag: [f64; 2]) -> Self {
        LqrWeights {
            q: Matrix4::from_diagonal(&Vector4::from(q_diag)),
            r: Matrix2::from_diagonal(&Vector2::from(r_diag)),
        }
    }

    /// Reference configuration: unit weight on every state and input channel
    pub fn identity() -> Self {
        Self::new([1.0; 4], [1.0; 2])
    }
}

impl Default for LqrWeights {
    fn default() -> Self {
        Self::identity()
    }
}
