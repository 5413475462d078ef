//! LQR controller for the planar car
//!
//! All solving happens once at construction: the continuous model is
//! discretized by the exact zero-order-hold method and the continuous-time
//! algebraic Riccati equation is solved for the feedback gain. Every tick
//! after that is a handful of fixed-size matrix-vector products.

use nalgebra::{Matrix2, Matrix2x4, Matrix4, Matrix4x2, SMatrix, Vector2, Vector4};

use crate::common::{Acceleration, SimError, SimResult};
use crate::model::{CarModel, LqrWeights};

/// Pseudo-time step of the Riccati ODE iteration
const CARE_STEP: f64 = 0.01;
/// Residual tolerance for accepting the Riccati solution
const CARE_EPS: f64 = 1e-10;
const CARE_MAX_ITER: usize = 200_000;

/// Rank tolerance for the controllability check
const RANK_EPS: f64 = 1e-9;

/// Discretize a continuous pair (A, B) at sample period `dt` using the
/// matrix-exponential (zero-order-hold) method.
///
/// The returned (Ad, Bd) satisfy `x[k+1] = Ad x[k] + Bd u[k]` exactly for
/// the continuous dynamics integrated over one sample with the input held
/// constant. No Euler truncation is involved; the exponential of the
/// augmented block matrix `[[A, B], [0, 0]] * dt` carries both terms.
pub fn discretize_zoh(
    a: &Matrix4<f64>,
    b: &Matrix4x2<f64>,
    dt: f64,
) -> (Matrix4<f64>, Matrix4x2<f64>) {
    let mut m = SMatrix::<f64, 6, 6>::zeros();
    m.fixed_view_mut::<4, 4>(0, 0).copy_from(&(a * dt));
    m.fixed_view_mut::<4, 2>(0, 4).copy_from(&(b * dt));

    let e = m.exp();

    let ad = e.fixed_view::<4, 4>(0, 0).into_owned();
    let bd = e.fixed_view::<4, 2>(0, 4).into_owned();
    (ad, bd)
}

/// Solve the continuous-time algebraic Riccati equation
/// `A'P + PA - PBR⁻¹B'P + Q = 0` for the stabilizing P.
///
/// Integrates the Riccati ODE forward in pseudo-time until the residual
/// vanishes, symmetrizing each step to keep floating-point drift out of P.
pub fn solve_care(
    a: &Matrix4<f64>,
    b: &Matrix4x2<f64>,
    q: &Matrix4<f64>,
    r: &Matrix2<f64>,
) -> SimResult<Matrix4<f64>> {
    let r_inv = r.try_inverse().ok_or_else(|| {
        SimError::NumericalError("control weight R is singular".to_string())
    })?;

    let mut p = *q;
    for _ in 0..CARE_MAX_ITER {
        let residual = a.transpose() * p + p * a - p * b * r_inv * b.transpose() * p + q;
        if residual.abs().max() < CARE_EPS {
            return Ok(p);
        }
        p += residual * CARE_STEP;
        p = (p + p.transpose()) * 0.5;
    }

    Err(SimError::NumericalError(format!(
        "Riccati iteration did not converge within {} steps",
        CARE_MAX_ITER
    )))
}

/// Rank test of the controllability matrix `[B AB A²B A³B]`
pub fn is_controllable(a: &Matrix4<f64>, b: &Matrix4x2<f64>) -> bool {
    let mut ctrb = SMatrix::<f64, 4, 8>::zeros();
    let mut block = *b;
    for i in 0..4 {
        ctrb.fixed_view_mut::<4, 2>(0, 2 * i).copy_from(&block);
        block = a * block;
    }
    ctrb.rank(RANK_EPS) == 4
}

/// LQR state-feedback controller.
///
/// Immutable once constructed; `advance` is pure and safe to call from
/// multiple threads without synchronization.
#[derive(Debug, Clone)]
pub struct LqrController {
    /// Discrete state transition matrix
    pub ad: Matrix4<f64>,
    /// Discrete input matrix
    pub bd: Matrix4x2<f64>,
    /// Output matrix, carried through discretization unchanged (identity)
    pub cd: Matrix4<f64>,
    /// Feedthrough matrix, carried through unchanged (zero)
    pub dd: Matrix4x2<f64>,
    /// Feedback gain K = R⁻¹B'P
    pub k: Matrix2x4<f64>,
    /// Sample period [s]
    pub dt: f64,
}

impl LqrController {
    /// Build a controller: validate the weights, discretize the model at
    /// `dt`, and solve the LQR problem for the gain.
    ///
    /// Fails if Q or R is not positive definite, if (A, B) is not
    /// controllable, or if the Riccati iteration does not converge. No
    /// part of the simulation can proceed without a valid gain, so these
    /// are fatal configuration errors.
    pub fn new(model: &CarModel, weights: &LqrWeights, dt: f64) -> SimResult<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "sample period must be finite and positive, got {}",
                dt
            )));
        }
        if weights.q.cholesky().is_none() {
            return Err(SimError::InvalidParameter(
                "state weight Q must be positive definite".to_string(),
            ));
        }
        if weights.r.cholesky().is_none() {
            return Err(SimError::InvalidParameter(
                "control weight R must be positive definite".to_string(),
            ));
        }
        if !is_controllable(&model.a, &model.b) {
            return Err(SimError::InvalidParameter(
                "(A, B) is not controllable".to_string(),
            ));
        }

        let (ad, bd) = discretize_zoh(&model.a, &model.b, dt);
        let p = solve_care(&model.a, &model.b, &weights.q, &weights.r)?;

        let r_inv = weights.r.try_inverse().ok_or_else(|| {
            SimError::NumericalError("control weight R is singular".to_string())
        })?;
        let k = r_inv * model.b.transpose() * p;

        Ok(LqrController {
            ad,
            bd,
            cd: model.c,
            dd: model.d,
            k,
            dt,
        })
    }

    /// Controller for the reference model and weights at the given period
    pub fn with_defaults(dt: f64) -> SimResult<Self> {
        Self::new(&CarModel::new(), &LqrWeights::default(), dt)
    }

    /// Advance the state one tick toward `target`, checking dimensions.
    ///
    /// Only `target[0]` and `target[2]` (position) are used; the setpoint
    /// velocity is forced to zero. Wrong-length inputs fail with a
    /// dimension error, never silently truncated or padded.
    pub fn advance(&self, state: &[f64], target: &[f64]) -> SimResult<Vector4<f64>> {
        if state.len() != 4 {
            return Err(SimError::DimensionMismatch(format!(
                "state has {} components, expected 4",
                state.len()
            )));
        }
        if target.len() != 4 {
            return Err(SimError::DimensionMismatch(format!(
                "target has {} components, expected 4",
                target.len()
            )));
        }
        let x = Vector4::from_column_slice(state);
        let reference = Vector4::from_column_slice(target);
        Ok(self.compute_control(&x, &reference))
    }

    /// Feedback acceleration commanded for the current tracking error
    pub fn control_input(&self, state: &Vector4<f64>, reference: &Vector4<f64>) -> Acceleration {
        let setpoint = Vector4::new(reference[0], 0.0, reference[2], 0.0);
        let e = state - setpoint;
        Acceleration::from(-(self.k * e))
    }

    /// Typed fast path of [`advance`](Self::advance): feedback on the
    /// tracking error, then one discrete step.
    pub fn compute_control(&self, state: &Vector4<f64>, reference: &Vector4<f64>) -> Vector4<f64> {
        let u = self.control_input(state, reference).to_vector();
        self.step(state, &u)
    }

    /// One step of the discrete dynamics under input `u`
    pub fn step(&self, state: &Vector4<f64>, u: &Vector2<f64>) -> Vector4<f64> {
        self.ad * state + self.bd * u
    }

    /// Closed-loop transition matrix Ad - Bd K
    pub fn closed_loop(&self) -> Matrix4<f64> {
        self.ad - self.bd * self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CarModel, LqrWeights};
    use nalgebra::Normed;

    const DT: f64 = 0.01;

    fn reference_controller() -> LqrController {
        LqrController::with_defaults(DT).unwrap()
    }

    #[test]
    fn test_zoh_matches_closed_form() {
        // For the double integrator the ZOH pair is known exactly:
        // position row [1, dt], input column [dt^2/2, dt].
        let model = CarModel::new();
        let (ad, bd) = discretize_zoh(&model.a, &model.b, DT);

        for &(p, v) in &[(0usize, 1usize), (2, 3)] {
            assert!((ad[(p, p)] - 1.0).abs() < 1e-12);
            assert!((ad[(p, v)] - DT).abs() < 1e-12);
            assert!((ad[(v, v)] - 1.0).abs() < 1e-12);
            assert!(ad[(v, p)].abs() < 1e-12);
        }
        assert!((bd[(0, 0)] - DT * DT / 2.0).abs() < 1e-12);
        assert!((bd[(1, 0)] - DT).abs() < 1e-12);
        assert!((bd[(2, 1)] - DT * DT / 2.0).abs() < 1e-12);
        assert!((bd[(3, 1)] - DT).abs() < 1e-12);
        // Axes stay decoupled
        assert!(bd[(0, 1)].abs() < 1e-12);
        assert!(bd[(2, 0)].abs() < 1e-12);
    }

    #[test]
    fn test_care_solution_reference_model() {
        // Per axis with Q = I, R = 1 the stabilizing solution is
        // P = [[sqrt(3), 1], [1, sqrt(3)]] and K = [1, sqrt(3)].
        let model = CarModel::new();
        let weights = LqrWeights::default();
        let p = solve_care(&model.a, &model.b, &weights.q, &weights.r).unwrap();

        let s3 = 3.0_f64.sqrt();
        for &(i, j) in &[(0usize, 1usize), (2, 3)] {
            assert!((p[(i, i)] - s3).abs() < 1e-6);
            assert!((p[(j, j)] - s3).abs() < 1e-6);
            assert!((p[(i, j)] - 1.0).abs() < 1e-6);
        }
        assert!(p[(0, 2)].abs() < 1e-6);

        let controller = reference_controller();
        assert!((controller.k[(0, 0)] - 1.0).abs() < 1e-6);
        assert!((controller.k[(0, 1)] - s3).abs() < 1e-6);
        assert!((controller.k[(1, 2)] - 1.0).abs() < 1e-6);
        assert!((controller.k[(1, 3)] - s3).abs() < 1e-6);
    }

    #[test]
    fn test_care_residual_is_small() {
        let model = CarModel::new();
        let weights = LqrWeights::new([1.0, 2.0, 3.0, 4.0], [0.5, 2.0]);
        let p = solve_care(&model.a, &model.b, &weights.q, &weights.r).unwrap();

        let r_inv = weights.r.try_inverse().unwrap();
        let residual = model.a.transpose() * p + p * model.a
            - p * model.b * r_inv * model.b.transpose() * p
            + weights.q;
        assert!(residual.abs().max() < 1e-9);
        // Stabilizing solution is symmetric positive definite
        assert!((p - p.transpose()).abs().max() < 1e-9);
        assert!(p.cholesky().is_some());
    }

    #[test]
    fn test_closed_loop_is_stable() {
        let controller = reference_controller();
        for eig in controller.closed_loop().complex_eigenvalues().iter() {
            assert!(eig.norm() < 1.0, "unstable closed-loop eigenvalue {}", eig);
        }
    }

    #[test]
    fn test_controllability_check() {
        let model = CarModel::new();
        assert!(is_controllable(&model.a, &model.b));
        // Cutting the input off makes the pair uncontrollable
        assert!(!is_controllable(&model.a, &Matrix4x2::zeros()));
    }

    #[test]
    fn test_nonpositive_r_rejected() {
        let model = CarModel::new();
        for r_diag in [[0.0, 1.0], [-1.0, 1.0]] {
            let weights = LqrWeights::new([1.0; 4], r_diag);
            let result = LqrController::new(&model, &weights, DT);
            assert!(matches!(result, Err(SimError::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_nonpositive_q_rejected() {
        let model = CarModel::new();
        let weights = LqrWeights::new([1.0, 1.0, -2.0, 1.0], [1.0; 2]);
        assert!(LqrController::new(&model, &weights, DT).is_err());
    }

    #[test]
    fn test_invalid_dt_rejected() {
        let model = CarModel::new();
        let weights = LqrWeights::default();
        assert!(LqrController::new(&model, &weights, 0.0).is_err());
        assert!(LqrController::new(&model, &weights, -0.01).is_err());
    }

    #[test]
    fn test_advance_dimension_checks() {
        let controller = reference_controller();
        let short = [0.0; 3];
        let full = [0.0; 4];
        assert!(matches!(
            controller.advance(&short, &full),
            Err(SimError::DimensionMismatch(_))
        ));
        assert!(matches!(
            controller.advance(&full, &[0.0; 5]),
            Err(SimError::DimensionMismatch(_))
        ));
        assert!(controller.advance(&full, &full).is_ok());
    }

    #[test]
    fn test_zero_error_commands_zero_acceleration() {
        let controller = reference_controller();
        let state = Vector4::new(-1.0, 0.0, 4.0, 0.0);
        let u = controller.control_input(&state, &state);
        assert!(u.ax.abs() < 1e-12);
        assert!(u.ay.abs() < 1e-12);
    }

    #[test]
    fn test_target_is_a_fixed_point() {
        let controller = reference_controller();
        let state = Vector4::new(2.0, 0.0, 3.0, 0.0);
        let next = controller.compute_control(&state, &state);
        assert!((next - state).abs().max() < 1e-12);
    }

    #[test]
    fn test_target_velocity_ignored() {
        let controller = reference_controller();
        let state = Vector4::new(2.0, 0.0, 3.0, 0.0);
        // Nonzero velocity components of the target must not change the
        // setpoint actually tracked.
        let reference = Vector4::new(2.0, 5.0, 3.0, -5.0);
        let next = controller.compute_control(&state, &reference);
        assert!((next - state).abs().max() < 1e-12);
    }

    #[test]
    fn test_convergence_to_target() {
        let controller = reference_controller();
        let target = Vector4::new(2.0, 0.0, 3.0, 0.0);
        let mut state = Vector4::zeros();
        for _ in 0..2000 {
            state = controller.compute_control(&state, &target);
        }
        assert!((state - target).abs().max() < 1e-3);
        assert!(state[1].abs() < 1e-3);
        assert!(state[3].abs() < 1e-3);
    }

    #[test]
    fn test_halved_dt_reaches_same_fixed_point() {
        // Same horizon, twice the ticks at half the period: both runs must
        // settle at the same state (no bit-exactness implied).
        let target = Vector4::new(-1.5, 0.0, 2.5, 0.0);
        let coarse = LqrController::with_defaults(0.02).unwrap();
        let fine = LqrController::with_defaults(0.01).unwrap();

        let mut a = Vector4::zeros();
        for _ in 0..1000 {
            a = coarse.compute_control(&a, &target);
        }
        let mut b = Vector4::zeros();
        for _ in 0..2000 {
            b = fine.compute_control(&b, &target);
        }
        assert!((a - b).abs().max() < 1e-3);
        assert!((a - target).abs().max() < 1e-3);
    }
}
