//! car_lqr_sim - LQR-controlled planar car simulator
//!
//! This crate simulates a point-mass vehicle moving in a 2D plane under
//! closed-loop linear-quadratic-regulator (LQR) control: a continuous
//! state-space model, its exact zero-order-hold discretization, an offline
//! Riccati solve for the feedback gain, and a per-tick state advance.

// Core modules
pub mod common;
pub mod utils;

// Simulation modules
pub mod model;
pub mod control;
pub mod simulation;

// Re-export common types for convenience
pub use common::{Acceleration, CarState};
pub use common::{SimError, SimResult};
pub use control::lqr::LqrController;
pub use model::{CarModel, LqrWeights, SimConfig};
pub use simulation::{Simulation, Trajectory};
