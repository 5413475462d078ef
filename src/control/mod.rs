//! Control module
//!
//! LQR state-feedback control of the planar car: zero-order-hold
//! discretization, continuous-time Riccati solve, and the per-tick
//! control law.

pub mod lqr;

pub use lqr::LqrController;
