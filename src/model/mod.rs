//! Vehicle model module
//!
//! Defines the continuous-time state-space model of the planar car, the
//! LQR cost weights, and the immutable simulation configuration.

pub mod config;
pub mod state_space;

pub use config::SimConfig;
pub use state_space::{CarModel, LqrWeights};
