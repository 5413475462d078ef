//! Common types and error definitions for car_lqr_sim
//!
//! This module provides the foundational building blocks shared by the
//! model, controller, and simulation modules.

pub mod types;
pub mod error;

pub use types::*;
pub use error::*;
