//! Common types used throughout car_lqr_sim

use nalgebra::{Vector2, Vector4};

/// Planar car state: position and velocity on each axis.
///
/// The vector layout is `[x, vx, y, vy]`, matching the state-space model
/// in [`crate::model::CarModel`]. No unit enforcement; the renderer
/// assumes meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarState {
    pub x: f64,
    pub vx: f64,
    pub y: f64,
    pub vy: f64,
}

impl CarState {
    pub fn new(x: f64, vx: f64, y: f64, vy: f64) -> Self {
        Self { x, vx, y, vy }
    }

    /// State at rest at the given position
    pub fn at_rest(x: f64, y: f64) -> Self {
        Self { x, vx: 0.0, y, vy: 0.0 }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, vx: 0.0, y: 0.0, vy: 0.0 }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn speed(&self) -> f64 {
        (self.vx.powi(2) + self.vy.powi(2)).sqrt()
    }

    /// Heading of the velocity vector [rad]
    pub fn heading(&self) -> f64 {
        self.vy.atan2(self.vx)
    }

    pub fn to_vector(&self) -> Vector4<f64> {
        Vector4::new(self.x, self.vx, self.y, self.vy)
    }
}

impl From<Vector4<f64>> for CarState {
    fn from(v: Vector4<f64>) -> Self {
        Self { x: v[0], vx: v[1], y: v[2], vy: v[3] }
    }
}

/// Commanded acceleration `[ax, ay]`, the model's control input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceleration {
    pub ax: f64,
    pub ay: f64,
}

impl Acceleration {
    pub fn new(ax: f64, ay: f64) -> Self {
        Self { ax, ay }
    }

    pub fn zero() -> Self {
        Self { ax: 0.0, ay: 0.0 }
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.ax, self.ay)
    }
}

impl From<Vector2<f64>> for Acceleration {
    fn from(v: Vector2<f64>) -> Self {
        Self { ax: v[0], ay: v[1] }
    }
}
