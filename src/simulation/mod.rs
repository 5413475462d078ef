//! Simulation driver
//!
//! Owns the pacing of a fixed-horizon run: holds the controller and the
//! target, and exposes the resulting states as a finite lazy sequence the
//! renderer pulls from. The controller never calls into drawing code.

use nalgebra::Vector4;

use crate::common::{CarState, SimResult};
use crate::control::lqr::LqrController;
use crate::model::{CarModel, SimConfig};

/// Ordered (time, state) sequence recorded by a run
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    pub samples: Vec<(f64, CarState)>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { samples: Vec::new() }
    }

    pub fn push(&mut self, time: f64, state: CarState) {
        self.samples.push((time, state));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn final_state(&self) -> Option<CarState> {
        self.samples.last().map(|(_, s)| *s)
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|(t, _)| *t).collect()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.samples.iter().map(|(_, s)| s.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.samples.iter().map(|(_, s)| s.y).collect()
    }

    pub fn vxs(&self) -> Vec<f64> {
        self.samples.iter().map(|(_, s)| s.vx).collect()
    }

    pub fn vys(&self) -> Vec<f64> {
        self.samples.iter().map(|(_, s)| s.vy).collect()
    }
}

/// Fixed-horizon simulation of the LQR-controlled car
pub struct Simulation {
    controller: LqrController,
    target: Vector4<f64>,
    dt: f64,
    ticks: usize,
}

impl Simulation {
    /// Build the model and controller from `config` and fix the target.
    /// Construction is where all solving happens; it fails on any invalid
    /// configuration before a single tick can run.
    pub fn new(config: &SimConfig, target: CarState) -> SimResult<Self> {
        config.validate()?;
        let controller = LqrController::new(&CarModel::new(), &config.weights(), config.dt)?;
        Ok(Simulation {
            controller,
            target: target.to_vector(),
            dt: config.dt,
            ticks: config.ticks(),
        })
    }

    pub fn controller(&self) -> &LqrController {
        &self.controller
    }

    pub fn target(&self) -> CarState {
        CarState::from(self.target)
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Lazy sequence of `(time, state)` samples starting from `initial`,
    /// one per tick over the configured horizon
    pub fn states(&self, initial: CarState) -> StateIter<'_> {
        StateIter {
            controller: &self.controller,
            target: self.target,
            state: initial.to_vector(),
            dt: self.dt,
            tick: 0,
            ticks: self.ticks,
        }
    }

    /// Run the whole horizon and collect the trajectory
    pub fn run(&self, initial: CarState) -> Trajectory {
        let mut trajectory = Trajectory::new();
        for (time, state) in self.states(initial) {
            trajectory.push(time, state);
        }
        trajectory
    }
}

/// Iterator over the states of a run; each `next` records the current
/// state and advances one tick
pub struct StateIter<'a> {
    controller: &'a LqrController,
    target: Vector4<f64>,
    state: Vector4<f64>,
    dt: f64,
    tick: usize,
    ticks: usize,
}

impl<'a> Iterator for StateIter<'a> {
    type Item = (f64, CarState);

    fn next(&mut self) -> Option<Self::Item> {
        if self.tick >= self.ticks {
            return None;
        }
        let time = self.tick as f64 * self.dt;
        let current = CarState::from(self.state);
        self.state = self.controller.compute_control(&self.state, &self.target);
        self.tick += 1;
        Some((time, current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ticks - self.tick;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for StateIter<'a> {}
