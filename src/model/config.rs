//! Simulation configuration
//!
//! One immutable aggregate passed explicitly into the controller and the
//! driver loop; nothing here is ambient global state.

use super::state_space::LqrWeights;
use crate::common::{SimError, SimResult};

/// Fixed configuration of a simulation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Sample period [s]
    pub dt: f64,
    /// Total simulated duration [s]
    pub sim_time: f64,
    /// State error weights (diagonal of Q)
    pub q_diag: [f64; 4],
    /// Control effort weights (diagonal of R)
    pub r_diag: [f64; 2],
}

impl SimConfig {
    /// Number of ticks covered by the configured horizon
    pub fn ticks(&self) -> usize {
        (self.sim_time / self.dt).round() as usize
    }

    pub fn weights(&self) -> LqrWeights {
        LqrWeights::new(self.q_diag, self.r_diag)
    }

    /// Check the fields a controller cannot be built from
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "sample period must be finite and positive, got {}",
                self.dt
            )));
        }
        if !(self.sim_time.is_finite() && self.sim_time > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "simulation time must be finite and positive, got {}",
                self.sim_time
            )));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            sim_time: 5.0,
            q_diag: [1.0; 4],
            r_diag: [1.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.dt, 0.01);
        assert_eq!(config.ticks(), 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_dt_rejected() {
        let config = SimConfig { dt: 0.0, ..SimConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidParameter(_))
        ));

        let config = SimConfig { dt: f64::NAN, ..SimConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_sim_time_rejected() {
        let config = SimConfig { sim_time: -1.0, ..SimConfig::default() };
        assert!(config.validate().is_err());
    }
}
