//! Engine configuration
//!
//! Optional JSON file; every field has a default and the CLI overrides
//! whatever the file sets.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::DEFAULT_PRICING_PERIOD;
use crate::error::{Result, TieringError};
use crate::simulation::TerminalPolicy;
use crate::types::DEFAULT_OBJECT_STORE_BANDWIDTH_GBS;

/// Wall-clock cadence of the simulation and its time acceleration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationClock {
    /// Real time between ticks (ms)
    pub frame_interval_ms: u64,
    /// Real seconds one checkpoint interval takes on screen
    pub seconds_per_interval: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            frame_interval_ms: 500,
            seconds_per_interval: 3.0,
        }
    }
}

impl SimulationClock {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Simulated minutes carried by one tick
    ///
    /// With the defaults a 60 min interval advances 10 min per tick.
    pub fn delta_minutes(&self, checkpoint_interval_min: f64) -> f64 {
        let frame_minutes = self.frame_interval_ms as f64 / 60_000.0;
        let acceleration = checkpoint_interval_min * 60.0 / self.seconds_per_interval;
        frame_minutes * acceleration
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(TieringError::invalid_input("frame_interval_ms", "must be greater than zero"));
        }
        if !(self.seconds_per_interval > 0.0 && self.seconds_per_interval.is_finite()) {
            return Err(TieringError::invalid_input(
                "seconds_per_interval",
                format!("{} must be greater than zero", self.seconds_per_interval),
            ));
        }
        Ok(())
    }
}

/// Settings shared by the CLI and library callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pricing period to read from the catalog
    pub pricing_period: String,
    /// Pricing document; no document means no costs and built-in shapes
    pub pricing_path: Option<PathBuf>,
    pub clock: SimulationClock,
    pub terminal_policy: TerminalPolicy,
    /// Competitor migration bandwidth into the object store (GB/s)
    pub object_store_bandwidth_gbs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pricing_period: DEFAULT_PRICING_PERIOD.to_string(),
            pricing_path: None,
            clock: SimulationClock::default(),
            terminal_policy: TerminalPolicy::default(),
            object_store_bandwidth_gbs: DEFAULT_OBJECT_STORE_BANDWIDTH_GBS,
        }
    }
}

impl EngineConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&contents)?;
        config.clock.validate()?;
        debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn with_pricing_period(mut self, period: impl Into<String>) -> Self {
        self.pricing_period = period.into();
        self
    }

    pub fn with_pricing_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pricing_path = Some(path.into());
        self
    }

    pub fn with_clock(mut self, clock: SimulationClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_terminal_policy(mut self, policy: TerminalPolicy) -> Self {
        self.terminal_policy = policy;
        self
    }

    pub fn with_object_store_bandwidth(mut self, bandwidth_gbs: f64) -> Self {
        self.object_store_bandwidth_gbs = bandwidth_gbs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delta_minutes() {
        let clock = SimulationClock::default();
        assert_eq!(clock.frame_interval(), Duration::from_millis(500));
        assert!((clock.delta_minutes(60.0) - 10.0).abs() < 1e-9);
        assert!((clock.delta_minutes(30.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_interval_every_few_seconds() {
        // 6 ticks of 500ms cover one interval whatever its length
        let clock = SimulationClock::default();
        for interval in [5.0, 60.0, 240.0] {
            let ticks = interval / clock.delta_minutes(interval);
            assert!((ticks - 6.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_partial_config_file() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "terminal_policy": "restart", "clock": { "seconds_per_interval": 6.0 } }"#)
                .unwrap();
        assert_eq!(config.terminal_policy, TerminalPolicy::Restart);
        assert_eq!(config.clock.frame_interval_ms, 500);
        assert_eq!(config.clock.seconds_per_interval, 6.0);
        assert_eq!(config.pricing_period, DEFAULT_PRICING_PERIOD);
        assert_eq!(config.object_store_bandwidth_gbs, 5.0);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_pricing_period("Q3_2026")
            .with_pricing_path("pricing.json")
            .with_terminal_policy(TerminalPolicy::Restart)
            .with_object_store_bandwidth(10.0)
            .with_clock(SimulationClock { frame_interval_ms: 100, ..SimulationClock::default() });
        assert_eq!(config.pricing_period, "Q3_2026");
        assert_eq!(config.pricing_path, Some(PathBuf::from("pricing.json")));
        assert_eq!(config.terminal_policy, TerminalPolicy::Restart);
        assert_eq!(config.object_store_bandwidth_gbs, 10.0);
        // 100ms frames move a 60 min interval 2 min per tick
        assert!((config.clock.delta_minutes(60.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_validation() {
        assert!(SimulationClock::default().validate().is_ok());
        let clock = SimulationClock { frame_interval_ms: 0, ..SimulationClock::default() };
        assert!(clock.validate().unwrap_err().is_input_error());
        let clock = SimulationClock { seconds_per_interval: 0.0, ..SimulationClock::default() };
        assert!(clock.validate().is_err());
    }
}
