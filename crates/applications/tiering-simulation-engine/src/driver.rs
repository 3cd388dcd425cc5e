//! Self-driving simulation clock
//!
//! Spawns a tokio task that ticks a [`ComparisonSimulation`] at the
//! configured frame interval. Ticks and restarts take the write lock, so a
//! renderer reading through [`SimulationHandle::state`] never sees one engine
//! restarted and the other not.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::comparison::Comparison;
use crate::config::SimulationClock;
use crate::error::Result;
use crate::simulation::{ComparisonSimulation, SimulationState};

/// Running simulation session
pub struct SimulationHandle {
    simulation: Arc<RwLock<ComparisonSimulation>>,
    clock: SimulationClock,
    task: Option<JoinHandle<()>>,
}

/// Start ticking `simulation` on `clock`
///
/// Fails without spawning anything when the clock has a zero frame interval
/// or a non-positive acceleration.
pub fn start_simulation(simulation: ComparisonSimulation, clock: SimulationClock) -> Result<SimulationHandle> {
    clock.validate()?;

    let simulation = Arc::new(RwLock::new(simulation));
    let task = spawn_ticker(simulation.clone(), clock);

    Ok(SimulationHandle {
        simulation,
        clock,
        task: Some(task),
    })
}

fn spawn_ticker(simulation: Arc<RwLock<ComparisonSimulation>>, clock: SimulationClock) -> JoinHandle<()> {
    tokio::spawn(async move {
        let delta_minutes = clock.delta_minutes(simulation.read().await.checkpoint_interval_min());
        debug!(
            "Simulation clock: {:?} frames, {:.3} simulated min per tick",
            clock.frame_interval(),
            delta_minutes
        );

        let mut ticker = tokio::time::interval(clock.frame_interval());
        loop {
            ticker.tick().await;

            if !simulation.write().await.tick(delta_minutes) {
                info!("Simulation clock stopped: session halted");
                break;
            }
        }
    })
}

impl SimulationHandle {
    /// Deliver one tick by hand; returns false once the session has halted
    pub async fn tick(&self, delta_minutes: f64) -> bool {
        self.simulation.write().await.tick(delta_minutes)
    }

    /// Snapshot of both engines
    pub async fn state(&self) -> SimulationState {
        self.simulation.read().await.snapshot()
    }

    /// Swap in fresh engines for `comparison` and keep ticking
    pub async fn restart_with(&mut self, comparison: &Comparison) {
        self.stop();
        {
            let mut simulation = self.simulation.write().await;
            let policy = simulation.policy();
            *simulation = ComparisonSimulation::new(comparison, policy);
        }
        info!(
            "Simulation restarted for {} vs {}",
            comparison.primary.architecture, comparison.competitor.architecture
        );
        self.task = Some(spawn_ticker(self.simulation.clone(), self.clock));
    }

    /// Whether the clock task is still ticking
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the clock; state stays readable
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_PRICING_PERIOD;
    use crate::comparison::compute_comparison;
    use crate::simulation::TerminalPolicy;
    use crate::types::{WorkflowParameters, WorkloadRequest};
    use std::time::Duration;

    /// 1ms frames carrying a full 60 min interval each
    fn fast_clock() -> SimulationClock {
        SimulationClock {
            frame_interval_ms: 1,
            seconds_per_interval: 0.001,
        }
    }

    fn comparison(fast_tier_percent: f64) -> Comparison {
        compute_comparison(
            &WorkloadRequest::new(2.0, fast_tier_percent, 100.0),
            &WorkflowParameters::default(),
            None,
            DEFAULT_PRICING_PERIOD,
        )
        .unwrap()
    }

    async fn wait_until_halted(handle: &SimulationHandle) -> SimulationState {
        for _ in 0..2_000 {
            let state = handle.state().await;
            if state.halted {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("simulation never halted");
    }

    #[tokio::test]
    async fn test_clock_runs_until_fast_tier_fills() {
        let simulation = ComparisonSimulation::new(&comparison(100.0), TerminalPolicy::Halt);
        let handle = start_simulation(simulation, fast_clock()).unwrap();

        let state = wait_until_halted(&handle).await;
        assert!(state.primary.status.fast_tier_full || state.competitor.status.fast_tier_full);
        assert_eq!(state.primary.tally.migrating, 0);
        assert_eq!(state.competitor.tally.migrating, 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_running());
        assert_eq!(handle.state().await.ticks, state.ticks);
    }

    #[tokio::test]
    async fn test_stop_freezes_state() {
        let simulation = ComparisonSimulation::new(&comparison(20.0), TerminalPolicy::Restart);
        let mut handle = start_simulation(simulation, SimulationClock::default()).unwrap();
        assert!(handle.is_running());

        handle.stop();
        assert!(!handle.is_running());
        let frozen = handle.state().await;
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(handle.state().await, frozen);
    }

    #[tokio::test]
    async fn test_manual_tick_and_restart() {
        let simulation = ComparisonSimulation::new(&comparison(20.0), TerminalPolicy::Halt);
        let mut handle = start_simulation(simulation, SimulationClock::default()).unwrap();
        handle.stop();

        let before = handle.state().await.ticks;
        assert!(handle.tick(10.0).await);
        let state = handle.state().await;
        assert_eq!(state.ticks, before + 1);
        assert!(!state.primary.checkpoints.is_empty());

        handle.restart_with(&comparison(100.0)).await;
        handle.stop();
        let state = handle.state().await;
        assert!(state.ticks <= 1);
        assert_eq!(state.restarts, 0);
        assert!(state.primary.capacity_tier_slots == 0);
    }

    #[tokio::test]
    async fn test_invalid_clock_is_rejected() {
        let simulation = ComparisonSimulation::new(&comparison(20.0), TerminalPolicy::Halt);
        let clock = SimulationClock {
            frame_interval_ms: 0,
            seconds_per_interval: 3.0,
        };
        let err = start_simulation(simulation, clock).err().unwrap();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("frame_interval_ms"));

        let simulation = ComparisonSimulation::new(&comparison(20.0), TerminalPolicy::Halt);
        let clock = SimulationClock {
            frame_interval_ms: 500,
            seconds_per_interval: 0.0,
        };
        assert!(start_simulation(simulation, clock).is_err());
    }
}
