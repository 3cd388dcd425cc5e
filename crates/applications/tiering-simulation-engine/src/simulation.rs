//! Checkpoint simulation
//!
//! Tick-driven state machine for one architecture. Each engine alternates
//! between two phases:
//!
//! - `Writing`: a checkpoint lands in the fast tier at fast-tier bandwidth.
//!   No new checkpoint is admitted while the fast tier has no room for a
//!   whole one.
//! - `Running`: compute time between checkpoints. Once more checkpoints are
//!   active than the retention target, the oldest one migrates to the
//!   capacity tier, one at a time.
//!
//! [`ComparisonSimulation`] drives the primary and competitor engines off the
//! same clock and applies the [`TerminalPolicy`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::comparison::Comparison;
use crate::feasibility::write_minutes;
use crate::types::{Architecture, SizedConfiguration, WorkflowParameters};

/// Session ticks between tally log lines (5 s at the default 500 ms frame)
pub const TALLY_LOG_EVERY_TICKS: u64 = 10;

/// Lifecycle of one checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    /// Resident in the fast tier
    Active,
    /// Being copied to the capacity tier
    Migrating,
    /// Landed in the capacity tier
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: u64,
    pub status: CheckpointStatus,
    /// Migration progress (0-100)
    pub migration_progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Writing,
    Running,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Writing => write!(f, "writing"),
            Phase::Running => write!(f, "running"),
        }
    }
}

/// What an engine does when it can go no further
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPolicy {
    /// Stop the whole session as soon as either engine is done
    #[default]
    Halt,
    /// Start both engines over from empty once both are done
    Restart,
}

impl FromStr for TerminalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "halt" => Ok(TerminalPolicy::Halt),
            "restart" => Ok(TerminalPolicy::Restart),
            other => Err(format!("unknown terminal policy {:?} (expected halt or restart)", other)),
        }
    }
}

/// Tier figures one engine runs against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierProfile {
    pub architecture: Architecture,
    pub fast_tier_bandwidth_gbs: f64,
    pub fast_tier_capacity_tb: f64,
    pub capacity_tier_capacity_tb: f64,
    /// Minutes to migrate one checkpoint; `None` when nothing can migrate
    pub migration_minutes: Option<f64>,
}

impl TierProfile {
    pub fn from_config(config: &SizedConfiguration, params: &WorkflowParameters) -> Self {
        TierProfile {
            architecture: config.architecture,
            fast_tier_bandwidth_gbs: config.fast_tier.bandwidth_gbs,
            fast_tier_capacity_tb: config.fast_tier.capacity_tb,
            capacity_tier_capacity_tb: config.capacity_tier.capacity_tb,
            migration_minutes: params.transfer_minutes(config.migration_bandwidth_gbs),
        }
    }

    pub fn has_capacity_tier(&self) -> bool {
        self.capacity_tier_capacity_tb > 0.0
    }
}

/// Checkpoint counts by status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    pub active: usize,
    pub migrating: usize,
    pub archived: usize,
}

impl Tally {
    /// Checkpoints still occupying the fast tier
    pub fn in_fast_tier(&self) -> usize {
        self.active + self.migrating
    }
}

/// Human-facing digest of an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub phase: Phase,
    /// Write progress while writing, share of the interval elapsed while running
    pub progress_percent: f64,
    /// Checkpoint currently landing in the fast tier
    pub writing_id: Option<u64>,
    pub migrating_id: Option<u64>,
    pub migration_progress: Option<f64>,
    pub archived: usize,
    pub fast_tier_full: bool,
}

/// Single-architecture checkpoint engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointSimulation {
    profile: TierProfile,
    params: WorkflowParameters,
    write_minutes: f64,
    checkpoints: Vec<Checkpoint>,
    next_id: u64,
    phase: Phase,
    phase_elapsed: f64,
    write_elapsed: f64,
    write_progress: f64,
    current_write: Option<u64>,
    fast_tier_full: bool,
    halted: bool,
    elapsed_minutes: f64,
}

impl CheckpointSimulation {
    pub fn new(profile: TierProfile, params: WorkflowParameters) -> Self {
        CheckpointSimulation {
            write_minutes: write_minutes(profile.fast_tier_bandwidth_gbs, &params),
            profile,
            params,
            checkpoints: Vec::new(),
            next_id: 1,
            phase: Phase::Writing,
            phase_elapsed: 0.0,
            write_elapsed: 0.0,
            write_progress: 0.0,
            current_write: None,
            fast_tier_full: false,
            halted: false,
            elapsed_minutes: 0.0,
        }
    }

    /// Same profile and parameters, empty state
    pub fn reset(&self) -> Self {
        Self::new(self.profile, self.params.clone())
    }

    pub fn architecture(&self) -> Architecture {
        self.profile.architecture
    }

    pub fn profile(&self) -> &TierProfile {
        &self.profile
    }

    pub fn params(&self) -> &WorkflowParameters {
        &self.params
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_fast_tier_full(&self) -> bool {
        self.fast_tier_full
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Simulated minutes since the engine started
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_minutes
    }

    /// Whole checkpoints the fast tier can hold
    pub fn fast_tier_slots(&self) -> usize {
        slots(self.profile.fast_tier_capacity_tb, self.params.checkpoint_size_gb)
    }

    /// Whole checkpoints the capacity tier can hold
    pub fn capacity_tier_slots(&self) -> usize {
        slots(self.profile.capacity_tier_capacity_tb, self.params.checkpoint_size_gb)
    }

    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for checkpoint in &self.checkpoints {
            match checkpoint.status {
                CheckpointStatus::Active => tally.active += 1,
                CheckpointStatus::Migrating => tally.migrating += 1,
                CheckpointStatus::Archived => tally.archived += 1,
            }
        }
        tally
    }

    /// The engine can make no further progress
    ///
    /// Without a capacity tier that is a full fast tier; otherwise a full
    /// capacity tier.
    pub fn is_terminal(&self) -> bool {
        if self.profile.has_capacity_tier() {
            self.tally().archived >= self.capacity_tier_slots()
        } else {
            self.fast_tier_full
        }
    }

    /// Advance the engine by `delta_minutes` of simulated time
    pub fn tick(&mut self, delta_minutes: f64) {
        if self.halted {
            return;
        }

        self.elapsed_minutes += delta_minutes;
        self.phase_elapsed += delta_minutes;

        self.update_phase(delta_minutes);
        self.advance_migrations(delta_minutes);

        if self.is_terminal() {
            self.halted = true;
            let tally = self.tally();
            info!(
                "{} engine halted at {:.1} min: {} active, {} archived, fast tier full: {}",
                self.architecture(),
                self.elapsed_minutes,
                tally.active,
                tally.archived,
                self.fast_tier_full
            );
        }
    }

    fn update_phase(&mut self, delta_minutes: f64) {
        match self.phase {
            Phase::Writing => {
                if self.current_write.is_none() && !self.admit_checkpoint() {
                    return;
                }

                self.write_elapsed += delta_minutes;
                self.write_progress = if self.write_minutes > 0.0 {
                    (self.write_elapsed / self.write_minutes * 100.0).min(100.0)
                } else {
                    100.0
                };

                if self.write_progress >= 100.0 {
                    self.phase = Phase::Running;
                    self.phase_elapsed = 0.0;
                    self.current_write = None;

                    if self.profile.has_capacity_tier() && self.tally().migrating == 0 {
                        self.start_next_migration();
                    }
                }
            }
            Phase::Running => {
                if self.phase_elapsed >= self.params.checkpoint_interval_min {
                    self.phase = Phase::Writing;
                    self.phase_elapsed = 0.0;
                }
            }
        }
    }

    /// Start writing a new checkpoint if a whole one fits
    fn admit_checkpoint(&mut self) -> bool {
        if self.tally().in_fast_tier() >= self.fast_tier_slots() {
            self.fast_tier_full = true;
            return false;
        }
        self.fast_tier_full = false;

        let id = self.next_id;
        self.next_id += 1;
        self.checkpoints.push(Checkpoint {
            id,
            status: CheckpointStatus::Active,
            migration_progress: 0.0,
        });
        self.current_write = Some(id);
        self.write_elapsed = 0.0;
        self.write_progress = 0.0;
        true
    }

    fn advance_migrations(&mut self, delta_minutes: f64) {
        let step = match self.profile.migration_minutes {
            Some(minutes) if minutes > 0.0 => 100.0 / minutes * delta_minutes,
            Some(_) => 100.0,
            None => 0.0,
        };

        let mut completed = false;
        for checkpoint in &mut self.checkpoints {
            if checkpoint.status != CheckpointStatus::Migrating {
                continue;
            }
            checkpoint.migration_progress += step;
            if checkpoint.migration_progress >= 100.0 {
                checkpoint.migration_progress = 100.0;
                checkpoint.status = CheckpointStatus::Archived;
                completed = true;
            }
        }

        if completed {
            self.start_next_migration();
        }
    }

    /// Migrate the oldest active checkpoint when over the retention target
    fn start_next_migration(&mut self) {
        if self.tally().active <= self.params.target_retention as usize {
            return;
        }
        // Ids are assigned in push order, so the first active is the oldest
        if let Some(oldest) = self
            .checkpoints
            .iter_mut()
            .find(|c| c.status == CheckpointStatus::Active)
        {
            oldest.status = CheckpointStatus::Migrating;
            oldest.migration_progress = 0.0;
        }
    }

    pub fn status(&self) -> StatusSummary {
        let progress_percent = match self.phase {
            Phase::Writing => self.write_progress,
            Phase::Running => {
                (self.phase_elapsed / self.params.checkpoint_interval_min * 100.0).min(100.0)
            }
        };
        let migrating = self
            .checkpoints
            .iter()
            .find(|c| c.status == CheckpointStatus::Migrating);

        StatusSummary {
            phase: self.phase,
            progress_percent,
            writing_id: self.current_write,
            migrating_id: migrating.map(|c| c.id),
            migration_progress: migrating.map(|c| c.migration_progress),
            archived: self.tally().archived,
            fast_tier_full: self.fast_tier_full,
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            architecture: self.architecture(),
            elapsed_minutes: self.elapsed_minutes,
            checkpoints: self.checkpoints.clone(),
            tally: self.tally(),
            fast_tier_slots: self.fast_tier_slots(),
            capacity_tier_slots: self.capacity_tier_slots(),
            halted: self.halted,
            status: self.status(),
        }
    }
}

fn slots(capacity: f64, checkpoint_size: f64) -> usize {
    if capacity <= 0.0 || checkpoint_size <= 0.0 {
        return 0;
    }
    (capacity / checkpoint_size).floor() as usize
}

/// Point-in-time copy of one engine for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub architecture: Architecture,
    pub elapsed_minutes: f64,
    pub checkpoints: Vec<Checkpoint>,
    pub tally: Tally,
    pub fast_tier_slots: usize,
    pub capacity_tier_slots: usize,
    pub halted: bool,
    pub status: StatusSummary,
}

/// Point-in-time copy of both engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub primary: EngineSnapshot,
    pub competitor: EngineSnapshot,
    pub ticks: u64,
    pub restarts: u32,
    pub halted: bool,
}

/// Primary and competitor engines on one clock
#[derive(Debug, Clone)]
pub struct ComparisonSimulation {
    primary: CheckpointSimulation,
    competitor: CheckpointSimulation,
    policy: TerminalPolicy,
    ticks: u64,
    restarts: u32,
    halted: bool,
}

impl ComparisonSimulation {
    pub fn new(comparison: &Comparison, policy: TerminalPolicy) -> Self {
        let params = &comparison.workflow;
        Self::from_engines(
            CheckpointSimulation::new(TierProfile::from_config(&comparison.primary, params), params.clone()),
            CheckpointSimulation::new(TierProfile::from_config(&comparison.competitor, params), params.clone()),
            policy,
        )
    }

    pub fn from_engines(
        primary: CheckpointSimulation,
        competitor: CheckpointSimulation,
        policy: TerminalPolicy,
    ) -> Self {
        ComparisonSimulation {
            primary,
            competitor,
            policy,
            ticks: 0,
            restarts: 0,
            halted: false,
        }
    }

    pub fn primary(&self) -> &CheckpointSimulation {
        &self.primary
    }

    pub fn competitor(&self) -> &CheckpointSimulation {
        &self.competitor
    }

    pub fn policy(&self) -> TerminalPolicy {
        self.policy
    }

    /// Checkpoint interval both engines run on (minutes)
    pub fn checkpoint_interval_min(&self) -> f64 {
        self.primary.params().checkpoint_interval_min
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Advance both engines; returns false once the session has halted
    pub fn tick(&mut self, delta_minutes: f64) -> bool {
        if self.halted {
            return false;
        }

        self.primary.tick(delta_minutes);
        self.competitor.tick(delta_minutes);
        self.ticks += 1;

        if self.ticks % TALLY_LOG_EVERY_TICKS == 0 {
            self.log_tallies();
        }

        match self.policy {
            TerminalPolicy::Halt => {
                if self.primary.is_halted() || self.competitor.is_halted() {
                    self.halted = true;
                    info!("Simulation halted after {} ticks", self.ticks);
                }
            }
            TerminalPolicy::Restart => {
                if self.primary.is_halted() && self.competitor.is_halted() {
                    self.restart();
                }
            }
        }

        !self.halted
    }

    /// Replace both engines with empty ones
    pub fn restart(&mut self) {
        self.primary = self.primary.reset();
        self.competitor = self.competitor.reset();
        self.halted = false;
        self.restarts += 1;
        info!("Simulation restarted from empty state (restart {})", self.restarts);
    }

    pub fn snapshot(&self) -> SimulationState {
        SimulationState {
            primary: self.primary.snapshot(),
            competitor: self.competitor.snapshot(),
            ticks: self.ticks,
            restarts: self.restarts,
            halted: self.halted,
        }
    }

    fn log_tallies(&self) {
        for engine in [&self.primary, &self.competitor] {
            let tally = engine.tally();
            debug!(
                "{}: {} active, {} migrating, {} archived, fast tier full: {}",
                engine.architecture(),
                tally.active,
                tally.migrating,
                tally.archived,
                engine.is_fast_tier_full()
            );
        }
    }
}
