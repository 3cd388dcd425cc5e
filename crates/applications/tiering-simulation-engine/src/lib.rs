//! Tiering Simulation Engine
//!
//! Sizes a tiered checkpoint storage system (fast tier + parallel JBOD
//! capacity tier) against all-flash competitors that migrate into a
//! bandwidth-capped object store, then simulates checkpoints flowing through
//! both.
//!
//! ```no_run
//! use tiering_simulation_engine::{
//!     compute_comparison, ComparisonSimulation, PricingCatalog, TerminalPolicy,
//!     WorkflowParameters, WorkloadRequest, DEFAULT_PRICING_PERIOD,
//! };
//!
//! let catalog = PricingCatalog::from_path("pricing-config.json")?;
//! let request = WorkloadRequest::new(10.0, 20.0, 200.0);
//! let comparison = compute_comparison(
//!     &request,
//!     &WorkflowParameters::default(),
//!     Some(&catalog),
//!     DEFAULT_PRICING_PERIOD,
//! )?;
//!
//! let mut simulation = ComparisonSimulation::new(&comparison, TerminalPolicy::Halt);
//! while simulation.tick(10.0) {}
//! # Ok::<(), tiering_simulation_engine::TieringError>(())
//! ```

pub mod error;
pub mod types;
pub mod catalog;
pub mod sizing;
pub mod cost;
pub mod feasibility;
pub mod simulation;
pub mod comparison;
pub mod config;
#[cfg(feature = "async")]
pub mod driver;

pub use catalog::{PricingCatalog, DEFAULT_PRICING_PERIOD};
pub use comparison::{compute_comparison, Comparison};
pub use config::{EngineConfig, SimulationClock};
pub use cost::{estimate_cost, CostBreakdown};
pub use error::{Result, TieringError};
pub use feasibility::evaluate;
pub use simulation::{
    CheckpointSimulation, ComparisonSimulation, SimulationState, TerminalPolicy, TierProfile,
};
pub use sizing::{sizer_for, ArchitectureSizer};
pub use types::{
    Architecture, ComponentCounts, Feasibility, SizedConfiguration, TierSpec, WorkflowParameters,
    WorkloadRequest,
};

#[cfg(feature = "async")]
pub use driver::{start_simulation, SimulationHandle};
