//! Core types for the tiering calculator

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TieringError};

/// Default external object store bandwidth (GB/s) used by every competitor
pub const DEFAULT_OBJECT_STORE_BANDWIDTH_GBS: f64 = 5.0;

/// Storage architecture being sized
///
/// The serialized names double as the pricing catalog keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Architecture {
    /// Primary architecture: director nodes, pod servers and JBOD capacity tier
    #[serde(rename = "vdura")]
    Vdura,
    /// All-flash servers with uniform data drives
    #[serde(rename = "weka_nitro")]
    WekaNitro,
    /// All-flash servers with separate boot and data drives
    #[serde(rename = "weka_prime")]
    WekaPrime,
    /// Single box type with SLC write buffer and QLC data drives
    #[serde(rename = "comp_v_ebox")]
    CompVEbox,
    /// Compute boxes in front of SCM + QLC data boxes
    #[serde(rename = "comp_v_cbox_dbox")]
    CompVCdBox,
}

impl Architecture {
    /// Every competitor the primary architecture can be compared against
    pub const COMPETITORS: [Architecture; 4] = [
        Architecture::WekaNitro,
        Architecture::WekaPrime,
        Architecture::CompVEbox,
        Architecture::CompVCdBox,
    ];

    /// Key of this architecture inside a pricing period
    pub fn catalog_key(&self) -> &'static str {
        match self {
            Architecture::Vdura => "vdura",
            Architecture::WekaNitro => "weka_nitro",
            Architecture::WekaPrime => "weka_prime",
            Architecture::CompVEbox => "comp_v_ebox",
            Architecture::CompVCdBox => "comp_v_cbox_dbox",
        }
    }

    /// Parse from a catalog key (as used on the command line)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "vdura" => Some(Self::Vdura),
            "weka_nitro" => Some(Self::WekaNitro),
            "weka_prime" => Some(Self::WekaPrime),
            "comp_v_ebox" => Some(Self::CompVEbox),
            "comp_v_cbox_dbox" => Some(Self::CompVCdBox),
            _ => None,
        }
    }

    pub fn is_competitor(&self) -> bool {
        !matches!(self, Architecture::Vdura)
    }

    /// Name of the tier checkpoints migrate into
    pub fn capacity_tier_name(&self) -> &'static str {
        if self.is_competitor() { "S3" } else { "JBOD" }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.catalog_key())
    }
}

/// Capacity and performance requirements for one recalculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadRequest {
    /// Total usable capacity (PB)
    pub total_capacity_pb: f64,
    /// Share of the capacity placed in the fast tier (0-100)
    pub fast_tier_percent: f64,
    /// Required sustained throughput (GB/s)
    pub throughput_gbs: f64,
    /// Competitor the primary architecture is compared against
    pub competitor: Architecture,
    /// Fixed external object store bandwidth every competitor migrates through (GB/s)
    #[serde(default = "default_object_store_bandwidth")]
    pub object_store_bandwidth_gbs: f64,
}

fn default_object_store_bandwidth() -> f64 {
    DEFAULT_OBJECT_STORE_BANDWIDTH_GBS
}

impl WorkloadRequest {
    pub fn new(total_capacity_pb: f64, fast_tier_percent: f64, throughput_gbs: f64) -> Self {
        WorkloadRequest {
            total_capacity_pb,
            fast_tier_percent,
            throughput_gbs,
            competitor: Architecture::WekaNitro,
            object_store_bandwidth_gbs: DEFAULT_OBJECT_STORE_BANDWIDTH_GBS,
        }
    }

    pub fn with_competitor(mut self, competitor: Architecture) -> Self {
        self.competitor = competitor;
        self
    }

    pub fn with_object_store_bandwidth(mut self, bandwidth_gbs: f64) -> Self {
        self.object_store_bandwidth_gbs = bandwidth_gbs;
        self
    }

    /// Total capacity normalized to TB
    pub fn total_capacity_tb(&self) -> f64 {
        self.total_capacity_pb * 1000.0
    }

    /// Capacity that must land in the fast tier (TB)
    pub fn fast_tier_capacity_tb(&self) -> f64 {
        self.total_capacity_tb() * (self.fast_tier_percent / 100.0)
    }

    /// Capacity that must land in the capacity tier (TB)
    pub fn capacity_tier_capacity_tb(&self) -> f64 {
        self.total_capacity_tb() - self.fast_tier_capacity_tb()
    }

    /// Reject inputs the sizers cannot work with
    pub fn validate(&self) -> Result<()> {
        require_positive("total_capacity_pb", self.total_capacity_pb)?;
        require_positive("throughput_gbs", self.throughput_gbs)?;
        require_positive("object_store_bandwidth_gbs", self.object_store_bandwidth_gbs)?;

        if !self.fast_tier_percent.is_finite() || !(0.0..=100.0).contains(&self.fast_tier_percent) {
            return Err(TieringError::invalid_input(
                "fast_tier_percent",
                format!("{} is outside 0-100", self.fast_tier_percent),
            ));
        }

        if !self.competitor.is_competitor() {
            return Err(TieringError::invalid_input(
                "competitor",
                "the primary architecture cannot be its own competitor",
            ));
        }

        Ok(())
    }
}

/// Checkpoint cadence of the GPU workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowParameters {
    /// Size of one checkpoint (GB)
    pub checkpoint_size_gb: f64,
    /// Time between checkpoints (minutes)
    pub checkpoint_interval_min: f64,
    /// Checkpoints kept in the fast tier before migration starts
    pub target_retention: u32,
}

impl WorkflowParameters {
    pub fn new(checkpoint_size_gb: f64, checkpoint_interval_min: f64, target_retention: u32) -> Self {
        WorkflowParameters {
            checkpoint_size_gb,
            checkpoint_interval_min,
            target_retention,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("checkpoint_size_gb", self.checkpoint_size_gb)?;
        require_positive("checkpoint_interval_min", self.checkpoint_interval_min)?;
        Ok(())
    }

    /// Minutes needed to move one checkpoint through `bandwidth_gbs`
    ///
    /// `None` when there is no bandwidth to move it through.
    pub fn transfer_minutes(&self, bandwidth_gbs: f64) -> Option<f64> {
        if bandwidth_gbs > 0.0 {
            Some((self.checkpoint_size_gb * 1000.0) / bandwidth_gbs / 60.0)
        } else {
            None
        }
    }
}

impl Default for WorkflowParameters {
    fn default() -> Self {
        WorkflowParameters::new(100.0, 60.0, 5)
    }
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(TieringError::invalid_input(field, "must be a number"));
    }
    if value <= 0.0 {
        return Err(TieringError::invalid_input(field, format!("{} must be greater than zero", value)));
    }
    Ok(())
}

/// Bandwidth and capacity of one storage tier
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierSpec {
    /// Aggregate bandwidth (GB/s)
    pub bandwidth_gbs: f64,
    /// Usable capacity (TB)
    pub capacity_tb: f64,
}

impl TierSpec {
    pub fn new(bandwidth_gbs: f64, capacity_tb: f64) -> Self {
        TierSpec { bandwidth_gbs, capacity_tb }
    }

    pub fn is_absent(&self) -> bool {
        self.capacity_tb <= 0.0
    }
}

/// Physical components of a sized configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentCounts {
    /// Director nodes + pod servers (fast tier) and JBOD enclosures (capacity tier)
    DirectorPod { directors: u32, pods: u32, jbods: u32 },
    /// Homogeneous storage servers
    Servers { servers: u32 },
    /// Single box type carrying both buffer and data media
    EBoxes { nodes: u32 },
    /// Compute boxes paired with data boxes
    CdBoxes { c_boxes: u32, d_boxes: u32 },
}

impl ComponentCounts {
    /// Count of throughput-bearing units
    pub fn performance_units(&self) -> u32 {
        match *self {
            ComponentCounts::DirectorPod { pods, .. } => pods,
            ComponentCounts::Servers { servers } => servers,
            ComponentCounts::EBoxes { nodes } => nodes,
            ComponentCounts::CdBoxes { c_boxes, .. } => c_boxes,
        }
    }

    /// Every fast-tier enclosure, whatever its role
    pub fn total_nodes(&self) -> u32 {
        match *self {
            ComponentCounts::DirectorPod { directors, pods, .. } => directors.saturating_add(pods),
            ComponentCounts::Servers { servers } => servers,
            ComponentCounts::EBoxes { nodes } => nodes,
            ComponentCounts::CdBoxes { c_boxes, d_boxes } => c_boxes.saturating_add(d_boxes),
        }
    }
}

/// Concrete hardware configuration for one architecture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedConfiguration {
    pub architecture: Architecture,
    pub components: ComponentCounts,
    /// Chosen data media size (TB)
    pub media_size_tb: f64,
    pub fast_tier: TierSpec,
    pub capacity_tier: TierSpec,
    /// Bandwidth available for fast tier -> capacity tier migration (GB/s)
    pub migration_bandwidth_gbs: f64,
    /// Estimated total cost, when pricing was available
    pub total_cost: Option<f64>,
}

impl SizedConfiguration {
    /// Attach the external object store every competitor migrates into
    pub fn with_object_store(mut self, capacity_tb: f64, bandwidth_gbs: f64) -> Self {
        self.capacity_tier = TierSpec::new(bandwidth_gbs, capacity_tb);
        self.migration_bandwidth_gbs = bandwidth_gbs;
        self
    }
}

/// Whether migration can keep pace with checkpoint production
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feasibility {
    /// Minutes to migrate one checkpoint to the capacity tier; `None` without a migration path
    pub migration_minutes: Option<f64>,
    /// Minutes to write one checkpoint into the fast tier
    pub write_minutes: f64,
    /// Migration finishes strictly before the next checkpoint arrives
    pub keeps_up: bool,
    /// Share of the fast tier occupied by the retained checkpoints (0-100)
    pub fast_tier_utilization_percent: f64,
}
