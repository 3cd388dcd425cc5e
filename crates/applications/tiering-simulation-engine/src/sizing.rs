//! Architecture sizing
//!
//! Turns a [`WorkloadRequest`] into a concrete hardware configuration for the
//! primary architecture and for each competitor shape:
//!
//! - Primary: pod servers for throughput and fast-tier capacity, JBODs for the
//!   capacity tier, directors scaled with the pod count
//! - Nitro: homogeneous servers with one drive type
//! - Prime: servers with boot drives split from data drives
//! - E-Box: single box with an SLC buffer and QLC data drives
//! - C+D Box: compute boxes for throughput, data boxes for capacity
//!
//! All counts round up. Media sizes are searched smallest first; when no size
//! fits, the largest size is used and the unit count re-derived from it.
//! Competitors are all-flash: they size the whole request into the fast tier
//! and migrate into an external object store attached by the comparison.

use tracing::debug;

use crate::catalog::{
    CatalogEntry, CdBoxPricing, EBoxPricing, NitroPricing, PricingCatalog, PrimaryLimits,
    PrimaryPricing, PrimePricing,
};
use crate::error::{Result, TieringError};
use crate::types::{Architecture, ComponentCounts, SizedConfiguration, TierSpec, WorkloadRequest};

/// Per-node throughput of the baseline competitor shape (GB/s)
pub const BASELINE_NODE_THROUGHPUT_GBS: f64 = 40.0;
/// Drives per baseline competitor node
pub const BASELINE_DRIVES_PER_NODE: u32 = 14;
/// Drive size of the baseline competitor shape (TB)
pub const BASELINE_DRIVE_SIZE_TB: f64 = 30.0;
pub const BASELINE_MIN_NODES: u32 = 8;

/// Sizes one architecture from workload requirements
pub trait ArchitectureSizer {
    /// Architecture this sizer produces configurations for
    fn architecture(&self) -> Architecture;

    /// Size a configuration that meets the request
    fn size(&self, request: &WorkloadRequest) -> Result<SizedConfiguration>;
}

/// Build the sizer for `architecture`
///
/// Without a catalog the primary architecture uses its built-in limits and
/// every competitor falls back to the baseline server shape.
pub fn sizer_for(
    architecture: Architecture,
    catalog: Option<&PricingCatalog>,
    period: &str,
) -> Result<Box<dyn ArchitectureSizer>> {
    let Some(catalog) = catalog else {
        return Ok(match architecture {
            Architecture::Vdura => Box::new(PrimarySizer::new(PrimaryLimits::default())),
            competitor => Box::new(BaselineSizer::new(competitor)),
        });
    };

    Ok(match architecture {
        Architecture::Vdura => {
            let pricing: PrimaryPricing = catalog.entry(period)?;
            Box::new(PrimarySizer::new(pricing.limits))
        }
        Architecture::WekaNitro => Box::new(NitroSizer::new(catalog.entry(period)?)),
        Architecture::WekaPrime => Box::new(PrimeSizer::new(catalog.entry(period)?)),
        Architecture::CompVEbox => Box::new(EBoxSizer::new(catalog.entry(period)?)),
        Architecture::CompVCdBox => Box::new(CdBoxSizer::new(catalog.entry(period)?)),
    })
}

/// Units needed to cover `demand` at `per_unit` each
fn units_for(demand: f64, per_unit: f64) -> u32 {
    if demand <= 0.0 {
        return 0;
    }
    (demand / per_unit).ceil() as u32
}

/// Smallest size satisfying `fits`, if any
fn first_fit(sizes: &[f64], fits: impl Fn(f64) -> bool) -> Option<f64> {
    sizes.iter().copied().find(|&size| fits(size))
}

fn largest(architecture: Architecture, sizes: &[f64]) -> Result<f64> {
    sizes
        .last()
        .copied()
        .ok_or_else(|| TieringError::configuration(architecture.catalog_key(), "no media sizes listed"))
}

fn require_positive(architecture: Architecture, field: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TieringError::configuration(
            architecture.catalog_key(),
            format!("{} must be positive, got {}", field, value),
        ))
    }
}

/// Primary architecture sizer
pub struct PrimarySizer {
    limits: PrimaryLimits,
}

impl PrimarySizer {
    pub fn new(limits: PrimaryLimits) -> Self {
        PrimarySizer { limits }
    }

    fn validate_limits(&self) -> Result<Vec<f64>> {
        let arch = Architecture::Vdura;
        let limits = &self.limits;
        require_positive(arch, "pod_throughput_gbs", limits.pod_throughput_gbs)?;
        require_positive(arch, "jbod_capacity_tb", limits.jbod_capacity_tb)?;
        require_positive(arch, "drives_per_pod", limits.drives_per_pod as f64)?;
        require_positive(arch, "pods_per_extra_director", limits.pods_per_extra_director as f64)?;

        let mut sizes = limits.media_sizes_tb.clone();
        sizes.sort_by(|a, b| a.total_cmp(b));
        let smallest = sizes.first().copied().unwrap_or(0.0);
        require_positive(arch, "media_sizes_tb", smallest)?;
        Ok(sizes)
    }
}

impl ArchitectureSizer for PrimarySizer {
    fn architecture(&self) -> Architecture {
        Architecture::Vdura
    }

    fn size(&self, request: &WorkloadRequest) -> Result<SizedConfiguration> {
        let sizes = self.validate_limits()?;
        let limits = &self.limits;
        let drives = limits.drives_per_pod as f64;

        let fast_tb = request.fast_tier_capacity_tb();
        let capacity_tb = request.capacity_tier_capacity_tb();

        let pods_for_performance = units_for(request.throughput_gbs, limits.pod_throughput_gbs);
        let largest_media = largest(Architecture::Vdura, &sizes)?;
        let pods_for_capacity = units_for(fast_tb, largest_media * drives);

        let mut jbods = units_for(capacity_tb, limits.jbod_capacity_tb);
        if jbods > 0 && jbods < limits.min_jbods {
            jbods = limits.min_jbods;
        }

        // Fewer JBODs than pods needs the larger pod minimum
        let mut min_pods = limits.min_pods;
        let initial_pods = pods_for_performance.max(pods_for_capacity).max(min_pods);
        if jbods > 0 && jbods < initial_pods {
            min_pods = limits.min_pods_with_jbods;
        }
        let pods = pods_for_performance.max(pods_for_capacity).max(min_pods);

        let directors =
            limits.base_directors.saturating_add(pods.saturating_sub(1) / limits.pods_per_extra_director);

        let media_size_tb = first_fit(&sizes, |size| pods as f64 * drives * size >= fast_tb)
            .unwrap_or(largest_media);

        let director_capacity = directors as f64
            * limits.drives_per_director as f64
            * limits.director_drive_size_tb;
        let pod_capacity = pods as f64 * drives * media_size_tb;
        let capacity_bandwidth = jbods as f64 * limits.jbod_bandwidth_gbs;

        let config = SizedConfiguration {
            architecture: Architecture::Vdura,
            components: ComponentCounts::DirectorPod { directors, pods, jbods },
            media_size_tb,
            fast_tier: TierSpec::new(pods as f64 * limits.pod_throughput_gbs, director_capacity + pod_capacity),
            capacity_tier: TierSpec::new(capacity_bandwidth, jbods as f64 * limits.jbod_capacity_tb),
            migration_bandwidth_gbs: capacity_bandwidth,
            total_cost: None,
        };

        debug!(
            "Sized vdura: {} directors + {} pods x {}TB, {} JBODs ({:.1} GB/s migration)",
            directors, pods, media_size_tb, jbods, capacity_bandwidth
        );

        Ok(config)
    }
}

/// All-flash competitor configuration with no capacity tier attached yet
fn all_flash(
    architecture: Architecture,
    components: ComponentCounts,
    media_size_tb: f64,
    bandwidth_gbs: f64,
    capacity_tb: f64,
) -> SizedConfiguration {
    debug!(
        "Sized {}: {:?} x {}TB ({:.1} TB fast tier, {:.0} GB/s)",
        architecture, components, media_size_tb, capacity_tb, bandwidth_gbs
    );

    SizedConfiguration {
        architecture,
        components,
        media_size_tb,
        fast_tier: TierSpec::new(bandwidth_gbs, capacity_tb),
        capacity_tier: TierSpec::default(),
        migration_bandwidth_gbs: 0.0,
        total_cost: None,
    }
}

/// Homogeneous servers with a single data drive type
pub struct NitroSizer {
    pricing: NitroPricing,
}

impl NitroSizer {
    pub fn new(pricing: NitroPricing) -> Self {
        NitroSizer { pricing }
    }
}

impl ArchitectureSizer for NitroSizer {
    fn architecture(&self) -> Architecture {
        NitroPricing::ARCHITECTURE
    }

    fn size(&self, request: &WorkloadRequest) -> Result<SizedConfiguration> {
        let arch = self.architecture();
        let pricing = &self.pricing;
        require_positive(arch, "performance_per_server_gbs", pricing.performance_per_server_gbs)?;
        require_positive(arch, "ssds_per_server", pricing.ssds_per_server as f64)?;

        let capacity_tb = request.total_capacity_tb();
        let drives = pricing.ssds_per_server as f64;
        let sizes = pricing.ssds.sizes(arch)?;

        let servers_for_performance = units_for(request.throughput_gbs, pricing.performance_per_server_gbs);
        let mut servers = servers_for_performance.max(pricing.min_servers).max(1);

        let size_needed = capacity_tb / servers as f64 / drives;
        let media_size_tb = match first_fit(&sizes, |size| size >= size_needed) {
            Some(size) => size,
            None => {
                let size = largest(arch, &sizes)?;
                let servers_for_capacity = units_for(capacity_tb, size * drives);
                servers = servers_for_capacity
                    .max(servers_for_performance)
                    .max(pricing.min_servers);
                size
            }
        };

        Ok(all_flash(
            arch,
            ComponentCounts::Servers { servers },
            media_size_tb,
            servers as f64 * pricing.performance_per_server_gbs,
            servers as f64 * drives * media_size_tb,
        ))
    }
}

/// Servers whose boot drives do not hold data
pub struct PrimeSizer {
    pricing: PrimePricing,
}

impl PrimeSizer {
    pub fn new(pricing: PrimePricing) -> Self {
        PrimeSizer { pricing }
    }

    /// Boot capacity carried by every server (TB)
    fn boot_capacity_tb(&self) -> Result<f64> {
        let arch = self.architecture();
        let boot = &self.pricing.boot_ssds;
        let boot_size = boot.prices.sizes(arch)?.first().copied().unwrap_or(0.0);
        Ok(boot_size * boot.count as f64)
    }
}

impl ArchitectureSizer for PrimeSizer {
    fn architecture(&self) -> Architecture {
        PrimePricing::ARCHITECTURE
    }

    fn size(&self, request: &WorkloadRequest) -> Result<SizedConfiguration> {
        let arch = self.architecture();
        let pricing = &self.pricing;
        require_positive(arch, "performance_per_server_gbs", pricing.performance_per_server_gbs)?;
        require_positive(arch, "data_ssds.count", pricing.data_ssds.count as f64)?;

        let capacity_tb = request.total_capacity_tb();
        let boot_tb = self.boot_capacity_tb()?;
        let data_drives = pricing.data_ssds.count as f64;
        let sizes = pricing.data_ssds.prices.sizes(arch)?;

        let servers_for_performance = units_for(request.throughput_gbs, pricing.performance_per_server_gbs);
        let mut servers = servers_for_performance.max(pricing.min_servers).max(1);

        let data_needed_per_server = capacity_tb / servers as f64 - boot_tb;
        let size_needed = data_needed_per_server / data_drives;
        let media_size_tb = match first_fit(&sizes, |size| size >= size_needed) {
            Some(size) => size,
            None => {
                let size = largest(arch, &sizes)?;
                let servers_for_capacity = units_for(capacity_tb, boot_tb + size * data_drives);
                servers = servers_for_capacity
                    .max(servers_for_performance)
                    .max(pricing.min_servers);
                size
            }
        };

        let capacity_per_server = boot_tb + media_size_tb * data_drives;

        Ok(all_flash(
            arch,
            ComponentCounts::Servers { servers },
            media_size_tb,
            servers as f64 * pricing.performance_per_server_gbs,
            servers as f64 * capacity_per_server,
        ))
    }
}

/// Single box type with SLC buffer and QLC data drives
pub struct EBoxSizer {
    pricing: EBoxPricing,
}

impl EBoxSizer {
    pub fn new(pricing: EBoxPricing) -> Self {
        EBoxSizer { pricing }
    }
}

impl ArchitectureSizer for EBoxSizer {
    fn architecture(&self) -> Architecture {
        EBoxPricing::ARCHITECTURE
    }

    fn size(&self, request: &WorkloadRequest) -> Result<SizedConfiguration> {
        let arch = self.architecture();
        let pricing = &self.pricing;
        require_positive(arch, "performance_per_node_gbs", pricing.performance_per_node_gbs)?;
        require_positive(arch, "qlc_ssds.count", pricing.qlc_ssds.count as f64)?;

        let capacity_tb = request.total_capacity_tb();
        let slc_tb = pricing.slc_flash.size_tb;
        let qlc_drives = pricing.qlc_ssds.count as f64;
        let sizes = pricing.qlc_ssds.prices.sizes(arch)?;

        let nodes_for_performance = units_for(request.throughput_gbs, pricing.performance_per_node_gbs);
        let mut nodes = nodes_for_performance.max(pricing.min_nodes).max(1);

        let qlc_needed = capacity_tb - nodes as f64 * slc_tb;
        let size_needed = qlc_needed / (nodes as f64 * qlc_drives);
        let media_size_tb = match first_fit(&sizes, |size| size >= size_needed) {
            Some(size) => size,
            None => {
                let size = largest(arch, &sizes)?;
                let nodes_for_capacity = units_for(capacity_tb, slc_tb + size * qlc_drives);
                nodes = nodes_for_capacity
                    .max(nodes_for_performance)
                    .max(pricing.min_nodes);
                size
            }
        };

        Ok(all_flash(
            arch,
            ComponentCounts::EBoxes { nodes },
            media_size_tb,
            nodes as f64 * pricing.performance_per_node_gbs,
            nodes as f64 * (slc_tb + media_size_tb * qlc_drives),
        ))
    }
}

/// Compute boxes for throughput, data boxes for capacity
pub struct CdBoxSizer {
    pricing: CdBoxPricing,
}

impl CdBoxSizer {
    pub fn new(pricing: CdBoxPricing) -> Self {
        CdBoxSizer { pricing }
    }

    fn capacity_per_d_box(&self, qlc_size_tb: f64) -> f64 {
        let d_box = &self.pricing.d_box;
        d_box.scm_capacity_tb() + qlc_size_tb * d_box.qlc_ssds.count as f64
    }
}

impl ArchitectureSizer for CdBoxSizer {
    fn architecture(&self) -> Architecture {
        CdBoxPricing::ARCHITECTURE
    }

    fn size(&self, request: &WorkloadRequest) -> Result<SizedConfiguration> {
        let arch = self.architecture();
        let pricing = &self.pricing;
        require_positive(arch, "c_box.performance_per_node_gbs", pricing.c_box.performance_per_node_gbs)?;
        require_positive(arch, "d_box.qlc_ssds.count", pricing.d_box.qlc_ssds.count as f64)?;

        let capacity_tb = request.total_capacity_tb();
        let sizes = pricing.d_box.qlc_ssds.prices.sizes(arch)?;

        // Smallest QLC that meets capacity with the minimum D-Box count
        let (qlc_size, d_boxes_for_capacity) = match first_fit(&sizes, |size| {
            units_for(capacity_tb, self.capacity_per_d_box(size)) <= pricing.min_d_boxes
        }) {
            Some(size) => (size, pricing.min_d_boxes),
            None => {
                let smallest = sizes[0];
                (smallest, units_for(capacity_tb, self.capacity_per_d_box(smallest)))
            }
        };

        let c_boxes = units_for(request.throughput_gbs, pricing.c_box.performance_per_node_gbs)
            .max(pricing.min_c_boxes)
            .max(1);

        // Never more C-Boxes than D-Boxes; only ever adds capacity
        let d_boxes = d_boxes_for_capacity.max(c_boxes).max(pricing.min_d_boxes);

        Ok(all_flash(
            arch,
            ComponentCounts::CdBoxes { c_boxes, d_boxes },
            qlc_size,
            c_boxes as f64 * pricing.c_box.performance_per_node_gbs,
            d_boxes as f64 * self.capacity_per_d_box(qlc_size),
        ))
    }
}

/// Generic server shape used when no pricing catalog is available
pub struct BaselineSizer {
    architecture: Architecture,
}

impl BaselineSizer {
    pub fn new(architecture: Architecture) -> Self {
        BaselineSizer { architecture }
    }
}

impl ArchitectureSizer for BaselineSizer {
    fn architecture(&self) -> Architecture {
        self.architecture
    }

    fn size(&self, request: &WorkloadRequest) -> Result<SizedConfiguration> {
        let per_node_tb = BASELINE_DRIVES_PER_NODE as f64 * BASELINE_DRIVE_SIZE_TB;
        let nodes = units_for(request.throughput_gbs, BASELINE_NODE_THROUGHPUT_GBS)
            .max(units_for(request.total_capacity_tb(), per_node_tb))
            .max(BASELINE_MIN_NODES);

        Ok(all_flash(
            self.architecture,
            ComponentCounts::Servers { servers: nodes },
            BASELINE_DRIVE_SIZE_TB,
            nodes as f64 * BASELINE_NODE_THROUGHPUT_GBS,
            nodes as f64 * per_node_tb,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::catalog::DEFAULT_PRICING_PERIOD;

    fn primary(request: &WorkloadRequest) -> SizedConfiguration {
        PrimarySizer::new(PrimaryLimits::default()).size(request).unwrap()
    }

    fn competitor(arch: Architecture, request: &WorkloadRequest) -> SizedConfiguration {
        let catalog = sample_catalog();
        sizer_for(arch, Some(&catalog), DEFAULT_PRICING_PERIOD)
            .unwrap()
            .size(request)
            .unwrap()
    }

    #[test]
    fn test_primary_reference_scenario() {
        // 10PB, 20% fast tier, 200 GB/s
        let config = primary(&WorkloadRequest::new(10.0, 20.0, 200.0));

        // 4 pods for throughput, 6 for 2000TB at 30TB drives, 3 JBODs < pods raises min to 6
        assert_eq!(
            config.components,
            ComponentCounts::DirectorPod { directors: 3, pods: 6, jbods: 3 }
        );
        assert_eq!(config.media_size_tb, 30.0);
        assert_eq!(config.fast_tier.bandwidth_gbs, 390.0);
        assert_eq!(config.fast_tier.capacity_tb, 3.0 * 2.0 * 2.0 + 6.0 * 12.0 * 30.0);
        assert_eq!(config.capacity_tier.capacity_tb, 9720.0);
        assert!((config.migration_bandwidth_gbs - 64.5).abs() < 1e-9);
        assert!(config.total_cost.is_none());
    }

    #[test]
    fn test_primary_picks_smallest_fitting_media() {
        // 1PB at 10% = 100TB fast tier, 3 pods x 12 x 8TB = 288TB
        let config = primary(&WorkloadRequest::new(1.0, 10.0, 100.0));
        assert_eq!(config.media_size_tb, 8.0);
        assert_eq!(config.components.performance_units(), 3);

        // 4.5PB fast tier forces the capacity-driven pod count
        let config = primary(&WorkloadRequest::new(5.0, 90.0, 100.0));
        assert_eq!(config.media_size_tb, 30.0);
        assert_eq!(config.components.performance_units(), 13);
    }

    #[test]
    fn test_primary_all_fast_tier_has_no_jbods() {
        let config = primary(&WorkloadRequest::new(2.0, 100.0, 100.0));
        match config.components {
            ComponentCounts::DirectorPod { pods, jbods, .. } => {
                assert_eq!(jbods, 0);
                // ceil(2000 / 360), no JBOD-driven minimum
                assert_eq!(pods, 6);
            }
            other => panic!("unexpected components {:?}", other),
        }
        assert!(config.capacity_tier.is_absent());
        assert_eq!(config.migration_bandwidth_gbs, 0.0);
    }

    #[test]
    fn test_primary_jbod_minimum() {
        // 1PB capacity tier needs 1 JBOD, clamped to 3
        let config = primary(&WorkloadRequest::new(1.25, 20.0, 50.0));
        match config.components {
            ComponentCounts::DirectorPod { pods, jbods, .. } => {
                assert_eq!(jbods, 3);
                assert_eq!(pods, 3);
            }
            other => panic!("unexpected components {:?}", other),
        }
    }

    #[test]
    fn test_primary_director_scaling() {
        // 21 pods: 3 base + 2 extra
        let config = primary(&WorkloadRequest::new(1.0, 20.0, 21.0 * 65.0));
        match config.components {
            ComponentCounts::DirectorPod { directors, pods, .. } => {
                assert_eq!(pods, 21);
                assert_eq!(directors, 5);
            }
            other => panic!("unexpected components {:?}", other),
        }
    }

    #[test]
    fn test_primary_rejects_broken_limits() {
        let limits = PrimaryLimits { media_sizes_tb: vec![], ..PrimaryLimits::default() };
        let err = PrimarySizer::new(limits)
            .size(&WorkloadRequest::new(1.0, 20.0, 100.0))
            .unwrap_err();
        assert!(matches!(err, TieringError::Configuration { .. }));
    }

    #[test]
    fn test_capacity_never_below_request() {
        for &(pb, pct, gbs) in &[
            (1.0, 20.0, 50.0),
            (10.0, 20.0, 200.0),
            (25.0, 50.0, 800.0),
            (80.0, 100.0, 2000.0),
            (150.0, 5.0, 40.0),
        ] {
            let request = WorkloadRequest::new(pb, pct, gbs);

            let config = primary(&request);
            assert!(config.fast_tier.capacity_tb >= request.fast_tier_capacity_tb());
            assert!(config.capacity_tier.capacity_tb >= request.capacity_tier_capacity_tb());
            assert!(config.fast_tier.bandwidth_gbs >= gbs);

            for arch in Architecture::COMPETITORS {
                let config = competitor(arch, &request);
                assert!(
                    config.fast_tier.capacity_tb >= request.total_capacity_tb(),
                    "{} under-provisioned for {:?}",
                    arch,
                    request
                );
                assert!(config.fast_tier.bandwidth_gbs >= gbs);
            }

            let config = BaselineSizer::new(Architecture::WekaNitro).size(&request).unwrap();
            assert!(config.fast_tier.capacity_tb >= request.total_capacity_tb());
        }
    }

    #[test]
    fn test_unit_counts_monotonic_in_throughput() {
        for arch in [Architecture::Vdura, Architecture::WekaNitro, Architecture::WekaPrime, Architecture::CompVEbox, Architecture::CompVCdBox] {
            let mut previous = 0;
            for step in 1..40 {
                let request = WorkloadRequest::new(20.0, 30.0, step as f64 * 50.0);
                let config = if arch == Architecture::Vdura {
                    primary(&request)
                } else {
                    competitor(arch, &request)
                };
                let units = config.components.total_nodes();
                assert!(units >= previous, "{} dropped from {} to {} units", arch, previous, units);
                previous = units;
            }
        }
    }

    #[test]
    fn test_nitro_first_fit_and_fallback() {
        // 1PB over 8 servers x 14 drives needs 8.9TB drives -> 15TB
        let config = competitor(Architecture::WekaNitro, &WorkloadRequest::new(1.0, 20.0, 100.0));
        assert_eq!(config.components, ComponentCounts::Servers { servers: 8 });
        assert_eq!(config.media_size_tb, 15.0);
        assert_eq!(config.fast_tier.capacity_tb, 8.0 * 14.0 * 15.0);
        assert_eq!(config.fast_tier.bandwidth_gbs, 320.0);
        assert!(config.capacity_tier.is_absent());

        // 10PB does not fit on 8 servers -> 30TB drives and ceil(10000/420) servers
        let config = competitor(Architecture::WekaNitro, &WorkloadRequest::new(10.0, 20.0, 100.0));
        assert_eq!(config.media_size_tb, 30.0);
        assert_eq!(config.components, ComponentCounts::Servers { servers: 24 });
    }

    #[test]
    fn test_prime_counts_boot_drives() {
        // 8 servers, 2x8TB boot each: (3000/8 - 16)/18 = 19.9TB -> 30TB data drives
        let config = competitor(Architecture::WekaPrime, &WorkloadRequest::new(3.0, 20.0, 100.0));
        assert_eq!(config.components, ComponentCounts::Servers { servers: 8 });
        assert_eq!(config.media_size_tb, 30.0);
        assert_eq!(config.fast_tier.capacity_tb, 8.0 * (16.0 + 18.0 * 30.0));
    }

    #[test]
    fn test_ebox_sizing() {
        // 11 nodes with 4.8TB SLC: (2000 - 52.8) / 99 = 19.7TB -> 30TB QLC
        let config = competitor(Architecture::CompVEbox, &WorkloadRequest::new(2.0, 20.0, 100.0));
        assert_eq!(config.components, ComponentCounts::EBoxes { nodes: 11 });
        assert_eq!(config.media_size_tb, 30.0);
        assert!((config.fast_tier.capacity_tb - 11.0 * (4.8 + 270.0)).abs() < 1e-9);
        assert_eq!(config.fast_tier.bandwidth_gbs, 440.0);
    }

    #[test]
    fn test_cdbox_d_boxes_at_least_c_boxes() {
        // 400 GB/s -> 10 C-Boxes; capacity alone would fit in 2 D-Boxes
        let config = competitor(Architecture::CompVCdBox, &WorkloadRequest::new(1.0, 20.0, 400.0));
        match config.components {
            ComponentCounts::CdBoxes { c_boxes, d_boxes } => {
                assert_eq!(c_boxes, 10);
                assert_eq!(d_boxes, 10);
            }
            other => panic!("unexpected components {:?}", other),
        }
        assert_eq!(config.media_size_tb, 30.0);
        assert_eq!(config.fast_tier.bandwidth_gbs, 400.0);
    }

    #[test]
    fn test_cdbox_scales_d_boxes_for_capacity() {
        // 20PB cannot fit on 2 D-Boxes with any QLC: smallest QLC and more boxes
        let config = competitor(Architecture::CompVCdBox, &WorkloadRequest::new(20.0, 20.0, 100.0));
        match config.components {
            ComponentCounts::CdBoxes { c_boxes, d_boxes } => {
                assert_eq!(c_boxes, 4);
                // 20000 / (6.4 + 22 x 30)
                assert_eq!(d_boxes, 31);
            }
            other => panic!("unexpected components {:?}", other),
        }
        assert_eq!(config.media_size_tb, 30.0);
    }

    #[test]
    fn test_absurd_capacity_saturates_counts() {
        let request = WorkloadRequest::new(1e12, 20.0, 200.0);
        assert!(request.validate().is_ok());
        for arch in [Architecture::Vdura, Architecture::WekaNitro, Architecture::WekaPrime, Architecture::CompVEbox, Architecture::CompVCdBox] {
            let config = if arch == Architecture::Vdura {
                primary(&request)
            } else {
                competitor(arch, &request)
            };
            assert_eq!(config.components.total_nodes(), u32::MAX, "{}", arch);
        }
    }

    #[test]
    fn test_cdbox_capacity_covers_request() {
        for capacity_pb in [0.5, 1.0, 1.3, 2.0, 7.5, 20.0, 55.0] {
            for throughput in [50.0, 400.0, 2_000.0] {
                let request = WorkloadRequest::new(capacity_pb, 20.0, throughput);
                let config = competitor(Architecture::CompVCdBox, &request);
                assert!(
                    config.fast_tier.capacity_tb >= request.total_capacity_tb(),
                    "{} PB @ {} GB/s sized to {} TB",
                    capacity_pb,
                    throughput,
                    config.fast_tier.capacity_tb
                );
            }
        }
    }

    #[test]
    fn test_baseline_shape() {
        let config = BaselineSizer::new(Architecture::WekaPrime)
            .size(&WorkloadRequest::new(1.0, 20.0, 500.0))
            .unwrap();
        assert_eq!(config.architecture, Architecture::WekaPrime);
        assert_eq!(config.components, ComponentCounts::Servers { servers: 13 });
        assert_eq!(config.media_size_tb, 30.0);
        assert_eq!(config.fast_tier.bandwidth_gbs, 520.0);

        // 10PB over 14 x 30TB nodes outgrows the throughput count
        let config = BaselineSizer::new(Architecture::WekaNitro)
            .size(&WorkloadRequest::new(10.0, 20.0, 200.0))
            .unwrap();
        assert_eq!(config.components, ComponentCounts::Servers { servers: 24 });
        assert!(config.fast_tier.capacity_tb >= 10_000.0);
    }

    #[test]
    fn test_sizer_for_without_catalog() {
        let sizer = sizer_for(Architecture::CompVEbox, None, DEFAULT_PRICING_PERIOD).unwrap();
        assert_eq!(sizer.architecture(), Architecture::CompVEbox);
        let config = sizer.size(&WorkloadRequest::new(1.0, 20.0, 100.0)).unwrap();
        assert_eq!(config.components, ComponentCounts::Servers { servers: 8 });
    }

    #[test]
    fn test_sizing_is_deterministic() {
        let request = WorkloadRequest::new(12.0, 35.0, 640.0);
        for arch in Architecture::COMPETITORS {
            assert_eq!(competitor(arch, &request), competitor(arch, &request));
        }
        assert_eq!(primary(&request), primary(&request));
    }
}
