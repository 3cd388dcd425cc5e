//! Cost estimation
//!
//! Hardware is summed per component category, then uplifted:
//!
//! ```text
//! total = (hardware + hardware * software_support_multiplier) * (1 + partner_margin)
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{
    CatalogEntry, CdBoxPricing, EBoxPricing, NitroPricing, PricingCatalog, PrimaryPricing,
    PrimePricing,
};
use crate::error::{Result, TieringError};
use crate::types::{Architecture, ComponentCounts, SizedConfiguration};

/// One hardware category of a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub component: String,
    pub amount: f64,
}

/// Cost roll-up for a sized configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub lines: Vec<CostLine>,
    pub hardware: f64,
    pub software_support: f64,
    pub subtotal: f64,
    pub total: f64,
}

impl CostBreakdown {
    fn from_lines<P: CatalogEntry>(lines: Vec<CostLine>, pricing: &P) -> Self {
        let hardware: f64 = lines.iter().map(|line| line.amount).sum();
        let software_support = hardware * pricing.software_support_multiplier();
        let subtotal = hardware + software_support;

        CostBreakdown {
            lines,
            hardware,
            software_support,
            subtotal,
            total: subtotal * (1.0 + pricing.partner_margin()),
        }
    }
}

fn line(component: &str, amount: f64) -> CostLine {
    CostLine {
        component: component.to_string(),
        amount,
    }
}

/// Estimate the cost of `config` from the pricing of `period`
pub fn estimate_cost(
    config: &SizedConfiguration,
    catalog: &PricingCatalog,
    period: &str,
) -> Result<CostBreakdown> {
    match (config.architecture, config.components) {
        (Architecture::Vdura, ComponentCounts::DirectorPod { directors, pods, jbods }) => {
            let pricing: PrimaryPricing = catalog.entry(period)?;
            primary_cost(&pricing, directors, pods, jbods, config.media_size_tb)
        }
        (Architecture::WekaNitro, ComponentCounts::Servers { servers }) => {
            let pricing: NitroPricing = catalog.entry(period)?;
            nitro_cost(&pricing, servers, config.media_size_tb)
        }
        (Architecture::WekaPrime, ComponentCounts::Servers { servers }) => {
            let pricing: PrimePricing = catalog.entry(period)?;
            prime_cost(&pricing, servers, config.media_size_tb)
        }
        (Architecture::CompVEbox, ComponentCounts::EBoxes { nodes }) => {
            let pricing: EBoxPricing = catalog.entry(period)?;
            ebox_cost(&pricing, nodes, config.media_size_tb)
        }
        (Architecture::CompVCdBox, ComponentCounts::CdBoxes { c_boxes, d_boxes }) => {
            let pricing: CdBoxPricing = catalog.entry(period)?;
            cdbox_cost(&pricing, c_boxes, d_boxes, config.media_size_tb)
        }
        (architecture, components) => Err(TieringError::configuration(
            architecture.catalog_key(),
            format!("no pricing model for {:?}", components),
        )),
    }
}

fn primary_cost(
    pricing: &PrimaryPricing,
    directors: u32,
    pods: u32,
    jbods: u32,
    media_size_tb: f64,
) -> Result<CostBreakdown> {
    let arch = PrimaryPricing::ARCHITECTURE;
    let directors = directors as f64;
    let pods = pods as f64;

    let director_drive = pricing.ssds.price_by_key(arch, &pricing.velo_ssd_size)?;
    let pod_drive = pricing.ssds.price(arch, media_size_tb)?;

    let lines = vec![
        line("director nodes", directors * pricing.velo_director.base_cost),
        line("director ssds", directors * pricing.ssds_per_velo as f64 * director_drive),
        line(
            "director dram",
            directors * pricing.velo_director.dram_gb * pricing.dram_price_per_gb,
        ),
        line("pod servers", pods * pricing.vpod_server.base_cost),
        line("pod ssds", pods * pricing.ssds_per_vpod as f64 * pod_drive),
        line(
            "pod dram",
            pods * pricing.vpod_server.dram_gb * pricing.dram_price_per_gb,
        ),
        line("jbods", jbods as f64 * pricing.jbod_4u108.cost),
    ];

    Ok(CostBreakdown::from_lines(lines, pricing))
}

fn nitro_cost(pricing: &NitroPricing, servers: u32, media_size_tb: f64) -> Result<CostBreakdown> {
    let servers = servers as f64;
    let drive = pricing.ssds.price(NitroPricing::ARCHITECTURE, media_size_tb)?;

    let lines = vec![
        line("servers", servers * pricing.server_base_cost),
        line("cpus", servers * pricing.cpu_cost),
        line("dram", servers * pricing.dram_gb * pricing.dram_price_per_gb),
        line("nics", servers * pricing.nic_cost),
        line("ssds", servers * pricing.ssds_per_server as f64 * drive),
    ];

    Ok(CostBreakdown::from_lines(lines, pricing))
}

fn prime_cost(pricing: &PrimePricing, servers: u32, media_size_tb: f64) -> Result<CostBreakdown> {
    let arch = PrimePricing::ARCHITECTURE;
    let servers = servers as f64;

    let boot = &pricing.boot_ssds;
    let boot_size = boot.prices.sizes(arch)?.first().copied().unwrap_or(0.0);
    let boot_drive = boot.prices.price(arch, boot_size)?;
    let data_drive = pricing.data_ssds.prices.price(arch, media_size_tb)?;

    let lines = vec![
        line("servers", servers * pricing.server_base_cost),
        line("cpus", servers * pricing.cpu_cost),
        line("dram", servers * pricing.dram_gb * pricing.dram_price_per_gb),
        line("nics", servers * pricing.nic_cost),
        line("boot ssds", servers * boot.count as f64 * boot_drive),
        line(
            "data ssds",
            servers * pricing.data_ssds.count as f64 * data_drive,
        ),
    ];

    Ok(CostBreakdown::from_lines(lines, pricing))
}

fn ebox_cost(pricing: &EBoxPricing, nodes: u32, media_size_tb: f64) -> Result<CostBreakdown> {
    let nodes = nodes as f64;
    let qlc_drive = pricing.qlc_ssds.prices.price(EBoxPricing::ARCHITECTURE, media_size_tb)?;

    let lines = vec![
        line("nodes", nodes * pricing.node_base_cost),
        line("dram", nodes * pricing.dram_gb * pricing.dram_price_per_gb),
        line("slc flash", nodes * pricing.slc_flash.cost),
        line("qlc ssds", nodes * pricing.qlc_ssds.count as f64 * qlc_drive),
    ];

    Ok(CostBreakdown::from_lines(lines, pricing))
}

fn cdbox_cost(
    pricing: &CdBoxPricing,
    c_boxes: u32,
    d_boxes: u32,
    media_size_tb: f64,
) -> Result<CostBreakdown> {
    let d_box = &pricing.d_box;
    let d_boxes = d_boxes as f64;
    let qlc_drive = d_box.qlc_ssds.prices.price(CdBoxPricing::ARCHITECTURE, media_size_tb)?;

    let lines = vec![
        line("c-boxes", c_boxes as f64 * pricing.c_box.base_cost),
        line("d-boxes", d_boxes * d_box.base_cost),
        line(
            "scm drives",
            d_boxes * d_box.scm_drives.count as f64 * d_box.scm_drives.cost_per_drive,
        ),
        line("qlc ssds", d_boxes * d_box.qlc_ssds.count as f64 * qlc_drive),
    ];

    Ok(CostBreakdown::from_lines(lines, pricing))
}
