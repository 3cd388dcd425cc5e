//! Pricing catalog
//!
//! Read-only table of unit costs and architecture limits, keyed by pricing
//! period and then by architecture:
//!
//! ```json
//! {
//!   "quarters": {
//!     "Q2_2026": {
//!       "vdura": { "software_support_multiplier": 0.5, ... },
//!       "weka_nitro": { "min_servers": 8, ... }
//!     }
//!   }
//! }
//! ```
//!
//! Architecture entries stay as raw JSON until a sizer or the cost estimator
//! asks for them, so a malformed entry only fails its own architecture.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TieringError};
use crate::types::Architecture;

/// Pricing period used when none is configured
pub const DEFAULT_PRICING_PERIOD: &str = "Q2_2026";

/// Partner margin applied on top of hardware + software for every architecture
pub const DEFAULT_PARTNER_MARGIN: f64 = 0.15;

fn default_partner_margin() -> f64 {
    DEFAULT_PARTNER_MARGIN
}

/// Parsed pricing document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingCatalog {
    pub quarters: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl PricingCatalog {
    /// Load the pricing document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&contents)?;
        debug!(
            "Loaded pricing catalog from {} ({} periods)",
            path.display(),
            catalog.quarters.len()
        );
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pricing periods present in the document
    pub fn periods(&self) -> impl Iterator<Item = &str> {
        self.quarters.keys().map(String::as_str)
    }

    /// Decode the entry for `T::ARCHITECTURE` in `period`
    pub fn entry<T: CatalogEntry>(&self, period: &str) -> Result<T> {
        let architecture = T::ARCHITECTURE;
        let quarter = self.quarters.get(period).ok_or_else(|| {
            TieringError::configuration(architecture.catalog_key(), format!("pricing period {} not found", period))
        })?;
        let raw = quarter.get(architecture.catalog_key()).ok_or_else(|| {
            TieringError::configuration(
                architecture.catalog_key(),
                format!("no entry in pricing period {}", period),
            )
        })?;

        serde_json::from_value(raw.clone())
            .map_err(|e| TieringError::configuration(architecture.catalog_key(), e.to_string()))
    }
}

/// A typed architecture entry of the pricing catalog
pub trait CatalogEntry: DeserializeOwned {
    const ARCHITECTURE: Architecture;

    /// Software/support uplift on hardware cost
    fn software_support_multiplier(&self) -> f64;

    /// Partner margin on hardware + software
    fn partner_margin(&self) -> f64;
}

/// Unit prices keyed by media size (`"8TB"`, `"15.36TB"`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaPrices(pub BTreeMap<String, f64>);

impl MediaPrices {
    /// Available media sizes (TB), ascending
    pub fn sizes(&self, architecture: Architecture) -> Result<Vec<f64>> {
        let mut sizes = self
            .0
            .keys()
            .map(|key| parse_size_key(architecture, key))
            .collect::<Result<Vec<f64>>>()?;

        if sizes.is_empty() {
            return Err(TieringError::configuration(
                architecture.catalog_key(),
                "no media sizes listed",
            ));
        }

        sizes.sort_by(|a, b| a.total_cmp(b));
        Ok(sizes)
    }

    /// Unit price of the media of `size_tb`
    pub fn price(&self, architecture: Architecture, size_tb: f64) -> Result<f64> {
        for (key, price) in &self.0 {
            if (parse_size_key(architecture, key)? - size_tb).abs() < 1e-9 {
                return Ok(*price);
            }
        }
        Err(TieringError::configuration(
            architecture.catalog_key(),
            format!("no price for {}TB media", size_tb),
        ))
    }

    /// Unit price by raw catalog key
    pub fn price_by_key(&self, architecture: Architecture, key: &str) -> Result<f64> {
        self.0.get(key).copied().ok_or_else(|| {
            TieringError::configuration(architecture.catalog_key(), format!("no price for {} media", key))
        })
    }
}

fn parse_size_key(architecture: Architecture, key: &str) -> Result<f64> {
    key.trim_end_matches("TB").parse::<f64>().map_err(|_| {
        TieringError::configuration(
            architecture.catalog_key(),
            format!("media key {:?} is not a size", key),
        )
    })
}

/// Media prices plus how many drives of that kind a node carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaTable {
    pub count: u32,
    #[serde(flatten)]
    pub prices: MediaPrices,
}

/// Base price and memory of a server class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePricing {
    pub base_cost: f64,
    pub dram_gb: f64,
}

/// Capacity-tier enclosure price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnclosurePricing {
    pub cost: f64,
}

/// Fixed limits of the primary architecture
///
/// Catalog entries may override any of them under a `limits` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryLimits {
    /// Throughput of one pod server (GB/s)
    pub pod_throughput_gbs: f64,
    /// Data drive slots per pod server
    pub drives_per_pod: u32,
    /// Drives per director node
    pub drives_per_director: u32,
    /// Size of each director drive (TB)
    pub director_drive_size_tb: f64,
    /// Bandwidth of one JBOD enclosure (GB/s)
    pub jbod_bandwidth_gbs: f64,
    /// Capacity of one JBOD enclosure (TB), 108 x 30TB HDDs
    pub jbod_capacity_tb: f64,
    pub min_pods: u32,
    /// Pod minimum once there are fewer JBODs than pods
    pub min_pods_with_jbods: u32,
    /// JBOD minimum once any JBOD is needed
    pub min_jbods: u32,
    pub base_directors: u32,
    /// One more director for every this many pods beyond the first
    pub pods_per_extra_director: u32,
    /// Data drive sizes offered in pod servers (TB), ascending
    pub media_sizes_tb: Vec<f64>,
}

impl Default for PrimaryLimits {
    fn default() -> Self {
        PrimaryLimits {
            pod_throughput_gbs: 65.0,
            drives_per_pod: 12,
            drives_per_director: 2,
            director_drive_size_tb: 2.0,
            jbod_bandwidth_gbs: 21.5,
            jbod_capacity_tb: 3240.0,
            min_pods: 3,
            min_pods_with_jbods: 6,
            min_jbods: 3,
            base_directors: 3,
            pods_per_extra_director: 10,
            media_sizes_tb: vec![8.0, 15.0, 30.0],
        }
    }
}

/// Primary architecture pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryPricing {
    pub velo_director: NodePricing,
    pub vpod_server: NodePricing,
    pub ssds: MediaPrices,
    pub ssds_per_velo: u32,
    pub ssds_per_vpod: u32,
    /// Catalog key of the director drive (e.g. `"2TB"`)
    pub velo_ssd_size: String,
    pub dram_price_per_gb: f64,
    pub jbod_4u108: EnclosurePricing,
    pub software_support_multiplier: f64,
    #[serde(default = "default_partner_margin")]
    pub partner_margin: f64,
    #[serde(default)]
    pub limits: PrimaryLimits,
}

impl CatalogEntry for PrimaryPricing {
    const ARCHITECTURE: Architecture = Architecture::Vdura;

    fn software_support_multiplier(&self) -> f64 {
        self.software_support_multiplier
    }

    fn partner_margin(&self) -> f64 {
        self.partner_margin
    }
}

/// Server shape with uniform data drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NitroPricing {
    pub performance_per_server_gbs: f64,
    pub min_servers: u32,
    pub ssds_per_server: u32,
    pub ssds: MediaPrices,
    pub server_base_cost: f64,
    pub cpu_cost: f64,
    pub dram_gb: f64,
    pub dram_price_per_gb: f64,
    pub nic_cost: f64,
    pub software_support_multiplier: f64,
    #[serde(default = "default_partner_margin")]
    pub partner_margin: f64,
}

impl CatalogEntry for NitroPricing {
    const ARCHITECTURE: Architecture = Architecture::WekaNitro;

    fn software_support_multiplier(&self) -> f64 {
        self.software_support_multiplier
    }

    fn partner_margin(&self) -> f64 {
        self.partner_margin
    }
}

/// Server shape with boot drives split from data drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimePricing {
    pub performance_per_server_gbs: f64,
    pub min_servers: u32,
    pub boot_ssds: MediaTable,
    pub data_ssds: MediaTable,
    pub server_base_cost: f64,
    pub cpu_cost: f64,
    pub dram_gb: f64,
    pub dram_price_per_gb: f64,
    pub nic_cost: f64,
    pub software_support_multiplier: f64,
    #[serde(default = "default_partner_margin")]
    pub partner_margin: f64,
}

impl CatalogEntry for PrimePricing {
    const ARCHITECTURE: Architecture = Architecture::WekaPrime;

    fn software_support_multiplier(&self) -> f64 {
        self.software_support_multiplier
    }

    fn partner_margin(&self) -> f64 {
        self.partner_margin
    }
}

/// SLC write buffer fitted to every E-Box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlcFlash {
    pub size_tb: f64,
    pub cost: f64,
}

/// Single-box shape with SLC buffer and QLC data drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EBoxPricing {
    pub performance_per_node_gbs: f64,
    pub min_nodes: u32,
    pub node_base_cost: f64,
    pub dram_gb: f64,
    pub dram_price_per_gb: f64,
    pub slc_flash: SlcFlash,
    pub qlc_ssds: MediaTable,
    pub software_support_multiplier: f64,
    #[serde(default = "default_partner_margin")]
    pub partner_margin: f64,
}

impl CatalogEntry for EBoxPricing {
    const ARCHITECTURE: Architecture = Architecture::CompVEbox;

    fn software_support_multiplier(&self) -> f64 {
        self.software_support_multiplier
    }

    fn partner_margin(&self) -> f64 {
        self.partner_margin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CBoxPricing {
    pub performance_per_node_gbs: f64,
    pub base_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScmDrives {
    pub size_gb: f64,
    pub count: u32,
    pub cost_per_drive: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DBoxPricing {
    pub base_cost: f64,
    pub scm_drives: ScmDrives,
    pub qlc_ssds: MediaTable,
}

impl DBoxPricing {
    /// SCM capacity of one D-Box (TB)
    pub fn scm_capacity_tb(&self) -> f64 {
        (self.scm_drives.size_gb * self.scm_drives.count as f64) / 1000.0
    }
}

/// Compute boxes in front of data boxes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdBoxPricing {
    pub c_box: CBoxPricing,
    pub d_box: DBoxPricing,
    pub min_c_boxes: u32,
    pub min_d_boxes: u32,
    pub software_support_multiplier: f64,
    #[serde(default = "default_partner_margin")]
    pub partner_margin: f64,
}

impl CatalogEntry for CdBoxPricing {
    const ARCHITECTURE: Architecture = Architecture::CompVCdBox;

    fn software_support_multiplier(&self) -> f64 {
        self.software_support_multiplier
    }

    fn partner_margin(&self) -> f64 {
        self.partner_margin
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Pricing document shipped with the crate
    pub(crate) const SAMPLE_CATALOG: &str = include_str!("../pricing-config.json");

    pub(crate) fn sample_catalog() -> PricingCatalog {
        PricingCatalog::from_json_str(SAMPLE_CATALOG).unwrap()
    }

    #[test]
    fn test_sample_catalog_decodes_every_architecture() {
        let catalog = sample_catalog();
        assert_eq!(catalog.periods().collect::<Vec<_>>(), vec![DEFAULT_PRICING_PERIOD]);

        let primary: PrimaryPricing = catalog.entry(DEFAULT_PRICING_PERIOD).unwrap();
        assert_eq!(primary.limits, PrimaryLimits::default());
        assert_eq!(primary.partner_margin, DEFAULT_PARTNER_MARGIN);

        assert!(catalog.entry::<NitroPricing>(DEFAULT_PRICING_PERIOD).is_ok());
        assert!(catalog.entry::<PrimePricing>(DEFAULT_PRICING_PERIOD).is_ok());
        assert!(catalog.entry::<EBoxPricing>(DEFAULT_PRICING_PERIOD).is_ok());
        assert!(catalog.entry::<CdBoxPricing>(DEFAULT_PRICING_PERIOD).is_ok());
    }

    #[test]
    fn test_missing_period_is_configuration_error() {
        let catalog = sample_catalog();
        let err = catalog.entry::<NitroPricing>("Q1_1999").unwrap_err();
        assert!(matches!(err, TieringError::Configuration { .. }));
        assert!(err.to_string().contains("Q1_1999"));
    }

    #[test]
    fn test_malformed_entry_only_fails_its_architecture() {
        let json = r#"{
            "quarters": {
                "Q2_2026": {
                    "weka_nitro": { "min_servers": "eight" },
                    "comp_v_ebox": {
                        "performance_per_node_gbs": 40,
                        "min_nodes": 11,
                        "node_base_cost": 30000,
                        "dram_gb": 384,
                        "dram_price_per_gb": 5,
                        "slc_flash": { "size_tb": 4.8, "cost": 9000 },
                        "qlc_ssds": { "count": 9, "30TB": 3300, "60TB": 6900 },
                        "software_support_multiplier": 0.55
                    }
                }
            }
        }"#;
        let catalog = PricingCatalog::from_json_str(json).unwrap();

        let err = catalog.entry::<NitroPricing>("Q2_2026").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error for weka_nitro"));

        let ebox: EBoxPricing = catalog.entry("Q2_2026").unwrap();
        assert_eq!(ebox.qlc_ssds.count, 9);
        assert_eq!(ebox.qlc_ssds.prices.sizes(Architecture::CompVEbox).unwrap(), vec![30.0, 60.0]);
        assert_eq!(ebox.partner_margin, 0.15);

        assert!(catalog.entry::<CdBoxPricing>("Q2_2026").is_err());
    }

    #[test]
    fn test_media_prices_lookup() {
        let mut map = BTreeMap::new();
        map.insert("30TB".to_string(), 3000.0);
        map.insert("15.36TB".to_string(), 1600.0);
        map.insert("7.68TB".to_string(), 900.0);
        let prices = MediaPrices(map);

        let arch = Architecture::WekaNitro;
        assert_eq!(prices.sizes(arch).unwrap(), vec![7.68, 15.36, 30.0]);
        assert_eq!(prices.price(arch, 15.36).unwrap(), 1600.0);
        assert_eq!(prices.price_by_key(arch, "30TB").unwrap(), 3000.0);
        assert!(prices.price(arch, 61.44).is_err());
        assert!(prices.price_by_key(arch, "2TB").is_err());
    }

    #[test]
    fn test_unparsable_media_key() {
        let mut map = BTreeMap::new();
        map.insert("large".to_string(), 1.0);
        let err = MediaPrices(map).sizes(Architecture::WekaNitro).unwrap_err();
        assert!(err.to_string().contains("not a size"));

        let err = MediaPrices::default().sizes(Architecture::WekaNitro).unwrap_err();
        assert!(err.to_string().contains("no media sizes"));
    }

    #[test]
    fn test_scm_capacity() {
        let d_box = DBoxPricing {
            base_cost: 1.0,
            scm_drives: ScmDrives { size_gb: 800.0, count: 8, cost_per_drive: 1.0 },
            qlc_ssds: MediaTable { count: 22, prices: MediaPrices::default() },
        };
        assert!((d_box.scm_capacity_tb() - 6.4).abs() < 1e-9);
    }
}
