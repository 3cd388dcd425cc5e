//! Primary vs competitor comparison
//!
//! Sizes both architectures, attaches the object store every competitor
//! migrates into, costs both when a catalog is present and evaluates
//! migration feasibility. A broken catalog entry only drops that
//! architecture's cost (or its catalog-driven shape), never the comparison.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::PricingCatalog;
use crate::cost::{estimate_cost, CostBreakdown};
use crate::error::{Result, TieringError};
use crate::feasibility::evaluate;
use crate::sizing::sizer_for;
use crate::types::{Architecture, Feasibility, SizedConfiguration, WorkflowParameters, WorkloadRequest};

/// Side-by-side result for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub request: WorkloadRequest,
    pub workflow: WorkflowParameters,
    pub primary: SizedConfiguration,
    pub competitor: SizedConfiguration,
    pub primary_cost: Option<CostBreakdown>,
    pub competitor_cost: Option<CostBreakdown>,
    pub primary_feasibility: Feasibility,
    pub competitor_feasibility: Feasibility,
    /// Primary migration bandwidth over competitor migration bandwidth
    pub migration_speedup: Option<f64>,
}

/// Size, cost and evaluate the primary architecture against `request.competitor`
pub fn compute_comparison(
    request: &WorkloadRequest,
    workflow: &WorkflowParameters,
    catalog: Option<&PricingCatalog>,
    period: &str,
) -> Result<Comparison> {
    request.validate()?;
    workflow.validate()?;

    let mut primary = size(Architecture::Vdura, request, catalog, period)?;
    let mut competitor = size(request.competitor, request, catalog, period)?
        .with_object_store(primary.capacity_tier.capacity_tb, request.object_store_bandwidth_gbs);

    let primary_cost = catalog.and_then(|catalog| price(&primary, catalog, period));
    let competitor_cost = catalog.and_then(|catalog| price(&competitor, catalog, period));
    primary.total_cost = primary_cost.as_ref().map(|cost| cost.total);
    competitor.total_cost = competitor_cost.as_ref().map(|cost| cost.total);

    let primary_feasibility = evaluate(&primary, workflow);
    let competitor_feasibility = evaluate(&competitor, workflow);

    let migration_speedup = if competitor.migration_bandwidth_gbs > 0.0 {
        Some(primary.migration_bandwidth_gbs / competitor.migration_bandwidth_gbs)
    } else {
        None
    };

    info!(
        "Compared {} vs {}: migration {:?} vs {:?} min, keeps up {} vs {}",
        primary.architecture,
        competitor.architecture,
        primary_feasibility.migration_minutes,
        competitor_feasibility.migration_minutes,
        primary_feasibility.keeps_up,
        competitor_feasibility.keeps_up
    );

    Ok(Comparison {
        request: request.clone(),
        workflow: workflow.clone(),
        primary,
        competitor,
        primary_cost,
        competitor_cost,
        primary_feasibility,
        competitor_feasibility,
        migration_speedup,
    })
}

/// Size one architecture, falling back to the built-in shape on catalog errors
fn size(
    architecture: Architecture,
    request: &WorkloadRequest,
    catalog: Option<&PricingCatalog>,
    period: &str,
) -> Result<SizedConfiguration> {
    match sizer_for(architecture, catalog, period).and_then(|sizer| sizer.size(request)) {
        Ok(config) => Ok(config),
        Err(TieringError::Configuration { message, .. }) => {
            warn!(
                "Sizing {} from the catalog failed ({}), using the built-in shape",
                architecture, message
            );
            sizer_for(architecture, None, period)?.size(request)
        }
        Err(other) => Err(other),
    }
}

fn price(config: &SizedConfiguration, catalog: &PricingCatalog, period: &str) -> Option<CostBreakdown> {
    match estimate_cost(config, catalog, period) {
        Ok(cost) => Some(cost),
        Err(e) => {
            warn!("Omitting {} cost: {}", config.architecture, e);
            None
        }
    }
}
