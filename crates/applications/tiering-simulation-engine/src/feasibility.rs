//! Migration feasibility
//!
//! A configuration keeps up when one checkpoint drains to the capacity tier
//! strictly faster than the next one is produced.

use crate::types::{Feasibility, SizedConfiguration, WorkflowParameters};

/// Evaluate whether `config` can migrate checkpoints as fast as they arrive
pub fn evaluate(config: &SizedConfiguration, params: &WorkflowParameters) -> Feasibility {
    let migration_minutes = params.transfer_minutes(config.migration_bandwidth_gbs);

    Feasibility {
        migration_minutes,
        write_minutes: write_minutes(config.fast_tier.bandwidth_gbs, params),
        keeps_up: migration_minutes.is_some_and(|minutes| minutes < params.checkpoint_interval_min),
        fast_tier_utilization_percent: fast_tier_utilization(config.fast_tier.capacity_tb, params),
    }
}

/// Minutes to land one checkpoint in the fast tier; no bandwidth completes instantly
pub fn write_minutes(fast_tier_bandwidth_gbs: f64, params: &WorkflowParameters) -> f64 {
    params.transfer_minutes(fast_tier_bandwidth_gbs).unwrap_or(0.0)
}

fn fast_tier_utilization(capacity_tb: f64, params: &WorkflowParameters) -> f64 {
    if capacity_tb <= 0.0 {
        return 100.0;
    }
    let retained = params.checkpoint_size_gb * params.target_retention as f64;
    (retained / capacity_tb * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Architecture, ComponentCounts, TierSpec};

    fn config(fast_bandwidth: f64, fast_capacity: f64, migration_bandwidth: f64) -> SizedConfiguration {
        SizedConfiguration {
            architecture: Architecture::WekaNitro,
            components: ComponentCounts::Servers { servers: 8 },
            media_size_tb: 15.0,
            fast_tier: TierSpec::new(fast_bandwidth, fast_capacity),
            capacity_tier: TierSpec::new(migration_bandwidth, 8000.0),
            migration_bandwidth_gbs: migration_bandwidth,
            total_cost: None,
        }
    }

    #[test]
    fn test_object_store_bottleneck() {
        // 100GB at 5 GB/s = 333.33 min against a 60 min interval
        let feasibility = evaluate(&config(320.0, 1680.0, 5.0), &WorkflowParameters::new(100.0, 60.0, 5));
        assert!((feasibility.migration_minutes.unwrap() - 333.333_333).abs() < 1e-3);
        assert!(!feasibility.keeps_up);
    }

    #[test]
    fn test_parallel_jbods_keep_up() {
        // 3 JBODs x 21.5 GB/s: 100GB in ~0.026 min
        let feasibility = evaluate(&config(390.0, 2172.0, 64.5), &WorkflowParameters::default());
        assert!(feasibility.migration_minutes.unwrap() < 1.0);
        assert!(feasibility.keeps_up);
    }

    #[test]
    fn test_equal_time_does_not_keep_up() {
        // 6GB at 1 GB/s is exactly 100 minutes
        let params = WorkflowParameters::new(6.0, 100.0, 5);
        let feasibility = evaluate(&config(100.0, 1000.0, 1.0), &params);
        assert_eq!(feasibility.migration_minutes, Some(100.0));
        assert!(!feasibility.keeps_up);

        let params = WorkflowParameters::new(6.0, 100.000_001, 5);
        assert!(evaluate(&config(100.0, 1000.0, 1.0), &params).keeps_up);
    }

    #[test]
    fn test_no_migration_path_never_keeps_up() {
        let feasibility = evaluate(&config(390.0, 2172.0, 0.0), &WorkflowParameters::default());
        assert_eq!(feasibility.migration_minutes, None);
        assert!(!feasibility.keeps_up);
    }

    #[test]
    fn test_write_minutes() {
        let params = WorkflowParameters::default();
        // 100GB at 100 GB/s
        assert!((write_minutes(100.0, &params) - 100_000.0 / 100.0 / 60.0).abs() < 1e-9);
        assert_eq!(write_minutes(0.0, &params), 0.0);
    }

    #[test]
    fn test_fast_tier_utilization() {
        let params = WorkflowParameters::new(100.0, 60.0, 5);
        let feasibility = evaluate(&config(320.0, 1000.0, 5.0), &params);
        assert!((feasibility.fast_tier_utilization_percent - 50.0).abs() < 1e-9);

        let feasibility = evaluate(&config(320.0, 200.0, 5.0), &params);
        assert_eq!(feasibility.fast_tier_utilization_percent, 100.0);

        let feasibility = evaluate(&config(320.0, 0.0, 5.0), &params);
        assert_eq!(feasibility.fast_tier_utilization_percent, 100.0);
    }
}
