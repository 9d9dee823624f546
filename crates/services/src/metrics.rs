//! Prometheus counters for the expiration sweep.

use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

use crate::sweep::SweepReport;

/// Cheap to clone; clones share the same underlying counters.
#[derive(Debug, Clone, Default)]
pub struct SweepMetrics {
    pub runs: Counter,
    pub items_processed: Counter,
    pub items_reset: Counter,
    pub items_failed: Counter,
    pub notifications_sent: Counter,
    pub notifications_failed: Counter,
    pub store_failures: Counter,
}

impl SweepMetrics {
    pub fn register(&self, registry: &mut Registry) {
        let sub = registry.sub_registry_with_prefix("lostfound_sweep");
        sub.register("runs", "Expiration sweeps started", self.runs.clone());
        sub.register(
            "items_processed",
            "Items past their verification deadline picked up by a sweep",
            self.items_processed.clone(),
        );
        sub.register(
            "items_reset",
            "Claimed items reset to available after their window lapsed",
            self.items_reset.clone(),
        );
        sub.register(
            "items_failed",
            "Items a sweep could not update",
            self.items_failed.clone(),
        );
        sub.register(
            "notifications_sent",
            "Claim-expired notifications delivered",
            self.notifications_sent.clone(),
        );
        sub.register(
            "notifications_failed",
            "Claim-expired notifications that failed to send",
            self.notifications_failed.clone(),
        );
        sub.register(
            "store_failures",
            "Sweeps aborted because the item store query failed",
            self.store_failures.clone(),
        );
    }

    pub(crate) fn record(&self, report: &SweepReport) {
        self.runs.inc();
        self.items_processed.inc_by(report.processed as u64);
        self.items_reset.inc_by(report.reset as u64);
        self.items_failed.inc_by(report.failed as u64);
        self.notifications_sent.inc_by(report.notified as u64);
        self.notifications_failed.inc_by(report.notify_failed as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::encoding::text::encode;

    #[test]
    fn registered_counters_are_exported() {
        let metrics = SweepMetrics::default();
        let mut registry = Registry::default();
        metrics.register(&mut registry);

        metrics.record(&SweepReport {
            processed: 3,
            reset: 2,
            notified: 2,
            failed: 1,
            notify_failed: 0,
        });

        let mut out = String::new();
        encode(&mut out, &registry).unwrap();
        assert!(out.contains("lostfound_sweep_runs_total 1"));
        assert!(out.contains("lostfound_sweep_items_reset_total 2"));
        assert!(out.contains("lostfound_sweep_items_failed_total 1"));
    }
}
