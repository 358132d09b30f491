use prometheus_client::{metrics::gauge::Gauge, registry::Registry};

/// Metrics describing the application instance cache.
///
/// Cloned handles share the same underlying values.
#[derive(Clone, Debug, Default)]
pub struct CacheMetrics {
    pending: Gauge,
}

// === impl CacheMetrics ===

impl CacheMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let pending = Gauge::default();
        prom.register(
            "service_pending_application_instance",
            "Number of service that currently needs application instances.",
            pending.clone(),
        );
        Self { pending }
    }

    /// Returns the number of application instances with services waiting on them.
    pub fn pending(&self) -> i64 {
        self.pending.get()
    }

    pub(crate) fn set_pending(&self, instances: usize) {
        self.pending.set(instances as i64);
    }
}
