use crate::metrics::CacheMetrics;
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use appinst_controller_core::{EventKind, ResourceId};
use appinst_controller_k8s_api::{ApplicationInstance, Event, MalformedEvent, ResourceExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument};

pub type SharedCache = Arc<RwLock<ApplicationInstanceCache>>;

/// Publishes the keys of services that must be reconciled again.
pub type RequeueTx = UnboundedSender<ResourceId>;

/// An eventually consistent index of application instances to the application service each belongs
/// to.
///
/// Services may be processed before the instances they reference. Rather than blocking, a service
/// registers itself as pending on the instance and is requeued once the instance's association
/// becomes known.
#[derive(Debug)]
pub struct ApplicationInstanceCache {
    /// The annotation that carries an instance's application service.
    annotation: String,

    /// Application instance key to application service resource-id.
    services_by_instance: HashMap<ResourceId, String>,

    /// Application instance key to the services waiting for it to be resolved.
    ///
    /// Entries are only removed when the instance resolves. An instance that never arrives leaves
    /// its entry in place, as does a service that is deleted or relabeled to another instance while
    /// it waits. Such stale registrations still count toward the pending gauge.
    pending_by_instance: HashMap<ResourceId, HashSet<ResourceId>>,

    requeue: RequeueTx,
    metrics: CacheMetrics,
}

// === impl ApplicationInstanceCache ===

impl ApplicationInstanceCache {
    pub fn shared(
        annotation: impl ToString,
        requeue: RequeueTx,
        metrics: CacheMetrics,
    ) -> SharedCache {
        Arc::new(RwLock::new(Self::new(annotation, requeue, metrics)))
    }

    pub fn new(annotation: impl ToString, requeue: RequeueTx, metrics: CacheMetrics) -> Self {
        Self {
            annotation: annotation.to_string(),
            services_by_instance: HashMap::default(),
            pending_by_instance: HashMap::default(),
            requeue,
            metrics,
        }
    }

    /// Applies a single watch event to the cache.
    ///
    /// Fails only when the event's object is neither an application instance nor a tombstone
    /// wrapping one. Instances without an application service annotation are ignored.
    pub fn apply_event(&mut self, event: Event) -> Result<(), MalformedEvent> {
        let Event { kind, object } = event;
        let instance = object.into_instance()?;
        self.handle(kind, &instance);
        Ok(())
    }

    /// Returns the application service of the given instance, if it is known.
    pub fn lookup(&self, instance: &ResourceId) -> Option<String> {
        self.services_by_instance.get(instance).cloned()
    }

    /// Records that `service` must be requeued when `instance` is next resolved.
    ///
    /// Registrations are deduplicated, so a service is requeued at most once per resolution no
    /// matter how many times it registers.
    pub fn register_pending_lookup(&mut self, instance: ResourceId, service: ResourceId) {
        debug!(%instance, %service, "Waiting for application instance");
        self.pending_by_instance
            .entry(instance)
            .or_default()
            .insert(service);
        self.metrics.set_pending(self.pending_by_instance.len());
    }

    /// Returns the number of instances with a known application service.
    pub fn len(&self) -> usize {
        self.services_by_instance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services_by_instance.is_empty()
    }

    /// Returns the number of instances that services are waiting on.
    pub fn pending_len(&self) -> usize {
        self.pending_by_instance.len()
    }

    #[instrument(
        skip(self, instance),
        fields(
            ns = ?instance.metadata.namespace,
            name = %instance.name_any(),
        )
    )]
    fn handle(&mut self, kind: EventKind, instance: &ApplicationInstance) {
        debug!(%kind, "Handling application instance event");
        let key = ResourceId::new(instance.namespace().unwrap_or_default(), instance.name_any());

        match kind {
            EventKind::Delete => self.remove(&key),
            EventKind::Update if instance.is_terminating() => self.remove(&key),
            EventKind::Add | EventKind::Update => {
                match instance.application_service(&self.annotation) {
                    Some(service) => self.update(key, service.to_string()),
                    None => {
                        info!("Application instance doesn't have application service annotation")
                    }
                }
            }
        }
    }

    fn remove(&mut self, key: &ResourceId) {
        if self.services_by_instance.remove(key).is_some() {
            debug!(%key, "Removed application instance");
        }
    }

    fn update(&mut self, key: ResourceId, service: String) {
        debug!(%key, %service, "Updated application instance");
        self.services_by_instance.insert(key.clone(), service);

        if let Some(services) = self.pending_by_instance.remove(&key) {
            for service in services {
                debug!(instance = %key, %service, "Requeueing service");
                if self.requeue.send(service).is_err() {
                    tracing::warn!(instance = %key, "Service requeue channel closed");
                }
            }
            self.metrics.set_pending(self.pending_by_instance.len());
        }
    }
}

impl kubert::index::IndexNamespacedResource<ApplicationInstance> for ApplicationInstanceCache {
    /// Watches do not distinguish creation from modification, so every apply is handled as an
    /// update. A terminating instance is removed.
    fn apply(&mut self, instance: ApplicationInstance) {
        self.handle(EventKind::Update, &instance);
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.remove(&ResourceId::new(namespace, name));
    }
}
