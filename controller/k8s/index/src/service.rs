use crate::application_instance::SharedCache;
use ahash::AHashMap as HashMap;
use appinst_controller_core::{ResourceId, ServiceAttributes};
use appinst_controller_k8s_api::{self as k8s, ResourceExt};
use kubert::index::IndexNamespacedResource;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, instrument};

pub type SharedServiceIndex = Arc<RwLock<ServiceIndex>>;

/// Indexes services along with the attributes resolved for them.
#[derive(Debug)]
pub struct ServiceIndex {
    cache: SharedCache,

    /// The service label that names a service's application instance.
    instance_label: String,

    by_id: HashMap<ResourceId, Service>,
}

#[derive(Debug)]
struct Service {
    resource: k8s::Service,
    attributes: ServiceAttributes,
}

/// Sets a service's application instance and, if the instance is known, its application service.
///
/// When the instance is not yet known, the service is registered with the cache so that it is
/// requeued once the instance resolves.
pub fn resolve_application_service(
    cache: &SharedCache,
    attributes: &mut ServiceAttributes,
    instance_label: &str,
) {
    let Some(instance_name) = attributes.labels.get(instance_label).cloned() else {
        return;
    };

    let instance = ResourceId::new(attributes.namespace.clone(), instance_name.clone());
    attributes.application_instance = Some(instance_name);

    // Hold the write lock across the lookup and the registration so that the instance cannot
    // resolve in between.
    let mut cache = cache.write();
    match cache.lookup(&instance) {
        Some(application_service) => {
            attributes.application_service = Some(application_service);
        }
        None => {
            let service = ResourceId::new(attributes.namespace.clone(), attributes.name.clone());
            debug!(%service, %instance, "Service without application instance");
            attributes.application_service = None;
            cache.register_pending_lookup(instance, service);
        }
    }
}

/// Reprocesses services as their application instances become known.
///
/// Completes when all requeue senders have been dropped.
pub async fn requeue_services(
    index: SharedServiceIndex,
    mut requeues: UnboundedReceiver<ResourceId>,
) {
    while let Some(id) = requeues.recv().await {
        // The service must not be deleted or replaced between the lookup and the reapply.
        let mut index = index.write();
        match index.get(&id).cloned() {
            Some(service) => index.apply(service),
            None => debug!(service = %id, "Service not found, skipping stale service"),
        }
    }
    debug!("Requeue channel closed");
}

// === impl ServiceIndex ===

impl ServiceIndex {
    pub fn shared(cache: SharedCache, instance_label: impl ToString) -> SharedServiceIndex {
        Arc::new(RwLock::new(Self {
            cache,
            instance_label: instance_label.to_string(),
            by_id: HashMap::default(),
        }))
    }

    /// Returns the resolved attributes of a service.
    pub fn attributes(&self, id: &ResourceId) -> Option<&ServiceAttributes> {
        self.by_id.get(id).map(|svc| &svc.attributes)
    }

    pub fn get(&self, id: &ResourceId) -> Option<&k8s::Service> {
        self.by_id.get(id).map(|svc| &svc.resource)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl IndexNamespacedResource<k8s::Service> for ServiceIndex {
    #[instrument(
        skip(self, service),
        fields(
            ns = ?service.metadata.namespace,
            name = %service.name_any(),
        )
    )]
    fn apply(&mut self, service: k8s::Service) {
        let namespace = service.namespace().unwrap_or_default();
        let name = service.name_any();
        let mut attributes = ServiceAttributes {
            name: name.clone(),
            namespace: namespace.clone(),
            labels: service
                .labels()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ..Default::default()
        };
        resolve_application_service(&self.cache, &mut attributes, &self.instance_label);

        self.by_id.insert(
            ResourceId::new(namespace, name),
            Service {
                resource: service,
                attributes,
            },
        );
    }

    fn delete(&mut self, namespace: String, name: String) {
        let id = ResourceId::new(namespace, name);
        if self.by_id.remove(&id).is_some() {
            debug!(service = %id, "Removed service");
        }
    }
}
