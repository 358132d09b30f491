//! Application instance index
//!
//! Services name the application instance that backs them with a label, and each application
//! instance names the application service it belongs to with an annotation. Services and instances
//! are watched independently, so a service may be indexed before its instance has been seen.
//!
//! ```text
//! [ Service ] -> [ ApplicationInstance ] -> application service
//! ```
//!
//! The `ApplicationInstanceCache` maps instances to their application services. When a service
//! references an instance that is not in the cache, the service is registered as pending on that
//! instance. When the instance is later added, the cache publishes the service's key on a requeue
//! channel, and `requeue_services` reprocesses the service against the `ServiceIndex`. The cache
//! never calls back into the service index directly, so the two may be updated concurrently from
//! separate watch tasks.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod application_instance;
pub mod metrics;
pub mod service;


pub use self::{
    application_instance::{ApplicationInstanceCache, RequeueTx, SharedCache},
    metrics::CacheMetrics,
    service::{requeue_services, resolve_application_service, ServiceIndex, SharedServiceIndex},
};
