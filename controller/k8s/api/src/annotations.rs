//! Well-known metadata keys.

/// Annotation on an `ApplicationInstance` naming the application service it belongs to.
pub const APPLICATION_SERVICE: &str = "applicationservice.cms.tess.io/resource-id";

/// Label on a `Service` naming the `ApplicationInstance` (in the service's namespace) that backs
/// it.
pub const APPLICATION_INSTANCE_NAME: &str = "applicationinstance.apps.tess.io/name";
