use ahash::AHashMap as HashMap;

/// The attributes of a service that proxy configuration is generated from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceAttributes {
    pub name: String,
    pub namespace: String,
    pub labels: HashMap<String, String>,

    /// The name of the application instance that backs this service, taken from the service's
    /// labels.
    pub application_instance: Option<String>,

    /// The application service the instance belongs to. Unset until the instance is known.
    pub application_service: Option<String>,
}
