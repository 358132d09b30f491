use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ApplicationInstance is a deployed unit of an application. Its annotations associate it with
/// the logical application service it was provisioned for.
///
/// The controller only reads instance metadata; the spec is carried through opaquely.
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "apps.tess.io",
    version = "v1alpha2",
    kind = "ApplicationInstance",
    namespaced
)]
pub struct ApplicationInstanceSpec {
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl ApplicationInstance {
    /// Returns the value of the given annotation, if it is set to a non-empty value.
    pub fn application_service(&self, annotation: &str) -> Option<&str> {
        self.annotations()
            .get(annotation)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Indicates whether the instance has been marked for deletion.
    pub fn is_terminating(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }
}
