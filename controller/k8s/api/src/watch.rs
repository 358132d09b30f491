//! Types for objects as they arrive from a watch, before the cache has interpreted them.
//!
//! A watch may deliver the object itself or, when a deletion was observed without the object's
//! final state, a [`Tombstone`] that wraps the last state that was known. Either way the payload
//! may also be something other than an `ApplicationInstance`. These cases are resolved once, by
//! [`WatchObject::into_instance`], so that indexing code only ever handles a typed instance.

use crate::ApplicationInstance;
use appinst_controller_core::EventKind;
use kube::{api::DynamicObject, Resource};

/// A single watch notification.
#[derive(Clone, Debug)]
pub struct Event {
    pub kind: EventKind,
    pub object: WatchObject,
}

/// An object delivered by a watch.
#[derive(Clone, Debug)]
pub enum WatchObject {
    Instance(ApplicationInstance),
    DeletedFinalStateUnknown(Tombstone),
    Unrecognized(DynamicObject),
}

/// Carries the last known state of an object whose deletion was missed by the watch.
#[derive(Clone, Debug)]
pub struct Tombstone {
    /// The `namespace/name` key of the deleted object.
    pub key: String,
    pub object: Box<WatchObject>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEvent {
    #[error("unexpected object {kind} ({api_version})")]
    UnexpectedObject { api_version: String, kind: String },

    #[error("tombstone {key} contained object that is not an application instance")]
    UnexpectedTombstone { key: String },
}

// === impl Event ===

impl Event {
    pub fn new(kind: EventKind, object: impl Into<WatchObject>) -> Self {
        Self {
            kind,
            object: object.into(),
        }
    }
}

// === impl WatchObject ===

impl WatchObject {
    /// Resolves the watched object to an instance, unwrapping a tombstone if necessary.
    pub fn into_instance(self) -> Result<ApplicationInstance, MalformedEvent> {
        match self {
            Self::Instance(instance) => Ok(instance),
            Self::DeletedFinalStateUnknown(Tombstone { key, object }) => match *object {
                Self::Instance(instance) => Ok(instance),
                _ => Err(MalformedEvent::UnexpectedTombstone { key }),
            },
            Self::Unrecognized(obj) => {
                let (api_version, kind) = obj
                    .types
                    .map(|t| (t.api_version, t.kind))
                    .unwrap_or_default();
                Err(MalformedEvent::UnexpectedObject { api_version, kind })
            }
        }
    }
}

impl From<ApplicationInstance> for WatchObject {
    fn from(instance: ApplicationInstance) -> Self {
        Self::Instance(instance)
    }
}

impl From<Tombstone> for WatchObject {
    fn from(tombstone: Tombstone) -> Self {
        Self::DeletedFinalStateUnknown(tombstone)
    }
}

/// Types a dynamic object as an instance when its type metadata identifies it as one and its body
/// parses.
impl From<DynamicObject> for WatchObject {
    fn from(obj: DynamicObject) -> Self {
        let is_instance = obj.types.as_ref().is_some_and(|t| {
            t.api_version == ApplicationInstance::api_version(&())
                && t.kind == ApplicationInstance::kind(&())
        });
        if !is_instance {
            return Self::Unrecognized(obj);
        }

        match serde_json::to_value(&obj).and_then(serde_json::from_value) {
            Ok(instance) => Self::Instance(instance),
            Err(error) => {
                tracing::debug!(%error, "Failed to parse application instance");
                Self::Unrecognized(obj)
            }
        }
    }
}

// === impl Tombstone ===

impl Tombstone {
    pub fn new(key: impl ToString, object: impl Into<WatchObject>) -> Self {
        Self {
            key: key.to_string(),
            object: Box::new(object.into()),
        }
    }
}
