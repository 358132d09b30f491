#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod annotations;
pub mod application_instance;
pub mod watch;

pub use self::{
    application_instance::{ApplicationInstance, ApplicationInstanceSpec},
    watch::{Event, MalformedEvent, Tombstone, WatchObject},
};
pub use k8s_openapi::{
    api::{self, core::v1::Service},
    apimachinery::pkg::apis::meta::v1::Time,
};
pub use kube::{
    api::{Api, DynamicObject, ObjectMeta, ResourceExt},
    core::TypeMeta,
    Client, Resource,
};
