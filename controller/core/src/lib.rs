#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod event;
mod resource_id;
mod service;

pub use self::{event::EventKind, resource_id::ResourceId, service::ServiceAttributes};
