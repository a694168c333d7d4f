#[cfg(feature = "client")]
mod api;
#[cfg(feature = "client")]
mod client;
mod crd;
mod error;
mod label;
mod meta;

pub use k8s_openapi;
pub use kube;

#[cfg(feature = "client")]
pub use api::Api;
#[cfg(feature = "client")]
pub use client::{Client, ClientBuilder, DEFAULT_FIELD_MANAGER};
pub use crd::{
    DEFAULT_FRONTEND_IMAGE, DEFAULT_REDIS_PORT, DEFAULT_SERVING_PORT, FrontendSpec, GuestBook,
    GuestBookSpec, GuestBookStatus, Redis, RedisSpec, RedisStatus, all_crds,
};
#[cfg(feature = "client")]
pub use error::ClientBuildError;
pub use error::{Error, Result};
pub use label::{GuestBookLabel, LABEL_PREFIX};
pub use meta::{ObjectMetaExt, ResourceNameExt, ResourceOwnerRefExt};

pub mod prelude {
    pub use super::{ObjectMetaExt, ResourceNameExt, ResourceOwnerRefExt};
    pub use kube::{Resource, ResourceExt};
}
