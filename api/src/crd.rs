use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{CustomResource, CustomResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FRONTEND_IMAGE: &str = "gcr.io/google-samples/gb-frontend:v4";
pub const DEFAULT_SERVING_PORT: i32 = 8080;
pub const DEFAULT_REDIS_PORT: i32 = 6379;

fn default_frontend_image() -> String {
    DEFAULT_FRONTEND_IMAGE.to_string()
}

fn default_serving_port() -> i32 {
    DEFAULT_SERVING_PORT
}

fn default_replicas() -> Option<i32> {
    Some(1)
}

fn default_redis_port() -> i32 {
    DEFAULT_REDIS_PORT
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrontendSpec {
    /// Port the frontend is exposed on, both by the container and the service.
    #[serde(default = "default_serving_port")]
    pub serving_port: i32,
    #[serde(default = "default_replicas")]
    pub replicas: Option<i32>,
    #[serde(default = "default_frontend_image")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

impl Default for FrontendSpec {
    fn default() -> Self {
        Self {
            serving_port: default_serving_port(),
            replicas: default_replicas(),
            image: default_frontend_image(),
            resources: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuestBookStatus {
    /// Externally reachable endpoint of the frontend, empty until the service has an address.
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, Default)]
#[kube(
    group = "webapp.guestbook.io",
    version = "v1",
    kind = "GuestBook",
    plural = "guestbooks",
    status = "GuestBookStatus",
    shortname = "gb",
    printcolumn = r#"{"name":"Redis","type":"string","jsonPath":".spec.redisName"}"#,
    printcolumn = r#"{"name":"URL","type":"string","jsonPath":".status.url"}"#,
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct GuestBookSpec {
    /// Name of the [`Redis`] in the same namespace backing this guestbook.
    pub redis_name: String,
    #[serde(default)]
    pub frontend: FrontendSpec,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedisStatus {
    pub leader_service: Option<String>,
    pub follower_service: Option<String>,
}

#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "webapp.guestbook.io",
    version = "v1",
    kind = "Redis",
    plural = "redis",
    status = "RedisStatus",
    shortname = "rd",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct RedisSpec {
    pub follower_replicas: Option<i32>,
    #[serde(default = "default_redis_port")]
    pub port: i32,
}

impl Default for RedisSpec {
    fn default() -> Self {
        Self {
            follower_replicas: None,
            port: default_redis_port(),
        }
    }
}

/// Every definition the controller serves, in install order.
pub fn all_crds() -> Vec<CustomResourceDefinition> {
    vec![Redis::crd(), GuestBook::crd()]
}
