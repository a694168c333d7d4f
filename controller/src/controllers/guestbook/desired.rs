//! Pure mapping from a guestbook and its redis to the objects the cluster should hold.

use std::collections::BTreeMap;

use guestbook::k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use guestbook::k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec,
};
use guestbook::k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, OwnerReference};
use guestbook::k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use guestbook::kube::api::ObjectMeta;
use guestbook::{GuestBook, GuestBookLabel, Redis, prelude::*};
use thiserror::Error;

pub const CONTAINER_NAME: &str = "frontend";
pub const PORT_NAME: &str = "http";
pub const SERVICE_TYPE: &str = "LoadBalancer";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("metadata.{0} is missing")]
    MissingMetadata(&'static str),
    #[error("spec.redisName is empty")]
    MissingRedisName,
    #[error("spec.frontend.image is empty")]
    MissingImage,
    #[error("spec.frontend.servingPort {0} is outside 1-65535")]
    InvalidServingPort(i32),
    #[error("spec.frontend.replicas {0} is negative")]
    InvalidReplicas(i32),
    #[error("guestbook has no uid to own derived objects")]
    MissingOwnerReference,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Desired {
    pub deployment: Deployment,
    pub service: Service,
}

/// Labels selecting the frontend pods of the guestbook `name`.
pub fn selector_labels(name: &str) -> BTreeMap<String, String> {
    [(
        GuestBookLabel::borrow("guestbook").to_string(),
        name.to_string(),
    )]
    .into_iter()
    .collect()
}

fn labels(name: &str) -> BTreeMap<String, String> {
    let mut labels = selector_labels(name);
    labels.insert(
        GuestBookLabel::borrow("component").to_string(),
        CONTAINER_NAME.to_string(),
    );
    labels
}

struct Frontend<'a> {
    name: &'a str,
    namespace: &'a str,
    owner: OwnerReference,
    serving_port: i32,
    replicas: i32,
    image: &'a str,
}

impl<'a> Frontend<'a> {
    fn validate(guestbook: &'a GuestBook) -> Result<Self, ConfigurationError> {
        let name = guestbook
            .name()
            .map_err(|_| ConfigurationError::MissingMetadata("name"))?;
        let namespace = guestbook
            .require_namespace()
            .map_err(|_| ConfigurationError::MissingMetadata("namespace"))?;
        let owner = guestbook
            .static_controller_owner_ref()
            .map_err(|_| ConfigurationError::MissingOwnerReference)?;
        let spec = &guestbook.spec;
        if spec.redis_name.is_empty() {
            return Err(ConfigurationError::MissingRedisName);
        }
        let frontend = &spec.frontend;
        if frontend.image.trim().is_empty() {
            return Err(ConfigurationError::MissingImage);
        }
        if !(1..=i32::from(u16::MAX)).contains(&frontend.serving_port) {
            return Err(ConfigurationError::InvalidServingPort(frontend.serving_port));
        }
        let replicas = frontend.replicas.unwrap_or(1);
        if replicas < 0 {
            return Err(ConfigurationError::InvalidReplicas(replicas));
        }
        Ok(Self {
            name,
            namespace,
            owner,
            serving_port: frontend.serving_port,
            replicas,
            image: &frontend.image,
        })
    }

    fn metadata(&self) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.name.to_string()),
            namespace: Some(self.namespace.to_string()),
            owner_references: Some(vec![self.owner.clone()]),
            labels: Some(labels(self.name)),
            ..Default::default()
        }
    }
}

fn redis_env(redis: &Redis) -> Vec<EnvVar> {
    let status = redis.status.clone().unwrap_or_default();
    let leader = status
        .leader_service
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| redis.name_any());
    let follower = status
        .follower_service
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| leader.clone());
    [
        ("GET_HOSTS_FROM", "env".to_string()),
        ("REDIS_MASTER_SERVICE_HOST", leader),
        ("REDIS_SLAVE_SERVICE_HOST", follower),
        ("REDIS_SERVICE_PORT", redis.spec.port.to_string()),
    ]
    .into_iter()
    .map(|(name, value)| EnvVar {
        name: name.to_string(),
        value: Some(value),
        ..Default::default()
    })
    .collect()
}

fn deployment(frontend: &Frontend<'_>, guestbook: &GuestBook, redis: &Redis) -> Deployment {
    Deployment {
        metadata: frontend.metadata(),
        spec: Some(DeploymentSpec {
            replicas: Some(frontend.replicas),
            selector: LabelSelector {
                match_labels: Some(selector_labels(frontend.name)),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels(frontend.name)),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: CONTAINER_NAME.to_string(),
                        image: Some(frontend.image.to_string()),
                        env: Some(redis_env(redis)),
                        ports: Some(vec![ContainerPort {
                            container_port: frontend.serving_port,
                            name: Some(PORT_NAME.to_string()),
                            protocol: Some("TCP".to_string()),
                            ..Default::default()
                        }]),
                        resources: guestbook.spec.frontend.resources.clone(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn service(frontend: &Frontend<'_>) -> Service {
    Service {
        metadata: frontend.metadata(),
        spec: Some(ServiceSpec {
            type_: Some(SERVICE_TYPE.to_string()),
            selector: Some(selector_labels(frontend.name)),
            ports: Some(vec![ServicePort {
                name: Some(PORT_NAME.to_string()),
                port: frontend.serving_port,
                protocol: Some("TCP".to_string()),
                target_port: Some(IntOrString::String(PORT_NAME.to_string())),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Computes both derived objects, failing before anything is produced if the guestbook is invalid.
pub fn build(guestbook: &GuestBook, redis: &Redis) -> Result<Desired, ConfigurationError> {
    let frontend = Frontend::validate(guestbook)?;
    Ok(Desired {
        deployment: deployment(&frontend, guestbook, redis),
        service: service(&frontend),
    })
}

pub fn desired_deployment(
    guestbook: &GuestBook,
    redis: &Redis,
) -> Result<Deployment, ConfigurationError> {
    Ok(deployment(&Frontend::validate(guestbook)?, guestbook, redis))
}

pub fn desired_service(guestbook: &GuestBook) -> Result<Service, ConfigurationError> {
    Ok(service(&Frontend::validate(guestbook)?))
}
