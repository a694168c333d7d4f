use std::net::Ipv6Addr;

use guestbook::k8s_openapi::api::core::v1::Service;
use guestbook::k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};
use guestbook::{GuestBook, GuestBookStatus};

use super::desired::ConfigurationError;

pub const READY: &str = "Ready";

/// What the latest reconciliation attempt observed.
#[derive(Clone, Debug)]
pub enum Outcome<'a> {
    Applied { url: String },
    Rejected(&'a ConfigurationError),
}

/// Externally reachable endpoint of `service`, or an empty string while no
/// load-balancer address has been assigned.
pub fn url_for_service(service: &Service, serving_port: i32) -> String {
    let Some(ingress) = service
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .and_then(|ingress| ingress.first())
    else {
        return String::new();
    };
    let host = ingress
        .hostname
        .as_deref()
        .filter(|host| !host.is_empty())
        .or_else(|| ingress.ip.as_deref().filter(|ip| !ip.is_empty()));
    match host {
        Some(host) if host.parse::<Ipv6Addr>().is_ok() => format!("http://[{host}]:{serving_port}"),
        Some(host) => format!("http://{host}:{serving_port}"),
        None => String::new(),
    }
}

pub fn desired_status(guestbook: &GuestBook, outcome: &Outcome<'_>, now: &Time) -> GuestBookStatus {
    let current = guestbook.status.clone().unwrap_or_default();
    let (url, status, reason, message) = match outcome {
        Outcome::Applied { url } if url.is_empty() => (
            String::new(),
            "False",
            "AddressPending",
            "Waiting for the service to be assigned an address".to_string(),
        ),
        Outcome::Applied { url } => (url.clone(), "True", "Reconciled", format!("Serving at {url}")),
        Outcome::Rejected(err) => (
            String::new(),
            "False",
            "InvalidConfiguration",
            err.to_string(),
        ),
    };
    let observed_generation = guestbook.metadata.generation;
    let mut conditions = current.conditions.unwrap_or_default();
    let last_transition_time = conditions
        .iter()
        .find(|cond| cond.type_ == READY && cond.status == status)
        .map(|cond| cond.last_transition_time.clone())
        .unwrap_or_else(|| now.clone());
    let ready = Condition {
        last_transition_time,
        observed_generation,
        message,
        reason: reason.into(),
        status: status.into(),
        type_: READY.into(),
    };
    if let Some(current_ready) = conditions.iter_mut().find(|cond| cond.type_ == READY) {
        *current_ready = ready;
    } else {
        conditions.push(ready);
    }
    GuestBookStatus {
        url,
        observed_generation,
        conditions: Some(conditions),
    }
}
