use guestbook::kube::runtime::controller::Action;
use guestbook::kube::runtime::reflector::ObjectRef;
use guestbook::{FrontendSpec, GuestBook, GuestBookSpec, Redis, RedisSpec};

use crate::RetryPolicy;
use crate::store::MockGuestBookStore;
use crate::store::memory::MemoryStore;

use super::{ConfigurationError, GuestBookError, GuestBookReconciler, READY};

const LB_IP: &str = "203.0.113.7";

fn guestbook(name: &str, namespace: &str, redis_name: &str, serving_port: i32) -> GuestBook {
    let mut guestbook = GuestBook::new(
        name,
        GuestBookSpec {
            redis_name: redis_name.to_string(),
            frontend: FrontendSpec {
                serving_port,
                ..Default::default()
            },
        },
    );
    guestbook.metadata.namespace = Some(namespace.to_string());
    guestbook
}

fn redis(name: &str, namespace: &str) -> Redis {
    let mut redis = Redis::new(name, RedisSpec::default());
    redis.metadata.namespace = Some(namespace.to_string());
    redis
}

fn key(name: &str, namespace: &str) -> ObjectRef<GuestBook> {
    ObjectRef::new(name).within(namespace)
}

fn ready_reason(guestbook: &GuestBook) -> String {
    guestbook
        .status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|cond| cond.type_ == READY))
        .map(|cond| cond.reason.clone())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_creates_owned_objects_and_url() {
    let store = MemoryStore::new().with_load_balancer_ip(LB_IP);
    let gb1 = store.put_guestbook(guestbook("gb1", "default", "redis1", 80));
    store.put_redis(redis("redis1", "default"));
    let reconciler = GuestBookReconciler::default();

    let action = reconciler
        .reconcile(&store, &key("gb1", "default"))
        .await
        .unwrap();
    assert_eq!(action, Action::await_change());

    let deployments = store.deployments();
    let services = store.services();
    assert_eq!(deployments.len(), 1);
    assert_eq!(services.len(), 1);
    let uid = gb1.metadata.uid.unwrap();
    for meta in [&deployments[0].metadata, &services[0].metadata] {
        let orefs = meta.owner_references.as_ref().unwrap();
        assert_eq!(orefs.len(), 1);
        assert_eq!(orefs[0].name, "gb1");
        assert_eq!(orefs[0].uid, uid);
    }

    let stored = store.guestbook("default", "gb1").unwrap();
    let url = &stored.status.as_ref().unwrap().url;
    assert_eq!(url, "http://203.0.113.7:80");
    assert!(url.contains(":80"));
    assert_eq!(ready_reason(&stored), "Reconciled");
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let store = MemoryStore::new().with_load_balancer_ip(LB_IP);
    store.put_guestbook(guestbook("gb1", "ns", "redis1", 8080));
    store.put_redis(redis("redis1", "ns"));
    let reconciler = GuestBookReconciler::default();

    reconciler.reconcile(&store, &key("gb1", "ns")).await.unwrap();
    let deployments = store.deployments();
    let services = store.services();
    let status = store.guestbook("ns", "gb1").unwrap().status;

    reconciler.reconcile(&store, &key("gb1", "ns")).await.unwrap();
    assert_eq!(store.deployments(), deployments);
    assert_eq!(store.services(), services);
    assert_eq!(store.guestbook("ns", "gb1").unwrap().status, status);

    let status_writes = store
        .writes()
        .into_iter()
        .filter(|write| write.ends_with("/status"))
        .count();
    assert_eq!(status_writes, 1);
}

#[tokio::test]
async fn test_missing_guestbook_is_noop() {
    let store = MemoryStore::new();
    let reconciler = GuestBookReconciler::default();
    let action = reconciler
        .reconcile(&store, &key("gone", "ns"))
        .await
        .unwrap();
    assert_eq!(action, Action::await_change());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_missing_guestbook_issues_no_writes() {
    let mut store = MockGuestBookStore::new();
    store
        .expect_get_guestbook()
        .times(1)
        .returning(|_, _| Ok(None));
    let reconciler = GuestBookReconciler::default();
    reconciler
        .reconcile(&store, &key("gone", "ns"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_redis_is_retried_without_writes() {
    let store = MemoryStore::new().with_load_balancer_ip(LB_IP);
    store.put_guestbook(guestbook("gb1", "ns", "redis1", 8080));
    let reconciler = GuestBookReconciler::default();

    let err = reconciler
        .reconcile(&store, &key("gb1", "ns"))
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        GuestBookError::RedisNotFound { namespace, name } if namespace == "ns" && name == "redis1"
    ));
    assert!(err.retryable());
    assert!(store.writes().is_empty());
    assert!(store.guestbook("ns", "gb1").unwrap().status.is_none());

    // the redis showing up later converges the guestbook
    store.put_redis(redis("redis1", "ns"));
    reconciler.reconcile(&store, &key("gb1", "ns")).await.unwrap();
    assert_eq!(store.deployments().len(), 1);
}

#[tokio::test]
async fn test_missing_redis_never_applies() {
    let mut store = MockGuestBookStore::new();
    store.expect_get_guestbook().times(1).returning(|_, _| {
        let mut guestbook = guestbook("gb1", "ns", "redis1", 8080);
        guestbook.metadata.uid = Some("uid-gb1".to_string());
        Ok(Some(guestbook))
    });
    store.expect_get_redis().times(1).returning(|_, _| Ok(None));
    let reconciler = GuestBookReconciler::default();
    let err = reconciler
        .reconcile(&store, &key("gb1", "ns"))
        .await
        .unwrap_err();
    assert!(matches!(err, GuestBookError::RedisNotFound { .. }));
}

#[tokio::test]
async fn test_serving_port_change_updates_url() {
    let store = MemoryStore::new().with_load_balancer_ip(LB_IP);
    store.put_guestbook(guestbook("gb1", "ns", "redis1", 8080));
    store.put_redis(redis("redis1", "ns"));
    let reconciler = GuestBookReconciler::default();

    reconciler.reconcile(&store, &key("gb1", "ns")).await.unwrap();
    let stored = store.guestbook("ns", "gb1").unwrap();
    assert_eq!(stored.status.unwrap().url, "http://203.0.113.7:8080");

    store.put_guestbook(guestbook("gb1", "ns", "redis1", 9090));
    reconciler.reconcile(&store, &key("gb1", "ns")).await.unwrap();
    let stored = store.guestbook("ns", "gb1").unwrap();
    let status = stored.status.unwrap();
    assert_eq!(status.url, "http://203.0.113.7:9090");
    assert_eq!(status.observed_generation, stored.metadata.generation);
    let service = &store.services()[0];
    assert_eq!(service.spec.as_ref().unwrap().ports.as_ref().unwrap()[0].port, 9090);
}

#[tokio::test]
async fn test_pending_address_leaves_url_empty() {
    let store = MemoryStore::new();
    store.put_guestbook(guestbook("gb1", "ns", "redis1", 8080));
    store.put_redis(redis("redis1", "ns"));
    let reconciler = GuestBookReconciler::default();

    reconciler.reconcile(&store, &key("gb1", "ns")).await.unwrap();
    let stored = store.guestbook("ns", "gb1").unwrap();
    assert_eq!(stored.status.as_ref().unwrap().url, "");
    assert_eq!(ready_reason(&stored), "AddressPending");
}

#[tokio::test]
async fn test_invalid_configuration_is_terminal() {
    let store = MemoryStore::new().with_load_balancer_ip(LB_IP);
    let mut invalid = guestbook("gb1", "ns", "redis1", 8080);
    invalid.spec.frontend.image = String::new();
    store.put_guestbook(invalid);
    store.put_redis(redis("redis1", "ns"));
    let reconciler = GuestBookReconciler::default();

    let err = reconciler
        .reconcile(&store, &key("gb1", "ns"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GuestBookError::Configuration(ConfigurationError::MissingImage)
    ));
    assert!(!err.retryable());
    assert!(store.deployments().is_empty());
    assert!(store.services().is_empty());
    let stored = store.guestbook("ns", "gb1").unwrap();
    assert_eq!(ready_reason(&stored), "InvalidConfiguration");
    assert_eq!(store.writes(), ["guestbook/gb1/status"]);

    // a repeated attempt does not rewrite the same condition
    reconciler
        .reconcile(&store, &key("gb1", "ns"))
        .await
        .unwrap_err();
    assert_eq!(store.writes().len(), 1);
}

#[tokio::test]
async fn test_empty_redis_name_is_rejected_before_lookup() {
    let mut store = MockGuestBookStore::new();
    store.expect_get_guestbook().times(1).returning(|_, _| {
        let mut guestbook = guestbook("gb1", "ns", "", 8080);
        guestbook.metadata.uid = Some("uid-gb1".to_string());
        Ok(Some(guestbook))
    });
    store
        .expect_patch_guestbook_status()
        .times(1)
        .returning(|guestbook| Ok(guestbook.clone()));
    let reconciler = GuestBookReconciler::default();
    let err = reconciler
        .reconcile(&store, &key("gb1", "ns"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GuestBookError::Configuration(ConfigurationError::MissingRedisName)
    ));
}

#[tokio::test]
async fn test_partial_apply_skips_status() {
    let store = MemoryStore::new()
        .with_load_balancer_ip(LB_IP)
        .failing_service_apply();
    store.put_guestbook(guestbook("gb1", "ns", "redis1", 8080));
    store.put_redis(redis("redis1", "ns"));
    let reconciler = GuestBookReconciler::default();

    let err = reconciler
        .reconcile(&store, &key("gb1", "ns"))
        .await
        .unwrap_err();
    assert!(matches!(err, GuestBookError::Api(_)));
    assert!(err.retryable());
    assert_eq!(store.deployments().len(), 1);
    assert!(store.services().is_empty());
    assert!(store.guestbook("ns", "gb1").unwrap().status.is_none());
}

#[tokio::test]
async fn test_deleted_guestbook_leaves_no_orphans() {
    let store = MemoryStore::new().with_load_balancer_ip(LB_IP);
    store.put_guestbook(guestbook("g1", "ns", "redis1", 8080));
    store.put_guestbook(guestbook("g2", "ns", "redis1", 8080));
    store.put_redis(redis("redis1", "ns"));
    let reconciler = GuestBookReconciler::default();
    reconciler.reconcile(&store, &key("g1", "ns")).await.unwrap();
    reconciler.reconcile(&store, &key("g2", "ns")).await.unwrap();
    assert_eq!(store.deployments().len(), 2);

    store.delete_guestbook("ns", "g1");
    let names = |metas: Vec<Option<String>>| metas.into_iter().flatten().collect::<Vec<_>>();
    assert_eq!(
        names(store.deployments().into_iter().map(|d| d.metadata.name).collect()),
        ["g2"]
    );
    assert_eq!(
        names(store.services().into_iter().map(|s| s.metadata.name).collect()),
        ["g2"]
    );

    let writes = store.writes().len();
    reconciler.reconcile(&store, &key("g1", "ns")).await.unwrap();
    assert_eq!(store.writes().len(), writes);
}

#[tokio::test]
async fn test_invalid_configuration_clears_url() {
    let store = MemoryStore::new().with_load_balancer_ip(LB_IP);
    store.put_guestbook(guestbook("gb1", "ns", "redis1", 8080));
    store.put_redis(redis("redis1", "ns"));
    let reconciler = GuestBookReconciler::default();

    reconciler.reconcile(&store, &key("gb1", "ns")).await.unwrap();
    let stored = store.guestbook("ns", "gb1").unwrap();
    assert_eq!(stored.status.unwrap().url, "http://203.0.113.7:8080");

    store.put_guestbook(guestbook("gb1", "ns", "redis1", 0));
    let err = reconciler
        .reconcile(&store, &key("gb1", "ns"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GuestBookError::Configuration(ConfigurationError::InvalidServingPort(0))
    ));
    let stored = store.guestbook("ns", "gb1").unwrap();
    assert_eq!(ready_reason(&stored), "InvalidConfiguration");
    assert_eq!(stored.status.unwrap().url, "");
}
