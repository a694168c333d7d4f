mod apply_status;
mod desired;
mod error;
mod index;
mod status;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::prelude::*;
use guestbook::k8s_openapi::api::{apps::v1::Deployment, core::v1::Service};
use guestbook::kube::runtime::{
    Controller,
    controller::{self, Action},
    reflector::ObjectRef,
    watcher,
};
use guestbook::{GuestBook, GuestBookLabel, Redis};

use crate::backoff::default_error_policy;
use crate::context::Context;
use crate::error::ControllerResult;
use crate::reconciler::{ReconcileError, Reconciler, ReconcilerExt};
use crate::store::GuestBookStore;

pub use desired::{
    ConfigurationError, Desired, build, desired_deployment, desired_service, selector_labels,
};
pub use error::GuestBookError;
pub use index::DependencyIndex;
pub use status::{Outcome, READY, desired_status, url_for_service};

#[derive(Debug, Clone, Copy, Default)]
pub struct GuestBookReconciler;

impl GuestBookReconciler {
    /// Converges the cluster towards the guestbook identified by `key`.
    ///
    /// Every call recomputes the full desired state from the stored guestbook
    /// and its redis. A guestbook that no longer exists is not an error.
    #[tracing::instrument(skip_all, fields(guestbook = %key))]
    pub async fn reconcile<S>(
        &self,
        store: &S,
        key: &ObjectRef<GuestBook>,
    ) -> Result<Action, GuestBookError>
    where
        S: GuestBookStore + ?Sized,
    {
        let namespace = key
            .namespace
            .as_deref()
            .ok_or(guestbook::Error::ObjectMetaMissing("namespace"))?;
        let Some(guestbook) = store.get_guestbook(namespace, &key.name).await? else {
            tracing::debug!("GuestBook is gone");
            return Ok(Action::await_change());
        };

        let redis_name = guestbook.spec.redis_name.as_str();
        if redis_name.is_empty() {
            return self
                .reject(store, &guestbook, ConfigurationError::MissingRedisName)
                .await;
        }
        let Some(redis) = store.get_redis(namespace, redis_name).await? else {
            tracing::info!(redis = redis_name, "Waiting for Redis");
            return Err(GuestBookError::RedisNotFound {
                namespace: namespace.to_string(),
                name: redis_name.to_string(),
            });
        };

        let Desired {
            deployment,
            service,
        } = match build(&guestbook, &redis) {
            Ok(desired) => desired,
            Err(err) => return self.reject(store, &guestbook, err).await,
        };
        store.apply_deployment(&deployment).await?;
        let service = store.apply_service(&service).await?;

        let url = url_for_service(&service, guestbook.spec.frontend.serving_port);
        self.apply_status(store, &guestbook, Outcome::Applied { url })
            .await?;
        Ok(Action::await_change())
    }

    async fn reject<S>(
        &self,
        store: &S,
        guestbook: &GuestBook,
        err: ConfigurationError,
    ) -> Result<Action, GuestBookError>
    where
        S: GuestBookStore + ?Sized,
    {
        tracing::warn!(%err, "Invalid guestbook");
        self.apply_status(store, guestbook, Outcome::Rejected(&err))
            .await?;
        Err(err.into())
    }
}

impl Reconciler for GuestBookReconciler {
    type Resource = GuestBook;
    type Error = GuestBookError;

    fn apply(
        &self,
        key: ObjectRef<GuestBook>,
        ctx: Arc<Context>,
    ) -> BoxFuture<'static, Result<Action, Self::Error>> {
        let reconciler = *self;
        async move { reconciler.reconcile(ctx.as_ref(), &key).await }.boxed()
    }
}

fn owned_config() -> watcher::Config {
    watcher::Config::default().labels(&GuestBookLabel::borrow("guestbook").to_string())
}

pub fn controller(ctx: &Context) -> Controller<GuestBook> {
    let guestbooks = ctx.watched_api::<GuestBook>().kube().clone();
    let deployments = ctx.watched_api::<Deployment>().kube().clone();
    let services = ctx.watched_api::<Service>().kube().clone();
    let redis = ctx.watched_api::<Redis>().kube().clone();
    let controller = Controller::new(guestbooks, watcher::Config::default());
    let index = DependencyIndex::new(controller.store());
    controller
        .owns(deployments, owned_config())
        .owns(services, owned_config())
        .watches(redis, watcher::Config::default(), move |redis| {
            index.dependents(&redis)
        })
        .with_config(controller::Config::default().concurrency(ctx.config.concurrency))
}

pub async fn run(
    ctx: Arc<Context>,
    shutdown_signal: impl Future<Output = ()> + Send + Sync + 'static,
) -> Result<
    impl Stream<Item = ControllerResult<GuestBook, ReconcileError<GuestBookError>>>,
    ReconcileError<GuestBookError>,
> {
    Ok(controller(&ctx)
        .graceful_shutdown_on(shutdown_signal)
        .run(
            GuestBookReconciler.reconcile_fn("guestbook").await?,
            default_error_policy,
            ctx,
        ))
}
