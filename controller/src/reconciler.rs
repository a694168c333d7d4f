use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use guestbook::kube::{
    Resource,
    runtime::{controller::Action, reflector::ObjectRef},
};
use tower::{Service, ServiceBuilder};

use crate::backoff::{BackoffError, DefaultBackoffLayer, RetryPolicy};
use crate::context::Context;
use crate::service::{ReconcileService, reconcile};
use crate::trace::TraceLayer;

/// One reconciliation attempt for the object behind `key`.
///
/// Implementations fetch the object themselves, the body delivered by the
/// watcher only identifies what to reconcile.
pub trait Reconciler {
    type Resource: Resource;
    type Error;
    fn apply(
        &self,
        key: ObjectRef<Self::Resource>,
        ctx: Arc<Context>,
    ) -> BoxFuture<'static, Result<Action, Self::Error>>;
}

pub type ReconcileError<E> = BackoffError<E>;
type ReconcileFuture<E> = BoxFuture<'static, Result<Action, ReconcileError<E>>>;
type ReconcileFn<R, E> = Box<dyn FnMut(Arc<R>, Arc<Context>) -> ReconcileFuture<E> + Send>;

#[allow(clippy::type_complexity)]
pub trait ReconcilerExt: Reconciler {
    fn service(
        self,
        name: impl ToString,
    ) -> impl Service<
        (Arc<Self::Resource>, Arc<Context>),
        Response = Action,
        Error = ReconcileError<Self::Error>,
        Future = ReconcileFuture<Self::Error>,
    > + Send
    + Sync
    + 'static
    where
        Self: Sized + Send + Sync + 'static,
        Self::Resource: Clone + Debug + Send + Sync + 'static,
        <Self::Resource as Resource>::DynamicType:
            Default + Clone + Eq + Hash + Send + Sync + 'static,
        Self::Error: std::error::Error + RetryPolicy + Send + 'static,
    {
        ServiceBuilder::new()
            .layer(DefaultBackoffLayer::default())
            .layer(TraceLayer::new(name))
            .service(ReconcileService::new(self))
    }

    fn reconcile_fn(
        self,
        name: impl ToString,
    ) -> BoxFuture<
        'static,
        Result<ReconcileFn<Self::Resource, Self::Error>, ReconcileError<Self::Error>>,
    >
    where
        Self: Sized + Send + Sync + 'static,
        Self::Resource: Clone + Debug + Send + Sync + 'static,
        <Self::Resource as Resource>::DynamicType:
            Default + Clone + Eq + Hash + Send + Sync + 'static,
        Self::Error: std::error::Error + RetryPolicy + Send + 'static,
    {
        reconcile(self.service(name)).boxed()
    }
}

impl<T> ReconcilerExt for T where T: Reconciler {}
