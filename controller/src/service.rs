use std::sync::Arc;

use futures::future::BoxFuture;
use guestbook::kube::{
    Resource,
    runtime::{controller::Action, reflector::ObjectRef},
};
use tower::{Service, ServiceExt};

use crate::context::Context;
use crate::reconciler::Reconciler;

/// Bottom of the reconcile stack, hands the object identity to the reconciler.
pub struct ReconcileService<T> {
    reconciler: T,
}

impl<T> ReconcileService<T> {
    pub fn new(reconciler: T) -> Self {
        Self { reconciler }
    }
}

impl<T, R> Service<(Arc<R>, Arc<Context>)> for ReconcileService<T>
where
    T: Reconciler<Resource = R>,
    R: Resource,
    <R as Resource>::DynamicType: Default,
{
    type Response = Action;
    type Error = T::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, (resource, ctx): (Arc<R>, Arc<Context>)) -> Self::Future {
        self.reconciler
            .apply(ObjectRef::from_obj(resource.as_ref()), ctx)
    }
}

pub async fn reconcile<S, T>(
    mut service: S,
) -> Result<Box<dyn FnMut(Arc<T>, Arc<Context>) -> S::Future + Send>, S::Error>
where
    S: Service<(Arc<T>, Arc<Context>)> + Send + 'static,
{
    service.ready().await?;
    Ok(Box::new(move |resource: Arc<T>, ctx: Arc<Context>| {
        service.call((resource, ctx))
    }))
}
