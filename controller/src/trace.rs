use std::fmt::Debug;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use guestbook::kube::Resource;
use guestbook::kube::runtime::reflector::ObjectRef;
use tower::{Layer, Service};
use tracing::{Instrument, Level};

pub struct TraceService<S> {
    name: String,
    inner: S,
}

impl<S, T, C> Service<(Arc<T>, C)> for TraceService<S>
where
    S: Service<(Arc<T>, C)> + Send,
    T: Resource,
    <T as Resource>::DynamicType: Default,
    S::Future: Send + 'static,
    S::Error: std::fmt::Display,
    S::Response: Debug,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;
    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }
    fn call(&mut self, req: (Arc<T>, C)) -> Self::Future {
        let span = tracing::span!(
            Level::INFO,
            "reconcile",
            controller = %self.name,
            object = %ObjectRef::from_obj(req.0.as_ref()),
        );
        let fut = span.in_scope(|| self.inner.call(req));
        async move {
            match fut.await {
                Ok(ret) => {
                    tracing::info!("Reconciled {ret:?}");
                    Ok(ret)
                }
                Err(err) => {
                    tracing::error!("Error {err}");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .boxed()
    }
}

pub struct TraceLayer {
    name: String,
}

impl TraceLayer {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl<S> Layer<S> for TraceLayer {
    type Service = TraceService<S>;
    fn layer(&self, inner: S) -> TraceService<S> {
        TraceService {
            name: self.name.clone(),
            inner,
        }
    }
}
