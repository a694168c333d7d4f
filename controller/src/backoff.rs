use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use guestbook::kube::Resource;
use guestbook::kube::runtime::controller::Action;
use guestbook::kube::runtime::reflector::ObjectRef;
use guestbook::kube::runtime::{utils::Backoff, watcher::DefaultBackoff};
use thiserror::Error;
use tokio::sync::Mutex;
use tower::{Layer, Service};

/// Classifies reconciliation errors for the backoff layer.
pub trait RetryPolicy {
    /// Errors that cannot succeed without the object changing return `false`
    /// and wait for the next change instead of being requeued.
    fn retryable(&self) -> bool {
        true
    }
}

#[derive(Debug, Error)]
pub struct BackoffError<E> {
    #[source]
    pub error: E,
    pub backoff: Option<Duration>,
}

impl<E> BackoffError<E> {
    pub fn new(error: E, backoff: Option<Duration>) -> Self {
        Self { error, backoff }
    }
}

impl<E> fmt::Display for BackoffError<E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(backoff) = self.backoff {
            write!(f, "{} (next wait: {:?})", self.error, backoff)
        } else {
            self.error.fmt(f)
        }
    }
}

pub trait BackoffBuilder {
    type Backoff: Backoff;
    fn build(&self) -> Self::Backoff;
}

type Backoffs<K, B> = Arc<Mutex<HashMap<ObjectRef<K>, B>>>;

/// Tracks one backoff per object so failures of one object never slow down another.
pub struct BackoffService<S, B, K>
where
    B: BackoffBuilder,
    K: Resource,
{
    inner: S,
    builder: Arc<B>,
    backoffs: Backoffs<K, B::Backoff>,
}

impl<S, B, K, C> Service<(Arc<K>, C)> for BackoffService<S, B, K>
where
    S: Service<(Arc<K>, C)>,
    S::Response: Send + 'static,
    S::Error: RetryPolicy + Send + 'static,
    S::Future: Send + 'static,
    B: BackoffBuilder + Send + Sync + 'static,
    B::Backoff: Send + 'static,
    K: Resource + 'static,
    K::DynamicType: Default + Clone + Eq + Hash + Send + Sync,
{
    type Response = S::Response;
    type Error = BackoffError<S::Error>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;
    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(|e| BackoffError::new(e, None))
    }
    fn call(&mut self, (resource, ctx): (Arc<K>, C)) -> Self::Future {
        let key = ObjectRef::from_obj(resource.as_ref());
        let ret = self.inner.call((resource, ctx));
        let builder = self.builder.clone();
        let backoffs = self.backoffs.clone();
        async move {
            match ret.await {
                Ok(res) => {
                    backoffs.lock().await.remove(&key);
                    Ok(res)
                }
                Err(err) => {
                    let mut backoffs = backoffs.lock().await;
                    let backoff = if err.retryable() {
                        backoffs
                            .entry(key)
                            .or_insert_with(|| builder.build())
                            .next()
                    } else {
                        backoffs.remove(&key);
                        None
                    };
                    Err(BackoffError::new(err, backoff))
                }
            }
        }
        .boxed()
    }
}

pub struct BackoffLayer<B, K> {
    backoff_builder: Arc<B>,
    _resource: PhantomData<fn() -> K>,
}

impl<B, K> Default for BackoffLayer<B, K>
where
    B: Default,
{
    fn default() -> Self {
        Self {
            backoff_builder: Arc::new(B::default()),
            _resource: PhantomData,
        }
    }
}

impl<S, B, K> Layer<S> for BackoffLayer<B, K>
where
    B: BackoffBuilder,
    K: Resource,
{
    type Service = BackoffService<S, B, K>;

    fn layer(&self, inner: S) -> Self::Service {
        BackoffService {
            inner,
            builder: self.backoff_builder.clone(),
            backoffs: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[derive(Clone, Default)]
pub struct DefaultBackoffBuilder;

impl BackoffBuilder for DefaultBackoffBuilder {
    type Backoff = DefaultBackoff;

    fn build(&self) -> Self::Backoff {
        DefaultBackoff::default()
    }
}

pub type DefaultBackoffLayer<K> = BackoffLayer<DefaultBackoffBuilder, K>;

pub fn default_error_policy<R, E, C>(
    _object: Arc<R>,
    error: &BackoffError<E>,
    _ctx: Arc<C>,
) -> Action {
    if let Some(backoff) = error.backoff {
        Action::requeue(backoff)
    } else {
        Action::await_change()
    }
}
