use std::fmt;

use futures::future::BoxFuture;
use futures::prelude::*;
use guestbook::kube::runtime::reflector::{Lookup, ObjectRef};

use crate::error::{ControllerError, ControllerResult};

pub trait ControllerStreamExt<'a> {
    /// Drives the controller stream to completion, logging every reconciliation outcome.
    fn wait(self) -> BoxFuture<'a, ()>;
}

impl<'a, T, K, E: 'static> ControllerStreamExt<'a> for T
where
    T: Stream<Item = ControllerResult<K, E>> + Send + 'a,
    K: Lookup,
    ObjectRef<K>: fmt::Display,
    ControllerError<E>: fmt::Display,
{
    fn wait(self) -> BoxFuture<'a, ()> {
        self.for_each(|result| {
            match result {
                Ok((object, action)) => tracing::debug!(%object, ?action, "Reconciled"),
                Err(err) => tracing::warn!(%err, "Reconciliation failed"),
            }
            future::ready(())
        })
        .boxed()
    }
}
