use guestbook::kube::runtime::reflector::{ObjectRef, Store};
use guestbook::{GuestBook, Redis, prelude::*};

/// Finds the guestbooks naming a Redis, reading the controller's own GuestBook cache.
///
/// The cache is fed by the GuestBook watcher, so deleted guestbooks drop out
/// without a reconciliation.
#[derive(Clone)]
pub struct DependencyIndex {
    guestbooks: Store<GuestBook>,
}

impl DependencyIndex {
    pub fn new(guestbooks: Store<GuestBook>) -> Self {
        Self { guestbooks }
    }

    /// Guestbooks to reconcile after `redis` changed, sorted by name.
    pub fn dependents(&self, redis: &Redis) -> Vec<ObjectRef<GuestBook>> {
        let Some(namespace) = redis.namespace() else {
            return Vec::new();
        };
        let redis_name = redis.name_any();
        let mut dependents = self
            .guestbooks
            .state()
            .into_iter()
            .filter(|guestbook| {
                guestbook.namespace().as_ref() == Some(&namespace)
                    && guestbook.spec.redis_name == redis_name
            })
            .map(|guestbook| ObjectRef::from_obj(guestbook.as_ref()))
            .collect::<Vec<_>>();
        dependents.sort_by(|a, b| a.name.cmp(&b.name));
        dependents
    }
}
