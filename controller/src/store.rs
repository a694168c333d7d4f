use async_trait::async_trait;
use guestbook::k8s_openapi::api::{apps::v1::Deployment, core::v1::Service};
use guestbook::{GuestBook, Redis, prelude::*};

use crate::context::Context;

/// The operations a GuestBook reconciliation needs from the cluster store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuestBookStore: Send + Sync {
    async fn get_guestbook(&self, namespace: &str, name: &str)
    -> guestbook::Result<Option<GuestBook>>;

    async fn get_redis(&self, namespace: &str, name: &str) -> guestbook::Result<Option<Redis>>;

    /// Server-side applies the full deployment document with forced ownership.
    async fn apply_deployment(&self, deployment: &Deployment) -> guestbook::Result<Deployment>;

    /// Server-side applies the full service document, returning the stored object with its status.
    async fn apply_service(&self, service: &Service) -> guestbook::Result<Service>;

    /// Writes only the status of `guestbook`.
    async fn patch_guestbook_status(&self, guestbook: &GuestBook)
    -> guestbook::Result<GuestBook>;
}

#[async_trait]
impl GuestBookStore for Context {
    async fn get_guestbook(
        &self,
        namespace: &str,
        name: &str,
    ) -> guestbook::Result<Option<GuestBook>> {
        self.api_namespaced::<GuestBook>(namespace)
            .get_opt(name)
            .await
    }

    async fn get_redis(&self, namespace: &str, name: &str) -> guestbook::Result<Option<Redis>> {
        self.api_namespaced::<Redis>(namespace).get_opt(name).await
    }

    async fn apply_deployment(&self, deployment: &Deployment) -> guestbook::Result<Deployment> {
        self.api_namespaced::<Deployment>(deployment.require_namespace()?)
            .patch(deployment)
            .await
    }

    async fn apply_service(&self, service: &Service) -> guestbook::Result<Service> {
        self.api_namespaced::<Service>(service.require_namespace()?)
            .patch(service)
            .await
    }

    async fn patch_guestbook_status(
        &self,
        guestbook: &GuestBook,
    ) -> guestbook::Result<GuestBook> {
        self.api_namespaced::<GuestBook>(guestbook.require_namespace()?)
            .patch_status(guestbook)
            .await
    }
}
