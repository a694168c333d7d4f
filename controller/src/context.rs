use std::ops::Deref;

use guestbook::k8s_openapi::NamespaceResourceScope;
use guestbook::kube::Resource;

use crate::Config;

#[derive(Clone)]
pub struct Context {
    pub client: guestbook::Client,
    pub config: Config,
}

impl Deref for Context {
    type Target = guestbook::Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl Context {
    pub fn new(client: guestbook::Client, config: Config) -> Self {
        Self { client, config }
    }

    /// Api scoped to the watched namespace, or to the whole cluster when none is configured.
    pub fn watched_api<T>(&self) -> guestbook::Api<T>
    where
        T: Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        match self.config.namespace.as_deref() {
            Some(namespace) => self.client.api_namespaced(namespace),
            None => self.client.api_global(),
        }
    }
}
