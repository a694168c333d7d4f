use hyper_util::{client::legacy::Client as HttpClient, rt::TokioExecutor};
use k8s_openapi::{
    NamespaceResourceScope,
    apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition,
};
use kube::Resource;
use kube::client::ConfigExt as _;
use tower::ServiceBuilder;
use tower_http::{BoxError, trace::TraceLayer};

use crate::{Api, ClientBuildError, Result, all_crds};

pub const DEFAULT_FIELD_MANAGER: &str = "guestbook-controller";

/// Store client that applies everything under one field manager.
#[derive(Clone)]
pub struct Client {
    field_manager: String,
    kube: kube::Client,
}

/// Builds a [`Client`] from the inferred kube config.
#[derive(Default)]
pub struct ClientBuilder {
    field_manager: Option<String>,
    default_namespace: Option<String>,
}

fn connect(
    config: kube::Config,
    namespace: Option<String>,
) -> Result<kube::Client, ClientBuildError> {
    let connector = config.rustls_https_connector()?;
    let service = ServiceBuilder::new()
        .layer(config.base_uri_layer())
        .option_layer(config.auth_layer()?)
        .layer(TraceLayer::new_for_http())
        .map_err(BoxError::from)
        .service(HttpClient::builder(TokioExecutor::new()).build(connector));
    Ok(kube::Client::new(
        service,
        namespace.unwrap_or(config.default_namespace),
    ))
}

impl ClientBuilder {
    pub fn name(mut self, field_manager: impl Into<String>) -> Self {
        self.field_manager = Some(field_manager.into());
        self
    }

    pub fn namespace(mut self, namespace: Option<impl Into<String>>) -> Self {
        self.default_namespace = namespace.map(Into::into);
        self
    }

    pub async fn build(self) -> Result<Client, ClientBuildError> {
        let config = kube::Config::infer().await?;
        Ok(Client {
            field_manager: self
                .field_manager
                .unwrap_or_else(|| DEFAULT_FIELD_MANAGER.to_string()),
            kube: connect(config, self.default_namespace)?,
        })
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    #[inline]
    pub fn api_namespaced<T>(&self, namespace: &str) -> Api<T>
    where
        T: Resource<Scope = NamespaceResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        Api::new(
            &self.field_manager,
            kube::Api::namespaced(self.kube.clone(), namespace),
        )
    }

    #[inline]
    pub fn api_global<T>(&self) -> Api<T>
    where
        T: Resource,
        <T as Resource>::DynamicType: Default,
    {
        Api::new(&self.field_manager, kube::Api::all(self.kube.clone()))
    }

    /// Server-side applies the GuestBook and Redis definitions.
    pub async fn patch_all_crds(&self) -> Result<()> {
        let api = self.api_global::<CustomResourceDefinition>();
        for crd in all_crds() {
            let crd = api.patch(&crd).await?;
            tracing::debug!(crd = ?crd.metadata.name, "Applied CRD");
        }
        Ok(())
    }
}
