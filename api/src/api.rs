use std::fmt::Debug;

use kube::{
    Resource,
    api::{Patch, PatchParams},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{ObjectMetaExt, ResourceNameExt, Result};

/// Typed access to one kind of object, applying under a fixed field manager.
pub struct Api<T> {
    params: PatchParams,
    inner: kube::api::Api<T>,
}

impl<T> Api<T> {
    pub fn new(field_manager: &str, inner: kube::api::Api<T>) -> Self {
        Self {
            params: PatchParams::apply(field_manager).force(),
            inner,
        }
    }
}

fn apply_document<T>(resource: &T) -> Result<Map<String, Value>>
where
    T: Serialize,
{
    match serde_json::to_value(resource)? {
        Value::Object(object) => Ok(object),
        other => Err(crate::Error::expected_json_type("object", &other)),
    }
}

impl<T> Api<T>
where
    T: Resource + Serialize + DeserializeOwned + Clone + Debug + Send + 'static,
{
    #[inline]
    pub fn kube(&self) -> &kube::Api<T> {
        &self.inner
    }

    /// Applies the whole document except status and server-populated metadata.
    #[tracing::instrument(level = "debug", skip(self), ret, err)]
    pub async fn patch(&self, resource: &T) -> Result<T> {
        let mut object = apply_document(resource)?;
        object.remove("status");
        object.insert(
            "metadata".to_string(),
            serde_json::to_value(resource.meta().strip_system())?,
        );
        Ok(self
            .inner
            .patch(resource.name()?, &self.params, &Patch::Apply(&object))
            .await?)
    }

    #[tracing::instrument(level = "debug", skip(self), ret, err)]
    pub async fn get_opt(&self, name: &str) -> Result<Option<T>> {
        Ok(self.inner.get_opt(name).await?)
    }

    /// Applies only the status through the status subresource, the spec is left alone.
    #[tracing::instrument(level = "debug", skip(self), ret, err)]
    pub async fn patch_status(&self, resource: &T) -> Result<T> {
        let mut object = apply_document(resource)?;
        object.remove("spec");
        object.remove("metadata");
        Ok(self
            .inner
            .patch_status(resource.name()?, &self.params, &Patch::Apply(&object))
            .await?)
    }
}
