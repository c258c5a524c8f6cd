use crate::client::ResourceManagementClient;
use crate::resource_group::null_as_empty;
use crate::ResourceManagementError;
use getset::Getters;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

const API_VERSION: &str = "2016-02-01";

/// Any ARM resource, with its type-specific settings carried as an untyped
/// property bag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, Getters)]
#[getset(get = "pub")]
pub struct GenericResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    resource_type: Option<String>,
    #[serde(default)]
    location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(rename = "managedBy", skip_serializing_if = "Option::is_none")]
    managed_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    properties: Value,
}

impl GenericResource {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_owned(),
            ..Default::default()
        }
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags = tags.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }
}

/// Identifies a resource below a resource group, together with the API version
/// its resource provider expects.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceId<'r> {
    pub resource_group_name: &'r str,
    pub provider_namespace: &'r str,
    pub parent_resource_path: &'r str,
    pub resource_type: &'r str,
    pub resource_name: &'r str,
    pub api_version: &'r str,
}

impl ResourceId<'_> {
    pub(crate) fn path(&self, subscription_path: &str) -> String {
        let parent = self.parent_resource_path.trim_matches('/');
        let mut path = format!(
            "{}/resourcegroups/{}/providers/{}/",
            subscription_path, self.resource_group_name, self.provider_namespace
        );
        if !parent.is_empty() {
            path.push_str(parent);
            path.push('/');
        }
        path.push_str(&format!("{}/{}", self.resource_type, self.resource_name));
        path
    }
}

/// Property bag for a standard-SKU key vault owned by `tenant_id`, enabled for
/// deployments, template deployments and disk encryption.
pub fn key_vault_properties(tenant_id: &str) -> Value {
    json!({
        "sku": { "family": "A", "name": "standard" },
        "tenantId": tenant_id,
        "accessPolicies": [],
        "enabledForDeployment": true,
        "enabledForTemplateDeployment": true,
        "enabledForDiskEncryption": true
    })
}

impl<'a> ResourceManagementClient<'a> {
    /// Creates or replaces a resource through the generic resource API.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use azure_sdk_resources::{key_vault_properties, GenericResource, ResourceId, ResourceManagementClient};
    /// # async fn run() -> Result<(), azure_sdk_resources::ResourceManagementError> {
    /// let mut client = ResourceManagementClient::new(&"c1a6d79b-082b-4798-b362-a77e96de50db", &"SUPER_SECRET_KEY", &"bc598e67-03d8-44d5-aa46-8289b9a39a14", &"11111111-1111-1111-1111-111111111111");
    /// let id = ResourceId {
    ///     resource_group_name: "my-group",
    ///     provider_namespace: "Microsoft.KeyVault",
    ///     parent_resource_path: "",
    ///     resource_type: "vaults",
    ///     resource_name: "my-vault",
    ///     api_version: "2015-06-01",
    /// };
    /// let params = GenericResource::new("westus").with_properties(key_vault_properties("bc598e67-03d8-44d5-aa46-8289b9a39a14"));
    /// client.create_or_update_resource(&id, &params).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_or_update_resource(
        &mut self,
        resource_id: &ResourceId<'_>,
        parameters: &GenericResource,
    ) -> Result<GenericResource, ResourceManagementError> {
        let url = self.arm_url(&resource_id.path(&self.subscription_path()), resource_id.api_version)?;
        let request = self.authed(Method::PUT, url).await?.json(parameters);
        let resp = Self::execute(request).await?;
        if resp.status() == StatusCode::ACCEPTED {
            self.wait_for_completion(resp).await?;
            return self.get_resource(resource_id).await;
        }
        Ok(serde_json::from_str(&resp.text().await?)?)
    }

    pub async fn get_resource(&mut self, resource_id: &ResourceId<'_>) -> Result<GenericResource, ResourceManagementError> {
        let url = self.arm_url(&resource_id.path(&self.subscription_path()), resource_id.api_version)?;
        self.get_json(url).await
    }

    pub async fn delete_resource(&mut self, resource_id: &ResourceId<'_>) -> Result<(), ResourceManagementError> {
        let url = self.arm_url(&resource_id.path(&self.subscription_path()), resource_id.api_version)?;
        let request = self.authed(Method::DELETE, url).await?;
        let resp = Self::execute(request).await?;
        self.wait_for_completion(resp).await?;
        Ok(())
    }

    /// Lists every resource in the subscription.
    pub async fn list_resources(&mut self) -> Result<Vec<GenericResource>, ResourceManagementError> {
        let url = self.arm_url(&format!("{}/resources", self.subscription_path()), API_VERSION)?;
        self.list_all(url).await
    }

    pub async fn list_resources_by_resource_group(
        &mut self,
        resource_group_name: &str,
    ) -> Result<Vec<GenericResource>, ResourceManagementError> {
        let url = self.arm_url(
            &format!("{}/resourcegroups/{}/resources", self.subscription_path(), resource_group_name),
            API_VERSION,
        )?;
        self.list_all(url).await
    }
}
