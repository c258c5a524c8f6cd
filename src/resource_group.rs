use crate::client::ResourceManagementClient;
use crate::{ErrorDetail, ResourceManagementError};
use getset::Getters;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

const API_VERSION: &str = "2016-02-01";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, Getters)]
#[getset(get = "pub")]
pub struct ResourceGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    location: String,
    #[serde(rename = "managedBy", skip_serializing_if = "Option::is_none")]
    managed_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Value>,
}

/// Some resource providers send `"tags": null` instead of omitting the field.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResourceGroup {
    /// Parameters for creating a resource group in `location`.
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_owned(),
            ..Default::default()
        }
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

/// Which resources of a group to include in an exported template.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExportTemplateRequest {
    pub resources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl ExportTemplateRequest {
    /// Requests every resource in the group.
    pub fn all_resources() -> Self {
        Self {
            resources: vec!["*".to_owned()],
            options: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct ResourceGroupExportResult {
    #[serde(default)]
    template: Value,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

impl<'a> ResourceManagementClient<'a> {
    fn resource_group_path(&self, resource_group_name: &str) -> String {
        format!("{}/resourcegroups/{}", self.subscription_path(), resource_group_name)
    }

    /// Lists every resource group in the subscription.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use azure_sdk_resources::ResourceManagementClient;
    /// # async fn run() -> Result<(), azure_sdk_resources::ResourceManagementError> {
    /// let mut client = ResourceManagementClient::new(&"c1a6d79b-082b-4798-b362-a77e96de50db", &"SUPER_SECRET_KEY", &"bc598e67-03d8-44d5-aa46-8289b9a39a14", &"11111111-1111-1111-1111-111111111111");
    /// for group in client.list_resource_groups().await? {
    ///     println!("{:?}", group.name());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_resource_groups(&mut self) -> Result<Vec<ResourceGroup>, ResourceManagementError> {
        let url = self.arm_url(&format!("{}/resourcegroups", self.subscription_path()), API_VERSION)?;
        self.list_all(url).await
    }

    pub async fn get_resource_group(&mut self, resource_group_name: &str) -> Result<ResourceGroup, ResourceManagementError> {
        let url = self.arm_url(&self.resource_group_path(resource_group_name), API_VERSION)?;
        self.get_json(url).await
    }

    /// Checks whether a resource group exists.
    pub async fn resource_group_exists(&mut self, resource_group_name: &str) -> Result<bool, ResourceManagementError> {
        let url = self.arm_url(&self.resource_group_path(resource_group_name), API_VERSION)?;
        let request = self.authed(Method::HEAD, url).await?;
        let resp = request.send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(ResourceManagementError::ApiError {
                status: status.as_u16(),
                code: String::new(),
                message: format!("Unexpected status checking resource group {}", resource_group_name),
            }),
        }
    }

    /// Creates a resource group, or replaces an existing one with `parameters`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use azure_sdk_resources::{ResourceGroup, ResourceManagementClient};
    /// # async fn run() -> Result<(), azure_sdk_resources::ResourceManagementError> {
    /// let mut client = ResourceManagementClient::new(&"c1a6d79b-082b-4798-b362-a77e96de50db", &"SUPER_SECRET_KEY", &"bc598e67-03d8-44d5-aa46-8289b9a39a14", &"11111111-1111-1111-1111-111111111111");
    /// let params = ResourceGroup::new("westus").with_tags(vec![("hello", "world")]);
    /// client.create_or_update_resource_group("my-group", &params).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_or_update_resource_group(
        &mut self,
        resource_group_name: &str,
        parameters: &ResourceGroup,
    ) -> Result<ResourceGroup, ResourceManagementError> {
        let url = self.arm_url(&self.resource_group_path(resource_group_name), API_VERSION)?;
        let request = self.authed(Method::PUT, url).await?.json(parameters);
        let resp = Self::execute(request).await?;
        Ok(serde_json::from_str(&resp.text().await?)?)
    }

    /// Replaces the tags of a resource group, leaving everything else untouched.
    pub async fn update_resource_group_tags(
        &mut self,
        resource_group_name: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<ResourceGroup, ResourceManagementError> {
        let url = self.arm_url(&self.resource_group_path(resource_group_name), API_VERSION)?;
        let request = self.authed(Method::PATCH, url).await?.json(&json!({ "tags": tags }));
        let resp = Self::execute(request).await?;
        Ok(serde_json::from_str(&resp.text().await?)?)
    }

    /// Captures a resource group as an ARM template.
    pub async fn export_resource_group_template(
        &mut self,
        resource_group_name: &str,
        parameters: &ExportTemplateRequest,
    ) -> Result<ResourceGroupExportResult, ResourceManagementError> {
        let url = self.arm_url(
            &format!("{}/exportTemplate", self.resource_group_path(resource_group_name)),
            API_VERSION,
        )?;
        let request = self.authed(Method::POST, url).await?.json(parameters);
        let resp = Self::execute(request).await?;
        let resp = self.wait_for_completion(resp).await?;
        let result: ResourceGroupExportResult = serde_json::from_str(&resp.text().await?)?;
        if let Some(error) = &result.error {
            tracing::warn!(
                resource_group = resource_group_name,
                code = %error.code,
                message = %error.message,
                "template export is incomplete"
            );
        }
        Ok(result)
    }

    /// Deletes a resource group and everything in it, waiting until ARM reports
    /// the deletion finished.
    pub async fn delete_resource_group(&mut self, resource_group_name: &str) -> Result<(), ResourceManagementError> {
        let url = self.arm_url(&self.resource_group_path(resource_group_name), API_VERSION)?;
        let request = self.authed(Method::DELETE, url).await?;
        let resp = Self::execute(request).await?;
        self.wait_for_completion(resp).await?;
        tracing::info!(resource_group = resource_group_name, "resource group deleted");
        Ok(())
    }
}
