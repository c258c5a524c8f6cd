use crate::ResourceManagementError;
use getset::Getters;
use reqwest::Url;

/// Endpoints of an Azure cloud. Use `azure_cloud` for public Azure and
/// `azure_stack` (or a hand-built value) for private clouds.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct AzureEnvironment {
    name: String,
    portal_url: String,
    management_endpoint_url: String,
    resource_manager_endpoint_url: String,
    active_directory_endpoint_url: String,
    token_audience: String,
    active_directory_graph_resource_id: String,
    storage_endpoint_suffix: String,
    key_vault_dns_suffix: String,
}

impl AzureEnvironment {
    /// Public Azure.
    pub fn azure_cloud() -> Self {
        Self {
            name: "AzureCloud".to_owned(),
            portal_url: "https://portal.azure.com".to_owned(),
            management_endpoint_url: "https://management.core.windows.net".to_owned(),
            resource_manager_endpoint_url: "https://management.azure.com/".to_owned(),
            active_directory_endpoint_url: "https://login.microsoftonline.com/".to_owned(),
            token_audience: "https://management.core.windows.net/".to_owned(),
            active_directory_graph_resource_id: "https://graph.windows.net/".to_owned(),
            storage_endpoint_suffix: ".core.windows.net".to_owned(),
            key_vault_dns_suffix: ".vault.azure.net".to_owned(),
        }
    }

    /// The Azure Stack deployment the sample walkthrough targets by default.
    pub fn azure_stack() -> Self {
        Self {
            name: "AzureStack".to_owned(),
            portal_url: "http://go.microsoft.com/fwlink/?LinkId=254433".to_owned(),
            management_endpoint_url: "https://management.core.windows.net".to_owned(),
            resource_manager_endpoint_url: "https://management.shanghai.azurestack.corp.microsoft.com/"
                .to_owned(),
            active_directory_endpoint_url: "https://login.windows.net/".to_owned(),
            token_audience:
                "https://management.masselfhost.onmicrosoft.com/08845a35-a6fe-4462-b56f-c00829e32e77"
                    .to_owned(),
            active_directory_graph_resource_id: "https://graph.windows.net/".to_owned(),
            storage_endpoint_suffix: ".shanghai.azurestack.corp.microsoft.com".to_owned(),
            key_vault_dns_suffix: ".vault.shanghai.azurestack.corp.microsoft.com".to_owned(),
        }
    }

    /// Looks up a preset by name, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use azure_sdk_resources::AzureEnvironment;
    /// let env = AzureEnvironment::from_name("azurestack").unwrap();
    /// assert_eq!(env.name(), "AzureStack");
    /// ```
    pub fn from_name(name: &str) -> Result<Self, ResourceManagementError> {
        match name.to_ascii_lowercase().as_str() {
            "azurecloud" => Ok(Self::azure_cloud()),
            "azurestack" => Ok(Self::azure_stack()),
            _ => Err(ResourceManagementError::UnknownEnvironment(name.to_owned())),
        }
    }

    /// Returns a copy of this environment with a different resource manager endpoint.
    pub fn with_resource_manager_endpoint(mut self, endpoint: &str) -> Self {
        self.resource_manager_endpoint_url = endpoint.to_owned();
        self
    }

    pub(crate) fn resource_manager_url(&self, path: &str) -> Result<Url, ResourceManagementError> {
        let base = self.resource_manager_endpoint_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }
}
