use crate::{AzureEnvironment, ResourceManagementError};
use std::fmt;

const DEFAULT_SUBSCRIPTION_ID: &str = "11111111-1111-1111-1111-111111111111";
const DEFAULT_ENVIRONMENT: &str = "AzureStack";
const DEFAULT_LOCATION: &str = "shanghai";
const DEFAULT_RESOURCE_GROUP: &str = "azure-sample-group";

/// Service principal credentials and walkthrough parameters, read from the
/// `AZURE_*` environment variables.
#[derive(Clone)]
pub struct Settings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub subscription_id: String,
    pub environment: AzureEnvironment,
    pub location: String,
    pub resource_group: String,
    pub insecure_skip_tls_verify: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .field("environment", &self.environment.name())
            .field("location", &self.location)
            .field("resource_group", &self.resource_group)
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .finish()
    }
}

impl Settings {
    /// Loads a `.env` file from the working directory, if there is one, then
    /// reads the settings from the process environment.
    pub fn load() -> Result<Self, ResourceManagementError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "failed to load .env file"),
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ResourceManagementError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ResourceManagementError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| ResourceManagementError::MissingConfiguration(key.to_owned()));

        let mut environment =
            AzureEnvironment::from_name(&get("AZURE_ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_owned()))?;
        if let Some(endpoint) = get("AZURE_RESOURCE_MANAGER_ENDPOINT") {
            environment = environment.with_resource_manager_endpoint(&endpoint);
        }

        Ok(Settings {
            tenant_id: required("AZURE_TENANT_ID")?,
            client_id: required("AZURE_CLIENT_ID")?,
            client_secret: required("AZURE_CLIENT_SECRET")?,
            subscription_id: get("AZURE_SUBSCRIPTION_ID").unwrap_or_else(|| DEFAULT_SUBSCRIPTION_ID.to_owned()),
            environment,
            location: get("AZURE_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_owned()),
            resource_group: get("AZURE_RESOURCE_GROUP").unwrap_or_else(|| DEFAULT_RESOURCE_GROUP.to_owned()),
            insecure_skip_tls_verify: get("AZURE_INSECURE_SKIP_TLS_VERIFY")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Builds the HTTP client shared by token acquisition and ARM calls.
    pub fn http_client(&self) -> Result<reqwest::Client, ResourceManagementError> {
        if self.insecure_skip_tls_verify {
            tracing::warn!(
                environment = %self.environment.name(),
                "TLS certificate verification is disabled"
            );
        }
        Ok(reqwest::Client::builder()
            .danger_accept_invalid_certs(self.insecure_skip_tls_verify)
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const CREDENTIALS: &[(&str, &str)] = &[
        ("AZURE_TENANT_ID", "tenant"),
        ("AZURE_CLIENT_ID", "client"),
        ("AZURE_CLIENT_SECRET", "secret"),
    ];

    #[test]
    fn applies_defaults() {
        let settings = Settings::from_lookup(lookup_from(CREDENTIALS)).unwrap();
        assert_eq!(settings.tenant_id, "tenant");
        assert_eq!(settings.subscription_id, DEFAULT_SUBSCRIPTION_ID);
        assert_eq!(settings.environment, AzureEnvironment::azure_stack());
        assert_eq!(settings.location, "shanghai");
        assert_eq!(settings.resource_group, "azure-sample-group");
        assert!(!settings.insecure_skip_tls_verify);
    }

    #[test]
    fn reads_overrides() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.extend_from_slice(&[
            ("AZURE_SUBSCRIPTION_ID", "sub"),
            ("AZURE_ENVIRONMENT", "AzureCloud"),
            ("AZURE_RESOURCE_MANAGER_ENDPOINT", "https://arm.example.test/"),
            ("AZURE_LOCATION", "westus"),
            ("AZURE_RESOURCE_GROUP", "rg"),
            ("AZURE_INSECURE_SKIP_TLS_VERIFY", "TRUE"),
        ]);
        let settings = Settings::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(settings.subscription_id, "sub");
        assert_eq!(settings.environment.name(), "AzureCloud");
        assert_eq!(settings.environment.resource_manager_endpoint_url(), "https://arm.example.test/");
        assert_eq!(settings.location, "westus");
        assert_eq!(settings.resource_group, "rg");
        assert!(settings.insecure_skip_tls_verify);
    }

    #[test]
    fn empty_required_value_is_missing() {
        let pairs = [
            ("AZURE_TENANT_ID", "tenant"),
            ("AZURE_CLIENT_ID", "  "),
            ("AZURE_CLIENT_SECRET", "secret"),
        ];
        match Settings::from_lookup(lookup_from(&pairs)) {
            Err(ResourceManagementError::MissingConfiguration(key)) => assert_eq!(key, "AZURE_CLIENT_ID"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_environment() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("AZURE_ENVIRONMENT", "Nowhere"));
        assert!(matches!(
            Settings::from_lookup(lookup_from(&pairs)),
            Err(ResourceManagementError::UnknownEnvironment(_))
        ));
    }
}
