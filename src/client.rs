use crate::{AzureEnvironment, ResourceManagementError};
use anyhow::{anyhow, Context};
use azure_sdk_auth_aad::authorize_non_interactive;
use chrono::{DateTime, Utc};
use oauth2::{AccessToken, ClientId, ClientSecret};
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Client for Azure Resource Manager operations - managing resource groups,
/// generic resources and template exports within one subscription.
///
/// # Examples
///
/// ```
/// use azure_sdk_resources::ResourceManagementClient;
/// let client = ResourceManagementClient::new(&"{client_id}", &"{client_secret}", &"{tenant_id}", &"{subscription_id}");
/// ```
pub struct ResourceManagementClient<'a> {
    pub(crate) aad_client_id: &'a str,
    pub(crate) aad_client_secret: &'a str,
    pub(crate) aad_tenant_id: &'a str,
    pub(crate) subscription_id: &'a str,
    pub(crate) environment: AzureEnvironment,
    pub(crate) http_client: Arc<reqwest::Client>,
    pub(crate) token: Option<AccessToken>,
    pub(crate) token_expiration: Option<DateTime<Utc>>,
}

impl fmt::Debug for ResourceManagementClient<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManagementClient")
            .field("aad_client_id", &self.aad_client_id)
            .field("aad_tenant_id", &self.aad_tenant_id)
            .field("subscription_id", &self.subscription_id)
            .field("environment", &self.environment.name())
            .field("token_expiration", &self.token_expiration)
            .finish()
    }
}

/// One page of an ARM list response.
#[derive(Deserialize, Debug)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

impl<'a> ResourceManagementClient<'a> {
    /// Creates a new `ResourceManagementClient` for a custom Azure environment,
    /// such as Azure Stack. For public Azure, use `ResourceManagementClient::new`.
    ///
    /// # Examples
    ///
    /// ```
    /// use azure_sdk_resources::{AzureEnvironment, ResourceManagementClient};
    /// let client = ResourceManagementClient::new_with_environment(&"c1a6d79b-082b-4798-b362-a77e96de50db", &"SUPER_SECRET_KEY", &"bc598e67-03d8-44d5-aa46-8289b9a39a14", &"11111111-1111-1111-1111-111111111111", AzureEnvironment::azure_stack());
    /// ```
    pub fn new_with_environment(
        aad_client_id: &'a str,
        aad_client_secret: &'a str,
        aad_tenant_id: &'a str,
        subscription_id: &'a str,
        environment: AzureEnvironment,
    ) -> Self {
        Self {
            aad_client_id,
            aad_client_secret,
            aad_tenant_id,
            subscription_id,
            environment,
            http_client: Arc::new(reqwest::Client::new()),
            token: None,
            token_expiration: None,
        }
    }

    /// Creates a new `ResourceManagementClient` for public Azure.
    ///
    /// # Examples
    ///
    /// ```
    /// use azure_sdk_resources::ResourceManagementClient;
    /// let client = ResourceManagementClient::new(&"c1a6d79b-082b-4798-b362-a77e96de50db", &"SUPER_SECRET_KEY", &"bc598e67-03d8-44d5-aa46-8289b9a39a14", &"11111111-1111-1111-1111-111111111111");
    /// ```
    pub fn new(
        aad_client_id: &'a str,
        aad_client_secret: &'a str,
        aad_tenant_id: &'a str,
        subscription_id: &'a str,
    ) -> Self {
        ResourceManagementClient::new_with_environment(
            aad_client_id,
            aad_client_secret,
            aad_tenant_id,
            subscription_id,
            AzureEnvironment::azure_cloud(),
        )
    }

    /// Replaces the HTTP client used for both token acquisition and ARM requests.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Arc::new(http_client);
        self
    }

    pub fn environment(&self) -> &AzureEnvironment {
        &self.environment
    }

    pub fn subscription_id(&self) -> &str {
        self.subscription_id
    }

    /// A cached token stays usable until `TOKEN_EXPIRY_MARGIN_SECS` before it expires.
    pub(crate) fn token_is_fresh(&self, now: DateTime<Utc>) -> bool {
        let margin = chrono::Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS);
        self.token.is_some() && matches!(self.token_expiration, Some(exp) if exp - margin > now)
    }

    pub(crate) async fn refresh_token(&mut self) -> Result<(), ResourceManagementError> {
        if self.token_is_fresh(Utc::now()) {
            // Token is valid, reuse it.
            return Ok(());
        }
        let aad_client_id = ClientId::new(self.aad_client_id.to_owned());
        let aad_client_secret = ClientSecret::new(self.aad_client_secret.to_owned());
        let token = authorize_non_interactive(
            self.http_client.clone(),
            &aad_client_id,
            &aad_client_secret,
            self.environment.token_audience(),
            self.aad_tenant_id,
        )
        .await
        .with_context(|| "Failed to authenticate to Azure Active Directory")
        .map_err(ResourceManagementError::AuthorizationError)?;
        tracing::info!(
            tenant_id = self.aad_tenant_id,
            audience = %self.environment.token_audience(),
            expires_on = %token.expires_on,
            "acquired access token"
        );
        self.token = Some(token.access_token().clone());
        self.token_expiration = Some(token.expires_on);
        Ok(())
    }

    /// Builds the URL of an ARM path below the resource manager endpoint, tagged
    /// with the given API version.
    pub(crate) fn arm_url(&self, path: &str, api_version: &str) -> Result<Url, ResourceManagementError> {
        let mut url = self.environment.resource_manager_url(path)?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    pub(crate) fn subscription_path(&self) -> String {
        format!("/subscriptions/{}", self.subscription_id)
    }

    pub(crate) async fn authed(&mut self, method: Method, url: Url) -> Result<RequestBuilder, ResourceManagementError> {
        self.refresh_token().await?;
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| ResourceManagementError::AuthorizationError(anyhow!("No access token available")))?;
        tracing::debug!(method = %method, url = %url, "sending request");
        Ok(self.http_client.request(method, url).bearer_auth(token.secret()))
    }

    /// Sends a request, turning non-success statuses into `ApiError`s.
    pub(crate) async fn execute(request: RequestBuilder) -> Result<Response, ResourceManagementError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await?;
        Err(ResourceManagementError::from_response_body(status.as_u16(), &body))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&mut self, url: Url) -> Result<T, ResourceManagementError> {
        let request = self.authed(Method::GET, url).await?;
        let resp = Self::execute(request).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str::<T>(&body)?)
    }

    /// Follows `nextLink` until the last page and returns every item.
    pub(crate) async fn list_all<T: DeserializeOwned>(&mut self, url: Url) -> Result<Vec<T>, ResourceManagementError> {
        let mut items = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            let page = self.get_json::<Page<T>>(url).await?;
            items.extend(page.value);
            next = match page.next_link {
                Some(link) if !link.is_empty() => Some(Url::parse(&link)?),
                _ => None,
            };
        }
        Ok(items)
    }

    /// Polls a `202 Accepted` response's `Location` until the operation finishes.
    /// Other responses are returned unchanged; a 202 without `Location` cannot be
    /// tracked and is an error.
    pub(crate) async fn wait_for_completion(&mut self, resp: Response) -> Result<Response, ResourceManagementError> {
        let mut resp = resp;
        while resp.status() == StatusCode::ACCEPTED {
            let location = match resp.headers().get(LOCATION) {
                Some(value) => value
                    .to_str()
                    .map_err(|e| ResourceManagementError::LongRunningOperation(e.to_string()))?
                    .to_owned(),
                None => {
                    return Err(ResourceManagementError::LongRunningOperation(
                        "202 Accepted without a Location header".to_owned(),
                    ))
                }
            };
            let delay = poll_delay(resp.headers());
            tracing::debug!(location = %location, delay_secs = delay.as_secs(), "operation in progress");
            tokio::time::delay_for(delay).await;

            let url = Url::parse(&location)?;
            let request = self.authed(Method::GET, url).await?;
            resp = Self::execute(request).await.map_err(|e| match e {
                ResourceManagementError::ApiError { status, code, message } => {
                    ResourceManagementError::LongRunningOperation(format!("{} {}: {}", status, code, message))
                }
                other => other,
            })?;
        }
        tracing::info!(status = resp.status().as_u16(), "operation completed");
        Ok(resp)
    }
}

/// Wait before the next poll: `Retry-After` in seconds, else `DEFAULT_POLL_INTERVAL`.
fn poll_delay(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL)
}

/// A client pointed at the mockito server with a pre-seeded token, so no
/// request ever reaches Azure Active Directory.
#[cfg(test)]
pub(crate) fn mock_client() -> ResourceManagementClient<'static> {
    let environment = AzureEnvironment::azure_cloud().with_resource_manager_endpoint(&mockito::server_url());
    let mut client = ResourceManagementClient::new_with_environment("client", "secret", "tenant", "sub", environment);
    client.token = Some(AccessToken::new("test-token".to_owned()));
    client.token_expiration = Some(Utc::now() + chrono::Duration::hours(1));
    client
}
