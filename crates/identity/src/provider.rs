//! OAuth2 authorization-code exchange against the upstream provider.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;

use marketedge_auth::AuthError;

use crate::profile::UpstreamProfile;

/// Upstream provider endpoints and credentials, assembled once at startup.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    /// Per-request timeout for provider calls.
    pub timeout: Duration,
    /// Pause before the single retry of a retryable failure.
    pub retry_backoff: Duration,
}

impl ProviderConfig {
    /// Conventional OIDC endpoint layout under one issuer base URL.
    pub fn new(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            token_endpoint: format!("{base}/oauth/token"),
            userinfo_endpoint: format!("{base}/userinfo"),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: Duration::from_secs(8),
            retry_backoff: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
}

/// One-time code exchange + profile fetch.
///
/// Holds a connection pool; construct once and share. Nothing is persisted
/// here — the adapter's only side effect is the network call.
pub struct IdentityProviderClient {
    http: Client,
    config: ProviderConfig,
}

impl IdentityProviderClient {
    pub fn new(config: ProviderConfig) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("http client construction failed: {e}")))?;
        Ok(Self { http, config })
    }

    /// Exchange an authorization code for the upstream profile.
    ///
    /// Both inputs are untrusted; they are sanitized before any network
    /// traffic. Provider 4xx means the code is bad (`InvalidGrant`);
    /// transport failures and 5xx are retried exactly once, then surface as
    /// `UpstreamUnavailable`.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<UpstreamProfile, AuthError> {
        validate_code(code)?;
        let redirect = validate_redirect_uri(redirect_uri)?;

        let upstream_token = self.fetch_upstream_token(code, redirect.as_str()).await?;
        let profile = self.fetch_profile(&upstream_token).await?;

        tracing::info!(sub = %profile.sub, "exchanged authorization code for upstream profile");
        Ok(profile)
    }

    async fn fetch_upstream_token(&self, code: &str, redirect_uri: &str) -> Result<String, AuthError> {
        let response = self
            .send_with_retry(
                || {
                    self.http.post(&self.config.token_endpoint).form(&[
                        ("grant_type", "authorization_code"),
                        ("code", code),
                        ("redirect_uri", redirect_uri),
                        ("client_id", self.config.client_id.as_str()),
                        ("client_secret", self.config.client_secret.as_str()),
                    ])
                },
                "authorization code rejected by identity provider",
            )
            .await?;

        let body: TokenEndpointResponse = response.json().await.map_err(|e| {
            AuthError::UpstreamUnavailable(format!("malformed token response: {e}"))
        })?;
        Ok(body.access_token)
    }

    async fn fetch_profile(&self, upstream_token: &str) -> Result<UpstreamProfile, AuthError> {
        let response = self
            .send_with_retry(
                || {
                    self.http
                        .get(&self.config.userinfo_endpoint)
                        .bearer_auth(upstream_token)
                },
                "upstream token rejected at userinfo endpoint",
            )
            .await?;

        response.json().await.map_err(|e| {
            AuthError::UpstreamUnavailable(format!("malformed userinfo response: {e}"))
        })
    }

    /// Send a provider request, retrying once on transport failure or 5xx.
    ///
    /// 4xx is the provider's verdict on our input and is never retried.
    async fn send_with_retry(
        &self,
        build: impl Fn() -> RequestBuilder,
        rejection: &str,
    ) -> Result<Response, AuthError> {
        let mut last_failure = String::new();

        for attempt in 0..2 {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_backoff).await;
                tracing::info!(attempt, "retrying identity provider call");
            }

            match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if response.status().is_client_error() => {
                    tracing::warn!(status = %response.status(), "identity provider rejected request");
                    return Err(AuthError::InvalidGrant(rejection.to_string()));
                }
                Ok(response) => {
                    last_failure = format!("provider answered {}", response.status());
                }
                Err(e) => {
                    last_failure = format!("provider unreachable: {e}");
                }
            }
        }

        tracing::warn!(reason = %last_failure, "identity provider unavailable after retry");
        Err(AuthError::UpstreamUnavailable(last_failure))
    }
}

fn validate_code(code: &str) -> Result<(), AuthError> {
    if code.is_empty() || code.len() > 512 {
        return Err(AuthError::InvalidRequest(
            "authorization code length out of bounds".to_string(),
        ));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
    {
        return Err(AuthError::InvalidRequest(
            "authorization code contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_redirect_uri(redirect_uri: &str) -> Result<Url, AuthError> {
    if redirect_uri.len() > 2048 {
        return Err(AuthError::InvalidRequest(
            "redirect URI too long".to_string(),
        ));
    }

    let url = Url::parse(redirect_uri)
        .map_err(|e| AuthError::InvalidRequest(format!("malformed redirect URI: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AuthError::InvalidRequest(
            "redirect URI must be http(s)".to_string(),
        ));
    }
    if url.host_str().is_none() {
        return Err(AuthError::InvalidRequest(
            "redirect URI has no host".to_string(),
        ));
    }

    Ok(url)
}
