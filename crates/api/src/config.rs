//! Typed runtime configuration, read from the environment once at startup.

use anyhow::Context;

use marketedge_identity::ProviderConfig;
use marketedge_session::Environment;

/// Upstream-token fallback verification (optional; present during the
/// migration window in which provider-minted tokens are still accepted).
#[derive(Debug, Clone)]
pub struct UpstreamVerifierConfig {
    pub issuer: String,
    pub audience: String,
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub environment: Environment,
    pub provider: ProviderConfig,
    pub upstream: Option<UpstreamVerifierConfig>,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let env_name =
            std::env::var("MARKETEDGE_ENV").unwrap_or_else(|_| "development".to_string());
        let cross_site = std::env::var("CROSS_SITE_COOKIES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let environment = Environment::parse(&env_name, cross_site)
            .with_context(|| format!("MARKETEDGE_ENV={env_name}"))?;

        let issuer_base = std::env::var("OAUTH_ISSUER_BASE_URL")
            .unwrap_or_else(|_| "https://marketedge.eu.auth0.com".to_string());
        let client_id = std::env::var("OAUTH_CLIENT_ID").unwrap_or_else(|_| {
            tracing::warn!("OAUTH_CLIENT_ID not set; using dev placeholder");
            "dev-client".to_string()
        });
        let client_secret = std::env::var("OAUTH_CLIENT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("OAUTH_CLIENT_SECRET not set; using dev placeholder");
            "dev-client-secret".to_string()
        });
        let provider = ProviderConfig::new(&issuer_base, client_id, client_secret);

        // All three must be present to enable the fallback path.
        let upstream = match (
            std::env::var("UPSTREAM_JWT_SECRET"),
            std::env::var("UPSTREAM_ISSUER"),
            std::env::var("UPSTREAM_AUDIENCE"),
        ) {
            (Ok(secret), Ok(issuer), Ok(audience)) => Some(UpstreamVerifierConfig {
                issuer,
                audience,
                secret,
            }),
            _ => None,
        };

        let bind_addr =
            std::env::var("MARKETEDGE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Self {
            jwt_secret,
            environment,
            provider,
            upstream,
            bind_addr,
        })
    }
}
