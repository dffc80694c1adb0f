//! Service wiring: issuer, provider adapter, verifier chain, cookie policy.

use std::sync::Arc;

use marketedge_auth::{PermissionResolver, TokenVerifier};
use marketedge_identity::{IdentityProviderClient, UpstreamConfig, UpstreamVerifier};
use marketedge_session::CookiePolicy;
use marketedge_tokens::{Hs256Verifier, InMemoryFamilyStore, TokenConfig, TokenIssuer};

use crate::config::AppConfig;

pub struct AppServices {
    pub provider: IdentityProviderClient,
    pub issuer: TokenIssuer,
    pub policy: CookiePolicy,
}

/// Assemble the service graph. Fails fast on a cookie policy that browsers
/// would silently reject — better a refused boot than invisible 401s later.
pub fn build_services(
    config: &AppConfig,
) -> anyhow::Result<(AppServices, Arc<PermissionResolver>)> {
    let policy = CookiePolicy::for_environment(config.environment);
    policy.validate()?;

    let families = Arc::new(InMemoryFamilyStore::new());
    let issuer = TokenIssuer::new(TokenConfig::new(config.jwt_secret.as_str()), families);

    // Ordered verification strategies: internal tokens first, the upstream
    // provider's format second while the migration window is open.
    let mut verifiers: Vec<Arc<dyn TokenVerifier>> =
        vec![Arc::new(Hs256Verifier::new(config.jwt_secret.as_bytes()))];
    if let Some(upstream) = &config.upstream {
        verifiers.push(Arc::new(UpstreamVerifier::hs256(
            &UpstreamConfig {
                issuer: upstream.issuer.clone(),
                audience: upstream.audience.clone(),
            },
            upstream.secret.as_bytes(),
        )));
    }
    let resolver = Arc::new(PermissionResolver::new(verifiers));

    let provider = IdentityProviderClient::new(config.provider.clone())?;

    Ok((
        AppServices {
            provider,
            issuer,
            policy,
        },
        resolver,
    ))
}
