//! Cookie policy resolution and startup validation.

use axum_extra::extract::cookie::SameSite;
use thiserror::Error;

/// Deployment environment, as declared by configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Local development: frontend and backend share an origin (or a proxy).
    Development,
    /// Deployed: `cross_site` is true when the frontend lives on a different
    /// origin than the API (the usual Vercel-frontend / Railway-API split).
    Production { cross_site: bool },
}

impl Environment {
    pub fn parse(name: &str, cross_site: bool) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "production" | "prod" | "staging" => Ok(Environment::Production { cross_site }),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown environment '{0}'")]
    UnknownEnvironment(String),

    /// Browsers reject `SameSite=None` cookies on insecure transports, which
    /// surfaces much later as unexplained 401s. Refuse to start instead.
    #[error("SameSite=None cookies require secure=true")]
    InsecureCrossSite,
}

/// Cookie attributes for the token pair, fixed at startup.
///
/// The access-token cookie is intentionally script-readable
/// (`http_only_access = false`) so the frontend can inspect expiry and
/// schedule refreshes; the refresh cookie is always httpOnly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
    pub http_only_access: bool,
    pub domain: Option<String>,
    pub path: String,
}

impl CookiePolicy {
    pub fn for_environment(environment: Environment) -> Self {
        let (secure, same_site) = match environment {
            Environment::Development => (false, SameSite::Lax),
            Environment::Production { cross_site: false } => (true, SameSite::Lax),
            Environment::Production { cross_site: true } => (true, SameSite::None),
        };

        Self {
            secure,
            same_site,
            http_only_access: false,
            domain: None,
            path: "/".to_string(),
        }
    }

    /// Startup guard; call before serving traffic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.same_site == SameSite::None && !self.secure {
            return Err(ConfigError::InsecureCrossSite);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_site_production_requires_secure_none() {
        let policy = CookiePolicy::for_environment(Environment::Production { cross_site: true });
        assert!(policy.secure);
        assert_eq!(policy.same_site, SameSite::None);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn development_uses_lax() {
        let policy = CookiePolicy::for_environment(Environment::Development);
        assert_eq!(policy.same_site, SameSite::Lax);
        assert!(!policy.secure);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn same_site_production_stays_lax_but_secure() {
        let policy = CookiePolicy::for_environment(Environment::Production { cross_site: false });
        assert_eq!(policy.same_site, SameSite::Lax);
        assert!(policy.secure);
    }

    #[test]
    fn insecure_cross_site_fails_validation() {
        let mut policy = CookiePolicy::for_environment(Environment::Production { cross_site: true });
        policy.secure = false;

        assert_eq!(policy.validate(), Err(ConfigError::InsecureCrossSite));
    }

    #[test]
    fn environment_parsing_accepts_aliases() {
        assert_eq!(
            Environment::parse("dev", false).unwrap(),
            Environment::Development
        );
        assert_eq!(
            Environment::parse("Production", true).unwrap(),
            Environment::Production { cross_site: true }
        );
        assert!(matches!(
            Environment::parse("qa-lab", false),
            Err(ConfigError::UnknownEnvironment(_))
        ));
    }
}
