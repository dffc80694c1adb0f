//! Attaching and clearing the token-pair cookies.

use axum_extra::extract::cookie::{Cookie, CookieJar};

use marketedge_tokens::TokenPair;

use crate::policy::CookiePolicy;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Attach both token cookies to the response jar.
pub fn attach(jar: CookieJar, pair: &TokenPair, policy: &CookiePolicy) -> CookieJar {
    jar.add(build_cookie(
        ACCESS_COOKIE,
        pair.access.clone(),
        policy.http_only_access,
        policy,
    ))
    .add(build_cookie(
        REFRESH_COOKIE,
        pair.refresh.clone(),
        true,
        policy,
    ))
}

/// Remove both token cookies (logout). Attributes must match the attach-time
/// path/domain or browsers keep the originals.
pub fn clear(jar: CookieJar, policy: &CookiePolicy) -> CookieJar {
    jar.remove(removal_cookie(ACCESS_COOKIE, policy))
        .remove(removal_cookie(REFRESH_COOKIE, policy))
}

fn build_cookie(
    name: &'static str,
    value: String,
    http_only: bool,
    policy: &CookiePolicy,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .http_only(http_only)
        .secure(policy.secure)
        .same_site(policy.same_site)
        .path(policy.path.clone());

    if let Some(domain) = &policy.domain {
        builder = builder.domain(domain.clone());
    }

    builder.build()
}

fn removal_cookie(name: &'static str, policy: &CookiePolicy) -> Cookie<'static> {
    let mut builder = Cookie::build(name).path(policy.path.clone());
    if let Some(domain) = &policy.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Environment;
    use axum_extra::extract::cookie::SameSite;

    fn pair() -> TokenPair {
        TokenPair {
            access: "access-jwt".to_string(),
            refresh: "refresh-jwt".to_string(),
            expires_in: 1800,
        }
    }

    #[test]
    fn production_cross_site_cookies_are_secure_and_same_site_none() {
        let policy = CookiePolicy::for_environment(Environment::Production { cross_site: true });
        let jar = attach(CookieJar::new(), &pair(), &policy);

        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let cookie = jar.get(name).unwrap();
            assert_eq!(cookie.secure(), Some(true), "{name} must be secure");
            assert_eq!(cookie.same_site(), Some(SameSite::None));
        }
    }

    #[test]
    fn development_cookies_are_lax() {
        let policy = CookiePolicy::for_environment(Environment::Development);
        let jar = attach(CookieJar::new(), &pair(), &policy);

        let cookie = jar.get(ACCESS_COOKIE).unwrap();
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn access_cookie_is_script_readable_and_refresh_is_not() {
        let policy = CookiePolicy::for_environment(Environment::Production { cross_site: true });
        let jar = attach(CookieJar::new(), &pair(), &policy);

        assert_ne!(jar.get(ACCESS_COOKIE).unwrap().http_only(), Some(true));
        assert_eq!(jar.get(REFRESH_COOKIE).unwrap().http_only(), Some(true));
    }

    #[test]
    fn cookies_carry_the_token_values() {
        let policy = CookiePolicy::for_environment(Environment::Development);
        let jar = attach(CookieJar::new(), &pair(), &policy);

        assert_eq!(jar.get(ACCESS_COOKIE).unwrap().value(), "access-jwt");
        assert_eq!(jar.get(REFRESH_COOKIE).unwrap().value(), "refresh-jwt");
    }

    #[test]
    fn clear_produces_removal_cookies() {
        let policy = CookiePolicy::for_environment(Environment::Development);
        let jar = attach(CookieJar::new(), &pair(), &policy);
        let jar = clear(jar, &policy);

        // The jar now holds removal (expired, empty-value) cookies.
        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            if let Some(cookie) = jar.get(name) {
                assert_eq!(cookie.value(), "");
            }
        }
    }
}
