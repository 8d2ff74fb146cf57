//! Browser transport for the token pair: HTTP-only, Secure cookies with
//! explicit expiry. The two `original_*` shadows hold the admin's own
//! pair while an impersonation session is active.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::domain::TokenPair;
use crate::utils::{consts, Config};

pub fn access_cookie(name: &str, token: &str, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .max_age(Duration::seconds(ttl_secs))
        .build()
}

pub fn refresh_cookie(name: &str, token: &str, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .path("/auth/refresh")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .max_age(Duration::seconds(ttl_secs))
        .build()
}

/// Both cookies for a freshly issued pair, named and aged per config.
pub fn pair_cookies(config: &Config, pair: &TokenPair) -> [Cookie<'static>; 2] {
    [
        access_cookie(
            config.access_cookie_name(),
            &pair.access_token,
            config.access_ttl_seconds(),
        ),
        refresh_cookie(
            config.refresh_cookie_name(),
            &pair.refresh_token,
            config.refresh_ttl_seconds(),
        ),
    ]
}

/// Shadow cookies preserving the original pair during impersonation.
pub fn original_pair_cookies(pair: &TokenPair, ttl_secs: i64) -> [Cookie<'static>; 2] {
    [
        access_cookie(
            consts::ORIGINAL_ACCESS_COOKIE_NAME,
            &pair.access_token,
            ttl_secs,
        ),
        refresh_cookie(
            consts::ORIGINAL_REFRESH_COOKIE_NAME,
            &pair.refresh_token,
            ttl_secs,
        ),
    ]
}

pub fn clear_cookie(name: &str, path: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), String::new()))
        .path(path.to_owned())
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .max_age(Duration::seconds(0))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_cookie_is_http_only_and_scoped() {
        let cookie = access_cookie("access", "tok", 600);
        assert_eq!(cookie.name(), "access");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(600)));
    }

    #[test]
    fn refresh_cookie_is_path_restricted_and_strict() {
        let cookie = refresh_cookie("refresh", "tok", 3600);
        assert_eq!(cookie.path(), Some("/auth/refresh"));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn pair_cookies_follow_config_names_and_ttls() {
        std::env::set_var("JWT_ISSUER", "test-issuer");
        std::env::set_var("JWT_AUDIENCE", "test-aud");
        std::env::set_var("ACCESS_TTL_SECONDS", "60");
        std::env::set_var("REFRESH_TTL_SECONDS", "300");
        std::env::set_var(
            "REFRESH_HASH_KEY_B64",
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
        );
        std::env::set_var(
            "JWT_HS256_KEYS_JSON",
            r#"[{"kid":"k1","secret_b64":"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="}]"#,
        );
        std::env::set_var("JWT_ACTIVE_KID", "k1");

        let config = Config::default().expect("test config");
        let pair = TokenPair::new("a".into(), "r".into());
        let [access, refresh] = pair_cookies(&config, &pair);
        assert_eq!(access.name(), config.access_cookie_name());
        assert_eq!(access.max_age(), Some(Duration::seconds(60)));
        assert_eq!(refresh.name(), config.refresh_cookie_name());
        assert_eq!(refresh.max_age(), Some(Duration::seconds(300)));
    }

    #[test]
    fn original_shadows_use_reserved_names() {
        let pair = TokenPair::new("a".into(), "r".into());
        let [access, refresh] = original_pair_cookies(&pair, 60);
        assert_eq!(access.name(), consts::ORIGINAL_ACCESS_COOKIE_NAME);
        assert_eq!(refresh.name(), consts::ORIGINAL_REFRESH_COOKIE_NAME);
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_cookie("access", "/");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::seconds(0)));
    }
}
