use axum_extra::extract::cookie::{Cookie, SameSite};

use super::csrf::CSRF_COOKIE;
use super::token::TokenService;

pub const ACCESS_COOKIE: &str = "token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Builds the three session cookies with shared attributes.
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies {
    secure: bool,
    access_ttl: time::Duration,
    refresh_ttl: time::Duration,
}

impl SessionCookies {
    pub fn new(secure: bool, tokens: &TokenService) -> Self {
        Self {
            secure,
            access_ttl: time::Duration::seconds(tokens.access_ttl().num_seconds()),
            refresh_ttl: time::Duration::seconds(tokens.refresh_ttl().num_seconds()),
        }
    }

    pub fn access(&self, token: String) -> Cookie<'static> {
        self.build(ACCESS_COOKIE, token, true, self.access_ttl)
    }

    /// Readable by scripts so the client can echo it in `X-CSRF-Token`.
    pub fn csrf(&self, token: String) -> Cookie<'static> {
        self.build(CSRF_COOKIE, token, false, self.access_ttl)
    }

    pub fn refresh(&self, token: String) -> Cookie<'static> {
        self.build(REFRESH_COOKIE, token, true, self.refresh_ttl)
    }

    /// Expired copies of all three cookies.
    pub fn removals(&self) -> [Cookie<'static>; 3] {
        [
            self.build(ACCESS_COOKIE, String::new(), true, time::Duration::ZERO),
            self.build(CSRF_COOKIE, String::new(), false, time::Duration::ZERO),
            self.build(REFRESH_COOKIE, String::new(), true, time::Duration::ZERO),
        ]
    }

    fn build(&self, name: &'static str, value: String, http_only: bool, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(http_only)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }
}
