pub mod cookies;
pub mod csrf;
pub mod password;
pub mod role;
pub mod token;

pub use cookies::{SessionCookies, ACCESS_COOKIE, REFRESH_COOKIE};
pub use csrf::{generate_csrf_token, tokens_match, CSRF_COOKIE, CSRF_HEADER};
pub use password::{hash_password, verify_login, PasswordError, MIN_PASSWORD_LENGTH};
pub use role::{Role, UnknownRole};
pub use token::{refresh_digest, AccessClaims, RefreshClaims, TokenError, TokenService, TokenSubject};
