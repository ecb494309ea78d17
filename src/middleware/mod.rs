pub mod auth;
pub mod csrf;
pub mod extract;
pub mod response;

pub use auth::{require_role, AuthUser, RoleGuard};
pub use csrf::{require_csrf, CSRF_FAILURE};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use response::{ApiResponse, ApiResult, ListResponse, ListResult};
