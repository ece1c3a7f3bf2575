pub mod auth;

pub use auth::{require_admin, require_api_session, require_session, SessionClaims};
