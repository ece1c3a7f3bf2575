use askama::Template;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use skyfare_core::navigation::Navigator;
use skyfare_core::{AuthGuard, CoreResult, GuardMode, GuardView, Identity, IdentityResolver, Role, Session};

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

pub const SESSION_COOKIE: &str = "skyfare_session";

// ============================================================================
// Session tokens
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub email: Option<String>,
    pub role: String,
    pub exp: usize,
}

pub fn issue_token(auth: &AuthConfig, identity: &Identity) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: identity.id.clone(),
        email: identity.email.as_ref().map(|e| e.expose().clone()),
        role: identity.role.as_str().to_owned(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

/// Resolves signed session tokens issued by [`issue_token`].
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        // The registry evicts on the exact `exp`, so decoding must agree with it.
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, token: &str) -> CoreResult<Option<Identity>> {
        let claims = match decode::<SessionClaims>(token, &self.key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                return Ok(None);
            }
        };

        let role = match claims.role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                tracing::debug!(error = %e, "Session token carries an unknown role");
                return Ok(None);
            }
        };

        let mut identity = Identity::new(claims.sub, role);
        if let Some(expires_at) = DateTime::from_timestamp(claims.exp as i64, 0) {
            identity = identity.with_expiry(expires_at);
        }
        if let Some(email) = claims.email {
            identity = identity.with_email(email);
        }
        Ok(Some(identity))
    }
}

/// Session token from the session cookie, falling back to a bearer token.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE).filter(|c| !c.value().is_empty()) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .build()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

// ============================================================================
// Guard
// ============================================================================

/// Captures the redirect the guard asks for so it can become a response.
#[derive(Debug, Default)]
struct ResponseNavigator {
    location: Option<String>,
}

impl Navigator for ResponseNavigator {
    fn replace(&mut self, path: &str) {
        self.location = Some(path.to_string());
    }

    fn push(&mut self, path: &str) {
        self.location = Some(path.to_string());
    }
}

#[derive(Template)]
#[template(path = "loading.html")]
struct LoadingTemplate {
    return_to: String,
    refresh_seconds: u64,
}

enum Verdict {
    Allow(Identity),
    Pending,
    Deny(String),
}

/// Runs the guard for one request. Every request starts a fresh guard, so
/// the state is always recomputed from the session (level-triggered).
async fn check_request(state: &AppState, token: Option<&str>) -> Verdict {
    let session = match token {
        Some(token) => {
            state
                .sessions
                .session_for(token)
                .await
                .settled(state.guard.resolve_wait)
                .await
        }
        None => Session::anonymous(),
    };

    let mut guard = AuthGuard::new(session, ResponseNavigator::default(), GuardMode::Level);
    let view = guard.render(Identity::clone);
    let navigator = guard.into_navigator();

    match view {
        GuardView::Content(identity) => Verdict::Allow(identity),
        GuardView::Loading => Verdict::Pending,
        GuardView::Redirect(path) => {
            if let Some(token) = token {
                state.sessions.forget(token).await;
            }
            Verdict::Deny(navigator.location.unwrap_or_else(|| path.to_string()))
        }
    }
}

// ============================================================================
// Page Guard Middleware
// ============================================================================

pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(req.headers());

    match check_request(&state, token.as_deref()).await {
        Verdict::Allow(identity) => {
            tracing::debug!(user = %identity.id, role = %identity.role, "Session accepted");
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Verdict::Pending => loading_page(&state, req.uri()),
        Verdict::Deny(location) => {
            let jar = CookieJar::from_headers(req.headers()).remove(expired_session_cookie());
            Ok((jar, Redirect::to(&location)).into_response())
        }
    }
}

fn loading_page(state: &AppState, uri: &Uri) -> Result<Response, AppError> {
    let refresh_seconds = state.guard.refresh_seconds;
    let page = LoadingTemplate {
        return_to: uri.to_string(),
        refresh_seconds,
    }
    .render()?;

    Ok(([("refresh", refresh_seconds.to_string())], Html(page)).into_response())
}

// ============================================================================
// API Guard Middleware
// ============================================================================

pub async fn require_api_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(req.headers());

    match check_request(&state, token.as_deref()).await {
        Verdict::Allow(identity) => {
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Verdict::Pending => Err(AppError::SessionPending),
        Verdict::Deny(_) => Err(AppError::AuthenticationError("Sign in required".to_string())),
    }
}

// ============================================================================
// Admin Role Check
// ============================================================================

/// Must be layered inside one of the session middlewares.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let is_admin = req
        .extensions()
        .get::<Identity>()
        .map(Identity::is_admin)
        .unwrap_or(false);

    if !is_admin {
        return Err(AppError::AuthorizationError(
            "Administrator access required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            secret: "unit-test-secret".to_string(),
            expiration: 3600,
            admin_access_code: "code".to_string(),
        }
    }

    #[tokio::test]
    async fn test_issued_token_resolves_to_identity() {
        let auth = auth_config();
        let identity = Identity::new("admin-1", Role::Admin).with_email("ops@skyfare.test");
        let token = issue_token(&auth, &identity).unwrap();

        let resolved = JwtIdentityResolver::new(&auth.secret)
            .resolve(&token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, identity.id);
        assert_eq!(resolved.role, identity.role);
        assert_eq!(resolved.email, identity.email);

        let expires_at = resolved.expires_at.unwrap();
        assert!(expires_at > Utc::now() + Duration::seconds(3500));
        assert!(!resolved.is_expired_at(Utc::now()));
        assert!(resolved.is_expired_at(expires_at));
    }

    #[tokio::test]
    async fn test_foreign_signature_is_not_authenticated() {
        let token = issue_token(&auth_config(), &Identity::new("user-1", Role::Customer)).unwrap();

        let resolved = JwtIdentityResolver::new("another-secret").resolve(&token).await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_not_authenticated() {
        let auth = AuthConfig { expiration: 0, ..auth_config() };
        let claims = SessionClaims {
            sub: "user-1".to_string(),
            email: None,
            role: "CUSTOMER".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes())).unwrap();

        let resolved = JwtIdentityResolver::new(&auth.secret).resolve(&token).await.unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_token_from_cookie_or_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));

        headers.insert(header::COOKIE, HeaderValue::from_static("skyfare_session=from-cookie"));
        assert_eq!(session_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_empty_bearer_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(session_token(&headers), None);
    }
}
