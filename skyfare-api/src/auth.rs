use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use skyfare_core::{Identity, Role, RoleChoice};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::{expired_session_cookie, issue_token, session_cookie, SESSION_COOKIE},
    pages::render_page,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(role_selection))
        .route("/auth/{role}", get(sign_in_form).post(sign_in))
        .route("/sign-out", post(sign_out))
}

struct ChoiceLink {
    href: &'static str,
    label: &'static str,
}

#[derive(Template)]
#[template(path = "role_select.html")]
struct RoleSelectTemplate {
    choices: Vec<ChoiceLink>,
}

#[derive(Template)]
#[template(path = "sign_in.html")]
struct SignInTemplate {
    role_slug: &'static str,
    heading: &'static str,
    needs_access_code: bool,
    error: Option<String>,
}

impl SignInTemplate {
    fn for_role(role: Role, error: Option<String>) -> Self {
        Self {
            role_slug: role.slug(),
            heading: match role {
                Role::Customer => "Traveller sign-in",
                Role::Admin => "Administrator sign-in",
            },
            needs_access_code: role == Role::Admin,
            error,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub access_code: Option<String>,
}

/// GET /sign-in
async fn role_selection() -> Result<Response, AppError> {
    let choices = RoleChoice::ALL
        .iter()
        .map(|choice| ChoiceLink {
            href: choice.destination(),
            label: choice.label(),
        })
        .collect();

    Ok(render_page(&RoleSelectTemplate { choices })?.into_response())
}

fn role_from_path(slug: &str) -> Result<Role, AppError> {
    Role::from_slug(slug).ok_or_else(|| AppError::NotFoundError(format!("No sign-in page for '{}'", slug)))
}

/// GET /auth/{role}
async fn sign_in_form(Path(slug): Path<String>) -> Result<Response, AppError> {
    let role = role_from_path(&slug)?;
    Ok(render_page(&SignInTemplate::for_role(role, None))?.into_response())
}

fn rejected(role: Role, status: StatusCode, message: &str) -> Result<Response, AppError> {
    let page = render_page(&SignInTemplate::for_role(role, Some(message.to_string())))?;
    Ok((status, page).into_response())
}

/// POST /auth/{role}
async fn sign_in(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Result<Response, AppError> {
    let role = role_from_path(&slug)?;

    let email = form.email.trim();
    if email.is_empty() || !email.contains('@') {
        return rejected(role, StatusCode::BAD_REQUEST, "Enter a valid email address");
    }

    if role == Role::Admin && form.access_code.as_deref() != Some(state.auth.admin_access_code.as_str()) {
        tracing::warn!("Admin sign-in rejected: bad access code");
        return rejected(role, StatusCode::UNAUTHORIZED, "Access code is not valid");
    }

    let identity = Identity::new(format!("{}-{}", role.slug(), Uuid::new_v4()), role).with_email(email);
    let token = issue_token(&state.auth, &identity)?;
    tracing::info!(user = %identity.id, role = %role, email = ?identity.email, "Signed in");

    let landing = match role {
        Role::Customer => "/booking",
        Role::Admin => "/admin",
    };
    Ok((jar.add(session_cookie(token)), Redirect::to(landing)).into_response())
}

/// POST /sign-out
async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.forget(cookie.value()).await;
    }
    (jar.remove(expired_session_cookie()), Redirect::to("/"))
}
