use askama::Template;
use axum::{response::Html, routing::get, Router};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health_check))
}

pub(crate) fn render_page<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate {}

async fn landing() -> Result<Html<String>, AppError> {
    render_page(&LandingTemplate {})
}

async fn health_check() -> &'static str {
    "OK"
}
