use axum::{http::Method, middleware::from_fn_with_state, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod app_config;
pub mod auth;
pub mod booking;
pub mod error;
pub mod middleware;
pub mod pages;
pub mod sessions;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware (JSON API only)
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let protected_pages = Router::new()
        .merge(booking::page_routes())
        .merge(admin::routes())
        .route_layer(from_fn_with_state(state.clone(), middleware::require_session));

    let api = booking::api_routes()
        .route_layer(from_fn_with_state(state.clone(), middleware::require_api_session))
        .layer(cors);

    Router::new()
        .merge(pages::routes())
        .merge(auth::routes())
        .merge(protected_pages)
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
