use askama::Template;
use axum::{extract::State, middleware, response::Html, routing::get, Extension, Router};
use skyfare_core::Identity;

use crate::{error::AppError, middleware::require_admin, pages::render_page, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route_layer(middleware::from_fn(require_admin))
}

struct FlightRow {
    flight_number: String,
    route: String,
    fare: String,
}

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    admin: String,
    flights: Vec<FlightRow>,
    tax_label: String,
    currency: String,
    active_sessions: usize,
}

/// GET /admin
async fn dashboard(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Html<String>, AppError> {
    let flights = state
        .flights
        .list_flights()
        .await?
        .into_iter()
        .map(|f| FlightRow {
            route: format!("{} → {}", f.departure_city, f.arrival_city),
            fare: state.pricing.format_price(f.price),
            flight_number: f.flight_number,
        })
        .collect();

    render_page(&AdminTemplate {
        admin: identity.id,
        flights,
        tax_label: format!("{}%", state.pricing.tax_rate_percent()),
        currency: state.pricing.config().currency.clone(),
        active_sessions: state.sessions.len().await,
    })
}
