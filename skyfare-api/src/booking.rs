use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use skyfare_catalog::PriceSummary;
use skyfare_core::{BookingSelection, Flight, Identity, TripType};
use uuid::Uuid;

use crate::{error::AppError, pages::render_page, state::AppState};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/booking", get(booking_page))
        .route("/booking/summary", get(summary_page))
}

pub fn api_routes() -> Router<AppState> {
    Router::new().route("/summary", get(summary_api))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub flight: Uuid,
    /// Form selects submit an empty string for "no return flight".
    #[serde(default)]
    pub return_flight: Option<String>,
    #[serde(default = "default_passengers")]
    pub passengers: u32,
    pub trip_type: TripType,
}

fn default_passengers() -> u32 { 1 }

struct FlightOption {
    id: Uuid,
    label: String,
}

#[derive(Template)]
#[template(path = "booking.html")]
struct BookingTemplate {
    traveller: String,
    flights: Vec<FlightOption>,
}

#[derive(Template)]
#[template(path = "summary.html")]
struct SummaryTemplate {
    traveller: String,
    route: String,
    summary: PriceSummary,
}

fn traveller_name(identity: &Identity) -> String {
    match &identity.email {
        Some(email) => email.expose().clone(),
        None => identity.id.clone(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /booking
async fn booking_page(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Html<String>, AppError> {
    let flights = state
        .flights
        .list_flights()
        .await?
        .into_iter()
        .map(|f| FlightOption {
            id: f.id,
            label: format!(
                "{} {} → {} ({})",
                f.flight_number,
                f.departure_city,
                f.arrival_city,
                state.pricing.format_price(f.price)
            ),
        })
        .collect();

    render_page(&BookingTemplate {
        traveller: traveller_name(&identity),
        flights,
    })
}

/// GET /booking/summary
async fn summary_page(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<SummaryQuery>,
) -> Result<Html<String>, AppError> {
    let selection = load_selection(&state, query).await?;
    let summary = PriceSummary::build(&selection, &state.pricing);

    render_page(&SummaryTemplate {
        traveller: traveller_name(&identity),
        route: route_heading(&selection),
        summary,
    })
}

/// Page heading naming every leg of the trip.
fn route_heading(selection: &BookingSelection) -> String {
    let outbound = &selection.flight;
    let heading = format!("{} → {}", outbound.departure_city, outbound.arrival_city);

    match &selection.return_flight {
        Some(back) if back.departure_city == outbound.arrival_city => {
            format!("{} → {} (round trip)", heading, back.arrival_city)
        }
        Some(back) => format!(
            "{}, {} → {} (round trip)",
            heading, back.departure_city, back.arrival_city
        ),
        None => heading,
    }
}

/// GET /api/v1/summary
async fn summary_api(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<PriceSummary>, AppError> {
    let selection = load_selection(&state, query).await?;
    Ok(Json(PriceSummary::build(&selection, &state.pricing)))
}

async fn find_flight(state: &AppState, id: Uuid) -> Result<Flight, AppError> {
    state
        .flights
        .get_flight(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Flight {} not found", id)))
}

async fn load_selection(state: &AppState, query: SummaryQuery) -> Result<BookingSelection, AppError> {
    let flight = find_flight(state, query.flight).await?;

    let return_id = query
        .return_flight
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty());

    let return_flight = match (query.trip_type, return_id) {
        (TripType::RoundTrip, Some(raw)) => {
            let id = Uuid::parse_str(raw)
                .map_err(|_| AppError::ValidationError(format!("'{}' is not a flight id", raw)))?;
            Some(find_flight(state, id).await?)
        }
        (TripType::OneWay, Some(_)) => {
            tracing::debug!("Dropping return flight from one-way selection");
            None
        }
        (_, None) => None,
    };

    BookingSelection::new(flight, return_flight, query.passengers, query.trip_type)
        .map_err(|e| AppError::ValidationError(e.to_string()))
}
