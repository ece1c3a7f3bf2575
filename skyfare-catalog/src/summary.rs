use serde::Serialize;
use skyfare_core::{BookingSelection, TripType};

use crate::pricing::PricingEngine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Leg,
    Subtotal,
    Taxes,
    Total,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub kind: LineKind,
    pub label: String,
    pub amount: i64,
    pub formatted: String,
}

/// Price breakdown for a booking selection, ready to display.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSummary {
    pub trip_type: TripType,
    pub passenger_count: u32,
    pub lines: Vec<SummaryLine>,
    pub subtotal: i64,
    pub taxes: i64,
    pub tax_label: String,
    pub grand_total: i64,
    pub currency: String,
}

impl PriceSummary {
    pub fn build(selection: &BookingSelection, pricing: &PricingEngine) -> Self {
        let return_flight = selection.return_flight.as_ref();
        let passengers = selection.passenger_count;

        let subtotal = pricing.total_price(&selection.flight, return_flight, passengers, selection.trip_type);
        let taxes = pricing.taxes(&selection.flight, return_flight, passengers, selection.trip_type);
        let grand_total = pricing.grand_total(&selection.flight, return_flight, passengers, selection.trip_type);
        let tax_label = format!("Taxes & Fees ({}%)", pricing.tax_rate_percent());

        let line = |kind, label: String, amount| SummaryLine {
            kind,
            label,
            amount,
            formatted: pricing.format_price(amount),
        };

        let mut lines: Vec<SummaryLine> = selection
            .legs()
            .map(|leg| {
                line(
                    LineKind::Leg,
                    format!("{} → {} × {}", leg.departure_city, leg.arrival_city, passengers),
                    leg.price * i64::from(passengers),
                )
            })
            .collect();
        lines.push(line(LineKind::Subtotal, "Subtotal".to_string(), subtotal));
        lines.push(line(LineKind::Taxes, tax_label.clone(), taxes));
        lines.push(line(LineKind::Total, "Total".to_string(), grand_total));

        Self {
            trip_type: selection.trip_type,
            passenger_count: passengers,
            lines,
            subtotal,
            taxes,
            tax_label,
            grand_total,
            currency: pricing.config().currency.clone(),
        }
    }

    pub fn legs(&self) -> impl Iterator<Item = &SummaryLine> {
        self.lines.iter().filter(|l| l.kind == LineKind::Leg)
    }

    pub fn line(&self, kind: LineKind) -> Option<&SummaryLine> {
        self.lines.iter().find(|l| l.kind == kind)
    }
}
