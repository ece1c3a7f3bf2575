use serde::{Deserialize, Serialize};
use skyfare_core::{Flight, TripType};

/// Pricing parameters, loaded from the `[pricing]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Fraction of the subtotal charged as taxes and fees (0.16 = 16%).
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,

    /// ISO 4217 code reported by the JSON summary.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Prefix used when formatting amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_tax_rate() -> f64 { 0.16 }
fn default_currency() -> String { "USD".to_string() }
fn default_currency_symbol() -> String { "$".to_string() }

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            currency: default_currency(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Tax rate must be between 0 and 1, got {0}")]
    InvalidTaxRate(f64),
}

/// Price arithmetic for booking selections. All amounts are minor units.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Result<Self, PricingError> {
        if !(0.0..=1.0).contains(&config.tax_rate) {
            return Err(PricingError::InvalidTaxRate(config.tax_rate));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Fare for every passenger on every leg. The return leg only counts for
    /// round trips.
    pub fn total_price(
        &self,
        flight: &Flight,
        return_flight: Option<&Flight>,
        passenger_count: u32,
        trip_type: TripType,
    ) -> i64 {
        let return_leg = match trip_type {
            TripType::RoundTrip => return_flight.map(|f| f.price).unwrap_or(0),
            TripType::OneWay => 0,
        };
        (flight.price + return_leg) * i64::from(passenger_count)
    }

    pub fn taxes(
        &self,
        flight: &Flight,
        return_flight: Option<&Flight>,
        passenger_count: u32,
        trip_type: TripType,
    ) -> i64 {
        let subtotal = self.total_price(flight, return_flight, passenger_count, trip_type);
        self.tax_on(subtotal)
    }

    pub fn grand_total(
        &self,
        flight: &Flight,
        return_flight: Option<&Flight>,
        passenger_count: u32,
        trip_type: TripType,
    ) -> i64 {
        let subtotal = self.total_price(flight, return_flight, passenger_count, trip_type);
        subtotal + self.tax_on(subtotal)
    }

    pub(crate) fn tax_on(&self, subtotal: i64) -> i64 {
        (subtotal as f64 * self.config.tax_rate).round() as i64
    }

    /// `116000` -> `$1,160.00`
    pub fn format_price(&self, amount: i64) -> String {
        let sign = if amount < 0 { "-" } else { "" };
        let abs = amount.unsigned_abs();
        format!(
            "{}{}{}.{:02}",
            sign,
            self.config.currency_symbol,
            group_thousands(abs / 100),
            abs % 100
        )
    }

    /// Tax rate as a percentage without trailing zeros: `16`, `7.5`.
    pub fn tax_rate_percent(&self) -> String {
        let formatted = format!("{:.2}", self.config.tax_rate * 100.0);
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn flight(price: i64) -> Flight {
        Flight {
            id: Uuid::new_v4(),
            flight_number: "SF100".to_string(),
            departure_city: "Bogotá".to_string(),
            arrival_city: "Medellín".to_string(),
            price,
        }
    }

    fn engine() -> PricingEngine {
        PricingEngine::new(PricingConfig::default()).unwrap()
    }

    #[test]
    fn test_one_way_totals() {
        let engine = engine();
        let out = flight(50_000);

        assert_eq!(engine.total_price(&out, None, 2, TripType::OneWay), 100_000);
        assert_eq!(engine.taxes(&out, None, 2, TripType::OneWay), 16_000);
        assert_eq!(engine.grand_total(&out, None, 2, TripType::OneWay), 116_000);
    }

    #[test]
    fn test_return_leg_only_counts_for_round_trip() {
        let engine = engine();
        let out = flight(30_000);
        let back = flight(20_000);

        assert_eq!(engine.total_price(&out, Some(&back), 3, TripType::RoundTrip), 150_000);
        assert_eq!(engine.total_price(&out, Some(&back), 3, TripType::OneWay), 90_000);
    }

    #[test]
    fn test_tax_rounds_to_nearest_cent() {
        let engine = engine();
        // 16% of 3.33 = 0.5328
        assert_eq!(engine.taxes(&flight(333), None, 1, TripType::OneWay), 53);
    }

    #[test]
    fn test_format_price() {
        let engine = engine();
        assert_eq!(engine.format_price(116_000), "$1,160.00");
        assert_eq!(engine.format_price(5), "$0.05");
        assert_eq!(engine.format_price(123_456_789), "$1,234,567.89");
        assert_eq!(engine.format_price(-1_050), "-$10.50");
    }

    #[test]
    fn test_tax_rate_percent() {
        assert_eq!(engine().tax_rate_percent(), "16");

        let config = PricingConfig { tax_rate: 0.075, ..PricingConfig::default() };
        assert_eq!(PricingEngine::new(config).unwrap().tax_rate_percent(), "7.5");
    }

    #[test]
    fn test_rejects_out_of_range_tax_rate() {
        let config = PricingConfig { tax_rate: 1.5, ..PricingConfig::default() };
        assert!(matches!(PricingEngine::new(config), Err(PricingError::InvalidTaxRate(_))));
    }
}
