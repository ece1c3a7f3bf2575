use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// A bookable flight leg. `price` is per passenger, in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub price: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "one-way",
            TripType::RoundTrip => "round-trip",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-way" => Ok(TripType::OneWay),
            "round-trip" => Ok(TripType::RoundTrip),
            other => Err(CoreError::ValidationError(format!("unknown trip type '{}'", other))),
        }
    }
}

/// The flights a traveller picked, ready to be priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSelection {
    pub flight: Flight,
    pub return_flight: Option<Flight>,
    pub passenger_count: u32,
    pub trip_type: TripType,
}

impl BookingSelection {
    pub fn new(
        flight: Flight,
        return_flight: Option<Flight>,
        passenger_count: u32,
        trip_type: TripType,
    ) -> CoreResult<Self> {
        if passenger_count == 0 {
            return Err(CoreError::ValidationError(
                "passenger count must be at least 1".to_string(),
            ));
        }

        match (trip_type, &return_flight) {
            (TripType::RoundTrip, None) => {
                return Err(CoreError::ValidationError(
                    "round-trip booking requires a return flight".to_string(),
                ))
            }
            (TripType::OneWay, Some(_)) => {
                return Err(CoreError::ValidationError(
                    "one-way booking cannot carry a return flight".to_string(),
                ))
            }
            _ => {}
        }

        if let Some(leg) = std::iter::once(&flight).chain(return_flight.as_ref()).find(|f| f.price < 0) {
            return Err(CoreError::ValidationError(format!(
                "flight {} has a negative price",
                leg.flight_number
            )));
        }

        Ok(Self {
            flight,
            return_flight,
            passenger_count,
            trip_type,
        })
    }

    /// Outbound leg first, then the return leg if there is one.
    pub fn legs(&self) -> impl Iterator<Item = &Flight> {
        std::iter::once(&self.flight).chain(self.return_flight.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(number: &str, from: &str, to: &str, price: i64) -> Flight {
        Flight {
            id: Uuid::new_v4(),
            flight_number: number.to_string(),
            departure_city: from.to_string(),
            arrival_city: to.to_string(),
            price,
        }
    }

    #[test]
    fn test_trip_type_wire_names() {
        assert_eq!("one-way".parse::<TripType>().unwrap(), TripType::OneWay);
        assert_eq!("round-trip".parse::<TripType>().unwrap(), TripType::RoundTrip);
        assert!("multi-city".parse::<TripType>().is_err());

        let json = serde_json::to_string(&TripType::RoundTrip).unwrap();
        assert_eq!(json, "\"round-trip\"");
    }

    #[test]
    fn test_selection_rejects_zero_passengers() {
        let err = BookingSelection::new(flight("SF1", "Lima", "Cusco", 100), None, 0, TripType::OneWay)
            .unwrap_err();
        assert!(err.to_string().contains("passenger count"));
    }

    #[test]
    fn test_selection_return_flight_matches_trip_type() {
        let out = flight("SF1", "Lima", "Cusco", 100);
        let back = flight("SF2", "Cusco", "Lima", 120);

        assert!(BookingSelection::new(out.clone(), None, 1, TripType::RoundTrip).is_err());
        assert!(BookingSelection::new(out.clone(), Some(back.clone()), 1, TripType::OneWay).is_err());

        let selection = BookingSelection::new(out, Some(back), 2, TripType::RoundTrip).unwrap();
        let numbers: Vec<&str> = selection.legs().map(|f| f.flight_number.as_str()).collect();
        assert_eq!(numbers, vec!["SF1", "SF2"]);
    }

    #[test]
    fn test_selection_rejects_negative_price() {
        let result = BookingSelection::new(flight("SF9", "Lima", "Cusco", -1), None, 1, TripType::OneWay);
        assert!(result.is_err());
    }
}
