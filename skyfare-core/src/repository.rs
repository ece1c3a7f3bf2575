use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::Flight;
use crate::CoreResult;

/// Repository trait for flight data access
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn get_flight(&self, id: Uuid) -> CoreResult<Option<Flight>>;

    async fn list_flights(&self) -> CoreResult<Vec<Flight>>;
}

/// Flights held in memory, in the order they were configured.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFlightRepository {
    flights: Vec<Flight>,
}

impl InMemoryFlightRepository {
    pub fn new(flights: Vec<Flight>) -> Self {
        Self { flights }
    }
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn get_flight(&self, id: Uuid) -> CoreResult<Option<Flight>> {
        Ok(self.flights.iter().find(|f| f.id == id).cloned())
    }

    async fn list_flights(&self) -> CoreResult<Vec<Flight>> {
        Ok(self.flights.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_by_id() {
        let flight = Flight {
            id: Uuid::new_v4(),
            flight_number: "SF100".to_string(),
            departure_city: "Lisbon".to_string(),
            arrival_city: "Porto".to_string(),
            price: 4_900,
        };
        let repo = InMemoryFlightRepository::new(vec![flight.clone()]);

        assert_eq!(repo.get_flight(flight.id).await.unwrap(), Some(flight));
        assert_eq!(repo.get_flight(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(repo.list_flights().await.unwrap().len(), 1);
    }
}
