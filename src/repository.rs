use async_trait::async_trait;

use crate::{
    error::Result,
    models::{CreateReservation, ParkingSpot, Reservation, ReservationStatus, SearchCriteria},
};

#[async_trait]
pub trait SpotRepository: Send + Sync {
    // 1-based positional ids, fresh on every call
    async fn fetch_all(&self) -> Result<Vec<ParkingSpot>>;
    // Commands: refetch to observe the effect
    async fn park_vehicle(&self, spot_number: &str, license_plate: &str) -> Result<()>;
    async fn release_vehicle(&self, spot_number: &str) -> Result<()>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Reservation>>;
    async fn fetch_one(&self, id: i64) -> Result<Reservation>;
    async fn create(&self, reservation: &CreateReservation) -> Result<Reservation>;
    async fn update_status(&self, id: i64, status: ReservationStatus) -> Result<Reservation>;
    async fn cancel(&self, id: i64) -> Result<()>;
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Reservation>>;
}
