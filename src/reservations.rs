//! Reservation client and DTO normalization.

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};

use crate::{
    client::{ApiClient, ErrorStyle},
    error::Result,
    models::{
        CreateReservation, Reservation, ReservationDto, ReservationStatus, SearchCriteria, StatusUpdateRequest,
    },
    repository::ReservationRepository,
};

pub const UNKNOWN_PLATE: &str = "N/A";

impl From<ReservationDto> for Reservation {
    fn from(dto: ReservationDto) -> Self {
        // The backend does not embed a driver name; derive a placeholder.
        let driver_name = format!("Driver {}", dto.driver_id.chars().take(5).collect::<String>());
        let license_plate = dto
            .spot
            .current_vehicle
            .filter(|plate| !plate.is_empty())
            .unwrap_or_else(|| UNKNOWN_PLATE.to_string());

        Self {
            id: dto.id,
            spot_number: dto.spot.spot_number,
            spot_id: dto.spot.spot_id,
            driver_name,
            driver_id: dto.driver_id,
            license_plate,
            start_time: dto.start_time,
            end_time: dto.end_time,
            status: dto.status,
            created_at: dto.created_at.unwrap_or_default(),
            updated_at: dto.updated_at.unwrap_or_default(),
            total_price: dto.total_price.unwrap_or(0.0),
            duration_in_hours: dto.duration_in_hours.unwrap_or(0.0),
        }
    }
}

fn normalize(dtos: Vec<ReservationDto>) -> Vec<Reservation> {
    dtos.into_iter().map(Reservation::from).collect()
}

#[derive(Debug, Clone)]
pub struct ReservationClient {
    api: ApiClient,
}

impl ReservationClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn get_list(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Vec<Reservation>> {
        let url = self.api.endpoint_with_query(segments, query)?;
        let dtos: Vec<ReservationDto> = self.api.request(Method::GET, url, None, ErrorStyle::StatusLine).await?;
        debug!("Fetched {} reservations", dtos.len());
        Ok(normalize(dtos))
    }

    pub async fn fetch_all(&self) -> Result<Vec<Reservation>> {
        self.get_list(&["reservations"], &[]).await
    }

    pub async fn fetch_one(&self, id: i64) -> Result<Reservation> {
        let url = self.api.endpoint(&["reservations", &id.to_string()])?;
        let dto: ReservationDto = self.api.request(Method::GET, url, None, ErrorStyle::StatusLine).await?;
        Ok(dto.into())
    }

    pub async fn create(&self, reservation: &CreateReservation) -> Result<Reservation> {
        let url = self.api.endpoint(&["reservations"])?;
        let body = serde_json::to_value(reservation)?;
        let dto: ReservationDto = self
            .api
            .request(Method::POST, url, Some(body), ErrorStyle::StatusLine)
            .await?;
        info!("Reservation {} created for spot {}", dto.id, dto.spot.spot_number);
        Ok(dto.into())
    }

    pub async fn update_status(&self, id: i64, status: ReservationStatus) -> Result<Reservation> {
        let url = self.api.endpoint(&["reservations", &id.to_string(), "status"])?;
        let body = serde_json::to_value(StatusUpdateRequest { status })?;
        let dto: ReservationDto = self
            .api
            .request(Method::PATCH, url, Some(body), ErrorStyle::StatusLine)
            .await?;
        info!("Reservation {} moved to {}", id, status);
        Ok(dto.into())
    }

    pub async fn cancel(&self, id: i64) -> Result<()> {
        let url = self.api.endpoint(&["reservations", &id.to_string(), "cancel"])?;
        self.api.execute(Method::POST, url, None, ErrorStyle::StatusLine).await?;
        info!("Reservation {} cancelled", id);
        Ok(())
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Reservation>> {
        self.get_list(&["reservations", "search"], &criteria.query_pairs()).await
    }

    pub async fn for_driver(&self, driver_id: &str) -> Result<Vec<Reservation>> {
        self.get_list(&["reservations", "driver", driver_id], &[]).await
    }

    pub async fn for_spot(&self, spot_id: i64) -> Result<Vec<Reservation>> {
        self.get_list(&["reservations", "spot", &spot_id.to_string()], &[]).await
    }
}

#[async_trait]
impl ReservationRepository for ReservationClient {
    async fn fetch_all(&self) -> Result<Vec<Reservation>> {
        ReservationClient::fetch_all(self).await
    }

    async fn fetch_one(&self, id: i64) -> Result<Reservation> {
        ReservationClient::fetch_one(self, id).await
    }

    async fn create(&self, reservation: &CreateReservation) -> Result<Reservation> {
        ReservationClient::create(self, reservation).await
    }

    async fn update_status(&self, id: i64, status: ReservationStatus) -> Result<Reservation> {
        ReservationClient::update_status(self, id, status).await
    }

    async fn cancel(&self, id: i64) -> Result<()> {
        ReservationClient::cancel(self, id).await
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Reservation>> {
        ReservationClient::search(self, criteria).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dto(value: serde_json::Value) -> ReservationDto {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_flattens_spot() {
        let reservation: Reservation = dto(json!({
            "id": 11,
            "startTime": "2025-04-02T08:00:00",
            "endTime": "2025-04-02T10:30:00",
            "status": "SCHEDULED",
            "spot": {
                "spotId": 5,
                "spotNumber": "C4",
                "status": "OCCUPIED",
                "currentVehicle": "KDA 221X",
                "location": "Level 2 - Section C",
                "reservations": []
            },
            "driverId": "8731245",
            "createdAt": "2025-04-01T09:00:00",
            "updatedAt": "2025-04-01T09:05:00",
            "totalPrice": 12.5,
            "durationInHours": 2.5
        }))
        .into();

        assert_eq!(reservation.id, 11);
        assert_eq!(reservation.spot_number, "C4");
        assert_eq!(reservation.spot_id, 5);
        assert_eq!(reservation.driver_name, "Driver 87312");
        assert_eq!(reservation.driver_id, "8731245");
        assert_eq!(reservation.license_plate, "KDA 221X");
        assert_eq!(reservation.status, ReservationStatus::Scheduled);
        assert_eq!(reservation.total_price, 12.5);
        assert_eq!(reservation.duration_in_hours, 2.5);
    }

    #[test]
    fn test_normalize_defaults() {
        let reservation: Reservation = dto(json!({
            "id": 1,
            "startTime": "2025-04-02T08:00:00",
            "endTime": "2025-04-02T09:00:00",
            "status": "PENDING",
            "spot": { "spotId": 1, "spotNumber": "A1", "currentVehicle": "" },
            "driverId": 3
        }))
        .into();

        assert_eq!(reservation.license_plate, "N/A");
        assert_eq!(reservation.driver_name, "Driver 3");
        assert_eq!(reservation.created_at, "");
        assert_eq!(reservation.total_price, 0.0);
    }

    #[test]
    fn test_driver_name_truncates_on_char_boundary() {
        let reservation: Reservation = dto(json!({
            "id": 2,
            "startTime": "s",
            "endTime": "e",
            "status": "ACTIVE",
            "spot": { "spotId": 1, "spotNumber": "A1" },
            "driverId": "ÅßÇĐÉF-01"
        }))
        .into();
        assert_eq!(reservation.driver_name, "Driver ÅßÇĐÉ");
    }
}
