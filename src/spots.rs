//! Parking spot client and DTO normalization.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Method;
use tracing::{debug, info};

use crate::{
    client::{ApiClient, ErrorStyle},
    error::Result,
    models::{ParkVehicleRequest, ParkingSpot, ParkingSpotDto, SpotStatus, VehicleData},
    repository::SpotRepository,
};

pub const DEFAULT_LEVEL: u32 = 1;
pub const DEFAULT_SECTION: &str = "A";

fn location_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i-u)Level ([0-9]+) - Section ([A-Z])").expect("location pattern is valid")
    })
}

/// Decode `"Level <n> - Section <x>"` (case-insensitive, anywhere in the
/// string). Anything unparsable falls back to level 1, section A.
pub fn parse_location(location: Option<&str>) -> (u32, String) {
    location
        .and_then(|raw| location_pattern().captures(raw))
        .and_then(|caps| {
            let level = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let section = caps.get(2)?.as_str().to_string();
            Some((level, section))
        })
        .unwrap_or_else(|| (DEFAULT_LEVEL, DEFAULT_SECTION.to_string()))
}

impl ParkingSpot {
    /// `index` is the 0-based position in the fetched list.
    pub fn from_dto(dto: ParkingSpotDto, index: usize, fetched_at: DateTime<Utc>) -> Self {
        let (level, section) = parse_location(dto.location.as_deref());

        Self {
            spot_id: index as u32 + 1,
            spot_number: dto.spot_number,
            level,
            section,
            occupied: dto.status == SpotStatus::Occupied,
            vehicle_data: dto
                .current_vehicle
                .filter(|plate| !plate.is_empty())
                .map(|license_plate| VehicleData {
                    license_plate,
                    entry_time: fetched_at,
                }),
        }
    }
}

pub fn normalize_spots(dtos: Vec<ParkingSpotDto>, fetched_at: DateTime<Utc>) -> Vec<ParkingSpot> {
    dtos.into_iter()
        .enumerate()
        .map(|(index, dto)| ParkingSpot::from_dto(dto, index, fetched_at))
        .collect()
}

#[derive(Debug, Clone)]
pub struct SpotClient {
    api: ApiClient,
}

impl SpotClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch_all(&self) -> Result<Vec<ParkingSpot>> {
        let url = self.api.endpoint(&["parking", "spots"])?;
        let dtos: Vec<ParkingSpotDto> = self.api.request(Method::GET, url, None, ErrorStyle::StatusLine).await?;
        debug!("Fetched {} parking spots", dtos.len());
        Ok(normalize_spots(dtos, Utc::now()))
    }

    pub async fn fetch_available(&self) -> Result<Vec<ParkingSpot>> {
        let url = self.api.endpoint(&["parking", "spots", "available"])?;
        let dtos: Vec<ParkingSpotDto> = self.api.request(Method::GET, url, None, ErrorStyle::StatusLine).await?;
        Ok(normalize_spots(dtos, Utc::now()))
    }

    /// Spot currently holding `license_plate`. The returned `spot_id` is always 1.
    pub async fn find_vehicle(&self, license_plate: &str) -> Result<ParkingSpot> {
        let url = self.api.endpoint(&["parking", "find", license_plate])?;
        let dto: ParkingSpotDto = self.api.request(Method::GET, url, None, ErrorStyle::StatusLine).await?;
        Ok(ParkingSpot::from_dto(dto, 0, Utc::now()))
    }

    pub async fn create_spot(&self, spot: &ParkingSpotDto) -> Result<ParkingSpotDto> {
        let url = self.api.endpoint(&["parking", "spots"])?;
        let body = serde_json::to_value(spot)?;
        let created: ParkingSpotDto = self
            .api
            .request(Method::POST, url, Some(body), ErrorStyle::StatusLine)
            .await?;
        info!("Created parking spot {}", created.spot_number);
        Ok(created)
    }

    pub async fn park_vehicle(&self, spot_number: &str, license_plate: &str) -> Result<()> {
        let url = self.api.endpoint(&["parking", "park"])?;
        let body = serde_json::to_value(ParkVehicleRequest {
            license_plate: license_plate.to_string(),
            spot_number: spot_number.to_string(),
        })?;
        self.api.execute(Method::POST, url, Some(body), ErrorStyle::StatusLine).await?;
        info!("Parked {} in spot {}", license_plate, spot_number);
        Ok(())
    }

    pub async fn release_vehicle(&self, spot_number: &str) -> Result<()> {
        let url = self.api.endpoint(&["parking", "release", spot_number])?;
        self.api.execute(Method::POST, url, None, ErrorStyle::StatusLine).await?;
        info!("Released spot {}", spot_number);
        Ok(())
    }
}

#[async_trait]
impl SpotRepository for SpotClient {
    async fn fetch_all(&self) -> Result<Vec<ParkingSpot>> {
        SpotClient::fetch_all(self).await
    }

    async fn park_vehicle(&self, spot_number: &str, license_plate: &str) -> Result<()> {
        SpotClient::park_vehicle(self, spot_number, license_plate).await
    }

    async fn release_vehicle(&self, spot_number: &str) -> Result<()> {
        SpotClient::release_vehicle(self, spot_number).await
    }
}
