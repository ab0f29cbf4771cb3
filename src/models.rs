use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

// ── Parking spots ───────────────────────────────────────────────────────

/// Wire status of a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpotStatus {
    Available,
    Occupied,
}

/// Spot record as the backend sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSpotDto {
    pub spot_number: String,
    pub status: SpotStatus,
    #[serde(default)]
    pub current_vehicle: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// A normalized parking spot.
///
/// `spot_id` is the 1-based position in the list it was fetched with. It is
/// not a stable identity and must not be carried across refreshes; use
/// `spot_number` as the key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingSpot {
    pub spot_id: u32,
    pub spot_number: String,
    pub level: u32,
    pub section: String,
    pub occupied: bool,
    pub vehicle_data: Option<VehicleData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleData {
    pub license_plate: String,
    /// When the spot list was fetched. The backend does not report entry times.
    pub entry_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkVehicleRequest {
    pub license_plate: String,
    pub spot_number: String,
}

// ── Reservations ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Active,
    Scheduled,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        ReservationStatus::Pending,
        ReservationStatus::Active,
        ReservationStatus::Scheduled,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Active => "ACTIVE",
            ReservationStatus::Scheduled => "SCHEDULED",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    /// Statuses an operator may move a reservation to from this one.
    pub fn allowed_transitions(&self) -> &'static [ReservationStatus] {
        use ReservationStatus::*;
        match self {
            Pending => &[Scheduled, Cancelled],
            Scheduled => &[Active, Cancelled],
            Active => &[Completed, Cancelled],
            Completed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: ReservationStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::other(format!("Unknown reservation status: {}", s)))
    }
}

/// Spot embedded in a reservation record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSpotDto {
    pub spot_id: i64,
    pub spot_number: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub current_vehicle: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Reservation record as the backend sends it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub id: i64,
    pub start_time: String,
    pub end_time: String,
    pub status: ReservationStatus,
    pub spot: ReservationSpotDto,
    #[serde(deserialize_with = "driver_id_as_string")]
    pub driver_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub duration_in_hours: Option<f64>,
}

/// The backend may send the driver as a bare id, a string, or the whole
/// driver object.
fn driver_id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DriverRef {
        Text(String),
        Number(i64),
        Object {
            #[serde(rename = "driverId")]
            driver_id: i64,
        },
    }

    Ok(match DriverRef::deserialize(deserializer)? {
        DriverRef::Text(s) => s,
        DriverRef::Number(n) => n.to_string(),
        DriverRef::Object { driver_id } => driver_id.to_string(),
    })
}

/// A normalized reservation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub id: i64,
    pub spot_number: String,
    pub spot_id: i64,
    /// Synthesized from `driver_id`; the backend does not embed driver names.
    pub driver_name: String,
    pub driver_id: String,
    /// Vehicle currently in the reserved spot, or `"N/A"`.
    pub license_plate: String,
    pub start_time: String,
    pub end_time: String,
    pub status: ReservationStatus,
    pub created_at: String,
    pub updated_at: String,
    pub total_price: f64,
    pub duration_in_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    pub start_time: String,
    pub end_time: String,
    pub status: ReservationStatus,
    pub spot_id: i64,
    pub driver_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateRequest {
    pub status: ReservationStatus,
}

/// Optional filters for `GET /reservations/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub driver_name: Option<String>,
    pub license_plate: Option<String>,
    pub spot_number: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

impl SearchCriteria {
    /// Non-empty filters as `(name, value)` query pairs, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("driverName", &self.driver_name),
            ("licensePlate", &self.license_plate),
            ("spotNumber", &self.spot_number),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
            ("status", &self.status),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (name, v))
        })
        .collect()
    }
}

// ── Drivers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub driver_id: i64,
    pub name: String,
    pub license_plate: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverForm {
    pub name: String,
    pub license_plate: String,
    pub phone_number: String,
    pub email: String,
    pub active: bool,
}

fn default_true() -> bool {
    true
}

// ── Users & auth ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Staff,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UserRole::Admin => "ADMIN",
            UserRole::Staff => "STAFF",
        })
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "STAFF" => Ok(UserRole::Staff),
            _ => Err(Error::other(format!("Unknown role: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserForm {
    pub username: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub message: Option<String>,
}
