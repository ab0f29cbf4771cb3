//! Form checks that run before anything is sent to the backend.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;

use crate::{
    error::{Error, Result, ValidationErrors},
    models::{CreateReservation, DriverForm, ReservationStatus, UserForm},
};

/// Reservation form as typed by an operator, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationForm {
    pub spot_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub start_time: String,
    pub end_time: String,
    pub status: ReservationStatus,
}

impl Default for ReservationForm {
    fn default() -> Self {
        Self {
            spot_id: None,
            driver_id: None,
            start_time: String::new(),
            end_time: String::new(),
            status: ReservationStatus::Pending,
        }
    }
}

impl ReservationForm {
    /// Validate and build the create payload.
    pub fn into_request(self) -> Result<CreateReservation> {
        let mut errors = ValidationErrors::new();

        if self.spot_id.is_none() {
            errors.add("spot_id", "Please select a parking spot");
        }
        if self.driver_id.is_none() {
            errors.add("driver_id", "Please select a driver");
        }

        let start = required_time(&mut errors, "start_time", &self.start_time, "Please select a start time", "start");
        let end = required_time(&mut errors, "end_time", &self.end_time, "Please select an end time", "end");
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                errors.add("end_time", "End time must be after start time");
            }
        }

        match (self.spot_id, self.driver_id, errors.is_empty()) {
            (Some(spot_id), Some(driver_id), true) => Ok(CreateReservation {
                start_time: self.start_time.trim().to_string(),
                end_time: self.end_time.trim().to_string(),
                status: self.status,
                spot_id,
                driver_id,
            }),
            _ => Err(Error::validation(errors)),
        }
    }
}

fn required_time(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    missing: &str,
    label: &str,
) -> Option<NaiveDateTime> {
    if raw.trim().is_empty() {
        errors.add(field, missing);
        return None;
    }
    let parsed = parse_form_time(raw);
    if parsed.is_none() {
        errors.add(field, format!("Invalid {} time: {}", label, raw.trim()));
    }
    parsed
}

/// RFC 3339, or the `YYYY-MM-DDTHH:MM[:SS]` shape a datetime-local input yields.
/// Offsets are normalized to UTC.
pub fn parse_form_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

pub fn validate_driver(form: &DriverForm) -> Result<()> {
    let mut errors = ValidationErrors::new();

    if form.name.trim().is_empty() {
        errors.add("name", "Name is required");
    }
    if form.license_plate.trim().is_empty() {
        errors.add("license_plate", "License plate is required");
    }
    if form.email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !email_pattern().is_match(&form.email) {
        errors.add("email", "Please enter a valid email address");
    }
    if form.phone_number.trim().is_empty() {
        errors.add("phone_number", "Phone number is required");
    }

    errors.into_result()
}

/// Reports only the first failing rule.
pub fn validate_user(form: &UserForm) -> Result<()> {
    let failure = if form.username.trim().is_empty() {
        Some(("username", "Username is required"))
    } else if form.password.trim().is_empty() {
        Some(("password", "Password is required"))
    } else if form.role.is_none() {
        Some(("role", "Role is required"))
    } else if form.username.chars().count() < 3 {
        Some(("username", "Username must be at least 3 characters"))
    } else if form.password.chars().count() < 6 {
        Some(("password", "Password must be at least 6 characters"))
    } else {
        None
    };

    let mut errors = ValidationErrors::new();
    if let Some((field, message)) = failure {
        errors.add(field, message);
    }
    errors.into_result()
}
