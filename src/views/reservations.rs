use std::{
    cmp::Ordering,
    str::FromStr,
    time::{Duration, Instant},
};

use tracing::{error, info, warn};

use crate::{
    error::{Error, Result},
    models::{CreateReservation, Reservation, ReservationStatus},
    repository::ReservationRepository,
    validation::parse_form_time,
};

use super::{visible, Notice};

const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    SpotNumber,
    DriverName,
    LicensePlate,
    StartTime,
    EndTime,
    Status,
    CreatedAt,
    TotalPrice,
    DurationInHours,
}

impl FromStr for SortField {
    type Err = Error;

    /// Accepts both `startTime` and `start_time` spellings.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s.chars().filter(|c| *c != '_').collect::<String>().to_ascii_lowercase();
        match key.as_str() {
            "id" => Ok(SortField::Id),
            "spotnumber" => Ok(SortField::SpotNumber),
            "drivername" => Ok(SortField::DriverName),
            "licenseplate" => Ok(SortField::LicensePlate),
            "starttime" => Ok(SortField::StartTime),
            "endtime" => Ok(SortField::EndTime),
            "status" => Ok(SortField::Status),
            "createdat" => Ok(SortField::CreatedAt),
            "totalprice" => Ok(SortField::TotalPrice),
            "durationinhours" => Ok(SortField::DurationInHours),
            _ => Err(Error::other(format!("Unknown sort field: {}", s))),
        }
    }
}

impl SortField {
    fn compare(&self, a: &Reservation, b: &Reservation) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::SpotNumber => locale_cmp(&a.spot_number, &b.spot_number),
            SortField::DriverName => locale_cmp(&a.driver_name, &b.driver_name),
            SortField::LicensePlate => locale_cmp(&a.license_plate, &b.license_plate),
            SortField::StartTime => time_cmp(&a.start_time, &b.start_time),
            SortField::EndTime => time_cmp(&a.end_time, &b.end_time),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::CreatedAt => time_cmp(&a.created_at, &b.created_at),
            SortField::TotalPrice => a.total_price.total_cmp(&b.total_price),
            SortField::DurationInHours => a.duration_in_hours.total_cmp(&b.duration_in_hours),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

// Case-insensitive first so "b1" sorts between "A1" and "C1"; on a case-only
// tie lowercase comes first.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| b.cmp(a))
}

// Unparsable values sort before every parsed timestamp.
fn time_cmp(a: &str, b: &str) -> Ordering {
    (parse_form_time(a), a).cmp(&(parse_form_time(b), b))
}

/// Counts by status over the unfiltered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationStats {
    pub total: usize,
    pub pending: usize,
    pub active: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
}

/// Reservation management screen.
pub struct ReservationsView<R> {
    repo: R,
    reservations: Vec<Reservation>,
    loading: bool,
    error: Option<Notice>,
    success: Option<Notice>,
    status_filter: Option<ReservationStatus>,
    search_query: String,
    sort_field: SortField,
    sort_direction: SortDirection,
    login_required: bool,
}

impl<R: ReservationRepository> ReservationsView<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            reservations: Vec::new(),
            loading: false,
            error: None,
            success: None,
            status_filter: None,
            search_query: String::new(),
            sort_field: SortField::StartTime,
            sort_direction: SortDirection::Desc,
            login_required: false,
        }
    }

    pub async fn load(repo: R) -> Self {
        let mut view = Self::new(repo);
        let _ = view.refresh().await;
        view
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.loading = true;
        let result = self.repo.fetch_all().await;
        self.loading = false;

        match result {
            Ok(reservations) => {
                info!("Loaded {} reservations", reservations.len());
                self.reservations = reservations;
                self.error = None;
                self.login_required = false;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching reservations: {}", e);
                if e.is_authentication() {
                    self.login_required = true;
                }
                self.error = Some(Notice::transient(e.to_string(), NOTICE_TTL));
                Err(e)
            }
        }
    }

    pub async fn create(&mut self, reservation: &CreateReservation) -> Result<Reservation> {
        self.loading = true;
        let result = self.repo.create(reservation).await;
        self.loading = false;

        let created = self.record(result)?;
        self.after_mutation("Reservation created successfully".to_string()).await;
        Ok(created)
    }

    pub async fn cancel(&mut self, id: i64) -> Result<()> {
        self.loading = true;
        let result = self.repo.cancel(id).await;
        self.loading = false;

        self.record(result)?;
        self.after_mutation("Reservation cancelled successfully".to_string()).await;
        Ok(())
    }

    pub async fn update_status(&mut self, id: i64, status: ReservationStatus) -> Result<Reservation> {
        self.loading = true;
        let result = self.repo.update_status(id, status).await;
        self.loading = false;

        let updated = self.record(result)?;
        self.after_mutation(format!("Reservation status updated to {}", status)).await;
        Ok(updated)
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        result.map_err(|e| {
            error!("Reservation action failed: {}", e);
            if e.is_authentication() {
                self.login_required = true;
            }
            self.error = Some(Notice::transient(e.to_string(), NOTICE_TTL));
            e
        })
    }

    async fn after_mutation(&mut self, message: String) {
        self.success = Some(Notice::transient(message, NOTICE_TTL));
        if let Err(e) = self.refresh().await {
            warn!("Refetch after reservation change failed: {}", e);
        }
    }

    // ── Filters and sorting ─────────────────────────────────────────────

    pub fn set_status_filter(&mut self, status: Option<ReservationStatus>) {
        self.status_filter = status;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.sort_field = field;
        self.sort_direction = direction;
    }

    /// Same field flips the direction; a new field starts ascending.
    pub fn handle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Asc;
        }
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn filtered_reservations(&self) -> Vec<&Reservation> {
        let query = self.search_query.to_lowercase();

        let mut result: Vec<&Reservation> = self
            .reservations
            .iter()
            .filter(|r| self.status_filter.map_or(true, |status| r.status == status))
            .filter(|r| {
                query.is_empty()
                    || r.driver_name.to_lowercase().contains(&query)
                    || r.license_plate.to_lowercase().contains(&query)
                    || r.spot_number.to_lowercase().contains(&query)
            })
            .collect();

        let field = self.sort_field;
        match self.sort_direction {
            SortDirection::Asc => result.sort_by(|a, b| field.compare(a, b)),
            SortDirection::Desc => result.sort_by(|a, b| field.compare(b, a)),
        }
        result
    }

    pub fn stats(&self) -> ReservationStats {
        let mut stats = ReservationStats {
            total: self.reservations.len(),
            ..Default::default()
        };
        for reservation in &self.reservations {
            match reservation.status {
                ReservationStatus::Pending => stats.pending += 1,
                ReservationStatus::Active => stats.active += 1,
                ReservationStatus::Scheduled => stats.scheduled += 1,
                ReservationStatus::Completed => stats.completed += 1,
                ReservationStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    // ── UI state ────────────────────────────────────────────────────────

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Set once the backend rejected the session; the caller should send
    /// the operator back to login.
    pub fn login_required(&self) -> bool {
        self.login_required
    }

    pub fn error(&self) -> Option<&str> {
        visible(&self.error, Instant::now())
    }

    pub fn success(&self) -> Option<&str> {
        visible(&self.success, Instant::now())
    }

    pub fn success_at(&self, now: Instant) -> Option<&str> {
        visible(&self.success, now)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}
