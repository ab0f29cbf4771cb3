use std::{collections::BTreeSet, str::FromStr, time::{Duration, Instant}};

use tracing::{error, info};

use crate::{
    error::{Error, Result},
    models::ParkingSpot,
    repository::SpotRepository,
};

use super::{visible, Notice};

pub const REFRESH_SUCCESS: &str = "Parking data refreshed successfully";
pub const REFRESH_FAILURE: &str = "Failed to load parking data. Please try again.";
const SUCCESS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Available,
    Occupied,
}

impl StatusFilter {
    fn admits(&self, spot: &ParkingSpot) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Available => !spot.occupied,
            StatusFilter::Occupied => spot.occupied,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "available" => Ok(StatusFilter::Available),
            "occupied" => Ok(StatusFilter::Occupied),
            other => Err(Error::other(format!("Unknown status filter: {}", other))),
        }
    }
}

/// Spot occupancy screen: the fetched list plus level, section, status and
/// free-text filters.
pub struct ParkingView<R> {
    repo: R,
    spots: Vec<ParkingSpot>,
    loading: bool,
    error: Option<Notice>,
    success: Option<Notice>,
    view_mode: ViewMode,
    level_filter: String,
    section_filter: String,
    status_filter: StatusFilter,
    search_query: String,
}

impl<R: SpotRepository> ParkingView<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            spots: Vec::new(),
            loading: false,
            error: None,
            success: None,
            view_mode: ViewMode::default(),
            level_filter: String::new(),
            section_filter: String::new(),
            status_filter: StatusFilter::default(),
            search_query: String::new(),
        }
    }

    /// Build the view and run the initial fetch. A failed fetch is recorded
    /// in [`error`](Self::error), not returned.
    pub async fn load(repo: R) -> Self {
        let mut view = Self::new(repo);
        let _ = view.refresh().await;
        view
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.loading = true;
        self.error = None;

        let result = self.repo.fetch_all().await;
        self.loading = false;

        match result {
            Ok(spots) => {
                info!("Loaded {} parking spots", spots.len());
                self.spots = spots;
                self.success = Some(Notice::transient(REFRESH_SUCCESS, SUCCESS_TTL));
                Ok(())
            }
            Err(e) => {
                error!("Error fetching parking data: {}", e);
                self.error = Some(Notice::sticky(REFRESH_FAILURE));
                Err(e)
            }
        }
    }

    pub async fn park_vehicle(&mut self, spot_number: &str, license_plate: &str) -> Result<()> {
        if spot_number.trim().is_empty() {
            return Err(self.reject("Please select a parking spot"));
        }
        if license_plate.trim().is_empty() {
            return Err(self.reject("Please enter a license plate number"));
        }

        self.error = None;
        if let Err(e) = self.repo.park_vehicle(spot_number, license_plate).await {
            error!("Error parking vehicle: {}", e);
            self.error = Some(Notice::sticky(e.to_string()));
            return Err(e);
        }
        let message = format!("Vehicle {} successfully parked in spot {}", license_plate, spot_number);
        self.refetch_after(message).await;
        Ok(())
    }

    pub async fn release_vehicle(&mut self, spot_number: &str) -> Result<()> {
        if spot_number.trim().is_empty() {
            return Err(self.reject("Please select an occupied parking spot"));
        }

        self.error = None;
        if let Err(e) = self.repo.release_vehicle(spot_number).await {
            error!("Error releasing vehicle: {}", e);
            self.error = Some(Notice::sticky(e.to_string()));
            return Err(e);
        }
        self.refetch_after(format!("Vehicle successfully released from spot {}", spot_number))
            .await;
        Ok(())
    }

    // The refresh banner must not overwrite the action's own message.
    async fn refetch_after(&mut self, message: String) {
        let _ = self.refresh().await;
        if self.error.is_none() {
            self.success = Some(Notice::transient(message, SUCCESS_TTL));
        }
    }

    fn reject(&mut self, message: &str) -> Error {
        self.error = Some(Notice::sticky(message));
        Error::other(message)
    }

    // ── Filters ─────────────────────────────────────────────────────────

    pub fn set_level_filter(&mut self, level: impl Into<String>) {
        self.level_filter = level.into();
    }

    pub fn set_section_filter(&mut self, section: impl Into<String>) {
        self.section_filter = section.into();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.status_filter = status;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn level_filter(&self) -> &str {
        &self.level_filter
    }

    pub fn section_filter(&self) -> &str {
        &self.section_filter
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    // ── Derived state ───────────────────────────────────────────────────

    pub fn spots(&self) -> &[ParkingSpot] {
        &self.spots
    }

    pub fn filtered_spots(&self) -> Vec<&ParkingSpot> {
        let query = self.search_query.to_lowercase();

        self.spots
            .iter()
            .filter(|spot| self.level_filter.is_empty() || spot.level.to_string() == self.level_filter)
            .filter(|spot| self.section_filter.is_empty() || spot.section == self.section_filter)
            .filter(|spot| self.status_filter.admits(spot))
            .filter(|spot| {
                if query.is_empty() {
                    return true;
                }
                let matches_plate = spot
                    .vehicle_data
                    .as_ref()
                    .is_some_and(|v| v.license_plate.to_lowercase().contains(&query));
                spot.spot_number.to_lowercase().contains(&query) || matches_plate
            })
            .collect()
    }

    /// Free spots among the filtered ones.
    pub fn available_spots(&self) -> usize {
        self.filtered_spots().iter().filter(|spot| !spot.occupied).count()
    }

    /// Distinct levels across all spots, ascending.
    pub fn unique_levels(&self) -> Vec<u32> {
        self.spots.iter().map(|s| s.level).collect::<BTreeSet<_>>().into_iter().collect()
    }

    /// Distinct sections across all spots, lexically sorted.
    pub fn unique_sections(&self) -> Vec<String> {
        self.spots
            .iter()
            .map(|s| s.section.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    // ── UI state ────────────────────────────────────────────────────────

    pub fn loading(&self) -> bool {
        self.loading
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
