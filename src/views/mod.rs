//! View state for the parking and reservation screens.
//!
//! Each view owns the last fetched list, the filters an operator has set and
//! the notices shown after an action. Derived lists are recomputed on every
//! call from current state; mutations always refetch the full list.

use std::time::{Duration, Instant};

pub mod parking;
pub mod reservations;

pub use parking::{ParkingView, StatusFilter, ViewMode};
pub use reservations::{ReservationStats, ReservationsView, SortDirection, SortField};

/// A banner message, optionally dismissed after a fixed delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: String,
    expires_at: Option<Instant>,
}

impl Notice {
    pub fn transient(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            expires_at: Some(Instant::now() + ttl),
        }
    }

    /// Stays until replaced or cleared.
    pub fn sticky(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expires_at: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Message of `notice` if it is still visible at `now`.
pub(crate) fn visible(notice: &Option<Notice>, now: Instant) -> Option<&str> {
    notice
        .as_ref()
        .filter(|n| !n.is_expired_at(now))
        .map(Notice::message)
}
