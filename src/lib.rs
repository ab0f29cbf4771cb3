//! # parkdesk
//!
//! Client library for administering a parking facility through its REST
//! backend: spot occupancy, reservations, drivers and staff accounts, plus
//! the view state an operator console keeps on top of them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use parkdesk::{ApiClient, ParkingView, Session, SpotClient, StatusFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::with_token("your-token-here");
//!     let api = ApiClient::new("http://localhost:8080/api", session)?;
//!
//!     let mut view = ParkingView::load(SpotClient::new(api)).await;
//!     view.set_status_filter(StatusFilter::Available);
//!     println!("{} free spots", view.available_spots());
//!
//!     view.park_vehicle("A1", "KCB 123A").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod drivers;
pub mod error;
pub mod format;
pub mod models;
pub mod repository;
pub mod reservations;
pub mod session;
pub mod spots;
pub mod users;
pub mod validation;
pub mod views;

pub use auth::AuthClient;
pub use client::{ApiClient, ErrorStyle};
pub use config::Config;
pub use drivers::DriverClient;
pub use error::{Error, Result, ValidationErrors};
pub use models::*;
pub use repository::{ReservationRepository, SpotRepository};
pub use reservations::ReservationClient;
pub use session::{Credential, Session, TokenStore};
pub use spots::SpotClient;
pub use users::UserClient;
pub use validation::ReservationForm;
pub use views::{
    Notice, ParkingView, ReservationStats, ReservationsView, SortDirection, SortField, StatusFilter, ViewMode,
};
