mod support;

use parkdesk::{
    ApiClient, AuthClient, DriverClient, Error, ParkingView, ReservationClient, ReservationStatus, ReservationsView,
    SearchCriteria, Session, SpotClient, StatusFilter, TokenStore, UserClient,
};
use support::{MockBackend, TOKEN};
use tempfile::TempDir;

fn api(backend: &MockBackend, session: Session) -> ApiClient {
    ApiClient::new(&backend.base_url, session).unwrap()
}

#[tokio::test]
async fn test_fetch_spots_normalizes_locations() {
    let backend = MockBackend::start().await;
    let spots = SpotClient::new(api(&backend, Session::with_token(TOKEN)))
        .fetch_all()
        .await
        .unwrap();

    assert_eq!(spots.len(), 3);
    assert_eq!(spots.iter().map(|s| s.spot_id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!((spots[0].level, spots[0].section.as_str()), (1, "A"));
    assert_eq!((spots[1].level, spots[1].section.as_str()), (2, "b"));
    assert_eq!((spots[2].level, spots[2].section.as_str()), (1, "A"));
    assert!(spots[1].occupied);
    assert_eq!(spots[1].vehicle_data.as_ref().unwrap().license_plate, "XYZ123");
    assert!(spots[0].vehicle_data.is_none());

    let request = backend.last_request();
    assert_eq!(request.path, "/api/parking/spots");
    assert_eq!(request.authorization.as_deref(), Some("Bearer good-token"));
}

#[tokio::test]
async fn test_no_token_sends_no_authorization_header() {
    let backend = MockBackend::start().await;
    SpotClient::new(api(&backend, Session::new())).fetch_all().await.unwrap();
    assert_eq!(backend.last_request().authorization, None);
}

#[tokio::test]
async fn test_available_spots_restart_positional_ids() {
    let backend = MockBackend::start().await;
    let spots = SpotClient::new(api(&backend, Session::new())).fetch_available().await.unwrap();
    assert_eq!(spots.iter().map(|s| s.spot_id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(spots[1].spot_number, "B1");
}

#[tokio::test]
async fn test_park_sends_camel_case_body() {
    let backend = MockBackend::start().await;
    SpotClient::new(api(&backend, Session::with_token(TOKEN)))
        .park_vehicle("A1", "KCB 123A")
        .await
        .unwrap();

    let bodies = backend.bodies();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["licensePlate"], "KCB 123A");
    assert_eq!(bodies[0]["spotNumber"], "A1");
}

#[tokio::test]
async fn test_release_failure_uses_status_line() {
    let backend = MockBackend::start().await;
    let err = SpotClient::new(api(&backend, Session::with_token(TOKEN)))
        .release_vehicle("Z9")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "API error: 404 Not Found");
    assert_eq!(backend.last_request().path, "/api/parking/release/Z9");
}

#[tokio::test]
async fn test_find_vehicle_encodes_plate() {
    let backend = MockBackend::start().await;
    let spot = SpotClient::new(api(&backend, Session::new()))
        .find_vehicle("XYZ 123")
        .await
        .unwrap();

    assert_eq!(spot.spot_number, "A2");
    assert_eq!((spot.level, spot.section.as_str()), (2, "B"));
    assert_eq!(backend.last_request().path, "/api/parking/find/XYZ%20123");
}

#[tokio::test]
async fn test_parking_view_refetches_after_park() {
    let backend = MockBackend::start().await;
    let mut view = ParkingView::load(SpotClient::new(api(&backend, Session::with_token(TOKEN)))).await;
    view.set_status_filter(StatusFilter::Occupied);
    assert_eq!(view.available_spots(), 0);

    view.park_vehicle("A1", "NEW 1").await.unwrap();
    let paths: Vec<String> = backend.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/api/parking/spots", "/api/parking/park", "/api/parking/spots"]);
    assert_eq!(view.success(), Some("Vehicle NEW 1 successfully parked in spot A1"));
}

#[tokio::test]
async fn test_reservations_normalize_driver_and_plate() {
    let backend = MockBackend::start().await;
    let reservations = ReservationClient::new(api(&backend, Session::with_token(TOKEN)))
        .fetch_all()
        .await
        .unwrap();

    assert_eq!(reservations.len(), 2);
    let first = &reservations[0];
    assert_eq!(first.driver_id, "424242");
    assert_eq!(first.driver_name, "Driver 42424");
    assert_eq!(first.license_plate, "XYZ123");
    assert_eq!(first.spot_number, "A2");
    assert_eq!(first.spot_id, 3);
    assert_eq!(first.status, ReservationStatus::Active);
    assert_eq!(first.total_price, 12.5);
    assert_eq!(first.created_at, "");
}

#[tokio::test]
async fn test_unauthorized_clears_persisted_session() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join("token"));
    store.save("stale-token").unwrap();

    let session = Session::with_store(store.clone()).unwrap();
    assert!(session.is_authenticated());

    let err = ReservationClient::new(api(&backend, session.clone()))
        .fetch_all()
        .await
        .unwrap_err();

    assert!(err.is_authentication());
    assert_eq!(err.to_string(), "Authentication failed. Please login again.");
    assert!(!session.is_authenticated());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_reservations_view_flags_login_required() {
    let backend = MockBackend::start().await;
    let view = ReservationsView::load(ReservationClient::new(api(&backend, Session::with_token("expired")))).await;

    assert!(view.login_required());
    assert!(view.reservations().is_empty());
}

#[tokio::test]
async fn test_search_forwards_only_non_empty_criteria() {
    let backend = MockBackend::start().await;
    let client = ReservationClient::new(api(&backend, Session::with_token(TOKEN)));

    let criteria = SearchCriteria {
        driver_name: Some("Amina".to_string()),
        license_plate: Some(String::new()),
        status: Some("ACTIVE".to_string()),
        ..Default::default()
    };
    client.search(&criteria).await.unwrap();
    let request = backend.last_request();
    assert_eq!(request.path, "/api/reservations/search");
    assert_eq!(request.query.as_deref(), Some("driverName=Amina&status=ACTIVE"));

    client.search(&SearchCriteria::default()).await.unwrap();
    assert_eq!(backend.last_request().query, None);
}

#[tokio::test]
async fn test_reservations_view_create_failure_keeps_list() {
    let backend = MockBackend::start().await;
    let mut view = ReservationsView::load(ReservationClient::new(api(&backend, Session::with_token(TOKEN)))).await;
    assert_eq!(view.reservations().len(), 2);

    let request = parkdesk::CreateReservation {
        start_time: "2025-06-01T08:00".to_string(),
        end_time: "2025-06-01T09:00".to_string(),
        status: ReservationStatus::Pending,
        spot_id: 99,
        driver_id: 1,
    };
    let err = view.create(&request).await.unwrap_err();

    assert_eq!(err.to_string(), "API error: 409 Conflict");
    assert_eq!(view.reservations().len(), 2);
    assert_eq!(view.error(), Some("API error: 409 Conflict"));
}

#[tokio::test]
async fn test_update_status_and_cancel_paths() {
    let backend = MockBackend::start().await;
    let client = ReservationClient::new(api(&backend, Session::with_token(TOKEN)));

    let updated = client.update_status(2, ReservationStatus::Scheduled).await.unwrap();
    assert_eq!(updated.status, ReservationStatus::Scheduled);
    let request = backend.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("PATCH", "/api/reservations/2/status"));

    client.cancel(2).await.unwrap();
    assert_eq!(backend.last_request().path, "/api/reservations/2/cancel");
}

#[tokio::test]
async fn test_drivers_use_server_message() {
    let backend = MockBackend::start().await;
    let client = DriverClient::new(api(&backend, Session::with_token(TOKEN)));

    let err = client.list().await.unwrap_err();
    assert_eq!(err.to_string(), "Driver store offline");
    assert_eq!(err.status(), Some(500));

    let err = client.get(7).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 404");
}

#[tokio::test]
async fn test_count_active_rejects_unexpected_body() {
    let backend = MockBackend::start().await;

    let count = DriverClient::new(api(&backend, Session::with_token(TOKEN)))
        .count_active()
        .await
        .unwrap();
    assert_eq!(count, 4);

    let err = DriverClient::new(api(&backend, Session::with_token("other")))
        .count_active()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Json { .. }));
}

#[tokio::test]
async fn test_users_forbidden_is_authentication() {
    let backend = MockBackend::start().await;
    let session = Session::with_token(TOKEN);
    let err = UserClient::new(api(&backend, session.clone())).list().await.unwrap_err();

    assert!(matches!(err, Error::Authentication { status: 401 }));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_stores_token_and_logout_clears_it() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join("nested").join("token"));
    let session = Session::with_store(store.clone()).unwrap();
    let auth = AuthClient::new(api(&backend, session.clone()));

    let credential = auth.login("admin", "secret1").await.unwrap();
    assert_eq!(credential.token, TOKEN);
    assert_eq!(store.load().unwrap().as_deref(), Some(TOKEN));
    assert_eq!(session.token().as_deref(), Some(TOKEN));

    auth.logout().await;
    assert!(!session.is_authenticated());
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(backend.last_request().path, "/api/auth/logout");
}

#[tokio::test]
async fn test_login_rejection_is_authentication() {
    let backend = MockBackend::start().await;
    let session = Session::new();
    let err = AuthClient::new(api(&backend, session.clone()))
        .login("admin", "wrong")
        .await
        .unwrap_err();

    assert!(err.is_authentication());
    assert!(!session.is_authenticated());
}
