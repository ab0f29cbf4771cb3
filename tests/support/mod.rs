//! In-process stand-in for the parking backend.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

pub const TOKEN: &str = "good-token";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct MockState {
    requests: Mutex<Vec<Recorded>>,
    bodies: Mutex<Vec<Value>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let api = Router::new()
            .route("/parking/spots", get(spots))
            .route("/parking/spots/available", get(available_spots))
            .route("/parking/park", post(park))
            .route("/parking/release/:spot", post(release))
            .route("/parking/find/:plate", get(find))
            .route("/reservations", get(reservations).post(create_reservation))
            .route("/reservations/search", get(reservations))
            .route("/reservations/:id/status", patch(update_status))
            .route("/reservations/:id/cancel", post(cancel))
            .route("/drivers", get(|| async {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "Driver store offline" })))
            }))
            .route("/drivers/count", get(driver_count))
            .route("/drivers/:id", get(|| async { StatusCode::NOT_FOUND }))
            .route("/users", get(|| async { StatusCode::UNAUTHORIZED }))
            .route("/auth/login", post(login))
            .route("/auth/logout", post(|| async { StatusCode::OK }))
            .with_state(state.clone());

        let app = Router::new()
            .nest("/api", api)
            .layer(middleware::from_fn_with_state(state.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.state.bodies.lock().unwrap().clone()
    }
}

async fn record(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    let recorded = Recorded {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    state.requests.lock().unwrap().push(recorded);
    next.run(request).await
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", TOKEN);
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(expected.as_str())
}

pub fn spot_list() -> Value {
    json!([
        { "spotNumber": "A1", "status": "AVAILABLE", "currentVehicle": null, "location": "Level 1 - Section A" },
        { "spotNumber": "A2", "status": "OCCUPIED", "currentVehicle": "XYZ123", "location": "level 2 - section b" },
        { "spotNumber": "B1", "status": "AVAILABLE", "location": "Basement" }
    ])
}

async fn spots() -> Json<Value> {
    Json(spot_list())
}

async fn available_spots() -> Json<Value> {
    Json(json!([
        { "spotNumber": "A1", "status": "AVAILABLE", "location": "Level 1 - Section A" },
        { "spotNumber": "B1", "status": "AVAILABLE", "location": "Basement" }
    ]))
}

async fn park(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> &'static str {
    state.bodies.lock().unwrap().push(body);
    "Vehicle parked successfully"
}

async fn release(Path(spot): Path<String>) -> Response {
    if spot == "Z9" {
        StatusCode::NOT_FOUND.into_response()
    } else {
        "Vehicle released".into_response()
    }
}

async fn find(Path(plate): Path<String>) -> Response {
    if plate == "XYZ 123" {
        Json(json!({ "spotNumber": "A2", "status": "OCCUPIED", "currentVehicle": "XYZ 123", "location": "Level 2 - Section B" }))
            .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

// A bare number for the real token, an object otherwise.
async fn driver_count(headers: HeaderMap) -> Json<Value> {
    if authorized(&headers) {
        Json(json!(4))
    } else {
        Json(json!({ "active": 4 }))
    }
}

fn reservation(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "startTime": "2025-05-01T09:00:00",
        "endTime": "2025-05-01T11:00:00",
        "status": status,
        "spot": { "spotId": 3, "spotNumber": "A2", "status": "OCCUPIED", "currentVehicle": "XYZ123" },
        "driverId": { "driverId": 424242, "name": "Amina" },
        "totalPrice": 12.5,
        "durationInHours": 2.0
    })
}

async fn reservations(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([reservation(1, "ACTIVE"), reservation(2, "PENDING")])).into_response()
}

async fn create_reservation(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if body["spotId"] == json!(99) {
        return StatusCode::CONFLICT.into_response();
    }
    (StatusCode::CREATED, Json(reservation(3, "PENDING"))).into_response()
}

async fn update_status(Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    let status = body["status"].as_str().unwrap_or("PENDING").to_string();
    Json(reservation(id, &status))
}

async fn cancel(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == json!("admin") && body["password"] == json!("secret1") {
        Json(json!({ "token": TOKEN, "username": "admin", "role": "ADMIN" })).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid username or password" }))).into_response()
    }
}
