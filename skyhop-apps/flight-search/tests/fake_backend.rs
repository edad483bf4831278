//! In-process stand-in for the search backend, served by axum on a free local port.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake backend answers to every `POST /api/search`.
#[derive(Clone, Debug)]
pub enum Reply {
    Json(StatusCode, Value),
    Raw(StatusCode, &'static str),
    Delayed(Duration, Value),
}

pub struct FakeBackend {
    pub base_url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl FakeBackend {
    /// Request bodies received so far, in arrival order.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

struct BackendState {
    reply: Reply,
    received: Arc<Mutex<Vec<Value>>>,
}

pub async fn spawn(reply: Reply) -> FakeBackend {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(BackendState {
        reply,
        received: Arc::clone(&received),
    });
    let app = Router::new()
        .route("/api/search", post(handle_search))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeBackend {
        base_url: format!("http://{}", addr),
        received,
    }
}

async fn handle_search(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> Response {
    state.received.lock().unwrap().push(body);
    match &state.reply {
        Reply::Json(status, value) => (*status, Json(value.clone())).into_response(),
        Reply::Raw(status, text) => (*status, *text).into_response(),
        Reply::Delayed(delay, value) => {
            tokio::time::sleep(*delay).await;
            (StatusCode::OK, Json(value.clone())).into_response()
        }
    }
}

/// ICN → NRT → ICN, 5 nights, 36,000 KRW cheaper than the direct fare.
pub fn sample_response() -> Value {
    json!({
        "total_cost": 164000,
        "segments": [
            {
                "from_airport": "ICN",
                "to_airport": "NRT",
                "date": "2025-01-15",
                "price": 80000,
                "provider": "Amadeus",
                "flight_number": "KE703",
                "departure_time": "09:00",
                "arrival_time": "11:30"
            },
            {
                "from_airport": "NRT",
                "to_airport": "ICN",
                "date": "2025-01-20",
                "price": 84000,
                "provider": "Peach",
                "flight_number": ""
            }
        ],
        "route_pattern": "ICN → NRT → ICN",
        "cheaper_than_direct": true,
        "direct_cost": 200000
    })
}

/// Port with nothing listening on it.
pub fn get_free_port() -> u16 {
    use std::net::TcpListener;
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
