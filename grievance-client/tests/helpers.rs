//! Stub authentication endpoint for integration tests
//!
//! A real axum server on an OS-assigned port, answering the login and
//! registration contract the client integrates against.

#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use grievance_client::{AuthFlow, HistoryNavigator, HttpAuthApi, SessionStore};
use grievance_core::{ApiConfig, ClientConfig, GuardMode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use tokio::net::TcpListener;

// Initialize tracing only once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let level = if std::env::var("TEST_LOG").is_ok() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
});

pub const VALID_REGISTER_NO: &str = "R1";
pub const VALID_PASSWORD: &str = "pw";

/// Running stub server
pub struct StubApi {
    pub address: String,
    pub requests: Arc<AtomicUsize>,
}

impl StubApi {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.address.clone(),
            ..ClientConfig::default().api
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// A flow wired to this stub with a fresh in-memory tab
    pub fn flow(&self) -> (AuthFlow, SessionStore, Arc<HistoryNavigator>) {
        let store = SessionStore::in_memory();
        let navigator = Arc::new(HistoryNavigator::starting_at("/"));
        let api = HttpAuthApi::new(&self.api_config()).expect("valid stub address");
        let mut config = ClientConfig::default();
        config.shell.guard_mode = GuardMode::Enforced;
        let flow = AuthFlow::new(
            Arc::new(api),
            store.clone(),
            navigator.clone(),
            &config.shell,
        );
        (flow, store, navigator)
    }
}

async fn login(
    State(requests): State<Arc<AtomicUsize>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    requests.fetch_add(1, Ordering::SeqCst);

    match (body["registerNo"].as_str(), body["password"].as_str()) {
        (Some(VALID_REGISTER_NO), Some(VALID_PASSWORD)) => (
            StatusCode::OK,
            Json(json!({
                "message": "Login successful",
                "user": {
                    "name": "A",
                    "phone": "1",
                    "role": "admin",
                    "registerNo": "R1"
                }
            })),
        ),
        (Some("STAFF1"), Some(VALID_PASSWORD)) => (
            StatusCode::OK,
            Json(json!({
                "user": {"name": "S", "phone": "2", "role": "staff", "registerNo": "STAFF1"}
            })),
        ),
        (Some("EMPTY"), _) => (StatusCode::OK, Json(json!({"message": "ok"}))),
        (Some("BROKEN"), _) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid register number or password"})),
        ),
    }
}

async fn register(
    State(requests): State<Arc<AtomicUsize>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    requests.fetch_add(1, Ordering::SeqCst);

    let complete = [
        "registerNo",
        "name",
        "email",
        "phone",
        "department",
        "password",
        "role",
    ]
    .iter()
    .all(|key| body[key].as_str().is_some());

    if !complete {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Missing fields"})),
        );
    }

    if body["registerNo"] == "DUP" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "User already exists"})),
        );
    }

    (
        StatusCode::CREATED,
        Json(json!({"message": "Registration successful"})),
    )
}

/// Start the stub on 127.0.0.1 with an OS-assigned port
pub async fn spawn_stub() -> StubApi {
    LazyLock::force(&TRACING);

    let requests = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .with_state(Arc::clone(&requests));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubApi {
        address: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// An address nothing is listening on
pub async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
