//! `/cache`, plain resource and `/health` routes exercised through the full router.

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use cerahati::cache::{
    CacheServices, ConnectionMonitor, ConnectionState, MemoryStore, TtlPolicy,
};
use cerahati::infra::http::{AppState, CacheGate, REQUEST_ID_HEADER, build_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use support::{FakeRepo, donor, seeded_repo};

struct Harness {
    router: Router,
    gate: CacheGate,
    repo: Arc<FakeRepo>,
    monitor: ConnectionMonitor,
}

impl Harness {
    fn new(repo: FakeRepo) -> Self {
        let repo = Arc::new(repo);
        let monitor = ConnectionMonitor::new();
        let gate = CacheGate::new();
        let state = AppState {
            cache: gate.clone(),
            monitor: monitor.clone(),
            health: repo.clone(),
            records: repo.clone(),
        };
        Self {
            router: build_router(state),
            gate,
            repo,
            monitor,
        }
    }

    fn ready(repo: FakeRepo) -> Self {
        let harness = Self::new(repo);
        harness.open();
        harness
    }

    fn open(&self) {
        self.monitor.set(ConnectionState::Connected);
        assert!(self.gate.open(CacheServices::new(
            Arc::new(MemoryStore::new()),
            self.repo.clone(),
            TtlPolicy::default(),
        )));
    }

    async fn send(&self, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request should build");
        self.dispatch(request).await
    }

    async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build");
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri).await
    }
}

#[tokio::test]
async fn collection_routes_report_their_source() {
    let harness = Harness::ready(seeded_repo());

    for route in ["users", "bookmark", "doa", "donation", "rumah_yatim"] {
        let uri = format!("/cache/{route}");
        let (status, first) = harness.get(&uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(first["source"], "database", "{uri}");
        assert!(first["data"].is_array(), "{uri}");

        let (_, second) = harness.get(&uri).await;
        assert_eq!(second["source"], "cache", "{uri}");
        assert_eq!(first["data"], second["data"], "{uri}");
    }
}

#[tokio::test]
async fn item_route_returns_the_row() {
    let harness = Harness::ready(seeded_repo());

    let (status, body) = harness.get("/cache/rumah_yatim/10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "database");
    assert_eq!(body["data"]["nama_panti"], "Panti Asuhan Kasih");

    let (_, body) = harness.get("/cache/doa/3").await;
    assert_eq!(body["data"]["id_doa"], 3);
}

#[tokio::test]
async fn missing_items_use_resource_labels() {
    let harness = Harness::ready(seeded_repo());

    let cases = [
        ("/cache/users/999", "User tidak ditemukan"),
        ("/cache/bookmark/999", "bookmark tidak ditemukan"),
        ("/cache/doa/999", "doa tidak ditemukan"),
        ("/cache/donation/999", "donasi tidak ditemukan"),
        ("/cache/rumah_yatim/999", "panti tidak ditemukan"),
        ("/cache/donation/users/2", "donasi tidak ditemukan"),
    ];

    for (uri, message) in cases {
        let (status, body) = harness.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({"error": message}), "{uri}");
    }
}

#[tokio::test]
async fn non_numeric_id_is_rejected_before_any_lookup() {
    let harness = Harness::ready(seeded_repo());

    let (status, _) = harness.get("/cache/users/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(harness.repo.queries(), 0);
}

#[tokio::test]
async fn database_errors_use_legacy_messages() {
    let repo = seeded_repo();
    repo.set_failing(true);
    let harness = Harness::ready(repo);

    let (status, body) = harness.get("/cache/users").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Terjadi kesalahan server"}));

    let (status, body) = harness.get("/cache/users/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Server error"}));

    let (status, body) = harness.get("/cache/leaderboard").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Failed to get leaderboard");
    assert!(body["error"].as_str().is_some_and(|e| e.contains("connection refused")));

    let (status, body) = harness.send(Method::POST, "/cache/leaderboard/refresh").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to refresh leaderboard cache");
}

#[tokio::test]
async fn leaderboard_envelopes() {
    let repo = FakeRepo::new();
    repo.set_donors(vec![donor(1, "A", 5_000_000, 5), donor(3, "C", 0, 0)]);
    let harness = Harness::ready(repo);

    let (status, body) = harness.get("/cache/leaderboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body.get("message").is_none());
    assert_eq!(body["data"][0]["rank"], 1);
    assert_eq!(body["data"][0]["total_donation"], 5_000_000);
    assert_eq!(body["data"][1]["total_transactions"], 0);

    let (status, body) = harness.send(Method::POST, "/cache/leaderboard/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Leaderboard cache refreshed successfully");
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn refresh_requires_post() {
    let harness = Harness::ready(FakeRepo::new());

    let (status, _) = harness.get("/cache/leaderboard/refresh").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn cache_routes_are_hidden_until_the_store_connects() {
    let harness = Harness::new(seeded_repo());

    let (status, _) = harness.get("/cache/users").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = harness.send(Method::POST, "/cache/leaderboard/refresh").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(harness.repo.queries(), 0);

    let (status, body) = harness.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cache"], "disconnected");
    assert_eq!(body["cache_routes"], false);

    harness.open();

    let (status, body) = harness.get("/cache/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "database");

    let (_, body) = harness.get("/health").await;
    assert_eq!(body["cache"], "connected");
    assert_eq!(body["cache_routes"], true);
}

#[tokio::test]
async fn health_reports_database_outage() {
    let repo = FakeRepo::new();
    repo.set_failing(true);
    let harness = Harness::ready(repo);

    let (status, body) = harness.get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "down");
}

#[tokio::test]
async fn gate_opens_only_once() {
    let harness = Harness::ready(FakeRepo::new());

    assert!(!harness.gate.open(CacheServices::new(
        Arc::new(MemoryStore::new()),
        harness.repo.clone(),
        TtlPolicy::default(),
    )));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let harness = Harness::ready(seeded_repo());

    let generated = harness
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/users")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");
    let id = generated
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("request id header")
        .to_str()
        .expect("ascii header");
    assert_eq!(id.len(), 36);

    let echoed = harness
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/users/1")
                .header(REQUEST_ID_HEADER, "trace-abc")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");
    assert_eq!(
        echoed.headers().get(REQUEST_ID_HEADER).map(|v| v.as_bytes()),
        Some(&b"trace-abc"[..])
    );
}

#[tokio::test(start_paused = true)]
async fn updates_leave_cached_items_stale_until_expiry() {
    let harness = Harness::ready(seeded_repo());

    let (_, body) = harness.get("/cache/users/1").await;
    assert_eq!(body["source"], "database");
    assert_eq!(body["data"]["name"], "Andi");

    let (status, body) = harness
        .send_json(Method::PUT, "/users/1", json!({"name": "Andi Baru"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "User updated successfully"}));

    let (_, body) = harness.get("/cache/users/1").await;
    assert_eq!(body["source"], "cache");
    assert_eq!(body["data"]["name"], "Andi");

    let (status, body) = harness.get("/users/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Andi Baru");

    tokio::time::advance(Duration::from_secs(299)).await;
    let (_, body) = harness.get("/cache/users/1").await;
    assert_eq!(body["source"], "cache");
    assert_eq!(body["data"]["name"], "Andi");

    tokio::time::advance(Duration::from_secs(2)).await;
    let (_, body) = harness.get("/cache/users/1").await;
    assert_eq!(body["source"], "database");
    assert_eq!(body["data"]["name"], "Andi Baru");
}

#[tokio::test(start_paused = true)]
async fn created_rows_stay_out_of_a_cached_collection() {
    let harness = Harness::ready(seeded_repo());

    let (_, body) = harness.get("/cache/doa").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, body) = harness
        .send_json(Method::POST, "/doa", json!({"nama_doa": "Doa sebelum tidur"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Doa berhasil ditambahkan");
    assert_eq!(body["id"], 4);

    let (_, body) = harness.get("/cache/doa").await;
    assert_eq!(body["source"], "cache");
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = harness.get("/doa").await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    tokio::time::advance(Duration::from_secs(301)).await;
    let (_, body) = harness.get("/cache/doa").await;
    assert_eq!(body["source"], "database");
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn deletes_report_missing_rows() {
    let harness = Harness::ready(seeded_repo());

    let (status, body) = harness.send(Method::DELETE, "/bookmark/5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Bookmark deleted successfully"}));

    let (status, body) = harness.send(Method::DELETE, "/bookmark/5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Bookmark not found"}));

    let (status, body) = harness.get("/users/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "User not found"}));

    let (status, body) = harness
        .send_json(Method::PUT, "/doa/999", json!({"arti": "-"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Doa tidak ditemukan"}));
}

#[tokio::test]
async fn malformed_payloads_never_reach_the_database() {
    let harness = Harness::ready(seeded_repo());

    let (status, body) = harness
        .send_json(Method::PUT, "/doa/3", json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Tidak ada data untuk diperbarui"}));

    let (status, body) = harness
        .send_json(Method::POST, "/donation", json!({"amount": 5, "note": "x"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("`note`")));

    let (status, _) = harness
        .send_json(Method::PUT, "/users/1", json!({"id": 7}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(harness.repo.write_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn resource_routes_work_before_the_cache_connects() {
    let harness = Harness::new(seeded_repo());

    let (status, body) = harness.get("/rumah_yatim").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["nama_panti"], "Panti Asuhan Kasih");

    let (status, body) = harness
        .send_json(
            Method::POST,
            "/donation",
            json!({"user_id": 2, "rumah_yatim_id": 10, "amount": 10000}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "Donation added successfully", "id": 22}));

    let (status, _) = harness.get("/cache/donation").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resource_database_errors_surface_as_server_errors() {
    let repo = seeded_repo();
    repo.set_failing(true);
    let harness = Harness::ready(repo);

    let (status, body) = harness.get("/users").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("connection refused")));
}
