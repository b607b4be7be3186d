//! End-to-end behaviour of the API client against a local stub server.

use api_client::testing::{StubResponse, StubServer};
use api_client::{
    ApiClient, AuthFailureHandler, FailureKind, Method, RequestFailure, RequestOptions,
};
use inventory_types::User;
use parking_lot::Mutex;
use serde_json::json;
use session_store::{MemoryStorage, SessionStore};
use std::sync::Arc;
use std::time::Duration;

/// Records every failure it is handed and clears the store, like the
/// session manager does.
struct RecordingHandler {
    store: Arc<SessionStore>,
    seen: Mutex<Vec<(RequestFailure, Option<String>)>>,
}

impl AuthFailureHandler for RecordingHandler {
    fn on_auth_failure(&self, failure: &RequestFailure, sent_with: Option<&str>) {
        self.store.clear().unwrap();
        self.seen
            .lock()
            .push((failure.clone(), sent_with.map(str::to_string)));
    }
}

fn user() -> User {
    serde_json::from_value(json!({ "id": 1, "email": "a@x.com", "role": "admin" })).unwrap()
}

fn setup(base_url: &str) -> (ApiClient, Arc<SessionStore>, Arc<RecordingHandler>) {
    let store = Arc::new(SessionStore::new(Box::new(MemoryStorage::new())));
    let handler = Arc::new(RecordingHandler {
        store: store.clone(),
        seen: Mutex::new(Vec::new()),
    });
    let client = ApiClient::new(
        base_url,
        store.clone(),
        handler.clone(),
        Duration::from_secs(5),
    )
    .unwrap();
    (client, store, handler)
}

#[tokio::test]
async fn test_bearer_is_read_from_store_on_every_request() {
    let server = StubServer::start().await.unwrap();
    server.respond_json("GET", "/assets", 200, json!([]));
    let (client, store, _) = setup(&server.base_url());

    client.get("/assets").await.unwrap();
    store.save("abc", &user()).unwrap();
    client.get("/assets").await.unwrap();
    store.save("def", &user()).unwrap();
    client.get("/assets").await.unwrap();

    let requests = server.requests_to("GET", "/assets");
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].header("authorization"), None);
    assert_eq!(requests[1].header("authorization"), Some("Bearer abc"));
    assert_eq!(requests[2].header("authorization"), Some("Bearer def"));
    for request in &requests {
        assert_eq!(request.header("accept"), Some("application/json"));
    }
}

#[tokio::test]
async fn test_json_body_and_extra_headers_are_sent() {
    let server = StubServer::start().await.unwrap();
    server.respond_json("POST", "/transfers", 201, json!({ "id": 10 }));
    let (client, _, _) = setup(&server.base_url());

    let options = RequestOptions {
        skip_auth: false,
        headers: vec![("X-Lab".to_string(), "3".to_string())],
    };
    let response = client
        .send(
            Method::POST,
            "transfers",
            Some(&json!({ "asset_id": 4 })),
            options,
        )
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body["id"], 10);

    let request = &server.requests_to("POST", "/transfers")[0];
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("x-lab"), Some("3"));
    assert_eq!(request.json_body(), Some(json!({ "asset_id": 4 })));
}

#[tokio::test]
async fn test_skip_auth_omits_bearer() {
    let server = StubServer::start().await.unwrap();
    server.respond_json("POST", "/login", 200, json!({ "token": "t" }));
    let (client, store, _) = setup(&server.base_url());
    store.save("stale", &user()).unwrap();

    client
        .send(
            Method::POST,
            "/login",
            Some(&json!({ "email": "a@x.com", "password": "pw" })),
            RequestOptions::without_auth(),
        )
        .await
        .unwrap();

    let request = &server.requests_to("POST", "/login")[0];
    assert_eq!(request.header("authorization"), None);
}

#[tokio::test]
async fn test_unauthorized_runs_handler_before_returning() {
    let server = StubServer::start().await.unwrap();
    server.respond_json("GET", "/reports", 401, json!({ "message": "Unauthenticated." }));
    let (client, store, handler) = setup(&server.base_url());
    store.save("abc", &user()).unwrap();

    let failure = client.get("/reports").await.unwrap_err();

    assert_eq!(failure.kind, FailureKind::Auth);
    assert_eq!(failure.status, Some(401));
    assert_eq!(failure.message, "Unauthenticated.");
    // The handler already ran by the time the caller sees the failure.
    let seen = handler.seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1.as_deref(), Some("abc"));
    assert!(store.load().unwrap().is_empty());
}

#[tokio::test]
async fn test_unauthorized_with_skip_auth_still_runs_handler() {
    let server = StubServer::start().await.unwrap();
    server.respond_json("POST", "/login", 401, json!({ "message": "nope" }));
    let (client, store, handler) = setup(&server.base_url());
    store.save("abc", &user()).unwrap();

    let failure = client
        .send(Method::POST, "/login", None, RequestOptions::without_auth())
        .await
        .unwrap_err();

    assert!(failure.is_auth_failure());
    let seen = handler.seen.lock();
    assert_eq!(seen.len(), 1);
    // The bearer was withheld, so the handler is told nothing was sent.
    assert_eq!(seen[0].1, None);
}

#[tokio::test]
async fn test_validation_message_is_surfaced_without_handler() {
    let server = StubServer::start().await.unwrap();
    server.respond_json(
        "POST",
        "/login",
        422,
        json!({ "message": "Invalid credentials" }),
    );
    let (client, store, handler) = setup(&server.base_url());
    store.save("abc", &user()).unwrap();

    let failure = client.post("/login", &json!({})).await.unwrap_err();

    assert_eq!(failure.kind, FailureKind::Validation);
    assert_eq!(failure.status, Some(422));
    assert_eq!(failure.to_string(), "Invalid credentials");
    assert!(handler.seen.lock().is_empty());
    assert_eq!(store.token().unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_server_error_without_message_uses_status_text() {
    let server = StubServer::start().await.unwrap();
    server.respond("GET", "/me", StubResponse::raw(500, "<html>boom</html>"));
    let (client, _, _) = setup(&server.base_url());

    let failure = client.get("/me").await.unwrap_err();

    assert_eq!(failure.kind, FailureKind::Http);
    assert_eq!(failure.message, "HTTP 500 Internal Server Error");
}

#[tokio::test]
async fn test_malformed_json_is_a_decode_failure() {
    let server = StubServer::start().await.unwrap();
    server.respond("GET", "/me", StubResponse::raw(200, "{\"id\": 1"));
    let (client, _, handler) = setup(&server.base_url());

    let failure = client.get("/me").await.unwrap_err();

    assert_eq!(failure.kind, FailureKind::Decode);
    assert_eq!(failure.status, Some(200));
    assert!(handler.seen.lock().is_empty());
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let server = StubServer::start().await.unwrap();
    server.respond("POST", "/logout", StubResponse::raw(204, ""));
    let (client, _, _) = setup(&server.base_url());

    let response = client.post("/logout", &json!({})).await.unwrap();
    assert_eq!(response.status, 204);
    assert!(response.body.is_null());
}

#[tokio::test]
async fn test_typed_decode_through_send_json() {
    let server = StubServer::start().await.unwrap();
    server.respond_json(
        "GET",
        "/me",
        200,
        json!({ "id": 5, "email": "u@x.com", "role": "user", "lab_id": "7" }),
    );
    let (client, _, _) = setup(&server.base_url());

    let me: User = client
        .send_json(Method::GET, "/me", None, RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(me.id, 5);
    assert_eq!(me.current_lab_id(), Some(7));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_failure() {
    // Bind and drop to get a port with nothing listening.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (client, _, handler) = setup(&format!("http://127.0.0.1:{}/api", port));

    let failure = client.get("/me").await.unwrap_err();

    assert_eq!(failure.kind, FailureKind::Transport);
    assert_eq!(failure.status, None);
    assert!(handler.seen.lock().is_empty());
}

#[tokio::test]
async fn test_slow_response_times_out_as_transport_failure() {
    let server = StubServer::start().await.unwrap();
    server.respond(
        "GET",
        "/me",
        StubResponse::json(200, json!({ "id": 1 })).delayed(Duration::from_secs(5)),
    );
    let store = Arc::new(SessionStore::new(Box::new(MemoryStorage::new())));
    let handler = Arc::new(RecordingHandler {
        store: store.clone(),
        seen: Mutex::new(Vec::new()),
    });
    let client = ApiClient::new(
        server.base_url(),
        store,
        handler,
        Duration::from_millis(200),
    )
    .unwrap();

    let failure = client.get("/me").await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Transport);
}
