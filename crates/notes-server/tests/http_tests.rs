//! End-to-end tests for the note HTTP surface.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use notes_server::config::Config;
use notes_server::note_id::NoteId;
use notes_server::notes::view::PROTECTED_MESSAGE;
use notes_server::{AppState, create_router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestServer {
    router: Router,
    dir: TempDir,
}

async fn test_server() -> TestServer {
    let dir = TempDir::new().unwrap();
    let config = Config::new("/notes", dir.path().join("data")).unwrap();
    let state = AppState::new(config).await.unwrap();
    TestServer {
        router: create_router(Arc::new(state)),
        dir,
    }
}

impl TestServer {
    fn data_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("data")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body_bytes.to_vec()).unwrap())
    }

    /// POST a JSON body and parse the JSON reply.
    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        let json = serde_json::from_str(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }
}

fn location(headers: &axum::http::HeaderMap) -> &str {
    headers[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_root_redirects_to_base_path() {
    let server = test_server().await;

    let (status, headers, _) = server.get("/").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location(&headers), "/notes");
}

#[tokio::test]
async fn test_base_path_redirects_to_new_note() {
    let server = test_server().await;

    for uri in ["/notes", "/notes/"] {
        let (status, headers, _) = server.get(uri).await;
        assert_eq!(status, StatusCode::FOUND);
        let id = location(&headers).strip_prefix("/notes/").unwrap();
        assert_eq!(id.len(), 5);
        assert!(NoteId::parse(id).is_ok());
    }
}

#[tokio::test]
async fn test_invalid_id_redirects() {
    let server = test_server().await;
    let long = format!("/notes/{}", "a".repeat(65));

    for uri in ["/notes/bad%20id", "/notes/a.b", long.as_str()] {
        let (status, headers, _) = server.get(uri).await;
        assert_eq!(status, StatusCode::FOUND, "{uri}");
        assert!(location(&headers).starts_with("/notes/"));
    }

    let (status, _) = server.post_json("/notes/a.b", json!({"text": "x"})).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(std::fs::read_dir(server.data_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_write_then_read_raw() {
    let server = test_server().await;

    let (status, body) = server.post_json("/notes/abcde", json!({"text": "hello"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, headers, body) = server.get("/notes/abcde?raw").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    assert_eq!(body, "hello");
}

#[tokio::test]
async fn test_missing_note_raw_is_not_found() {
    let server = test_server().await;

    let (status, _, body) = server.get("/notes/fresh?raw").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_empty_text_deletes_content() {
    let server = test_server().await;

    server.post_json("/notes/abcde", json!({"text": "hello"})).await;
    let (status, body) = server.post_json("/notes/abcde", json!({"text": ""})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    assert!(!server.data_dir().join("abcde").exists());
    let (status, _, _) = server.get("/notes/abcde?raw").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_curl_user_agent_gets_raw_text() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"text": "plain"})).await;

    let request = Request::builder()
        .uri("/notes/abcde")
        .header(header::USER_AGENT, "curl/8.5.0")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "plain");
}

#[tokio::test]
async fn test_form_encoded_update() {
    let server = test_server().await;

    let request = Request::builder()
        .method("POST")
        .uri("/notes/abcde")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("text=from+a+form"))
        .unwrap();
    let (status, _, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"success": true}));

    let (_, _, body) = server.get("/notes/abcde?raw").await;
    assert_eq!(body, "from a form");
}

#[tokio::test]
async fn test_password_blocks_raw_reads() {
    let server = test_server().await;

    server.post_json("/notes/abcde", json!({"text": "secret"})).await;
    let (status, body) = server.post_json("/notes/abcde", json!({"password": "p1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _, body) = server.get("/notes/abcde?raw").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, PROTECTED_MESSAGE);
    assert!(!body.contains("secret"));
}

#[tokio::test]
async fn test_password_persists_hash_record() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"password": "p1"})).await;

    let raw = std::fs::read_to_string(server.data_dir().join("abcde.meta")).unwrap();
    let meta: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(meta["hasPassword"], true);
    let (salt, hash) = meta["passwordHash"].as_str().unwrap().split_once('$').unwrap();
    assert_eq!(salt.len(), 20);
    assert_eq!(hash.len(), 1024);
}

#[tokio::test]
async fn test_verify_password() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"password": "p1"})).await;

    let (status, body) = server
        .post_json("/notes/abcde", json!({"password": "wrong", "action": "verifyPassword"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "reason": "incorrect password"}));

    let (status, body) = server
        .post_json("/notes/abcde", json!({"password": "p1", "action": "verifyPassword"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn test_protected_update_requires_password() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"password": "p1"})).await;

    let (status, body) = server.post_json("/notes/abcde", json!({"text": "new"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "reason": "password required"}));
    assert!(!server.data_dir().join("abcde").exists());
}

#[tokio::test]
async fn test_verify_only_does_not_touch_content() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"text": "keep"})).await;
    server.post_json("/notes/abcde", json!({"password": "p1"})).await;

    let (status, _) = server
        .post_json(
            "/notes/abcde",
            json!({"password": "p1", "action": "verifyPassword", "text": ""}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let content = std::fs::read_to_string(server.data_dir().join("abcde")).unwrap();
    assert_eq!(content, "keep");
}

#[tokio::test]
async fn test_verified_editor_can_save() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"password": "p1"})).await;

    let (status, body) = server
        .post_json("/notes/abcde", json!({"text": "edited", "passwordVerified": true}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let content = std::fs::read_to_string(server.data_dir().join("abcde")).unwrap();
    assert_eq!(content, "edited");
}

#[tokio::test]
async fn test_clear_password_reopens_raw_access() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"text": "hello"})).await;
    server.post_json("/notes/abcde", json!({"password": "p1"})).await;

    let (status, body) = server
        .post_json(
            "/notes/abcde",
            json!({"clearPassword": "true", "passwordVerified": true}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _, body) = server.get("/notes/abcde?raw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello");

    let raw = std::fs::read_to_string(server.data_dir().join("abcde.meta")).unwrap();
    assert_eq!(raw, r#"{"hasPassword":false}"#);
}

#[tokio::test]
async fn test_change_password_with_current_password() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"password": "p1"})).await;
    server
        .post_json("/notes/abcde", json!({"password": "p2", "passwordVerified": true}))
        .await;

    let (status, _) = server
        .post_json("/notes/abcde", json!({"password": "p1", "action": "verifyPassword"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .post_json("/notes/abcde", json!({"password": "p2", "action": "verifyPassword"}))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_corrupt_metadata_is_treated_as_unprotected() {
    let server = test_server().await;
    std::fs::write(server.data_dir().join("abcde"), "visible").unwrap();
    std::fs::write(server.data_dir().join("abcde.meta"), "not json").unwrap();

    let (status, _, body) = server.get("/notes/abcde?raw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "visible");
}

#[tokio::test]
async fn test_malformed_hash_record_is_server_error() {
    let server = test_server().await;
    std::fs::write(
        server.data_dir().join("abcde.meta"),
        r#"{"hasPassword":true,"passwordHash":"nodollar"}"#,
    )
    .unwrap();

    let (status, body) = server
        .post_json("/notes/abcde", json!({"password": "p1", "action": "verifyPassword"}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false}));
}

#[tokio::test]
async fn test_editor_page() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"text": "a < b"})).await;

    let (status, headers, body) = server.get("/notes/abcde").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    assert!(body.contains("a &lt; b"));
    assert!(body.contains(r#"const noteName = "abcde";"#));
}

#[tokio::test]
async fn test_editor_page_for_protected_note_still_embeds_content() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"text": "hidden"})).await;
    server.post_json("/notes/abcde", json!({"password": "p1"})).await;

    let (status, _, body) = server.get("/notes/abcde").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("id=\"password-protection\""));
    assert!(body.contains(r#"let content = "hidden";"#));
    assert!(body.contains("let passwordVerified = false;"));
}

#[tokio::test]
async fn test_post_without_body_is_a_no_op() {
    let server = test_server().await;

    let request = Request::builder()
        .method("POST")
        .uri("/notes/abcde")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"success": true}));
    assert_eq!(std::fs::read_dir(server.data_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_clear_password_only_accepts_true_string() {
    let server = test_server().await;
    server.post_json("/notes/abcde", json!({"text": "hello"})).await;
    server.post_json("/notes/abcde", json!({"password": "p1"})).await;

    for value in [json!(true), json!(1), json!("1"), json!("yes")] {
        let (status, body) = server
            .post_json(
                "/notes/abcde",
                json!({"clearPassword": value, "passwordVerified": true}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _, _) = server.get("/notes/abcde?raw").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "clearPassword {value} removed the password");
    }
}

#[tokio::test]
async fn test_storage_failures_are_server_errors() {
    let server = test_server().await;
    // A directory where the content file belongs makes every content read and write fail.
    std::fs::create_dir(server.data_dir().join("abcde")).unwrap();

    let (status, _, body) = server.get("/notes/abcde?raw").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());

    let (status, _, body) = server.get("/notes/abcde").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());

    let (status, body) = server.post_json("/notes/abcde", json!({"text": "x"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false}));
}
