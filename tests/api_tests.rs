// tests/api_tests.rs

use email_html::{config::Config, routes, state::AppState};
use serde_json::{Value, json};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    spawn_app_with(Config {
        rust_log: "error".to_string(),
        ..Config::default()
    })
    .await
}

async fn spawn_app_with(config: Config) -> String {
    let state = AppState { config };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

#[tokio::test]
async fn health_check_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn normalize_cleans_quill_html() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/html/normalize", address))
        .json(&json!({
            "html": "<div class=\"ql-editor\"><p>Hi</p><p> </p><p>&nbsp;</p><p>Bye</p><br><br></div>"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["html"], "<p>Hi</p><p>Bye</p><br>");
}

#[tokio::test]
async fn normalize_keeps_null_and_empty_apart() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let null_body: Value = client
        .post(&format!("{}/api/html/normalize", address))
        .json(&json!({ "html": null }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert!(null_body["html"].is_null());

    let empty_body: Value = client
        .post(&format!("{}/api/html/normalize", address))
        .json(&json!({ "html": "" }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(empty_body["html"], "");
}

#[tokio::test]
async fn normalize_can_sanitize_first() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(&format!("{}/api/html/normalize", address))
        .json(&json!({
            "html": "<div class=\"ql-editor\"><p>Hi<script>alert(1)</script></p></div>",
            "sanitize": true
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert_eq!(body["html"], "<p>Hi</p>");
}

#[tokio::test]
async fn images_are_listed_and_classified() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let html = concat!(
        "<p><img src=\"https://cdn.example.com/a.png\"></p>",
        "<p><img src='data:image/png;base64,AAAA'></p>",
        "<p><img src=\"cid:logo\"><img src=\"/static/b.png\"></p>",
        "<p><img src=\"https://cdn.example.com/a.png\"></p>",
    );

    let response = client
        .post(&format!("{}/api/html/images", address))
        .json(&json!({ "html": html }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["images"],
        json!([
            { "src": "https://cdn.example.com/a.png", "kind": "remote" },
            { "src": "data:image/png;base64,AAAA", "kind": "inline" },
            { "src": "cid:logo", "kind": "attachment" },
            { "src": "/static/b.png", "kind": "relative" },
            { "src": "https://cdn.example.com/a.png", "kind": "remote" },
        ])
    );
}

#[tokio::test]
async fn images_of_null_document_is_empty() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(&format!("{}/api/html/images", address))
        .json(&json!({ "html": null }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert_eq!(body["images"], json!([]));
}

#[tokio::test]
async fn analyze_reports_counts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(&format!("{}/api/html/analyze", address))
        .json(&json!({
            "html": "<p>Hello</p><p><br></p><p>&nbsp;</p><p>World<br><br><br></p>"
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert_eq!(
        body,
        json!({
            "paragraph_count": 4,
            "empty_paragraph_count": 2,
            "break_run_count": 1
        })
    );
}

#[tokio::test]
async fn prepare_email_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/email/prepare", address))
        .json(&json!({
            "subject": "  Monthly update ",
            "html": "<div class=\"ql-editor\"><p class=\"ql-align-center\">  Hello  </p><p><br></p><p><img src=\"cid:banner\"></p></div>"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["subject"], "Monthly update");
    assert_eq!(body["html"], "<p>Hello</p><p><img src=\"cid:banner\"></p>");
    assert_eq!(body["images"], json!([{ "src": "cid:banner", "kind": "attachment" }]));
    assert_eq!(body["cleaned"]["paragraph_count"], 3);
    assert_eq!(body["cleaned"]["empty_paragraph_count"], 1);
}

#[tokio::test]
async fn prepare_email_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Blank subject
    let response = client
        .post(&format!("{}/api/email/prepare", address))
        .json(&json!({ "subject": "   ", "html": "<p>Hi</p>" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    // Header injection attempt
    let response = client
        .post(&format!("{}/api/email/prepare", address))
        .json(&json!({ "subject": "Hi\r\nBcc: someone@example.com", "html": "<p>Hi</p>" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    // Body that cleans down to nothing
    let response = client
        .post(&format!("{}/api/email/prepare", address))
        .json(&json!({ "subject": "Hi", "html": "<p>&nbsp;</p><p><br></p>" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let address = spawn_app_with(Config {
        rust_log: "error".to_string(),
        max_body_bytes: 1024,
        ..Config::default()
    })
    .await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/html/normalize", address))
        .json(&json!({ "html": "<p>x</p>".repeat(1000) }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 413);
}
