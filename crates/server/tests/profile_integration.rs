//! Profile API integration tests against a spawned server.
//!
//! No collector endpoints are configured in these tests, so every run
//! completes with an empty, fully-annotated profile. That is exactly the
//! degraded-but-done behavior the API contract promises.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tempfile::{NamedTempFile, TempDir};
use tokio::time::sleep;

fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

struct TestServer {
    port: u16,
    child: tokio::process::Child,
    _config_file: NamedTempFile,
    _export_dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let port = get_available_port();
        let export_dir = TempDir::new().unwrap();
        let config_content = format!(
            r#"
[server]
host = "127.0.0.1"
port = {}

[export]
output_dir = "{}"
"#,
            port,
            export_dir.path().display()
        );

        let mut config_file = NamedTempFile::new().unwrap();
        config_file.write_all(config_content.as_bytes()).unwrap();
        config_file.flush().unwrap();

        let child = tokio::process::Command::new(env!("CARGO_BIN_EXE_voiceprint"))
            .env("VOICEPRINT_CONFIG", config_file.path())
            .env("RUST_LOG", "error")
            .kill_on_drop(true)
            .spawn()
            .expect("Failed to spawn server");

        let server = Self {
            port,
            child,
            _config_file: config_file,
            _export_dir: export_dir,
        };

        let client = Client::new();
        for _ in 0..40 {
            if client.get(server.url("/health")).send().await.is_ok() {
                return server;
            }
            sleep(Duration::from_millis(50)).await;
        }
        panic!("Server did not start in time");
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}/api/v1{}", self.port, path)
    }

    async fn stop(mut self) {
        self.child.kill().await.ok();
    }
}

async fn poll_until_terminal(client: &Client, server: &TestServer, job_id: &str) -> serde_json::Value {
    for _ in 0..100 {
        let json: serde_json::Value = client
            .get(server.url(&format!("/profiles/{}", job_id)))
            .send()
            .await
            .expect("Failed to poll job")
            .json()
            .await
            .expect("Failed to parse job");

        let status = json["status"].as_str().unwrap_or_default().to_string();
        if matches!(status.as_str(), "completed" | "failed" | "canceled") {
            return json;
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("Job never reached a terminal status");
}

#[tokio::test]
async fn test_profile_job_completes_via_polling() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(server.url("/profiles"))
        .json(&serde_json::json!({"target_name": "Jane Doe"}))
        .send()
        .await
        .expect("Failed to create job");

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: serde_json::Value = response.json().await.unwrap();
    let job_id = created["id"].as_str().expect("job id").to_string();
    assert_eq!(created["status"], "queued");

    let job = poll_until_terminal(&client, &server, &job_id).await;
    assert_eq!(job["status"], "completed");
    assert_eq!(job["progress"]["percentage"], 100);

    let result = &job["result"];
    assert_eq!(result["total_pieces"], 0);
    let reports = result["source_reports"].as_array().unwrap();
    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| r["skipped"] == true));
    // Nothing was collected from any source, so no dossier is written; the
    // artifact is a placeholder reference.
    assert_eq!(result["artifact"]["placeholder"], true);
    assert!(result["artifact"]["location"].is_null());

    server.stop().await;
}

#[tokio::test]
async fn test_create_profile_rejects_blank_name() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(server.url("/profiles"))
        .json(&serde_json::json!({"target_name": "   "}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("target_name"));

    server.stop().await;
}

#[tokio::test]
async fn test_get_unknown_profile_returns_404() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .get(server.url("/profiles/550e8400-e29b-41d4-a716-446655440000"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn test_cancel_terminal_profile_conflicts() {
    let server = TestServer::start().await;
    let client = Client::new();

    let created: serde_json::Value = client
        .post(server.url("/profiles"))
        .json(&serde_json::json!({"target_name": "Jane Doe"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let job_id = created["id"].as_str().unwrap().to_string();

    poll_until_terminal(&client, &server, &job_id).await;

    let response = client
        .delete(server.url(&format!("/profiles/{}", job_id)))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    server.stop().await;
}

#[tokio::test]
async fn test_cancel_unknown_profile_returns_404() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .delete(server.url("/profiles/nope"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn test_list_profiles_includes_created_jobs() {
    let server = TestServer::start().await;
    let client = Client::new();

    for name in ["Jane Doe", "John Roe"] {
        let response = client
            .post(server.url("/profiles"))
            .json(&serde_json::json!({"target_name": name}))
            .send()
            .await
            .expect("Failed to create job");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json: serde_json::Value = client
        .get(server.url("/profiles"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(json["total"], 2);
    assert_eq!(json["jobs"].as_array().unwrap().len(), 2);

    server.stop().await;
}

#[tokio::test]
async fn test_hints_are_accepted_on_create() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(server.url("/profiles"))
        .json(&serde_json::json!({
            "target_name": "Jane Doe",
            "hints": {"twitter": "@janedoe", "blog": "https://blog.jane.example"}
        }))
        .send()
        .await
        .expect("Failed to create job");

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: serde_json::Value = response.json().await.unwrap();
    let job_id = created["id"].as_str().unwrap().to_string();

    // Collectors are unconfigured (disabled), so even hinted sources are
    // skipped; the run must still settle cleanly.
    let job = poll_until_terminal(&client, &server, &job_id).await;
    assert_eq!(job["status"], "completed");

    server.stop().await;
}
