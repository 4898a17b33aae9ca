use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn minimal_config(port: u16) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[suggestions]
debounce_ms = 50
"#,
        port
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_pictovoz"))
        .env("PICTOVOZ_CONFIG", config_path)
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Run the binary to completion with the given config file.
async fn run_to_exit(config_path: &std::path::Path) -> std::process::Output {
    timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_pictovoz"))
            .env("PICTOVOZ_CONFIG", config_path)
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command")
}

#[tokio::test]
async fn test_health_and_config_endpoints() {
    let port = get_available_port();
    let config_file = write_config(&minimal_config(port));
    let mut server = spawn_server(config_file.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let json: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");

    let json: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(json["server"]["port"], port);
    assert_eq!(json["suggestions"]["debounce_ms"], 50);
    assert!(json.get("remote").is_none());

    server.kill().await.ok();
}

#[tokio::test]
async fn test_session_over_real_socket() {
    let port = get_available_port();
    let config_file = write_config(&minimal_config(port));
    let mut server = spawn_server(config_file.path()).await;
    assert!(wait_for_server(port, 40).await);

    let client = Client::new();
    let base = format!("http://127.0.0.1:{}/api/v1", port);

    let response = client
        .post(format!("{}/sessions", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let session: serde_json::Value = response.json().await.unwrap();
    let id = session["id"].as_str().unwrap().to_string();

    let view: serde_json::Value = client
        .post(format!("{}/sessions/{}/words", base, id))
        .json(&serde_json::json!({"word_id": "yo"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["text"], "Yo");
    assert_eq!(view["suggestions"]["source"], "rules");

    let metrics = client
        .get(format!("http://127.0.0.1:{}/metrics", port))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("pictovoz_sessions_created_total"));

    server.kill().await.ok();
}

#[tokio::test]
async fn test_invalid_config_exits_with_error() {
    let config_file = write_config(
        r#"
[server]
port = 0
"#,
    );
    assert!(!run_to_exit(config_file.path()).await.status.success());
}

#[tokio::test]
async fn test_missing_vocabulary_file_exits_with_error() {
    let config_file = write_config(
        r#"
[vocabulary]
path = "/nonexistent/words.json"
"#,
    );
    assert!(!run_to_exit(config_file.path()).await.status.success());
}

#[tokio::test]
async fn test_malformed_config_exits_with_error() {
    let config_file = write_config("[server\nport = ");
    assert!(!run_to_exit(config_file.path()).await.status.success());
}
