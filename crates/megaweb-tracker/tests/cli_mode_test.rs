use std::io::Write;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(server: &MockServer) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("temp config");
    let yaml = format!(
        concat!(
            "server:\n  base_url: {}\n",
            "polling:\n  interval_ms: 10\n  max_attempts: 20\n",
            "forms:\n  default_folder: /srv/dl\n",
        ),
        server.uri()
    );
    file.write_all(yaml.as_bytes()).expect("write config");
    file
}

fn megaweb() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_megaweb"));
    command.arg("--log-level").arg("error");
    command
}

#[tokio::test]
async fn forms_lists_every_task_type() {
    let output = megaweb().arg("forms").output().await.expect("run megaweb");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    for task_type in ["SaveFile", "DebridAndSaveFile", "DownloadMagnet", "DownloadTorrent"] {
        assert!(stdout.contains(task_type), "missing {task_type} in:\n{stdout}");
    }
}

#[tokio::test]
async fn submit_with_invalid_form_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;
    let config = write_config(&server);

    let output = megaweb()
        .arg("--config")
        .arg(config.path())
        .args(["submit", "DownloadTorrent", "-f", "torrent_path=/x/image.iso"])
        .output()
        .await
        .expect("run megaweb");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("torrent_path: Invalid input."), "stderr: {stderr}");
}

#[tokio::test]
async fn submit_watches_task_to_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(serde_json::json!({"task_id": "cli-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/cli-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": "cli-1",
            "task_status": "SUCCESS",
            "task_result": "/srv/dl/a.bin",
        })))
        .expect(1)
        .mount(&server)
        .await;
    let config = write_config(&server);

    let output = megaweb()
        .arg("--config")
        .arg(config.path())
        .args(["submit", "SaveFile", "-f", "url=https://host/a.bin"])
        .output()
        .await
        .expect("run megaweb");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stdout: {stdout}\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("cli-1"));
    assert!(stdout.contains("SUCCESS"));
    assert!(stdout.contains("/srv/dl/a.bin"));
}

#[tokio::test]
async fn watch_exits_non_zero_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": "bad",
            "task_status": "FAILURE",
            "task_result": null,
        })))
        .expect(1)
        .mount(&server)
        .await;
    let config = write_config(&server);

    let output = megaweb()
        .arg("--config")
        .arg(config.path())
        .args(["watch", "bad"])
        .output()
        .await
        .expect("run megaweb");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("FAILURE"));
}

#[tokio::test]
async fn submit_no_watch_prints_id_without_polling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(serde_json::json!({"task_id": "quiet-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/quiet-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": "quiet-1",
            "task_status": "PENDING",
            "task_result": null,
        })))
        .expect(0)
        .mount(&server)
        .await;
    let config = write_config(&server);

    let output = megaweb()
        .arg("--config")
        .arg(config.path())
        .args(["submit", "SaveFile", "-f", "url=https://host/a.bin", "--no-watch"])
        .output()
        .await
        .expect("run megaweb");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "quiet-1");
}

#[tokio::test]
async fn status_prints_one_row_and_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": "s-1",
            "task_status": "STARTED",
            "task_result": null,
        })))
        .expect(2)
        .mount(&server)
        .await;
    let config = write_config(&server);

    let output = megaweb()
        .arg("--config")
        .arg(config.path())
        .args(["status", "s-1"])
        .output()
        .await
        .expect("run megaweb");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("s-1") && stdout.contains("STARTED"), "stdout: {stdout}");

    let output = megaweb()
        .arg("--config")
        .arg(config.path())
        .args(["status", "s-1", "--json"])
        .output()
        .await
        .expect("run megaweb");
    assert!(output.status.success());
    let record: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("status --json prints JSON");
    assert_eq!(
        record,
        serde_json::json!({"task_id": "s-1", "task_status": "STARTED", "task_result": null})
    );
}

#[tokio::test]
async fn status_of_unknown_task_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such task"))
        .expect(1)
        .mount(&server)
        .await;
    let config = write_config(&server);

    let output = megaweb()
        .arg("--config")
        .arg(config.path())
        .args(["status", "missing"])
        .output()
        .await
        .expect("run megaweb");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no such task"));
}
