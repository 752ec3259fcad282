/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for megaweb-adapter tests

use megaweb_adapter::{ClientConfig, MegaWebClient};
use std::time::Duration;
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server with short timeouts
pub fn client_for(server: &MockServer) -> MegaWebClient {
    let config = ClientConfig {
        timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_secs(1),
    };
    MegaWebClient::with_config(config, &server.uri()).expect("client init")
}

/// Status body as served by the task API
pub fn status_body(task_id: &str, status: &str, result: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "task_id": task_id,
        "task_status": status,
        "task_result": result,
    })
}
