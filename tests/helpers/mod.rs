#![allow(dead_code)]

use notehub::infrastructure::config::ApiConfig;
use notehub::infrastructure::NoteHubClient;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-token";

/// Client pointed at a mock server, authenticated with [`TEST_TOKEN`].
pub fn client_for(server: &MockServer) -> NoteHubClient {
    NoteHubClient::new(&ApiConfig {
        base_url: format!("{}/api", server.uri()),
        token: Some(TEST_TOKEN.to_string()),
        per_page: 12,
    })
    .expect("Mock server URI should be a valid base URL")
}

pub fn note_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": format!("Content of {title}"),
        "tag": "Todo",
        "createdAt": "2025-01-01T10:00:00.000Z",
        "updatedAt": "2025-01-01T10:00:00.000Z"
    })
}

pub fn page_json(notes: Vec<Value>, total_pages: u32) -> Value {
    json!({ "notes": notes, "totalPages": total_pages })
}

/// Well-known note ids used across tests
pub mod test_notes {
    pub const GROCERIES: &str = "65f1c2a9e4b0a1b2c3d4e5f6";
    pub const MEETING: &str = "65f1c2a9e4b0a1b2c3d4e5f7";
    pub const FAILING: &str = "abc";
    pub const NONEXISTENT: &str = "000000000000000000000000";
}
