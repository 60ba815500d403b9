mod helpers;

use helpers::{client_for, note_json, page_json, test_notes, TEST_TOKEN};
use notehub::application::NoteRepository;
use notehub::domain::{NewNote, TransportError};
use notehub::infrastructure::config::ApiConfig;
use notehub::infrastructure::NoteHubClient;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn given_search_and_page_when_listing_then_sends_query_and_bearer_token() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(query_param("search", "cat"))
        .and(query_param("page", "2"))
        .and(query_param("perPage", "12"))
        .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![note_json(test_notes::GROCERIES, "Cat food")],
            3,
        )))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    // Act
    let page = client.list_notes("cat", 2).await.unwrap();

    // Assert
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.notes.len(), 1);
    assert_eq!(page.notes[0].title, "Cat food");
}

#[tokio::test]
async fn given_empty_search_when_listing_then_still_sends_search_param() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(query_param("search", ""))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], 0)))
        .expect(1)
        .mount(&server)
        .await;

    // Act
    let page = client_for(&server).list_notes("", 1).await.unwrap();

    // Assert
    assert!(page.is_empty());
    assert_eq!(page.total_pages, 0);
}

#[tokio::test]
async fn given_new_note_when_creating_then_posts_body_and_returns_created_note() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notes"))
        .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .and(body_json(json!({"title": "Groceries", "content": "Milk", "tag": "Shopping"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": test_notes::GROCERIES,
            "title": "Groceries",
            "content": "Milk",
            "tag": "Shopping"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Act
    let created = client_for(&server)
        .create_note(&NewNote {
            title: "Groceries".to_string(),
            content: "Milk".to_string(),
            tag: "Shopping".to_string(),
        })
        .await
        .unwrap();

    // Assert
    assert_eq!(created.id, test_notes::GROCERIES);
    assert_eq!(created.tag, "Shopping");
}

#[tokio::test]
async fn given_existing_id_when_deleting_then_returns_deleted_note() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/notes/{}", test_notes::MEETING)))
        .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(note_json(test_notes::MEETING, "Standup")))
        .expect(1)
        .mount(&server)
        .await;

    // Act
    let deleted = client_for(&server).delete_note(test_notes::MEETING).await.unwrap();

    // Assert
    assert_eq!(deleted.id, test_notes::MEETING);
    assert_eq!(deleted.title, "Standup");
}

#[tokio::test]
async fn given_unknown_id_when_deleting_then_returns_not_found_with_server_message() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/notes/{}", test_notes::NONEXISTENT)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Note not found"})))
        .mount(&server)
        .await;

    // Act
    let error = client_for(&server)
        .delete_note(test_notes::NONEXISTENT)
        .await
        .unwrap_err();

    // Assert
    assert!(error.is_not_found());
    assert_eq!(
        error,
        TransportError::Status {
            status: 404,
            message: "Note not found".to_string()
        }
    );
}

#[tokio::test]
async fn given_server_error_without_body_when_listing_then_uses_reason_phrase() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // Act
    let error = client_for(&server).list_notes("", 1).await.unwrap_err();

    // Assert
    assert_eq!(
        error,
        TransportError::Status {
            status: 500,
            message: "Internal Server Error".to_string()
        }
    );
}

#[tokio::test]
async fn given_missing_token_when_calling_then_server_rejection_surfaces_as_error() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&server)
        .await;
    let client = NoteHubClient::new(&ApiConfig {
        base_url: format!("{}/api", server.uri()),
        token: None,
        per_page: 12,
    })
    .unwrap();

    // Act
    let error = client.list_notes("", 1).await.unwrap_err();

    // Assert
    assert_eq!(error.status(), Some(401));
}

#[tokio::test]
async fn given_invalid_json_when_listing_then_returns_decode_error() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    // Act
    let error = client_for(&server).list_notes("", 1).await.unwrap_err();

    // Assert
    assert!(matches!(error, TransportError::Decode(_)));
}

#[tokio::test]
async fn given_unreachable_server_when_listing_then_returns_network_error() {
    // Arrange - reserve a port, then close it so nothing listens there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let client = NoteHubClient::new(&ApiConfig {
        base_url: format!("http://{address}/api"),
        token: Some(TEST_TOKEN.to_string()),
        per_page: 12,
    })
    .unwrap();

    // Act
    let error = client.list_notes("", 1).await.unwrap_err();

    // Assert
    assert!(matches!(error, TransportError::Network(_)));
}
