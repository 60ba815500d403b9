use anyhow::Result;
use notehub::domain::{NewNote, Note, NotePage};

#[test]
fn given_server_note_with_extra_fields_when_deserializing_then_ignores_them() -> Result<()> {
    // Arrange
    let json = r#"{
        "id": "65f1c2a9e4b0",
        "title": "Groceries",
        "content": "Milk",
        "tag": "Shopping",
        "createdAt": "2025-01-01T10:00:00.000Z",
        "updatedAt": "2025-01-01T10:00:00.000Z"
    }"#;

    // Act
    let note: Note = serde_json::from_str(json)?;

    // Assert
    assert_eq!(note.id, "65f1c2a9e4b0");
    assert_eq!(note.title, "Groceries");
    assert_eq!(note.tag, "Shopping");
    Ok(())
}

#[test]
fn given_list_response_when_deserializing_then_reads_camel_case_total_pages() -> Result<()> {
    // Arrange
    let json = r#"{"notes": [{"id": "1", "title": "T", "content": "C", "tag": "Todo"}], "totalPages": 4}"#;

    // Act
    let page: NotePage = serde_json::from_str(json)?;

    // Assert
    assert_eq!(page.total_pages, 4);
    assert_eq!(page.notes.len(), 1);
    assert!(page.contains("1"));
    Ok(())
}

#[test]
fn given_page_when_serializing_then_uses_camel_case_fields() -> Result<()> {
    // Arrange
    let page = NotePage {
        notes: vec![],
        total_pages: 0,
    };

    // Act
    let json = serde_json::to_string(&page)?;

    // Assert - field names follow the API, not Rust
    assert!(json.contains(r#""totalPages":0"#));
    assert!(!json.contains("total_pages"));
    Ok(())
}

#[test]
fn given_new_note_when_serializing_then_contains_only_request_fields() -> Result<()> {
    // Arrange
    let note = NewNote {
        title: "Title".to_string(),
        content: "Body".to_string(),
        tag: "Work".to_string(),
    };

    // Act
    let value = serde_json::to_value(&note)?;

    // Assert
    assert_eq!(
        value,
        serde_json::json!({"title": "Title", "content": "Body", "tag": "Work"})
    );
    Ok(())
}
