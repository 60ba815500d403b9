use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::NoteRepository;
use crate::domain::{NewNote, Note, NotePage, TransportError};
use crate::infrastructure::config::ApiConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListParams<'a> {
    search: &'a str,
    page: u32,
    per_page: u32,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the NoteHub REST API.
///
/// Every request carries `Authorization: Bearer <token>`. A missing token is
/// sent as an empty bearer and left for the server to reject.
#[derive(Debug, Clone)]
pub struct NoteHubClient {
    http: Client,
    base_url: Url,
    token: String,
    per_page: u32,
}

impl NoteHubClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid API base URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("API base URL cannot carry a path: {}", config.base_url);
        }

        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        debug!(%base_url, per_page = config.per_page, "Created NoteHub client");
        Ok(Self {
            http,
            base_url,
            token: config.token.clone().unwrap_or_default(),
            per_page: config.per_page,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL always has path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            let message = if message.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                message
            };
            debug!(status = status.as_u16(), %message, "Request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl NoteRepository for NoteHubClient {
    #[instrument(level = "debug", skip(self))]
    async fn list_notes(&self, search: &str, page: u32) -> Result<NotePage, TransportError> {
        let params = ListParams {
            search,
            page,
            per_page: self.per_page,
        };
        let request = self.http.get(self.endpoint(&["notes"])).query(&params);
        let result: NotePage = self.send(request).await?;
        debug!(notes = result.notes.len(), total_pages = result.total_pages, "Listed notes");
        Ok(result)
    }

    #[instrument(level = "debug", skip(self, note), fields(title = %note.title))]
    async fn create_note(&self, note: &NewNote) -> Result<Note, TransportError> {
        let request = self.http.post(self.endpoint(&["notes"])).json(note);
        let created: Note = self.send(request).await?;
        debug!(note_id = %created.id, "Created note");
        Ok(created)
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_note(&self, id: &str) -> Result<Note, TransportError> {
        let request = self.http.delete(self.endpoint(&["notes", id]));
        let deleted: Note = self.send(request).await?;
        debug!(note_id = %deleted.id, "Deleted note");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> NoteHubClient {
        NoteHubClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            token: None,
            per_page: 12,
        })
        .unwrap()
    }

    #[test]
    fn given_base_url_with_path_when_building_endpoint_then_appends_segments() {
        let client = client("https://notehub.example/api");
        assert_eq!(
            client.endpoint(&["notes", "abc"]).as_str(),
            "https://notehub.example/api/notes/abc"
        );
    }

    #[test]
    fn given_trailing_slash_when_building_endpoint_then_does_not_double_slash() {
        let client = client("https://notehub.example/api/");
        assert_eq!(client.endpoint(&["notes"]).as_str(), "https://notehub.example/api/notes");
    }

    #[test]
    fn given_id_with_reserved_characters_when_building_endpoint_then_escapes_it() {
        let client = client("https://notehub.example");
        assert_eq!(
            client.endpoint(&["notes", "a/b c"]).as_str(),
            "https://notehub.example/notes/a%2Fb%20c"
        );
    }

    #[test]
    fn given_invalid_base_url_when_creating_client_then_returns_error() {
        let result = NoteHubClient::new(&ApiConfig {
            base_url: "not a url".to_string(),
            token: None,
            per_page: 12,
        });
        assert!(result.is_err());
    }
}
