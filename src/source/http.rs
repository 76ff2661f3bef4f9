//! HTTP event source.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::event::{CalendarEvent, DateRange};

use super::EventSource;

/// Event source backed by an HTTP calendar API.
///
/// Issues `GET {base_url}/events?timeMin=<ISO8601>&timeMax=<ISO8601>` and
/// expects a `{ "events": [...] }` body. Unknown DTO fields are preserved
/// into [`CalendarEvent::extra`] for the renderer.
pub struct HttpEventSource {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    id: String,
}

/// Wire format of the events endpoint.
#[derive(Debug, Deserialize)]
struct EventsResponse {
    events: Vec<EventDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDto {
    id: String,
    #[serde(default)]
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    is_all_day: bool,
    color: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<EventDto> for CalendarEvent {
    fn from(dto: EventDto) -> Self {
        CalendarEvent {
            id: dto.id,
            title: dto.title,
            start: dto.start,
            // Backends occasionally emit end < start; clamp rather than
            // dropping the whole sub-range.
            end: dto.end.max(dto.start),
            all_day: dto.is_all_day,
            color: dto.color,
            extra: dto.extra,
        }
    }
}

/// Error response format of the events endpoint.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl HttpEventSource {
    /// Create a new HTTP event source from configuration.
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(crate::error::ConfigError::MissingField(
                "fetch.base_url".to_string(),
            )
            .into());
        }

        let api_token = config
            .api_token
            .clone()
            .or_else(|| std::env::var("TIMEGRID_API_TOKEN").ok());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let id = base_url.clone();

        Ok(Self {
            client,
            base_url,
            api_token,
            id,
        })
    }

    /// Build the events URL for a range.
    fn events_url(&self, range: &DateRange, force_refresh: bool) -> String {
        let mut url = format!(
            "{}/events?timeMin={}&timeMax={}",
            self.base_url,
            range.min.to_rfc3339_opts(SecondsFormat::Millis, true),
            range.max.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        if force_refresh {
            url.push_str("&forceRefresh=true");
        }
        url
    }

    /// Parse a successful response body into events.
    fn parse_events(body: &str) -> Result<Vec<CalendarEvent>> {
        let response: EventsResponse = serde_json::from_str(body)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        Ok(response.events.into_iter().map(CalendarEvent::from).collect())
    }

    /// Extract the diagnostic message from an error body, if present.
    fn error_message(status: u16, body: &str) -> String {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(response) => response.error.message,
            Err(_) => format!("HTTP {}", status),
        }
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_events(
        &self,
        range: &DateRange,
        force_refresh: bool,
    ) -> Result<Vec<CalendarEvent>> {
        let url = self.events_url(range, force_refresh);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_connect() {
                FetchError::Transport(format!("Connection failed: {}", e))
            } else {
                FetchError::Transport(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            return Self::parse_events(&body);
        }

        let message = Self::error_message(status.as_u16(), &body);
        let error = match status.as_u16() {
            401 => FetchError::AuthRequired(message),
            404 => FetchError::NotFound(message),
            _ => FetchError::Api {
                status: status.as_u16(),
                message,
            },
        };
        Err(error.into())
    }
}

// ============================================================================
// Tests
// ============================================================================
