//! HttpGameGateway - JSON-over-HTTP implementation of `GameGateway`.
//!
//! Every call is a single request; there is no retry. Error bodies are
//! expected to carry a FastAPI-style `detail` string.

use async_trait::async_trait;
use regent_core::error::{RegentError, Result};
use regent_core::game::FinalAudit;
use regent_core::gateway::{
    AudienceReply, AudienceRequest, DecisionRequest, DecisionResponse, DeleteSessionResponse,
    EventChoiceRequest, EventResponse, GameGateway, NewGameRequest, NewGameResponse,
    SessionSnapshot, SetLensRequest, SetLensResponse, StartChapterRequest, StartChapterResponse,
};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Gateway that talks to the game server over HTTP.
#[derive(Clone)]
pub struct HttpGameGateway {
    client: Client,
    base_url: String,
}

impl HttpGameGateway {
    /// Creates a gateway rooted at `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Uses a preconfigured client (timeouts, proxies).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/game/{session_id}/{suffix...}` with every segment
    /// percent-encoded.
    fn session_url(&self, session_id: &str, suffix: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|err| {
            RegentError::config(format!("Invalid server URL '{}': {}", self.base_url, err))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                RegentError::config(format!("Server URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push("game")
            .push(session_id)
            .extend(suffix);

        Ok(url)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        self.send(path, self.client.post(self.url(path)).json(body)).await
    }

    async fn get<R: DeserializeOwned>(&self, url: Url) -> Result<R> {
        let path = url.path().to_string();
        self.send(&path, self.client.get(url)).await
    }

    async fn delete<R: DeserializeOwned>(&self, url: Url) -> Result<R> {
        let path = url.path().to_string();
        self.send(&path, self.client.delete(url)).await
    }

    async fn send<R: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<R> {
        tracing::debug!("[HttpGameGateway] -> {}", path);

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = map_http_error(status, &body);
            tracing::warn!("[HttpGameGateway] {} failed: {}", path, err);
            return Err(err);
        }

        let body = response.text().await.map_err(map_transport_error)?;
        tracing::debug!("[HttpGameGateway] <- {} ({} bytes)", path, body.len());
        serde_json::from_str(&body).map_err(|err| {
            RegentError::transport(format!("Failed to parse response from {}: {}", path, err))
        })
    }
}

#[async_trait]
impl GameGateway for HttpGameGateway {
    async fn new_game(&self, request: NewGameRequest) -> Result<NewGameResponse> {
        self.post("/game/new", &request).await
    }

    async fn set_lens(&self, request: SetLensRequest) -> Result<SetLensResponse> {
        self.post("/game/lens", &request).await
    }

    async fn start_chapter(&self, request: StartChapterRequest) -> Result<StartChapterResponse> {
        self.post("/chapter/start", &request).await
    }

    async fn submit_decision(&self, request: DecisionRequest) -> Result<DecisionResponse> {
        self.post("/game/decision", &request).await
    }

    async fn private_audience(&self, request: AudienceRequest) -> Result<AudienceReply> {
        self.post("/game/audience", &request).await
    }

    async fn handle_event(&self, request: EventChoiceRequest) -> Result<EventResponse> {
        self.post("/game/event", &request).await
    }

    async fn get_state(&self, session_id: &str) -> Result<SessionSnapshot> {
        self.get(self.session_url(session_id, &[])?).await
    }

    async fn get_audit(&self, session_id: &str) -> Result<FinalAudit> {
        self.get(self.session_url(session_id, &["audit"])?).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<DeleteSessionResponse> {
        self.delete(self.session_url(session_id, &[])?).await
    }
}

/// Builds the error for a non-success response.
///
/// Message preference: the body's `detail` string, then the status reason
/// phrase, then a generic line naming the status code.
pub(crate) fn map_http_error(status: StatusCode, body: &str) -> RegentError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| detail.as_str())
                .map(str::to_string)
        })
        .filter(|detail| !detail.trim().is_empty());

    let message = detail
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

    RegentError::api(Some(status.as_u16()), message)
}

fn map_transport_error(err: reqwest::Error) -> RegentError {
    if err.is_connect() {
        RegentError::transport(format!("Cannot reach game server: {}", err))
    } else if err.is_timeout() {
        RegentError::transport(format!("Game server timed out: {}", err))
    } else {
        RegentError::transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_used_verbatim() {
        let err = map_http_error(
            StatusCode::NOT_FOUND,
            r#"{"detail": "Game session not found"}"#,
        );
        assert_eq!(err, RegentError::api(Some(404), "Game session not found"));
    }

    #[test]
    fn test_non_string_detail_falls_back_to_reason() {
        let err = map_http_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "input"], "msg": "field required"}]}"#,
        );
        assert_eq!(err.user_message(), "Unprocessable Entity");
    }

    #[test]
    fn test_html_body_falls_back_to_reason() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.user_message(), "Bad Gateway");
    }

    #[test]
    fn test_unknown_status_gets_generic_message() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = map_http_error(status, "");
        assert_eq!(err.user_message(), "request failed with status 599");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let gateway = HttpGameGateway::new("http://localhost:8000/api/");
        assert_eq!(gateway.url("/game/new"), "http://localhost:8000/api/game/new");
    }

    #[test]
    fn test_session_id_is_encoded_as_one_segment() {
        let gateway = HttpGameGateway::new("http://localhost:8000/api/");

        let url = gateway.session_url("s 1/../x", &["audit"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/game/s%201%2F..%2Fx/audit");

        let url = gateway.session_url("abc-123", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/game/abc-123");
    }

    #[test]
    fn test_unparseable_base_url_is_config_error() {
        let gateway = HttpGameGateway::new("not a url");
        let err = gateway.session_url("s-1", &[]).unwrap_err();
        assert!(matches!(err, RegentError::Config(_)));
    }
}
