use crate::backend::wire::{
    AreaQuery, ErrorBody, NearbyPhoto, NearbyResponse, PlaceDetails, PlaceDetailsRequest,
    RefreshSummary,
};
use crate::backend::{BackendError, PhotoFeed, PlaceDetailsSource};
use crate::config::BackendConfig;
use crate::session::Session;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client for the SnapSphere backend.
///
/// Holds the [`Session`] explicitly instead of reading a token from ambient storage;
/// endpoints that need a signed-in user attach it as a bearer token.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session: Session::default(),
        })
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        read_json(&url, response).await
    }

    pub(crate) async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, ?query, "GET");
        let response = self.http.get(&url).query(query).send().await?;
        read_json(&url, response).await
    }

    pub(crate) async fn post_json_authed<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "POST (authenticated)");
        let response = self.authorize(self.http.post(&url))?.json(body).send().await?;
        read_json(&url, response).await
    }

    pub(crate) async fn get_json_authed<T>(&self, path: &str) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "GET (authenticated)");
        let response = self.authorize(self.http.get(&url))?.send().await?;
        read_json(&url, response).await
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, BackendError> {
        let token = self.session.token().ok_or(BackendError::Unauthenticated)?;
        Ok(builder.bearer_auth(token))
    }
}

async fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, BackendError> {
    let text = read_body(url, response).await?;
    serde_json::from_str(&text).map_err(|e| BackendError::Parse(format!("{url}: {e}")))
}

/// The response text of a success status, or an `Api` error carrying the backend's message.
async fn read_body(url: &str, response: Response) -> Result<String, BackendError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        debug!(url = %url, status = status.as_u16(), "Backend returned an error status");
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: error_message(&text),
        });
    }
    Ok(text)
}

/// Pulls the message out of an `{"error": ...}` body, falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl PhotoFeed for BackendClient {
    async fn refresh_area(&self, query: &AreaQuery) -> Result<RefreshSummary, BackendError> {
        let url = self.endpoint("fetch_mapillary_photos");
        debug!(url = %url, "POST");
        let response = self.http.post(&url).json(query).send().await?;
        // Only the status decides success.
        let summary = RefreshSummary::from_body(&read_body(&url, response).await?);
        info!(
            center = %query.center(),
            new_photos = summary.count,
            "Photo index refreshed"
        );
        Ok(summary)
    }

    async fn photos_nearby(&self, query: &AreaQuery) -> Result<Vec<NearbyPhoto>, BackendError> {
        let response: NearbyResponse = self
            .get_json("photos_nearby", &query.query_pairs())
            .await?;
        Ok(response.photos)
    }
}

#[async_trait]
impl PlaceDetailsSource for BackendClient {
    async fn place_details(
        &self,
        request: &PlaceDetailsRequest,
    ) -> Result<PlaceDetails, BackendError> {
        self.post_json("place_details", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn client(base_url: &str) -> BackendClient {
        let config = BackendConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        BackendClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_without_double_slashes() {
        let backend = client("http://localhost:5001/");
        assert_eq!(backend.base_url(), "http://localhost:5001");
        assert_eq!(
            backend.endpoint("/photos_nearby"),
            "http://localhost:5001/photos_nearby"
        );
        assert_eq!(
            backend.endpoint("place_details"),
            "http://localhost:5001/place_details"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": "latitude, longitude, and photo_url required"}"#),
            "latitude, longitude, and photo_url required"
        );
        assert_eq!(error_message("  Bad Gateway\n"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_authed_calls_fail_locally_without_token() {
        let backend = client("http://localhost:5001");
        let result: Result<serde_json::Value, _> = backend.get_json_authed("me").await;
        assert!(matches!(result, Err(BackendError::Unauthenticated)));
    }

    /// Answers one request with `response` and returns the server's base URL.
    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&request) {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}")
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn test_refresh_succeeds_on_empty_success_body() {
        let backend = client(&serve_once(http_response("200 OK", "")));
        let query = AreaQuery::new(Coordinate::FALLBACK, 2.0);

        let summary = backend.refresh_area(&query).await.unwrap();

        assert_eq!(summary, RefreshSummary::default());
    }

    #[tokio::test]
    async fn test_refresh_fails_on_error_status() {
        let backend = client(&serve_once(http_response(
            "503 Service Unavailable",
            r#"{"error": "index offline"}"#,
        )));
        let query = AreaQuery::new(Coordinate::FALLBACK, 2.0);

        let result = backend.refresh_area(&query).await;

        assert!(matches!(
            result,
            Err(BackendError::Api { status: 503, ref message }) if message == "index offline"
        ));
    }
}
