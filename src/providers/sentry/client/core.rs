use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LINK};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

use crate::auth::Token;
use crate::error::{ExportError, Result};
use crate::providers::sentry::links::Links;

pub const DEFAULT_HOST: &str = "https://sentry.io";
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 20;

/// Authenticated client for Sentry's REST API (`{host}/api/0/`).
///
/// One client is built per run and shared by every request. The bearer token
/// is installed once as a default header.
pub struct SentryClient {
    client: Client,
    pub api_url: Url,
    semaphore: Arc<Semaphore>,
}

impl SentryClient {
    pub fn new(host: &str, token: &Token, max_concurrent_requests: usize) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|e| ExportError::Config(format!("Invalid API token: {e}")))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        let client = Client::builder()
            .user_agent(concat!("sentry2csv/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| ExportError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut base =
            Url::parse(host).map_err(|e| ExportError::Config(format!("Invalid host URL: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let api_url = base
            .join("api/0/")
            .map_err(|e| ExportError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            semaphore: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        })
    }

    /// Resolves a path relative to the API root, e.g. `issues/1/events/latest/`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| ExportError::Config(format!("Invalid API URL '{path}': {e}")))
    }

    /// Issues one GET and returns the decoded JSON body with its pagination links.
    ///
    /// A 403 is reported as [`ExportError::AccessDenied`] without looking at the
    /// body. Every other status is decoded as JSON; Sentry reports rejected
    /// requests in a `detail` field.
    pub async fn fetch(&self, url: Url, params: &[(&str, &str)]) -> Result<(Value, Links)> {
        let _permit = self.semaphore.acquire().await?;

        debug!("Fetching {url} with params: {params:?}");

        let response = self.client.get(url).query(params).send().await?;

        if response.status() == StatusCode::FORBIDDEN {
            return Err(ExportError::AccessDenied);
        }

        let links = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(Links::parse)
            .unwrap_or_default();
        if !links.is_empty() {
            debug!("Pagination links: {links:?}");
        }

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;

        Ok((body, links))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server) -> SentryClient {
        SentryClient::new(&server.url(), &Token::from("test-token"), 4).unwrap()
    }

    #[test]
    fn test_api_url_from_host() {
        let token = Token::from("t");
        let client = SentryClient::new(DEFAULT_HOST, &token, 1).unwrap();
        assert_eq!(client.api_url.as_str(), "https://sentry.io/api/0/");

        let client = SentryClient::new("https://example.com/sentry", &token, 1).unwrap();
        assert_eq!(client.api_url.as_str(), "https://example.com/sentry/api/0/");
    }

    #[test]
    fn test_request_limit_permits() {
        let token = Token::from("t");

        let client = SentryClient::new(DEFAULT_HOST, &token, 0).unwrap();
        assert_eq!(client.semaphore.available_permits(), 1);

        let client = SentryClient::new(DEFAULT_HOST, &token, 3).unwrap();
        assert_eq!(client.semaphore.available_permits(), 3);

        let client = SentryClient::new(DEFAULT_HOST, &token, DEFAULT_MAX_CONCURRENT_REQUESTS).unwrap();
        assert_eq!(client.semaphore.available_permits(), 20);
    }

    #[tokio::test]
    async fn test_fetch_holds_permit_until_done() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/testurl")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = SentryClient::new(&server.url(), &Token::from("t"), 1).unwrap();
        let held = client.semaphore.clone().acquire_owned().await.unwrap();
        assert_eq!(client.semaphore.available_permits(), 0);

        let url = Url::parse(&format!("{}/testurl", server.url())).unwrap();
        let pending = client.fetch(url, &[]);
        tokio::pin!(pending);
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(50), &mut pending).await;
        assert!(waited.is_err(), "fetch must wait for a free permit");

        drop(held);
        let (body, _) = pending.await.unwrap();
        assert_eq!(body, json!({}));
        assert_eq!(client.semaphore.available_permits(), 1);
    }

    #[test]
    fn test_invalid_host_is_config_error() {
        let result = SentryClient::new("not a url", &Token::from("t"), 1);
        assert!(matches!(result, Err(ExportError::Config(_))));
    }

    #[tokio::test]
    async fn test_fetch_basic() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/testurl")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"foo": "bar"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = Url::parse(&format!("{}/testurl", server.url())).unwrap();
        let (body, links) = client.fetch(url, &[]).await.unwrap();

        assert_eq!(body, json!({"foo": "bar"}));
        assert!(links.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_sends_query_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/testurl")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("cursor".into(), "".into()),
                Matcher::UrlEncoded("query".into(), "is:unresolved".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = client_for(&server);
        let url = Url::parse(&format!("{}/testurl", server.url())).unwrap();
        let (body, _) = client
            .fetch(url, &[("cursor", ""), ("query", "is:unresolved")])
            .await
            .unwrap();

        assert_eq!(body, json!([]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/testurl")
            .with_status(403)
            .with_body(r#"{"detail": "You do not have permission to perform this action."}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = Url::parse(&format!("{}/testurl", server.url())).unwrap();
        let err = client.fetch(url, &[]).await.unwrap_err();

        assert!(matches!(err, ExportError::AccessDenied));
        assert!(err.to_string().to_lowercase().contains("access denied"));
    }

    #[tokio::test]
    async fn test_fetch_auth_error_ignores_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/testurl")
            .with_status(403)
            .with_body("<html>forbidden</html>")
            .create_async()
            .await;

        let client = client_for(&server);
        let url = Url::parse(&format!("{}/testurl", server.url())).unwrap();
        let result = client.fetch(url, &[]).await;

        assert!(matches!(result, Err(ExportError::AccessDenied)));
    }

    #[tokio::test]
    async fn test_fetch_with_link() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/testurl/")
            .with_status(200)
            .with_header(
                "link",
                "<http://www.sentry.io/testurl/?&cursor=12345:0:0>; rel=\"next\"; results=\"true\"; cursor=\"12345:0:0\"",
            )
            .with_body(r#"{"foo": "bar"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = Url::parse(&format!("{}/testurl/", server.url())).unwrap();
        let (body, links) = client.fetch(url, &[]).await.unwrap();

        assert_eq!(body, json!({"foo": "bar"}));
        let next = links.get("next").unwrap();
        assert_eq!(next["results"], "true");
        assert_eq!(next["cursor"], "12345:0:0");
    }

    #[tokio::test]
    async fn test_fetch_error_status_still_decodes_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/testurl")
            .with_status(400)
            .with_body(r#"{"detail": "Invalid query"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let url = Url::parse(&format!("{}/testurl", server.url())).unwrap();
        let (body, _) = client.fetch(url, &[]).await.unwrap();

        assert_eq!(body, json!({"detail": "Invalid query"}));
    }

    #[tokio::test]
    async fn test_fetch_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/testurl")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client_for(&server);
        let url = Url::parse(&format!("{}/testurl", server.url())).unwrap();
        let result = client.fetch(url, &[]).await;

        assert!(matches!(result, Err(ExportError::Json(_))));
    }
}
