use super::csrf::{CsrfManager, CSRF_HEADER};
use super::error::{error_for_response, ApiError};
use reqwest::cookie::Jar;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// HTTP client for the recipe backend.
///
/// Wraps a cookie-enabled `reqwest::Client` and the [`CsrfManager`] that
/// shares its jar. The session cookie and CSRF cookie ride along on every
/// request automatically; mutating requests additionally carry the
/// `X-CSRFToken` header, fetched-or-read before the request is issued
/// (the two calls are sequential, never concurrent).
///
/// Cheap to clone: the inner client and jar are reference-counted, so
/// background tasks can each hold their own handle.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    csrf: CsrfManager,
    base: Url,
    /// Per-request time budget, mirroring the client builder's timeout so
    /// a stalled connect can never hang a spawned task.
    timeout: Duration,
}

impl ApiClient {
    /// Builds a client against the given backend root URL.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(timeout)
            .build()?;

        let csrf = CsrfManager::new(jar, base.clone());
        Ok(Self {
            http,
            csrf,
            base,
            timeout,
        })
    }

    /// Ensures a CSRF token is available before an operation that needs one.
    pub async fn ensure_csrf_token(&self) -> Option<String> {
        self.csrf.ensure_token(&self.http).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Unexpected(format!("invalid endpoint path {path}: {e}")))
    }

    /// GET returning a decoded JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.http.get(url)).await?;
        decode_json(response).await
    }

    /// CSRF-guarded mutating request with a JSON body, returning a decoded
    /// JSON response body.
    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.mutate(method, path, Some(body)).await?;
        decode_json(response).await
    }

    /// CSRF-guarded mutating request whose response body is discarded.
    pub(crate) async fn send_no_content<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        self.mutate(method, path, body).await?;
        Ok(())
    }

    /// Issues a mutating request: CSRF ensure first (suspend point), then
    /// the request itself with the token attached.
    async fn mutate<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let token = self.ensure_csrf_token().await;
        let url = self.endpoint(path)?;

        let mut request = self.http.request(method, url);
        if let Some(token) = token {
            request = request.header(CSRF_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| ApiError::Timeout)?
            .map_err(ApiError::Network)?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        Ok(response)
    }
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Unexpected(format!("invalid response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ApiClient {
        let base = Url::parse(&server.uri()).unwrap();
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_mutating_request_carries_csrf_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/csrf/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "csrftoken=tok-1; Path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/users/logout/"))
            .and(header("X-CSRFToken", "tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Logged out successfully"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client
            .send_no_content::<()>(Method::POST, "/api/users/logout/", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/recipes/"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result: Result<serde_json::Value, _> = client.get_json("/api/recipes/").await;
        match result.unwrap_err() {
            ApiError::Auth(403) => {}
            e => panic!("Expected Auth(403), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_validation_errors_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/csrf/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/users/login/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "non_field_errors": ["Invalid username or password."]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result: Result<serde_json::Value, _> = client
            .send_json(
                Method::POST,
                "/api/users/login/",
                &serde_json::json!({"username": "u", "password": "p"}),
            )
            .await;
        match result.unwrap_err() {
            ApiError::Validation(messages) => {
                assert_eq!(messages, vec!["Invalid username or password."]);
            }
            e => panic!("Expected Validation, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/recipes/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result: Result<serde_json::Value, _> = client.get_json("/api/recipes/").await;
        match result.unwrap_err() {
            ApiError::HttpStatus(500) => {}
            e => panic!("Expected HttpStatus(500), got {:?}", e),
        }
    }
}
