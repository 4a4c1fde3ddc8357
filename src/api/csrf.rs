use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Name of the CSRF cookie the backend issues.
const CSRF_COOKIE: &str = "csrftoken";

/// Header carrying the CSRF token on mutating requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Manages the CSRF token handshake against the backend.
///
/// The cookie jar shared with the HTTP client is the single source of
/// truth: the token is read from the `csrftoken` cookie, and when the
/// cookie is absent a single idempotent GET against the token-issuing
/// endpoint makes the server set it. There is no client-side expiry
/// tracking — if the server rotates the token, the jar picks up the new
/// cookie on the next response that sets it.
#[derive(Clone)]
pub struct CsrfManager {
    jar: Arc<Jar>,
    token_url: Url,
    base: Url,
}

impl CsrfManager {
    /// `base` is the backend root (e.g. `http://localhost:8000`); the
    /// token endpoint lives at `/api/csrf/` under it.
    pub fn new(jar: Arc<Jar>, base: Url) -> Self {
        // Path join on a validated base cannot fail
        let token_url = base
            .join("/api/csrf/")
            .unwrap_or_else(|_| base.clone());
        Self {
            jar,
            token_url,
            base,
        }
    }

    /// Reads the CSRF token from the cookie jar, if present.
    pub fn cookie_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        let cookies = header.to_str().ok()?;
        let prefix = format!("{CSRF_COOKIE}=");
        cookies
            .split("; ")
            .find_map(|pair| pair.strip_prefix(prefix.as_str()))
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    /// Ensures a CSRF token is available, fetching one if necessary.
    ///
    /// At most one fetch attempt per call, no retry, no backoff. A network
    /// failure during the issuing GET is logged and swallowed — the next
    /// mutating request will surface the problem as a 403 instead.
    pub async fn ensure_token(&self, http: &reqwest::Client) -> Option<String> {
        if let Some(token) = self.cookie_token() {
            return Some(token);
        }

        tracing::debug!(url = %self.token_url, "No CSRF cookie present, fetching token");
        let request = http.get(self.token_url.clone()).send();
        match tokio::time::timeout(Duration::from_secs(30), request).await {
            Ok(Ok(response)) => {
                if !response.status().is_success() {
                    tracing::warn!(
                        status = response.status().as_u16(),
                        "CSRF token endpoint returned non-success status"
                    );
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to fetch CSRF token");
            }
            Err(_) => {
                tracing::warn!("CSRF token fetch timed out");
            }
        }

        // Re-read after the fetch; may still be None if the fetch failed
        self.cookie_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manager_for(uri: &str) -> (CsrfManager, reqwest::Client) {
        let jar = Arc::new(Jar::default());
        let base = Url::parse(uri).unwrap();
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .unwrap();
        (CsrfManager::new(jar, base), client)
    }

    #[tokio::test]
    async fn test_ensure_token_fetches_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/csrf/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "csrftoken=abc123; Path=/")
                    .set_body_json(serde_json::json!({"csrfToken": "abc123"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (manager, client) = manager_for(&server.uri());
        assert_eq!(manager.cookie_token(), None);

        let token = manager.ensure_token(&client).await;
        assert_eq!(token.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_ensure_token_skips_fetch_when_cookie_present() {
        let server = MockServer::start().await;
        // Zero expected calls: the cookie is already in the jar
        Mock::given(method("GET"))
            .and(path("/api/csrf/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (manager, client) = manager_for(&server.uri());
        let base = Url::parse(&server.uri()).unwrap();
        manager.jar.add_cookie_str("csrftoken=cached; Path=/", &base);

        let token = manager.ensure_token(&client).await;
        assert_eq!(token.as_deref(), Some("cached"));
    }

    #[tokio::test]
    async fn test_ensure_token_swallows_network_failure() {
        // Point at a port nothing listens on; ensure_token must not error
        let (manager, client) = manager_for("http://127.0.0.1:9");
        let token = manager.ensure_token(&client).await;
        assert_eq!(token, None);
    }

    #[tokio::test]
    async fn test_cookie_token_among_other_cookies() {
        let (manager, _client) = manager_for("http://127.0.0.1:9");
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        manager.jar.add_cookie_str("sessionid=s3cret; Path=/", &base);
        manager.jar.add_cookie_str("csrftoken=tok42; Path=/", &base);

        assert_eq!(manager.cookie_token().as_deref(), Some("tok42"));
    }
}
