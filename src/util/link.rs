use thiserror::Error;
use url::Url;

/// Errors from validating a link before handing it to the system browser.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Validates a recipe's external link before opening it in the browser.
///
/// Recipe links come from user-entered data on the backend, so only
/// `http`/`https` schemes are allowed — never `file://` or custom
/// schemes that could invoke arbitrary handlers.
pub fn validate_link_for_open(url_str: &str) -> Result<Url, LinkError> {
    let url = Url::parse(url_str)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(LinkError::UnsupportedScheme(scheme.to_owned())),
    }
}
