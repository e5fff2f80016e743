use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },

    /// The listing page could not be fetched or parsed, so nothing can be produced.
    #[error("Listing page {url} unavailable: {source}")]
    Listing {
        url: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn parse(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn listing(url: impl Into<String>, source: Error) -> Self {
        Error::Listing {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Network failure, timeout or non-success status.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            Error::Fetch { .. } | Error::Timeout { .. } | Error::Status { .. }
        )
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }

    /// Whether another attempt at the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Fetch { .. } | Error::Timeout { .. } => true,
            Error::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        if e.is_timeout() {
            Error::Timeout { url }
        } else if let Some(status) = e.status() {
            Error::Status {
                url,
                status: status.as_u16(),
            }
        } else {
            Error::Fetch {
                url,
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let timeout = Error::Timeout {
            url: "https://example.com".to_string(),
        };
        assert!(timeout.is_fetch());
        assert!(timeout.is_retryable());

        let not_found = Error::Status {
            url: "https://example.com".to_string(),
            status: 404,
        };
        assert!(not_found.is_fetch());
        assert!(!not_found.is_retryable());

        let unavailable = Error::Status {
            url: "https://example.com".to_string(),
            status: 503,
        };
        assert!(unavailable.is_retryable());

        let parse = Error::parse("https://example.com", "no title");
        assert!(parse.is_parse());
        assert!(!parse.is_fetch());
        assert!(!parse.is_retryable());
    }

    #[test]
    fn test_listing_error_names_page() {
        let err = Error::listing(
            "https://example.com/list",
            Error::Status {
                url: "https://example.com/list".to_string(),
                status: 500,
            },
        );
        let message = err.to_string();
        assert!(message.contains("https://example.com/list"));
        assert!(message.contains("500"));
        assert!(!err.is_fetch());
    }
}
