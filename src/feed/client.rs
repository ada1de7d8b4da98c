use std::time::Duration;

use thiserror::Error;

/// Published CSV export of the classification sheet.
pub const DEFAULT_FEED_URL: &str =
    "https://docs.google.com/spreadsheets/d/1UEnXQ_PPfAZj9qq3MSf0p2DlOICMCCmfqCoTAq66MsU/export?format=csv";

const USER_AGENT: &str = concat!("inboxpert/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// DNS, connect, TLS, timeout or body read failure.
    #[error("failed to reach the email feed: {0}")]
    Transport(String),

    #[error("email feed returned HTTP {status}")]
    HttpStatus { status: u16 },
}

/// Anything that can hand back the raw feed text.
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> Result<String, FetchError>;
}

/// Single-attempt HTTP GET of the feed. Retrying is left to the caller.
pub struct FeedClient {
    url: String,
    http: reqwest::blocking::Client,
}

impl FeedClient {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedSource for FeedClient {
    fn fetch(&self) -> Result<String, FetchError> {
        log::debug!("fetching feed from {}", self.url);

        let resp = self
            .http
            .get(&self.url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        resp.text().map_err(|e| FetchError::Transport(e.to_string()))
    }
}
