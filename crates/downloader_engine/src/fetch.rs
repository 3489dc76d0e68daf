use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;

use engine_logging::engine_trace;

use crate::decode::decode_text;
use crate::{FailureKind, FetchError, FetchResult};

const DEFAULT_USER_AGENT: &str = concat!("downloader/", env!("CARGO_PKG_VERSION"));

/// Transport knobs shared by the async and blocking fetchers.
///
/// No overall request timeout is applied. `connect_timeout` only bounds the
/// TCP/TLS handshake.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub redirect_limit: usize,
    pub user_agent: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            redirect_limit: 5,
            user_agent: None,
        }
    }
}

impl FetchSettings {
    fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Suspendable fetch of one URL's text content.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;
}

/// Fetch of one URL's text content that blocks the calling thread.
pub trait BlockingFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, url: &str) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .redirect(redirect_policy(self.settings.redirect_limit))
            .user_agent(self.settings.user_agent())
            .build()
            .map_err(|err| FetchError::new(url, FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let parsed = parse_url(url)?;
        let client = self.build_client(url)?;

        let response = client
            .get(parsed)
            .send()
            .await
            .map_err(|err| map_reqwest_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                url,
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let content_type = content_type_of(response.headers());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| map_reqwest_error(url, err))?;
            bytes.extend_from_slice(&chunk);
            engine_trace!("{} received {} bytes so far", url, bytes.len());
        }

        let decoded = decode_text(&bytes, content_type.as_deref());
        Ok(FetchResult::new(url, decoded.text))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockingReqwestFetcher {
    settings: FetchSettings,
}

impl BlockingReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, url: &str) -> Result<reqwest::blocking::Client, FetchError> {
        reqwest::blocking::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            // The blocking client defaults to a 30s total timeout; runs have none.
            .timeout(None::<Duration>)
            .redirect(redirect_policy(self.settings.redirect_limit))
            .user_agent(self.settings.user_agent())
            .build()
            .map_err(|err| FetchError::new(url, FailureKind::Network, err.to_string()))
    }
}

impl BlockingFetcher for BlockingReqwestFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let parsed = parse_url(url)?;
        let client = self.build_client(url)?;

        let response = client
            .get(parsed)
            .send()
            .map_err(|err| map_reqwest_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                url,
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let content_type = content_type_of(response.headers());
        let bytes = response
            .bytes()
            .map_err(|err| map_reqwest_error(url, err))?;
        engine_trace!("{} received {} bytes", url, bytes.len());

        let decoded = decode_text(&bytes, content_type.as_deref());
        Ok(FetchResult::new(url, decoded.text))
    }
}

fn parse_url(url: &str) -> Result<reqwest::Url, FetchError> {
    reqwest::Url::parse(url)
        .map_err(|err| FetchError::new(url, FailureKind::InvalidUrl, err.to_string()))
}

fn redirect_policy(redirect_limit: usize) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= redirect_limit {
            attempt.error("redirect limit exceeded")
        } else {
            attempt.follow()
        }
    })
}

fn content_type_of(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn map_reqwest_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(url, FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(url, FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(url, FailureKind::Network, err.to_string())
}
