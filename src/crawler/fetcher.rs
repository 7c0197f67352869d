//! HTTP fetcher implementation
//!
//! This module handles all outbound requests, including:
//! - Building the shared HTTP client
//! - Issuing a single GET bounded by the configured timeout
//! - Classifying the result into a `RequestOutcome`
//! - Applying a completed outcome to the stats and the frontier
//!
//! Failures are values, not errors. Nothing in here can stop the engine.

use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract_links;
use crate::output::StatsReporter;
use crate::url::Blacklist;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("mock-traffic/", env!("CARGO_PKG_VERSION"));

/// Why a request failed before producing an HTTP status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCause {
    /// The request did not complete within the timeout
    Timeout,

    /// Connection could not be established (refused, DNS, TLS)
    Connect(String),

    /// Headers arrived but the body could not be read
    Body(String),

    /// Any other client-side failure (invalid URL, redirect loop, ...)
    Other(String),
}

impl fmt::Display for TransportCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timeout"),
            Self::Connect(e) => write!(f, "connection failed: {}", e),
            Self::Body(e) => write!(f, "failed to read body: {}", e),
            Self::Other(e) => write!(f, "{}", e),
        }
    }
}

/// Result of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// 2xx response with its body
    Success {
        /// URL the body was served from, after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Response with a non-2xx status
    HttpFailure {
        /// The HTTP status code
        status_code: u16,
    },

    /// No usable response (timeout, connection error, ...)
    TransportFailure {
        /// What went wrong
        cause: TransportCause,
    },
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure {
                cause: TransportCause::Timeout
            }
        )
    }
}

/// Builds the HTTP client shared by all fetches of an engine
///
/// The client keeps reqwest's default redirect policy and carries no
/// credentials. Per-request time limits are applied in [`fetch`].
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the result
///
/// The timeout bounds the whole exchange, body included. A request that
/// runs past it is reported as `TransportFailure { cause: Timeout }`.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Total time allowed for the request
pub async fn fetch(client: &Client, url: &str, timeout: Duration) -> RequestOutcome {
    match tokio::time::timeout(timeout, fetch_unbounded(client, url)).await {
        Ok(outcome) => outcome,
        Err(_) => RequestOutcome::TransportFailure {
            cause: TransportCause::Timeout,
        },
    }
}

async fn fetch_unbounded(client: &Client, url: &str) -> RequestOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return RequestOutcome::TransportFailure {
                cause: classify_error(&e),
            }
        }
    };

    let status = response.status();
    if !status.is_success() {
        return RequestOutcome::HttpFailure {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => RequestOutcome::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => RequestOutcome::TransportFailure {
            cause: TransportCause::Body(e.to_string()),
        },
    }
}

fn classify_error(e: &reqwest::Error) -> TransportCause {
    if e.is_timeout() {
        TransportCause::Timeout
    } else if e.is_connect() {
        TransportCause::Connect(e.to_string())
    } else {
        TransportCause::Other(e.to_string())
    }
}

/// Issues fetches and applies their outcomes
///
/// Cloning is cheap; every dispatched task carries its own clone so
/// completions run independently of the scheduler and of each other.
#[derive(Debug, Clone)]
pub struct RequestEngine {
    client: Client,
    frontier: Frontier,
    blacklist: Arc<Blacklist>,
    stats: StatsReporter,
    timeout: Duration,
}

impl RequestEngine {
    pub fn new(
        client: Client,
        frontier: Frontier,
        blacklist: Blacklist,
        stats: StatsReporter,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            frontier,
            blacklist: Arc::new(blacklist),
            stats,
            timeout,
        }
    }

    /// A request engine that shares this one's client and stats but
    /// writes discovered links into `frontier`
    pub fn with_frontier(&self, frontier: Frontier) -> Self {
        Self {
            frontier,
            ..self.clone()
        }
    }

    /// Starts a fetch in the background and returns immediately
    ///
    /// The returned handle may be dropped; the task keeps running and
    /// applies its outcome on completion.
    pub fn dispatch(&self, url: String) -> JoinHandle<RequestOutcome> {
        let engine = self.clone();
        tokio::spawn(async move { engine.visit(&url).await })
    }

    /// Fetches `url` and applies the outcome
    pub async fn visit(&self, url: &str) -> RequestOutcome {
        tracing::debug!("Visiting URL: {}", url);
        let outcome = fetch(&self.client, url, self.timeout).await;
        self.handle_outcome(url, &outcome);
        outcome
    }

    /// Applies a completed outcome
    ///
    /// On success the stats are bumped and the page's links are offered to
    /// the frontier. Failures are logged and dropped; the URL is not retried
    /// or re-offered.
    ///
    /// # Returns
    ///
    /// The number of URLs admitted to the frontier
    pub fn handle_outcome(&self, url: &str, outcome: &RequestOutcome) -> usize {
        match outcome {
            RequestOutcome::Success {
                final_url,
                status_code,
                body,
            } => {
                self.stats.on_success();
                tracing::debug!("Visited URL: {} | Status: {}", url, status_code);

                let links = extract_links(body, final_url);
                let found = links.len();
                let admitted = self.frontier.offer(links, &self.blacklist);
                tracing::debug!(
                    "Extracted {} links from {}, {} admitted to frontier",
                    found,
                    url,
                    admitted
                );
                admitted
            }
            RequestOutcome::HttpFailure { status_code } => {
                self.stats.on_failure();
                tracing::warn!("Failed to visit URL: {} | Status: {}", url, status_code);
                0
            }
            RequestOutcome::TransportFailure { cause } => {
                self.stats.on_failure();
                tracing::warn!("Failed to load URL: {} | {}", url, cause);
                0
            }
        }
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn stats(&self) -> &StatsReporter {
        &self.stats
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
