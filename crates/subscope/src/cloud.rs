use reqwest::header::SERVER;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, instrument};

pub const DETECT_TIMEOUT_MS: u64 = 5000;
/// HEAD requests in flight at once, shared by every clone of a detector.
pub const DETECT_CONCURRENCY: usize = 50;
const SERVER_TOKEN_MAX_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudClassification {
    Cloudflare,
    Aws,
    /// Any other `server` token, already truncated for display.
    Server(String),
    Online,
    Unreachable,
}

impl fmt::Display for CloudClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloudflare => write!(f, "Cloudflare"),
            Self::Aws => write!(f, "AWS"),
            Self::Server(token) => write!(f, "{}", token),
            Self::Online => write!(f, "Online"),
            Self::Unreachable => write!(f, "Unreachable"),
        }
    }
}

/// Classification from the `server` header of a response that did arrive.
pub fn classify(server: Option<&str>) -> CloudClassification {
    let server = server.unwrap_or_default().trim().to_lowercase();

    if server.contains("cloudflare") {
        CloudClassification::Cloudflare
    } else if server.contains("cloudfront") || server.contains("amazon") {
        CloudClassification::Aws
    } else if server.is_empty() {
        CloudClassification::Online
    } else if server.chars().count() > SERVER_TOKEN_MAX_CHARS {
        let truncated: String = server.chars().take(SERVER_TOKEN_MAX_CHARS).collect();
        CloudClassification::Server(format!("{}...", truncated))
    } else {
        CloudClassification::Server(server)
    }
}

#[derive(Debug, Clone)]
pub struct CloudDetector {
    http_client: Client,
    deadline: Duration,
    permits: Arc<Semaphore>,
}

impl CloudDetector {
    pub fn new(http_client: Client) -> Self {
        Self::with_deadline(http_client, Duration::from_millis(DETECT_TIMEOUT_MS))
    }

    pub fn with_deadline(http_client: Client, deadline: Duration) -> Self {
        Self::with_limits(http_client, deadline, DETECT_CONCURRENCY)
    }

    pub fn with_limits(http_client: Client, deadline: Duration, concurrency: usize) -> Self {
        Self {
            http_client,
            deadline,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// One HEAD request over plain http. Errors and the deadline both mean `Unreachable`.
    ///
    /// The deadline starts once a permit is held, so queued hosts are not
    /// charged for the time spent waiting behind others.
    #[instrument(name = "detect", level = "debug", skip(self))]
    pub async fn detect(&self, hostname: &str) -> CloudClassification {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return CloudClassification::Unreachable,
        };

        let url = format!("http://{}", hostname);
        let request = self.http_client.head(&url).send();

        match timeout(self.deadline, request).await {
            Ok(Ok(res)) => {
                let server = res
                    .headers()
                    .get(SERVER)
                    .and_then(|value| value.to_str().ok());
                debug!("{} answered {} (server: {:?})", url, res.status(), server);
                classify(server)
            }
            Ok(Err(err)) => {
                debug!("{} request failed: {}", url, err);
                CloudClassification::Unreachable
            }
            Err(_) => {
                debug!("{} timed out after {:?}", url, self.deadline);
                CloudClassification::Unreachable
            }
        }
    }
}
