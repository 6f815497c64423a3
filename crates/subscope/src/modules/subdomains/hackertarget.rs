use super::{belongs_to, SubdomainModule};
use crate::modules::{http_request, Module};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, trace};

const BASE_URL: &str = "https://api.hackertarget.com";

// region:        --- Module info

pub struct HackerTarget {
    base_url: String,
}

impl HackerTarget {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Module for HackerTarget {
    fn name(&self) -> String {
        "subdomains/hackertarget".to_string()
    }

    fn description(&self) -> String {
        "Use hackertarget.com host search to find subdomains".to_string()
    }
}

// endregion:     --- Module info

#[async_trait]
impl SubdomainModule for HackerTarget {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, http_client: &Client, domain: &str) -> Result<Vec<String>> {
        let url = format!("{}/hostsearch/?q={}", self.base_url, domain);
        let res = http_request(http_client, &url).await?;

        if !res.status().is_success() {
            return Err(Error::InvalidHttpResponse(self.name()));
        }

        // plain text, one "host,ip" per line
        let body = res.text().await?;
        if body.contains("error") {
            return Err(Error::ProviderError(format!(
                "{}: {}",
                self.name(),
                body.trim()
            )));
        }

        let subdomains: Vec<String> = body
            .lines()
            .filter_map(|line| line.split(',').next())
            .map(|host| host.trim().to_string())
            .filter(|host| belongs_to(host, domain))
            .inspect(|host| trace!("Collecting: {:?}", host))
            .collect();

        debug!("{} collected", subdomains.len());
        Ok(subdomains)
    }
}
