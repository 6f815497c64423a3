use super::{belongs_to, SubdomainModule};
use crate::modules::http_request;
use crate::Result;
use crate::{modules::Module, Error};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, trace};

const BASE_URL: &str = "https://crt.sh";

// region:        --- Module info

pub struct CrtSh {
    base_url: String,
}

impl CrtSh {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Module for CrtSh {
    fn name(&self) -> String {
        "subdomains/crtsh".to_string()
    }

    fn description(&self) -> String {
        "Use crt.sh/ certificate transparency logs to find subdomains".to_string()
    }
}

// endregion:     --- Module info

#[derive(Debug, Deserialize)]
pub struct CrtShEntry {
    pub name_value: String,
}

#[async_trait]
impl SubdomainModule for CrtSh {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, http_client: &Client, domain: &str) -> Result<Vec<String>> {
        let url = format!("{}/?q=%25.{}&output=json", self.base_url, domain);
        let res = http_request(http_client, &url).await?;

        if !res.status().is_success() {
            return Err(Error::InvalidHttpResponse(self.name()));
        }

        let crtsh_entries: Vec<CrtShEntry> = match res.json().await {
            Ok(info) => info,
            Err(_) => return Err(Error::InvalidHttpResponse(self.name())),
        };

        // a certificate can carry several names, one per line
        let subdomains: Vec<String> = crtsh_entries
            .into_iter()
            .flat_map(|entry| {
                entry
                    .name_value
                    .to_lowercase()
                    .split('\n')
                    .map(|subdomain| subdomain.trim().to_string())
                    .collect::<Vec<String>>()
            })
            .filter(|subdomain| !subdomain.contains('*'))
            .filter(|subdomain| belongs_to(subdomain, domain))
            .inspect(|subdomain| trace!("Collecting: {:?}", subdomain))
            .collect();

        debug!("{} collected", subdomains.len());
        Ok(subdomains)
    }
}
