use super::{belongs_to, SubdomainModule};
use crate::{
    modules::{http_request, Module},
    Error, Result,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument, trace, warn};

const BASE_URL: &str = "https://web.archive.org";

// region:        --- Module info

pub struct WebArchive {
    base_url: String,
}

impl WebArchive {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Module for WebArchive {
    fn name(&self) -> String {
        "subdomains/webarchive".to_string()
    }
    fn description(&self) -> String {
        "Use web.archive.org to find subdomains".to_string()
    }
}

// endregion:     --- Module info

#[derive(Debug, Deserialize)]
struct WebArchiveResponse(Vec<Vec<String>>);

#[async_trait]
impl SubdomainModule for WebArchive {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, http_client: &Client, domain: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/cdx/search/cdx?url=*.{}&output=json&fl=original&collapse=urlkey",
            self.base_url, domain
        );
        let res = http_request(http_client, &url).await?;

        if !res.status().is_success() {
            return Err(Error::InvalidHttpResponse(self.name()));
        }

        let web_archive_urls: Vec<String> = match res.json::<WebArchiveResponse>().await {
            Ok(info) => info.0.into_iter().flatten().collect(),
            Err(_) => return Err(Error::InvalidHttpResponse(self.name())),
        };

        let subdomains: Vec<String> = web_archive_urls
            .into_iter()
            .filter_map(|url| {
                // first row is the column header
                if url == "original" {
                    return None;
                }
                match Url::parse(&url) {
                    Ok(parsed_url) => parsed_url.host_str().map(|host| host.to_lowercase()),
                    Err(_) => {
                        warn!("Parsing url: {:?}", url);
                        None
                    }
                }
            })
            .filter(|host| belongs_to(host, domain))
            .inspect(|host| trace!("Collecting: {:?}", host))
            .collect();

        debug!("{} collected", subdomains.len());
        Ok(subdomains)
    }
}
