use super::{belongs_to, SubdomainModule};
use crate::modules::{http_request, Module};
use crate::{Error, Result};
use async_trait::async_trait;
use lazy_regex::regex;
use reqwest::Client;
use std::collections::HashSet;
use tracing::{debug, instrument, trace};

const BASE_URL: &str = "https://rapiddns.io";

// region:        --- Module info

pub struct RapidDns {
    base_url: String,
}

impl RapidDns {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Module for RapidDns {
    fn name(&self) -> String {
        "subdomains/rapiddns".to_string()
    }

    fn description(&self) -> String {
        "Scrape rapiddns.io result pages to find subdomains".to_string()
    }
}

// endregion:     --- Module info

/// Every hostname-looking token of the page that ends with `domain`.
fn scrape_hosts(html: &str, domain: &str) -> Vec<String> {
    let host_regex = regex!(r"[A-Za-z0-9_][A-Za-z0-9_.-]*\.[A-Za-z]{2,}");
    let mut seen = HashSet::new();
    host_regex
        .find_iter(html)
        .map(|found| found.as_str().to_lowercase())
        .filter(|host| host.len() > domain.len() && belongs_to(host, domain))
        .filter(|host| host.as_bytes()[host.len() - domain.len() - 1] == b'.')
        .filter(|host| seen.insert(host.clone()))
        .collect()
}

#[async_trait]
impl SubdomainModule for RapidDns {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, http_client: &Client, domain: &str) -> Result<Vec<String>> {
        let url = format!("{}/subdomain/{}?full=1&down=1", self.base_url, domain);
        let res = http_request(http_client, &url).await?;

        if !res.status().is_success() {
            return Err(Error::InvalidHttpResponse(self.name()));
        }

        let html = res.text().await?;
        let subdomains = scrape_hosts(&html, domain);
        for subdomain in &subdomains {
            trace!("Collecting: {:?}", subdomain);
        }

        debug!("{} collected", subdomains.len());
        Ok(subdomains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn scrape_keeps_only_real_subdomains() {
        let html = r#"<tr><td>vpn.example.com</td><td>A</td></tr>
            <tr><td>VPN.example.com</td></tr>
            <tr><td>badexample.com</td></tr>
            <tr><td>example.com</td></tr>
            <a href="https://rapiddns.io/s/example.com">"#;

        assert_eq!(scrape_hosts(html, "example.com"), vec!["vpn.example.com"]);
    }

    #[tokio::test]
    async fn enumerate_reads_the_result_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subdomain/example.com"))
            .and(query_param("full", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<td>dev.example.com</td><td>ftp.example.com</td>"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        let module = RapidDns::with_base_url(&mock_server.uri());

        let hosts = module
            .enumerate(&Client::new(), "example.com")
            .await
            .unwrap();

        assert_eq!(hosts, vec!["dev.example.com", "ftp.example.com"]);
    }
}
