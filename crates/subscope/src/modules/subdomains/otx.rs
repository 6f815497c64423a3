use super::{belongs_to, SubdomainModule};
use crate::modules::{http_request, Module};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, trace};

const BASE_URL: &str = "https://otx.alienvault.com";

// region:        --- Module info

pub struct Otx {
    base_url: String,
}

impl Otx {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Module for Otx {
    fn name(&self) -> String {
        "subdomains/otx".to_string()
    }

    fn description(&self) -> String {
        "Use AlienVault OTX passive DNS to find subdomains".to_string()
    }
}

// endregion:     --- Module info

#[derive(Debug, Deserialize)]
struct PassiveDnsResponse {
    passive_dns: Vec<PassiveDnsRecord>,
}

#[derive(Debug, Deserialize)]
struct PassiveDnsRecord {
    hostname: String,
}

#[async_trait]
impl SubdomainModule for Otx {
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(&self, http_client: &Client, domain: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/api/v1/indicators/domain/{}/passive_dns",
            self.base_url, domain
        );
        let res = http_request(http_client, &url).await?;

        if !res.status().is_success() {
            return Err(Error::InvalidHttpResponse(self.name()));
        }

        let response: PassiveDnsResponse = match res.json().await {
            Ok(info) => info,
            Err(_) => return Err(Error::InvalidHttpResponse(self.name())),
        };

        let subdomains: Vec<String> = response
            .passive_dns
            .into_iter()
            .map(|record| record.hostname.to_lowercase())
            .filter(|hostname| belongs_to(hostname, domain))
            .inspect(|hostname| trace!("Collecting: {:?}", hostname))
            .collect();

        debug!("{} collected", subdomains.len());
        Ok(subdomains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn passive_dns(body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/indicators/domain/example.com/passive_dns"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn reads_passive_dns_hostnames() {
        let mock_server = passive_dns(
            r#"{"passive_dns": [
                {"hostname": "API.example.com", "address": "1.1.1.1"},
                {"hostname": "cdn.elsewhere.net", "address": "2.2.2.2"}
            ], "count": 2}"#,
        )
        .await;
        let module = Otx::with_base_url(&mock_server.uri());

        let hosts = module
            .enumerate(&Client::new(), "example.com")
            .await
            .unwrap();

        assert_eq!(hosts, vec!["api.example.com"]);
    }

    #[tokio::test]
    async fn missing_passive_dns_field_is_an_error() {
        let mock_server = passive_dns(r#"{"detail": "endpoint not found"}"#).await;
        let module = Otx::with_base_url(&mock_server.uri());

        let res = module.enumerate(&Client::new(), "example.com").await;

        assert!(res.is_err());
    }
}
