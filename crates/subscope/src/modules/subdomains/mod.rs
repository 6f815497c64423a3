pub mod crtsh;
pub mod hackertarget;
pub mod otx;
pub mod rapiddns;
pub mod web_archive;

use super::Module;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait SubdomainModule: Module + Send + Sync {
    /// Hostnames ending with `domain`. Callers treat an error as "nothing found".
    async fn enumerate(&self, http_client: &Client, domain: &str) -> Result<Vec<String>>;
}

/// Suffix filter every provider applies before returning.
pub(crate) fn belongs_to(hostname: &str, domain: &str) -> bool {
    hostname.ends_with(domain)
}
