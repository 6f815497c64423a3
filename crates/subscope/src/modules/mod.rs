pub mod subdomains;

use self::subdomains::hackertarget::HackerTarget;
use self::subdomains::otx::Otx;
use self::subdomains::rapiddns::RapidDns;
use self::subdomains::web_archive::WebArchive;
use self::subdomains::{crtsh::CrtSh, SubdomainModule};
use crate::{Error, Result};
use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

pub trait Module {
    fn name(&self) -> String;
    fn description(&self) -> String;
}

/// The three default sources, plus the scraping ones when `extended` is set.
pub fn subdomains_modules(extended: bool) -> Vec<Box<dyn SubdomainModule>> {
    let mut modules: Vec<Box<dyn SubdomainModule>> = vec![
        Box::new(HackerTarget::new()),
        Box::new(CrtSh::new()),
        Box::new(Otx::new()),
    ];
    if extended {
        modules.extend(extended_modules());
    }
    modules
}

fn extended_modules() -> Vec<Box<dyn SubdomainModule>> {
    vec![Box::new(WebArchive::new()), Box::new(RapidDns::new())]
}

pub fn display_all() {
    println!("\nSubdomains modules");
    for module in subdomains_modules(false) {
        println!("- {:25}{}", module.name(), module.description());
    }
    println!("\nExtended modules (--extended)");
    for module in extended_modules() {
        println!("- {:25}{}", module.name(), module.description());
    }
}

// region:        --- HTTP requests

#[instrument(name = "HTTP_request", level = "info", skip_all, fields(url = url))]
pub async fn http_request(http_client: &Client, url: &str) -> Result<Response> {
    info!("Sending request");
    match http_client.get(url).send().await {
        Ok(res) => {
            info!("Receive with status: {}", res.status());
            debug!("Response: {:?}", res);
            Ok(res)
        }
        Err(err) => {
            warn!("Reason: {}", err);
            Err(Error::Reqwest(err))
        }
    }
}

// endregion:     --- HTTP requests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scan_uses_three_sources() {
        let names: Vec<String> = subdomains_modules(false)
            .iter()
            .map(|module| module.name())
            .collect();
        assert_eq!(
            names,
            vec!["subdomains/hackertarget", "subdomains/crtsh", "subdomains/otx"]
        );
    }

    #[test]
    fn extended_scan_adds_scrapers() {
        assert_eq!(subdomains_modules(true).len(), 5);
    }
}
