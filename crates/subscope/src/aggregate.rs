use crate::modules::subdomains::SubdomainModule;
use futures::{stream, StreamExt};
use reqwest::Client;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

/// Union of every provider list, without malformed entries, sorted.
pub fn aggregate<I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    lists
        .into_iter()
        .flatten()
        .filter(|host| host.contains('.') && !host.starts_with('.'))
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Queries every module at once and waits for all of them before merging.
#[instrument(name = "subdomains", level = "info", skip_all, fields(domain = domain))]
pub async fn enumerate(
    http_client: &Client,
    modules: &[Box<dyn SubdomainModule>],
    domain: &str,
) -> Vec<String> {
    let lists: Vec<Vec<String>> = stream::iter(modules.iter())
        .map(|module| async move {
            match module.enumerate(http_client, domain).await {
                Ok(subdomains) => {
                    info!("{}: {} collected", module.name(), subdomains.len());
                    subdomains
                }
                Err(err) => {
                    warn!("{}: {}", module.name(), err);
                    Vec::new()
                }
            }
        })
        .buffer_unordered(modules.len().max(1))
        .collect()
        .await;

    let subdomains = aggregate(lists);
    info!("{} unique subdomains", subdomains.len());
    subdomains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::subdomains::{crtsh::CrtSh, hackertarget::HackerTarget, otx::Otx};
    use crate::testing::closed_base_url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn merges_overlapping_lists() {
        let merged = aggregate(vec![
            strings(&["a.example.com", "b.example.com"]),
            strings(&["b.example.com", "c.example.com"]),
            Vec::new(),
        ]);

        assert_eq!(
            merged,
            strings(&["a.example.com", "b.example.com", "c.example.com"])
        );
    }

    #[test]
    fn drops_entries_without_dot_or_leading_dot() {
        let merged = aggregate(vec![strings(&[
            "localhost",
            ".example.com",
            "",
            "z.example.com",
            "a.example.com",
        ])]);

        assert_eq!(merged, strings(&["a.example.com", "z.example.com"]));
    }

    #[test]
    fn output_is_sorted_and_unique() {
        let merged = aggregate(vec![
            strings(&["m.example.com", "a.example.com", "m.example.com"]),
            strings(&["b.example.com", "a.example.com"]),
            strings(&["m.example.com"]),
        ]);

        let mut expected = merged.clone();
        expected.sort();
        expected.dedup();
        assert_eq!(merged, expected);
        assert_eq!(merged.len(), 3);
    }

    #[tokio::test]
    async fn failing_providers_contribute_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("q", "%.example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"[{"name_value": "www.example.com"}]"#,
                "application/json",
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/hostsearch/"))
            .and(query_param("q", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_string("error invalid host"))
            .expect(1)
            .mount(&mock_server)
            .await;
        let modules: Vec<Box<dyn SubdomainModule>> = vec![
            Box::new(HackerTarget::with_base_url(&mock_server.uri())),
            Box::new(CrtSh::with_base_url(&mock_server.uri())),
            Box::new(Otx::with_base_url(&closed_base_url())),
        ];

        let subdomains = enumerate(&Client::new(), &modules, "example.com").await;

        assert_eq!(subdomains, strings(&["www.example.com"]));
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn all_providers_failing_is_empty() {
        let dead = closed_base_url();
        let modules: Vec<Box<dyn SubdomainModule>> = vec![
            Box::new(HackerTarget::with_base_url(&dead)),
            Box::new(CrtSh::with_base_url(&dead)),
            Box::new(Otx::with_base_url(&dead)),
        ];

        let subdomains = enumerate(&Client::new(), &modules, "example.com").await;

        assert!(subdomains.is_empty());
    }
}
