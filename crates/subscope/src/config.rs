use crate::cloud::CloudDetector;
use crate::controller::Services;
use crate::modules;
use crate::Result;
use clap::ArgMatches;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::debug;

// paths
pub const OUTPUT_DIR: &str = "output/subscope";
pub const STORE_FILE: &str = "store.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_path: PathBuf,
    /// Also query the scraping sources.
    pub extended: bool,
    pub cloud: bool,
    pub save_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: Path::new(OUTPUT_DIR).join(STORE_FILE),
            extended: false,
            cloud: true,
            save_logs: false,
        }
    }
}

impl Settings {
    /// Reads the global flags, which clap propagates to every subcommand.
    pub fn from_matches(args: &ArgMatches) -> Self {
        let defaults = Self::default();
        Self {
            store_path: args
                .get_one::<String>("store")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            extended: args.get_flag("extended"),
            cloud: !args.get_flag("no-cloud"),
            save_logs: args.get_flag("logs"),
        }
    }

    pub fn services(&self) -> Result<Services> {
        // providers rely on the transport defaults, only the detector has a deadline
        let http_client = Client::builder().build()?;
        debug!("HTTP Client created: {:?}", http_client);

        let detector = self
            .cloud
            .then(|| CloudDetector::new(http_client.clone()));

        Ok(Services {
            http_client,
            modules: modules::subdomains_modules(self.extended),
            detector,
        })
    }
}
