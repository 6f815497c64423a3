use crate::aggregate;
use crate::clipboard::Clipboard;
use crate::cloud::{CloudClassification, CloudDetector};
use crate::model::{CloudCell, Row};
use crate::modules::subdomains::SubdomainModule;
use crate::store::{self, KvStore};
use crate::Result;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, instrument};

pub const COPY_ACK_MS: u64 = 2000;

pub const STATUS_READY: &str = "Ready";
pub const STATUS_EMPTY_INPUT: &str = "Please enter a domain.";
pub const STATUS_NO_RESULTS: &str = "No results found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Scanning,
    Displaying,
}

/// What a scan needs to reach the outside world.
pub struct Services {
    pub http_client: Client,
    pub modules: Vec<Box<dyn SubdomainModule>>,
    /// `None` disables the cloud column.
    pub detector: Option<CloudDetector>,
}

/// Result of one detection task. Only the row at `index` of `generation` is touched.
#[derive(Debug)]
struct Detection {
    generation: u64,
    index: usize,
    class: CloudClassification,
}

pub struct Controller<'a, S: KvStore + ?Sized, C: Clipboard + ?Sized> {
    store: &'a mut S,
    clipboard: &'a mut C,
    services: Services,
    state: State,
    scan_enabled: bool,
    domain_input: String,
    rows: Vec<Row>,
    status: String,
    copied_at: Option<Instant>,
    // bumped whenever the table is replaced, stale detections are dropped
    generation: u64,
    pending: usize,
    updates_tx: UnboundedSender<Detection>,
    updates_rx: UnboundedReceiver<Detection>,
}

// region:        --- Constructors

impl<'a, S: KvStore + ?Sized, C: Clipboard + ?Sized> Controller<'a, S, C> {
    pub fn new(store: &'a mut S, clipboard: &'a mut C, services: Services) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            store,
            clipboard,
            services,
            state: State::Idle,
            scan_enabled: true,
            domain_input: String::new(),
            rows: Vec::new(),
            status: STATUS_READY.to_string(),
            copied_at: None,
            generation: 0,
            pending: 0,
            updates_tx,
            updates_rx,
        }
    }

    /// Builds the controller and restores the last scan, without querying providers.
    #[instrument(name = "open", level = "info", skip_all)]
    pub fn open(store: &'a mut S, clipboard: &'a mut C, services: Services) -> Self {
        let mut controller = Self::new(store, clipboard, services);
        match store::restore(&*controller.store) {
            Ok(Some(result)) => {
                info!("Restored {} results for {}", result.subdomains.len(), result.domain);
                controller.domain_input = result.domain;
                controller.display(&result.subdomains);
                controller.status = format!("Restored {} results.", controller.rows.len());
            }
            Ok(None) => debug!("Nothing to restore"),
            Err(err) => {
                error!("Restore failed: {}", err);
                controller.status = format!("Error: {}", err);
            }
        }
        controller
    }
}

// endregion:     --- Constructors

// region:        --- Accessors

impl<'a, S: KvStore + ?Sized, C: Clipboard + ?Sized> Controller<'a, S, C> {
    pub fn state(&self) -> State {
        self.state
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn domain_input(&self) -> &str {
        &self.domain_input
    }

    pub fn scan_enabled(&self) -> bool {
        self.scan_enabled
    }

    pub fn copy_enabled(&self) -> bool {
        self.state == State::Displaying && !self.rows.is_empty()
    }

    pub fn clear_visible(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn detecting(&self) -> bool {
        self.pending > 0
    }

    pub fn copy_label(&self) -> &'static str {
        self.copy_label_at(Instant::now())
    }

    pub fn copy_label_at(&self, now: Instant) -> &'static str {
        match self.copied_at {
            Some(at) if now.duration_since(at) < Duration::from_millis(COPY_ACK_MS) => "Copied!",
            _ => "Copy",
        }
    }

    /// Rendered hostnames in display order, one per line.
    pub fn clipboard_payload(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.host.as_str())
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

// endregion:     --- Accessors

// region:        --- Actions

impl<'a, S: KvStore + ?Sized, C: Clipboard + ?Sized> Controller<'a, S, C> {
    /// Runs one scan to completion. `scan_enabled` is false for its whole duration;
    /// the exclusive borrow keeps a second scan from starting in the meantime.
    #[instrument(name = "scan", level = "info", skip(self))]
    pub async fn scan(&mut self, input: &str) {
        let domain = input.trim().to_string();
        self.domain_input = domain.clone();

        if domain.is_empty() {
            self.status = STATUS_EMPTY_INPUT.to_string();
            return;
        }

        self.scan_enabled = false;
        self.state = State::Scanning;
        self.copied_at = None;
        self.reset_table();
        self.status = "Connecting...".to_string();

        if let Err(err) = self.run_scan(&domain).await {
            error!("Scan of {} failed: {}", domain, err);
            self.status = format!("Error: {}", err);
            self.state = State::Idle;
        }

        self.scan_enabled = true;
    }

    async fn run_scan(&mut self, domain: &str) -> Result<()> {
        // the previous result must not survive a new scan, even a failed one
        store::clear(&mut *self.store)?;

        let subdomains = aggregate::enumerate(
            &self.services.http_client,
            &self.services.modules,
            domain,
        )
        .await;

        if subdomains.is_empty() {
            self.status = STATUS_NO_RESULTS.to_string();
            self.state = State::Displaying;
            return Ok(());
        }

        store::save(&mut *self.store, domain, &subdomains)?;
        self.display(&subdomains);
        self.status = format!("Found {} results.", subdomains.len());
        Ok(())
    }

    /// Writes the rendered hostnames to the clipboard. Returns whether anything was copied.
    #[instrument(name = "copy", level = "info", skip_all)]
    pub fn copy(&mut self) -> bool {
        if !self.copy_enabled() {
            debug!("Copy disabled");
            return false;
        }

        let payload = self.clipboard_payload();
        match self.clipboard.write_text(&payload) {
            Ok(()) => {
                self.copied_at = Some(Instant::now());
                true
            }
            Err(err) => {
                error!("Copy failed: {}", err);
                self.status = format!("Error: {}", err);
                false
            }
        }
    }

    #[instrument(name = "clear", level = "info", skip_all)]
    pub fn clear(&mut self) {
        self.reset_table();
        self.domain_input.clear();
        self.copied_at = None;
        self.state = State::Idle;
        self.status = STATUS_READY.to_string();

        if let Err(err) = store::clear(&mut *self.store) {
            error!("Clear failed: {}", err);
            self.status = format!("Error: {}", err);
        }
    }
}

// endregion:     --- Actions

// region:        --- Rows & detection

impl<'a, S: KvStore + ?Sized, C: Clipboard + ?Sized> Controller<'a, S, C> {
    fn reset_table(&mut self) {
        self.generation += 1;
        self.pending = 0;
        self.rows.clear();
    }

    fn display(&mut self, subdomains: &[String]) {
        self.reset_table();
        self.rows = subdomains.iter().map(|host| Row::pending(host)).collect();
        self.state = State::Displaying;

        let Some(detector) = self.services.detector.clone() else {
            for row in &mut self.rows {
                row.cloud = CloudCell::Skipped;
            }
            return;
        };

        for (index, row) in self.rows.iter().enumerate() {
            let detector = detector.clone();
            let updates_tx = self.updates_tx.clone();
            let host = row.host.clone();
            let generation = self.generation;
            tokio::spawn(async move {
                let class = detector.detect(&host).await;
                let _ = updates_tx.send(Detection {
                    generation,
                    index,
                    class,
                });
            });
        }
        self.pending = self.rows.len();
        debug!("{} detections launched", self.pending);
    }

    /// Waits for the next detection of the current table and applies it.
    /// Returns the updated row index, or `None` once every row has settled.
    pub async fn next_update(&mut self) -> Option<usize> {
        while self.pending > 0 {
            let detection = self.updates_rx.recv().await?;
            if detection.generation != self.generation {
                continue;
            }
            self.pending -= 1;
            if let Some(row) = self.rows.get_mut(detection.index) {
                row.cloud = CloudCell::Done(detection.class);
                return Some(detection.index);
            }
        }
        None
    }

    pub async fn settle(&mut self) {
        while self.next_update().await.is_some() {}
    }
}

// endregion:     --- Rows & detection
