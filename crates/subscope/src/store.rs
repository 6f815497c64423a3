use crate::model::ScanResult;
use crate::utils::ensure_dir;
use crate::Result;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SAVED_RESULTS: &str = "savedResults";
pub const SAVED_DOMAIN: &str = "savedDomain";

// region:        --- Key-value store

pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, entries: Vec<(&str, Value)>) -> Result<()>;
    fn remove(&mut self, keys: &[&str]) -> Result<()>;
}

/// A JSON object on disk, rewritten after each mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.is_file() {
            let content = fs::read_to_string(path)?;
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(entries)) => entries,
                Ok(_) | Err(_) => {
                    warn!("Ignoring unreadable store at {}", path.display());
                    Map::new()
                }
            }
        } else {
            Map::new()
        };
        debug!("Store opened at {} ({} keys)", path.display(), entries.len());

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            ensure_dir(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, entries: Vec<(&str, Value)>) -> Result<()> {
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value);
        }
        self.flush()
    }

    fn remove(&mut self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.entries.remove(*key);
        }
        self.flush()
    }
}

// endregion:     --- Key-value store

// region:        --- Scan persistence

pub fn save<S: KvStore + ?Sized>(store: &mut S, domain: &str, subdomains: &[String]) -> Result<()> {
    store.set(vec![
        (SAVED_RESULTS, serde_json::to_value(subdomains)?),
        (SAVED_DOMAIN, Value::String(domain.to_string())),
    ])
}

/// The last scan, if it holds at least one subdomain.
pub fn restore<S: KvStore + ?Sized>(store: &S) -> Result<Option<ScanResult>> {
    let subdomains: Vec<String> = match store.get(SAVED_RESULTS)? {
        Some(value) => serde_json::from_value(value)?,
        None => return Ok(None),
    };
    if subdomains.is_empty() {
        return Ok(None);
    }

    let domain = match store.get(SAVED_DOMAIN)? {
        Some(Value::String(domain)) => domain,
        _ => String::new(),
    };

    Ok(Some(ScanResult { domain, subdomains }))
}

pub fn clear<S: KvStore + ?Sized>(store: &mut S) -> Result<()> {
    store.remove(&[SAVED_RESULTS, SAVED_DOMAIN])
}

// endregion:     --- Scan persistence

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::HashMap;

    /// In-memory store counting writes.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        pub entries: HashMap<String, Value>,
        pub writes: usize,
    }

    impl KvStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<Value>> {
            Ok(self.entries.get(key).cloned())
        }

        fn set(&mut self, entries: Vec<(&str, Value)>) -> Result<()> {
            self.writes += 1;
            for (key, value) in entries {
                self.entries.insert(key.to_string(), value);
            }
            Ok(())
        }

        fn remove(&mut self, keys: &[&str]) -> Result<()> {
            for key in keys {
                self.entries.remove(*key);
            }
            Ok(())
        }
    }
}
