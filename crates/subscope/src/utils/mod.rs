pub mod log;

use crate::Result;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{fs, path::Path};

pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        Ok(false)
    } else {
        fs::create_dir_all(dir)?;
        Ok(true)
    }
}

/// Seconds since the epoch, used to name exports and log files of a run.
pub fn run_id() -> Result<String> {
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    Ok(timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_once() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("output").join("example.com");

        assert!(ensure_dir(&dir).unwrap());
        assert!(!ensure_dir(&dir).unwrap());
        assert!(dir.is_dir());
    }
}
