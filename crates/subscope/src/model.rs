use crate::cloud::CloudClassification;
use crate::Result;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

// region:        --- Models

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub domain: String,
    pub subdomains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudCell {
    Pending,
    /// Detection turned off for this run.
    Skipped,
    Done(CloudClassification),
}

impl CloudCell {
    pub fn label(&self) -> String {
        match self {
            Self::Pending => "⏳".to_string(),
            Self::Skipped => "-".to_string(),
            Self::Done(class) => class.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub host: String,
    pub cloud: CloudCell,
}

impl Row {
    pub fn pending(host: &str) -> Self {
        Self {
            host: host.to_string(),
            cloud: CloudCell::Pending,
        }
    }

    pub fn link(&self) -> String {
        format!("http://{}", self.host)
    }
}

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    domain: &'a str,
    subdomains: &'a [String],
    count: usize,
}

// endregion:     --- Models

// region:        --- Exporting utils

pub fn export_to_json(result: &ScanResult, path: &Path) -> Result<()> {
    let json = to_string_pretty(&JsonExport {
        domain: &result.domain,
        subdomains: &result.subdomains,
        count: result.subdomains.len(),
    })?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn export_to_text(result: &ScanResult, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(result.subdomains.join("\n").as_bytes())?;
    Ok(())
}

pub fn export_to_markdown(domain: &str, rows: &[Row], path: &Path) -> Result<()> {
    let generated_at = OffsetDateTime::now_utc().format(&Rfc3339)?;

    let mut md_content = String::new();
    writeln!(&mut md_content, "# Subdomains of `{}`", domain)?;
    writeln!(&mut md_content)?;
    writeln!(
        &mut md_content,
        "*{} subdomains, generated at {}. The cloud column is a guess from the `server` header.*",
        rows.len(),
        generated_at
    )?;
    writeln!(&mut md_content)?;
    writeln!(&mut md_content, "| Link | Cloud |")?;
    writeln!(&mut md_content, "| --- | --- |")?;

    for row in rows {
        let cloud = match &row.cloud {
            CloudCell::Done(class) => class.to_string(),
            CloudCell::Pending | CloudCell::Skipped => "-".to_string(),
        };
        writeln!(&mut md_content, "| {} | {} |", row.link(), cloud)?;
    }

    let mut file = File::create(path)?;
    file.write_all(md_content.as_bytes())?;
    Ok(())
}

// endregion:     --- Exporting utils

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn result() -> ScanResult {
        ScanResult {
            domain: "example.com".to_string(),
            subdomains: vec!["a.example.com".to_string(), "b.example.com".to_string()],
        }
    }

    #[test]
    fn json_export_carries_count() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scan.json");

        export_to_json(&result(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["domain"], "example.com");
        assert_eq!(value["subdomains"][1], "b.example.com");
    }

    #[test]
    fn text_export_is_one_host_per_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scan.txt");

        export_to_text(&result(), &path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "a.example.com\nb.example.com"
        );
    }

    #[test]
    fn markdown_export_lists_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scan.md");
        let rows = vec![
            Row {
                host: "a.example.com".to_string(),
                cloud: CloudCell::Done(CloudClassification::Cloudflare),
            },
            Row::pending("b.example.com"),
        ];

        export_to_markdown("example.com", &rows, &path).unwrap();

        let md = fs::read_to_string(&path).unwrap();
        assert!(md.starts_with("# Subdomains of `example.com`"));
        assert!(md.contains("| http://a.example.com | Cloudflare |"));
        assert!(md.contains("| http://b.example.com | - |"));
    }
}
