//! JSON report files for dataset summaries and selection results.

use crate::error::Result;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Writes serializable reports as pretty JSON files into one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write `report` to `<output_dir>/<base_name>_report.json`.
    pub fn write<T: Serialize>(&self, report: &T, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports"));
        let path = writer
            .write(&serde_json::json!({"rows": 3}), "advertising")
            .unwrap();

        assert!(path.ends_with("advertising_report.json"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("\"rows\": 3"));
    }
}
