// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridHarvest.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Append-only audit log of skipped and degraded days.
//!
//! One tab-separated line per entry: wall-clock time, resource, market day,
//! reason. A failure to write the log is itself only logged, the audit
//! trail must never take the collection run down with it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct SkipLog {
    path: PathBuf,
}

impl SkipLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one skipped or degraded day, both to the log file and to the
    /// live log.
    pub fn record(&self, resource: &str, day: NaiveDate, reason: &str) {
        warn!("⏭️ {} on {}: {}", resource, day, reason);
        let line = format!(
            "{}\t{}\t{}\t{}\n",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            resource,
            day,
            reason
        );
        if let Err(e) = self.append(&line) {
            warn!("⚠️ could not write skip log {}: {}", self.path.display(), e);
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_one_line_per_skip() {
        let dir = tempfile::tempdir().unwrap();
        let log = SkipLog::new(dir.path().join("skipped_days.log"));
        let day1 = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();

        log.record("Anholt", day1, "HTTP 500");
        log.record("Anholt", day2, "empty response body");

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\tAnholt\t2025-01-02\tHTTP 500"));
        assert!(lines[1].contains("\tAnholt\t2025-01-03\tempty response body"));
    }

    #[test]
    fn test_parent_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let log = SkipLog::new(dir.path().join("nested/audit/skips.log"));
        log.record("B16", NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), "HTTP 404");
        assert!(log.path().exists());
    }
}
