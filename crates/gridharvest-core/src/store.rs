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

//! CSV persistence for collected arrays.
//!
//! Filenames carry the resource and the date span. A saved single-resource
//! file is named after the span actually collected (first and last row
//! stamps), which can be narrower than the span requested when leading or
//! trailing days were skipped. Lookup for reuse goes by the requested span,
//! so a complete earlier run short-circuits a repeat collection.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use tracing::info;

use gridharvest_types::{ProductionMatrix, SeriesArray, production_type_name};

#[derive(Debug, Clone)]
pub struct ArrayStore {
    dir: PathBuf,
}

impl ArrayStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn series_path(&self, resource: &str, start: &str, end: &str) -> PathBuf {
        let safe = resource.replace([' ', '/'], "_");
        self.dir.join(format!("{safe}_{start}_to_{end}.csv"))
    }

    /// Save single-resource rows, naming the file after the span the rows
    /// actually cover. Returns the path written.
    pub fn save_series(
        &self,
        resource: &str,
        requested_start: NaiveDate,
        requested_end: NaiveDate,
        rows: &SeriesArray,
    ) -> anyhow::Result<PathBuf> {
        let start = rows
            .first()
            .and_then(|row| stamp_date(&row.stamp))
            .unwrap_or_else(|| requested_start.to_string());
        let end = rows
            .last()
            .and_then(|row| stamp_date(&row.stamp))
            .unwrap_or_else(|| requested_end.to_string());
        let path = self.series_path(resource, &start, &end);

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        writer.write_record(["timestamp", "quantity_mw"])?;
        for row in rows {
            let quantity = row.quantity.to_string();
            writer.write_record([row.stamp.as_str(), quantity.as_str()])?;
        }
        writer.flush()?;
        info!("💾 saved {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    /// Load a previously saved series for exactly the requested span.
    /// `Ok(None)` when no such file exists.
    pub fn load_series(
        &self,
        resource: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Option<SeriesArray>> {
        let path = self.series_path(resource, &start.to_string(), &end.to_string());
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        let mut rows = SeriesArray::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("reading {}", path.display()))?;
            let stamp = record.get(0).unwrap_or_default().to_owned();
            let quantity: f64 = record
                .get(1)
                .unwrap_or_default()
                .parse()
                .with_context(|| format!("bad quantity in {}", path.display()))?;
            rows.push(gridharvest_types::HourlyRow::new(stamp, quantity));
        }
        info!("📂 reusing {} rows from {}", rows.len(), path.display());
        Ok(Some(rows))
    }

    /// Save a fixed-shape matrix (production columns or stacked flows) under
    /// the given file stem.
    pub fn save_matrix(
        &self,
        file_stem: &str,
        column_headers: &[String],
        rows: &ProductionMatrix,
    ) -> anyhow::Result<PathBuf> {
        let path = self.dir.join(format!("{file_stem}.csv"));
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        writer.write_record(column_headers)?;
        for row in rows {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        info!("💾 saved {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    /// Write the human-readable column legend next to a production matrix.
    pub fn write_explanation(&self, type_codes: &[String]) -> anyhow::Result<PathBuf> {
        let path = self.dir.join("production_types_explanation.txt");
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let mut lines = String::from("Columns of the production matrix, left to right:\n");
        for (i, code) in type_codes.iter().enumerate() {
            let name = production_type_name(code).unwrap_or("unknown type");
            lines.push_str(&format!("column {i}: {code} = {name}\n"));
        }
        std::fs::write(&path, lines).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// `YYYYMMDDHH` row stamp to `YYYY-MM-DD`.
fn stamp_date(stamp: &str) -> Option<String> {
    let day = stamp.get(..8)?;
    NaiveDate::parse_from_str(day, "%Y%m%d")
        .ok()
        .map(|d| d.to_string())
}
