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

//! Materializer: typed documents become numeric day blocks.
//!
//! Three shapes come out of here. Single-resource rows keep the hour label
//! of each quarter-hour slot and tolerate bad points one at a time. The
//! production matrix and flow vector are fixed-shape and zero-defaulted, so
//! a partially populated document still yields a full day block.

use chrono::{Duration, NaiveDateTime};
use tracing::warn;

use crate::errors::MaterializeError;
use gridharvest_types::{
    HourlyRow, MarketDocument, Period, Resolution, HOURS_PER_DAY, SLOTS_PER_DAY,
};

/// Per-day tally of points the single-resource materializer could not use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DropRecord {
    /// Points dropped entirely for lack of a position.
    pub dropped_points: u32,
    /// Points kept with `NaN` in place of an unparseable quantity.
    pub substituted_quantities: u32,
}

impl DropRecord {
    pub fn is_clean(&self) -> bool {
        self.dropped_points == 0 && self.substituted_quantities == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} dropped, {} substituted",
            self.dropped_points, self.substituted_quantities
        )
    }
}

/// Parse a period start like `2025-01-01T22:00Z` into a naive UTC instant.
fn parse_period_start(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Materialize a single-resource quarter-hour document into stamped rows.
///
/// Each point maps to the hour label `start + (position - 1) / 4` hours,
/// formatted `YYYYMMDDHH`, so the four slots of one hour collapse onto the
/// same label. A point without a position is dropped; a point without a
/// quantity becomes `NaN`. Both are tallied in `drops`. A missing or
/// unparseable period start is fatal for the day: no row could carry a
/// correct timestamp.
pub fn hourly_rows(
    doc: &MarketDocument,
    drops: &mut DropRecord,
) -> Result<Vec<HourlyRow>, MaterializeError> {
    let series = doc.first_series().ok_or(MaterializeError::NoSeries)?;
    let period = series.first_period().ok_or(MaterializeError::NoPeriod)?;
    let start = parse_period_start(&period.interval.start)
        .ok_or_else(|| MaterializeError::MissingStart(period.interval.start.clone()))?;

    let mut rows = Vec::with_capacity(period.points.len());
    for point in &period.points {
        let Some(position) = point.position else {
            drops.dropped_points += 1;
            continue;
        };
        let quantity = match point.quantity {
            Some(q) => q,
            None => {
                drops.substituted_quantities += 1;
                f64::NAN
            }
        };
        let hour_offset = (i64::from(position) - 1).div_euclid(4);
        let stamp = (start + Duration::hours(hour_offset))
            .format("%Y%m%d%H")
            .to_string();
        rows.push(HourlyRow::new(stamp, quantity));
    }
    Ok(rows)
}

fn hourly_quantities(period: &Period) -> [f64; HOURS_PER_DAY] {
    let mut hours = [0.0; HOURS_PER_DAY];
    for point in &period.points {
        let (Some(position), Some(quantity)) = (point.position, point.quantity) else {
            continue;
        };
        let idx = position as usize;
        if (1..=HOURS_PER_DAY).contains(&idx) {
            hours[idx - 1] = quantity;
        }
    }
    hours
}

/// Materialize a per-type generation document into a `96 x T` day block.
///
/// Column order follows `type_codes`. A type with no matching hourly series
/// in the document stays all-zero; this function never fails, a day block
/// always has full shape. Hourly values are replicated into the four
/// quarter-hour slots of their hour.
pub fn production_matrix(doc: &MarketDocument, type_codes: &[String]) -> Vec<Vec<f64>> {
    let mut rows = vec![vec![0.0; type_codes.len()]; SLOTS_PER_DAY];
    for (col, code) in type_codes.iter().enumerate() {
        let Some(series) = doc
            .series
            .iter()
            .find(|series| series.psr_type.as_deref() == Some(code))
        else {
            continue;
        };
        let Some(period) = series.first_period() else {
            continue;
        };
        if period.resolution != Resolution::Hour {
            warn!(
                "⚠️ production type {} reported at {}, expected PT60M, column left at zero",
                code,
                period.resolution.code()
            );
            continue;
        }
        let hours = hourly_quantities(period);
        for (hour, quantity) in hours.iter().enumerate() {
            for sub in 0..4 {
                rows[hour * 4 + sub][col] = *quantity;
            }
        }
    }
    rows
}

/// Materialize a quarter-hour flow document into a 96-slot vector.
///
/// Positions index slots directly; anything missing stays zero. Like the
/// production matrix this never fails.
pub fn flow_vector(doc: &MarketDocument) -> Vec<f64> {
    let mut slots = vec![0.0; SLOTS_PER_DAY];
    let Some(period) = doc.first_series().and_then(|series| series.first_period()) else {
        return slots;
    };
    for point in &period.points {
        let (Some(position), Some(quantity)) = (point.position, point.quantity) else {
            continue;
        };
        let idx = position as usize;
        if (1..=SLOTS_PER_DAY).contains(&idx) {
            slots[idx - 1] = quantity;
        }
    }
    slots
}
