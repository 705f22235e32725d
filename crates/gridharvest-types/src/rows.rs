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

//! Output row shapes shared by the materializer, collector and array store.

use serde::{Deserialize, Serialize};

/// 15-minute slots in one collected day.
pub const SLOTS_PER_DAY: usize = 96;

/// Hourly points in one collected day.
pub const HOURS_PER_DAY: usize = 24;

/// One materialized single-resource row.
///
/// `stamp` is the absolute hour label `YYYYMMDDHH` of the slot; all four
/// quarter-hour slots of an hour share the same label. A substituted
/// (unparseable) quantity is `f64::NAN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRow {
    pub stamp: String,
    pub quantity: f64,
}

impl HourlyRow {
    pub fn new(stamp: impl Into<String>, quantity: f64) -> Self {
        Self {
            stamp: stamp.into(),
            quantity,
        }
    }
}

/// Concatenated single-resource output across a date range.
pub type SeriesArray = Vec<HourlyRow>;

/// Fixed-shape multi-type output: `96 * days` rows, one column per requested
/// production type, zero-filled where data was absent.
pub type ProductionMatrix = Vec<Vec<f64>>;
