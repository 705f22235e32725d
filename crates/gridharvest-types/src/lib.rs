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

pub mod document;
pub mod psr;
pub mod rows;

// Re-export common types for convenience
pub use document::{
    DocumentHeader, MarketDocument, Period, Point, Resolution, TimeInterval, TimeSeries,
};
pub use psr::{all_production_type_codes, production_type_name};
pub use rows::{HOURS_PER_DAY, HourlyRow, ProductionMatrix, SLOTS_PER_DAY, SeriesArray};
