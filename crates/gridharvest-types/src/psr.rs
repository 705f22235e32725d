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

//! ENTSO-E production-type (PSR type) codes.
//!
//! The table order defines the default column order of production matrices,
//! so it is part of the output contract; do not re-sort it.

/// Code → display name, fossil fuels first, then renewables, then
/// storage/other.
pub const PRODUCTION_TYPES: &[(&str, &str)] = &[
    ("B02", "Fossil Brown coal/Lignite"),
    ("B03", "Fossil Coal-derived gas"),
    ("B04", "Fossil Gas"),
    ("B05", "Fossil Hard coal"),
    ("B06", "Fossil Oil"),
    ("B07", "Fossil Oil shale"),
    ("B08", "Fossil Peat"),
    ("B01", "Biomass"),
    ("B09", "Geothermal"),
    ("B11", "Hydro Run-of-river and poundage"),
    ("B12", "Hydro Water Reservoir"),
    ("B13", "Marine"),
    ("B15", "Other renewable"),
    ("B16", "Solar"),
    ("B18", "Wind Offshore"),
    ("B19", "Wind Onshore"),
    ("B10", "Hydro Pumped Storage"),
    ("B14", "Nuclear"),
    ("B17", "Waste"),
    ("B20", "Other"),
    ("B25", "Energy storage"),
];

/// Display name for a production-type code, if known.
pub fn production_type_name(code: &str) -> Option<&'static str> {
    PRODUCTION_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// All known codes in table (column) order.
pub fn all_production_type_codes() -> Vec<String> {
    PRODUCTION_TYPES
        .iter()
        .map(|(code, _)| (*code).to_owned())
        .collect()
}
