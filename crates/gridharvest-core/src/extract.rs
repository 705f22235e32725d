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

//! Single-resource extractor: reduce a multi-series document to the one
//! series matching a production unit or production type.

use gridharvest_types::{MarketDocument, TimeSeries};

/// Identifies the resource to pull out of a day document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKey {
    /// Match on the unit name under `MktPSRType/PowerSystemResources/name`,
    /// exact and case-sensitive.
    PsrName(String),
    /// Match on the `psrType` B-code, e.g. `B18`.
    PsrType(String),
}

impl ResourceKey {
    pub fn label(&self) -> &str {
        match self {
            ResourceKey::PsrName(name) => name,
            ResourceKey::PsrType(code) => code,
        }
    }

    fn matches(&self, series: &TimeSeries) -> bool {
        match self {
            ResourceKey::PsrName(name) => series.psr_name.as_deref() == Some(name),
            ResourceKey::PsrType(code) => series.psr_type.as_deref() == Some(code),
        }
    }
}

/// Build a new single-series document for the first series matching `key`.
///
/// The header, root tag and namespace of the source document are carried
/// over verbatim. Returns `None` when no series matches; absence of one
/// resource on one day is expected and not an error.
pub fn extract_resource(doc: &MarketDocument, key: &ResourceKey) -> Option<MarketDocument> {
    let matched = doc.series.iter().find(|series| key.matches(series))?;
    Some(MarketDocument {
        root_tag: doc.root_tag.clone(),
        namespace: doc.namespace.clone(),
        header: doc.header.clone(),
        series: vec![matched.clone()],
    })
}
