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

//! Typed model of an ENTSO-E market document.
//!
//! The model is validated once when the XML is parsed: point positions and
//! quantities that fail to parse are `None` from that moment on, so the
//! pipeline stages never have to re-check raw text. Only the fields some
//! stage actually reads are kept; everything else in the wire document is
//! dropped at parse time.

use serde::{Deserialize, Serialize};

/// ISO-8601 resolution code of a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// `PT15M`
    QuarterHour,
    /// `PT60M`
    Hour,
    /// Any other code, carried through untouched.
    Other(String),
}

impl Resolution {
    pub fn from_code(code: &str) -> Self {
        match code {
            "PT15M" => Resolution::QuarterHour,
            "PT60M" => Resolution::Hour,
            other => Resolution::Other(other.to_owned()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Resolution::QuarterHour => "PT15M",
            Resolution::Hour => "PT60M",
            Resolution::Other(code) => code,
        }
    }
}

/// A raw ISO interval as it appears on the wire.
///
/// The start instant is kept as a string here; the materializer is the one
/// stage that needs it as an actual timestamp and owns that failure mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

/// One sampling point: 1-based slot position plus average power in MW.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub position: Option<u32>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub resolution: Resolution,
    pub interval: TimeInterval,
    pub points: Vec<Point>,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Other(String::new())
    }
}

/// One time series within a market document, tagged by the resource it
/// belongs to (a named PSR, a production-type code, or a domain pair).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub mrid: Option<String>,
    pub business_type: Option<String>,
    pub in_domain: Option<String>,
    pub out_domain: Option<String>,
    pub psr_type: Option<String>,
    pub psr_name: Option<String>,
    pub measure_unit: Option<String>,
    pub curve_type: Option<String>,
    pub periods: Vec<Period>,
}

impl TimeSeries {
    pub fn first_period(&self) -> Option<&Period> {
        self.periods.first()
    }
}

/// Document-level header, carried forward verbatim by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub mrid: Option<String>,
    pub revision_number: Option<String>,
    pub doc_type: Option<String>,
    pub process_type: Option<String>,
    pub sender_mrid: Option<String>,
    pub sender_role: Option<String>,
    pub receiver_mrid: Option<String>,
    pub receiver_role: Option<String>,
    pub created: Option<String>,
    pub interval: Option<TimeInterval>,
}

/// A parsed market document. `root_tag` and `namespace` are whatever the
/// input carried (GL_MarketDocument for generation, Publication_MarketDocument
/// for flows) and are reproduced on output so namespace-aware consumers can
/// re-parse what we emit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDocument {
    pub root_tag: String,
    pub namespace: String,
    pub header: DocumentHeader,
    pub series: Vec<TimeSeries>,
}

impl MarketDocument {
    pub fn first_series(&self) -> Option<&TimeSeries> {
        self.series.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_codes_round_trip() {
        assert_eq!(Resolution::from_code("PT15M"), Resolution::QuarterHour);
        assert_eq!(Resolution::from_code("PT60M"), Resolution::Hour);
        assert_eq!(
            Resolution::from_code("P1D"),
            Resolution::Other("P1D".to_owned())
        );

        assert_eq!(Resolution::QuarterHour.code(), "PT15M");
        assert_eq!(Resolution::Hour.code(), "PT60M");
        assert_eq!(Resolution::Other("P1D".to_owned()).code(), "P1D");
    }

    #[test]
    fn test_first_series_and_period() {
        let doc = MarketDocument {
            series: vec![
                TimeSeries {
                    psr_name: Some("Anholt".to_owned()),
                    periods: vec![Period::default()],
                    ..TimeSeries::default()
                },
                TimeSeries::default(),
            ],
            ..MarketDocument::default()
        };

        let series = doc.first_series().unwrap();
        assert_eq!(series.psr_name.as_deref(), Some("Anholt"));
        assert!(series.first_period().is_some());
    }
}
