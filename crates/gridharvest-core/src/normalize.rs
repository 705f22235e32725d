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

//! Resolution normalizer: hourly periods become quarter-hour periods by
//! zero-order hold, so downstream stages only ever see PT15M data.

use gridharvest_types::{MarketDocument, Point, Resolution};

/// Expand every PT60M period in the document to PT15M in place.
///
/// Each hourly point with a quantity becomes four consecutive quarter-hour
/// points carrying the same quantity. Positions are renumbered from 1 in
/// encounter order; a point without a quantity contributes nothing and does
/// not advance the numbering. Periods already at PT15M, and periods at any
/// other resolution, pass through untouched.
pub fn pad_hourly_to_quarter(mut doc: MarketDocument) -> MarketDocument {
    for series in &mut doc.series {
        for period in &mut series.periods {
            if period.resolution != Resolution::Hour {
                continue;
            }
            period.resolution = Resolution::QuarterHour;
            let hourly = std::mem::take(&mut period.points);
            let mut position = 1u32;
            for point in hourly {
                let Some(quantity) = point.quantity else {
                    continue;
                };
                for _ in 0..4 {
                    period.points.push(Point {
                        position: Some(position),
                        quantity: Some(quantity),
                    });
                    position += 1;
                }
            }
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridharvest_types::{Period, TimeSeries};

    fn doc_with_period(resolution: Resolution, points: Vec<Point>) -> MarketDocument {
        MarketDocument {
            root_tag: "GL_MarketDocument".to_owned(),
            series: vec![TimeSeries {
                periods: vec![Period {
                    resolution,
                    points,
                    ..Period::default()
                }],
                ..TimeSeries::default()
            }],
            ..MarketDocument::default()
        }
    }

    fn pt(position: u32, quantity: f64) -> Point {
        Point {
            position: Some(position),
            quantity: Some(quantity),
        }
    }

    #[test]
    fn test_hourly_period_expands_fourfold() {
        let doc = doc_with_period(Resolution::Hour, vec![pt(1, 100.0), pt(2, 250.5)]);
        let padded = pad_hourly_to_quarter(doc);

        let period = &padded.series[0].periods[0];
        assert_eq!(period.resolution, Resolution::QuarterHour);
        assert_eq!(period.points.len(), 8);
        for (i, point) in period.points.iter().enumerate() {
            assert_eq!(point.position, Some(i as u32 + 1));
        }
        assert!(period.points[..4].iter().all(|p| p.quantity == Some(100.0)));
        assert!(period.points[4..].iter().all(|p| p.quantity == Some(250.5)));
    }

    #[test]
    fn test_point_without_quantity_is_dropped_and_numbering_stays_dense() {
        let doc = doc_with_period(
            Resolution::Hour,
            vec![
                pt(1, 10.0),
                Point {
                    position: Some(2),
                    quantity: None,
                },
                pt(3, 30.0),
            ],
        );
        let padded = pad_hourly_to_quarter(doc);

        let period = &padded.series[0].periods[0];
        assert_eq!(period.points.len(), 8);
        assert_eq!(period.points[3].position, Some(4));
        assert_eq!(period.points[4].position, Some(5));
        assert_eq!(period.points[4].quantity, Some(30.0));
    }

    #[test]
    fn test_quarter_hour_period_passes_through() {
        let original = doc_with_period(Resolution::QuarterHour, vec![pt(1, 5.0), pt(2, 6.0)]);
        let padded = pad_hourly_to_quarter(original.clone());
        assert_eq!(padded, original);
    }

    #[test]
    fn test_other_resolution_passes_through() {
        let original = doc_with_period(Resolution::Other("PT30M".to_owned()), vec![pt(1, 5.0)]);
        let padded = pad_hourly_to_quarter(original.clone());
        assert_eq!(padded, original);
    }
}
