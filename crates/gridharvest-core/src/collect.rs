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

//! Range collector: drives the fetch-parse-materialize pipeline over an
//! inclusive date range, one market day at a time.
//!
//! A failed day never aborts the range. Single-resource collection simply
//! omits the day and records it in the skip log; the fixed-shape matrix and
//! flow collections substitute a zero-filled day block instead, so their
//! output shape stays `96 * days` regardless of what the API did.

use chrono::NaiveDate;
use tracing::info;

use crate::errors::SkipReason;
use crate::extract::{ResourceKey, extract_resource};
use crate::fetch::{Clock, DayFetch, DayQuery, Fetcher, SystemClock};
use crate::materialize::{DropRecord, flow_vector, hourly_rows, production_matrix};
use crate::normalize::pad_hourly_to_quarter;
use crate::skiplog::SkipLog;
use crate::xml::parse_document;
use gridharvest_types::{ProductionMatrix, SeriesArray, SLOTS_PER_DAY};

#[derive(Debug)]
pub struct RangeCollector<C: Clock = SystemClock> {
    fetcher: Fetcher<C>,
    skip_log: SkipLog,
}

impl<C: Clock> RangeCollector<C> {
    pub fn new(fetcher: Fetcher<C>, skip_log: SkipLog) -> Self {
        Self { fetcher, skip_log }
    }

    /// Collect one resource's quarter-hour rows over `[start, end]`.
    ///
    /// Skipped days leave no rows behind, only a skip-log entry. Returns
    /// `None` when every day of the range was skipped.
    pub fn collect_resource_range(
        &mut self,
        query: &DayQuery,
        key: &ResourceKey,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Option<SeriesArray> {
        let mut rows = SeriesArray::new();
        let mut produced = 0u32;
        for day in days(start, end) {
            match self.resource_day(query, key, day) {
                Ok(day_rows) => {
                    rows.extend(day_rows);
                    produced += 1;
                }
                Err(reason) => self.skip_log.record(key.label(), day, &reason.to_string()),
            }
            self.fetcher.politeness_pause();
        }
        info!(
            "✅ {}: {} rows from {} days ({} to {})",
            key.label(),
            rows.len(),
            produced,
            start,
            end
        );
        if rows.is_empty() { None } else { Some(rows) }
    }

    /// Collect the per-type generation matrix over `[start, end]`.
    ///
    /// The output always has `96 * days` rows and one column per code in
    /// `type_codes`; a skipped day contributes a zero block and a skip-log
    /// entry.
    pub fn collect_production_range(
        &mut self,
        query: &DayQuery,
        type_codes: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ProductionMatrix {
        let mut matrix = ProductionMatrix::new();
        for day in days(start, end) {
            match self.production_day(query, type_codes, day) {
                Ok(block) => matrix.extend(block),
                Err(reason) => {
                    self.skip_log.record(&query.label(), day, &reason.to_string());
                    matrix.extend(vec![vec![0.0; type_codes.len()]; SLOTS_PER_DAY]);
                }
            }
            self.fetcher.politeness_pause();
        }
        info!(
            "✅ production matrix {}: {} rows x {} types",
            query.label(),
            matrix.len(),
            type_codes.len()
        );
        matrix
    }

    /// Collect one directional flow as a flat quarter-hour vector over
    /// `[start, end]`, `96 * days` values, zeros where a day was skipped.
    pub fn collect_flow_range(
        &mut self,
        query: &DayQuery,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<f64> {
        let mut slots = Vec::new();
        for day in days(start, end) {
            match self.flow_day(query, day) {
                Ok(day_slots) => slots.extend(day_slots),
                Err(reason) => {
                    self.skip_log.record(&query.label(), day, &reason.to_string());
                    slots.extend(vec![0.0; SLOTS_PER_DAY]);
                }
            }
            self.fetcher.politeness_pause();
        }
        info!("✅ flow {}: {} slots", query.label(), slots.len());
        slots
    }

    fn fetch_body(&mut self, query: &DayQuery, day: NaiveDate) -> Result<String, SkipReason> {
        match self.fetcher.fetch_day(query, day) {
            DayFetch::Fetched(body) => Ok(body),
            DayFetch::Skipped(reason) => Err(reason),
        }
    }

    fn resource_day(
        &mut self,
        query: &DayQuery,
        key: &ResourceKey,
        day: NaiveDate,
    ) -> Result<SeriesArray, SkipReason> {
        let body = self.fetch_body(query, day)?;
        let doc =
            parse_document(&body).map_err(|e| SkipReason::Document(e.to_string()))?;
        let doc = pad_hourly_to_quarter(doc);
        let extracted = extract_resource(&doc, key).ok_or(SkipReason::ResourceNotFound)?;
        let mut drops = DropRecord::default();
        let rows = hourly_rows(&extracted, &mut drops)
            .map_err(|e| SkipReason::Materialize(e.to_string()))?;
        // A degraded day still contributes rows but must leave a durable
        // trace, the skip log is the only audit trail of quality loss.
        if !drops.is_clean() {
            self.skip_log
                .record(key.label(), day, &format!("degraded: {}", drops.summary()));
        }
        Ok(rows)
    }

    fn production_day(
        &mut self,
        query: &DayQuery,
        type_codes: &[String],
        day: NaiveDate,
    ) -> Result<Vec<Vec<f64>>, SkipReason> {
        let body = self.fetch_body(query, day)?;
        let doc =
            parse_document(&body).map_err(|e| SkipReason::Document(e.to_string()))?;
        Ok(production_matrix(&doc, type_codes))
    }

    fn flow_day(&mut self, query: &DayQuery, day: NaiveDate) -> Result<Vec<f64>, SkipReason> {
        let body = self.fetch_body(query, day)?;
        let doc =
            parse_document(&body).map_err(|e| SkipReason::Document(e.to_string()))?;
        let doc = pad_hourly_to_quarter(doc);
        Ok(flow_vector(&doc))
    }
}

/// Inclusive day iterator.
fn days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |day| day.succ_opt()).take_while(move |day| *day <= end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetcherConfig;
    use crate::fetch::tests::FakeClock;
    use crate::xml::write_document;
    use gridharvest_types::{
        MarketDocument, Period, Point, Resolution, TimeInterval, TimeSeries,
    };
    use mockito::Matcher;

    const GL_NAMESPACE: &str = "urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0";
    const PUB_NAMESPACE: &str =
        "urn:iec62325.351:tc57wg16:451-3:publicationdocument:7:0";

    fn pt(position: u32, quantity: f64) -> Point {
        Point {
            position: Some(position),
            quantity: Some(quantity),
        }
    }

    fn unit_day_body(start: &str, end: &str, quantity: f64) -> String {
        let doc = MarketDocument {
            root_tag: "GL_MarketDocument".to_owned(),
            namespace: GL_NAMESPACE.to_owned(),
            series: vec![TimeSeries {
                psr_name: Some("Anholt".to_owned()),
                psr_type: Some("B18".to_owned()),
                periods: vec![Period {
                    resolution: Resolution::Hour,
                    interval: TimeInterval {
                        start: start.to_owned(),
                        end: end.to_owned(),
                    },
                    points: vec![pt(1, quantity), pt(2, quantity + 1.0)],
                }],
                ..TimeSeries::default()
            }],
            ..MarketDocument::default()
        };
        write_document(&doc).unwrap()
    }

    fn flow_day_body(start: &str, end: &str) -> String {
        let doc = MarketDocument {
            root_tag: "Publication_MarketDocument".to_owned(),
            namespace: PUB_NAMESPACE.to_owned(),
            series: vec![TimeSeries {
                in_domain: Some("10YDK-1--------W".to_owned()),
                out_domain: Some("10Y1001A1001A82H".to_owned()),
                periods: vec![Period {
                    resolution: Resolution::QuarterHour,
                    interval: TimeInterval {
                        start: start.to_owned(),
                        end: end.to_owned(),
                    },
                    points: vec![pt(1, 700.0), pt(96, 650.0)],
                }],
                ..TimeSeries::default()
            }],
            ..MarketDocument::default()
        };
        write_document(&doc).unwrap()
    }

    fn collector(base_url: String, skip_log: SkipLog) -> RangeCollector<FakeClock> {
        let config = FetcherConfig {
            base_url,
            token: "test-token".to_owned(),
            max_retries: 1,
            ..FetcherConfig::default()
        };
        let fetcher = Fetcher::with_clock(config, FakeClock::new()).unwrap();
        RangeCollector::new(fetcher, skip_log)
    }

    fn mock_day(
        server: &mut mockito::Server,
        period_start: &str,
        status: usize,
        body: &str,
    ) -> mockito::Mock {
        server
            .mock("GET", "/api")
            .match_query(Matcher::UrlEncoded(
                "periodStart".to_owned(),
                period_start.to_owned(),
            ))
            .with_status(status)
            .with_body(body)
            .create()
    }

    #[test]
    fn test_failed_day_is_skipped_and_logged_but_range_continues() {
        let mut server = mockito::Server::new();
        mock_day(
            &mut server,
            "202501012200",
            200,
            &unit_day_body("2025-01-01T22:00Z", "2025-01-02T22:00Z", 100.0),
        );
        mock_day(&mut server, "202501022200", 500, "boom");
        mock_day(
            &mut server,
            "202501032200",
            200,
            &unit_day_body("2025-01-03T22:00Z", "2025-01-04T22:00Z", 300.0),
        );

        let dir = tempfile::tempdir().unwrap();
        let skip_log = SkipLog::new(dir.path().join("skips.log"));
        let mut collector = collector(format!("{}/api", server.url()), skip_log.clone());

        let query = DayQuery::generation_per_unit("10Y1001A1001A796");
        let key = ResourceKey::PsrName("Anholt".to_owned());
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let rows = collector
            .collect_resource_range(&query, &key, start, end)
            .unwrap();

        // Two hourly points per good day, each padded to four slots.
        assert_eq!(rows.len(), 16);
        assert!(rows[..8].iter().all(|r| r.stamp.starts_with("202501")));
        assert_eq!(rows[0].stamp, "2025010122");
        assert_eq!(rows[0].quantity, 100.0);
        assert_eq!(rows[8].stamp, "2025010322");
        assert_eq!(rows[8].quantity, 300.0);

        let log = std::fs::read_to_string(skip_log.path()).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\tAnholt\t2025-01-02\tHTTP 500"));
    }

    #[test]
    fn test_collection_is_idempotent() {
        let mut server = mockito::Server::new();
        mock_day(
            &mut server,
            "202501012200",
            200,
            &unit_day_body("2025-01-01T22:00Z", "2025-01-02T22:00Z", 42.0),
        );

        let dir = tempfile::tempdir().unwrap();
        let skip_log = SkipLog::new(dir.path().join("skips.log"));
        let mut collector = collector(format!("{}/api", server.url()), skip_log);

        let query = DayQuery::generation_per_unit("10Y1001A1001A796");
        let key = ResourceKey::PsrName("Anholt".to_owned());
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let first = collector.collect_resource_range(&query, &key, day, day);
        let second = collector.collect_resource_range(&query, &key, day, day);
        assert_eq!(first, second);
        assert!(format!("{collector:?}").contains("RangeCollector"));
    }

    #[test]
    fn test_degraded_day_keeps_rows_and_is_audited() {
        let degraded_doc = MarketDocument {
            root_tag: "GL_MarketDocument".to_owned(),
            namespace: GL_NAMESPACE.to_owned(),
            series: vec![TimeSeries {
                psr_name: Some("Anholt".to_owned()),
                periods: vec![Period {
                    resolution: Resolution::QuarterHour,
                    interval: TimeInterval {
                        start: "2025-01-01T22:00Z".to_owned(),
                        end: "2025-01-02T22:00Z".to_owned(),
                    },
                    points: vec![
                        pt(1, 100.0),
                        Point {
                            position: None,
                            quantity: Some(60.0),
                        },
                        Point {
                            position: Some(3),
                            quantity: None,
                        },
                    ],
                }],
                ..TimeSeries::default()
            }],
            ..MarketDocument::default()
        };
        let mut server = mockito::Server::new();
        mock_day(
            &mut server,
            "202501012200",
            200,
            &write_document(&degraded_doc).unwrap(),
        );

        let dir = tempfile::tempdir().unwrap();
        let skip_log = SkipLog::new(dir.path().join("skips.log"));
        let mut collector = collector(format!("{}/api", server.url()), skip_log.clone());

        let query = DayQuery::generation_per_unit("10Y1001A1001A796");
        let key = ResourceKey::PsrName("Anholt".to_owned());
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let rows = collector
            .collect_resource_range(&query, &key, day, day)
            .unwrap();

        // The day still yields its usable rows.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].quantity, 100.0);
        assert!(rows[1].quantity.is_nan());

        // And leaves a durable trace of what was lost.
        let log = std::fs::read_to_string(skip_log.path()).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\tAnholt\t2025-01-01\tdegraded: 1 dropped, 1 substituted"));
    }

    #[test]
    fn test_resource_missing_from_day_document() {
        let mut server = mockito::Server::new();
        mock_day(
            &mut server,
            "202501012200",
            200,
            &unit_day_body("2025-01-01T22:00Z", "2025-01-02T22:00Z", 100.0),
        );

        let dir = tempfile::tempdir().unwrap();
        let skip_log = SkipLog::new(dir.path().join("skips.log"));
        let mut collector = collector(format!("{}/api", server.url()), skip_log.clone());

        let query = DayQuery::generation_per_unit("10Y1001A1001A796");
        let key = ResourceKey::PsrName("Kriegers Flak".to_owned());
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let rows = collector.collect_resource_range(&query, &key, day, day);

        assert!(rows.is_none());
        let log = std::fs::read_to_string(skip_log.path()).unwrap();
        assert!(log.contains("resource not present"));
    }

    #[test]
    fn test_unparseable_body_is_skipped() {
        let mut server = mockito::Server::new();
        mock_day(&mut server, "202501012200", 200, "<html>maintenance</html");

        let dir = tempfile::tempdir().unwrap();
        let skip_log = SkipLog::new(dir.path().join("skips.log"));
        let mut collector = collector(format!("{}/api", server.url()), skip_log.clone());

        let query = DayQuery::generation_per_unit("10Y1001A1001A796");
        let key = ResourceKey::PsrName("Anholt".to_owned());
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        assert!(collector.collect_resource_range(&query, &key, day, day).is_none());
        let log = std::fs::read_to_string(skip_log.path()).unwrap();
        assert!(log.contains("document error"));
    }

    #[test]
    fn test_production_matrix_zero_fills_failed_days() {
        let mut server = mockito::Server::new();
        let type_doc = MarketDocument {
            root_tag: "GL_MarketDocument".to_owned(),
            namespace: GL_NAMESPACE.to_owned(),
            series: vec![TimeSeries {
                psr_type: Some("B16".to_owned()),
                periods: vec![Period {
                    resolution: Resolution::Hour,
                    interval: TimeInterval {
                        start: "2025-01-01T22:00Z".to_owned(),
                        end: "2025-01-02T22:00Z".to_owned(),
                    },
                    points: vec![pt(1, 10.0)],
                }],
                ..TimeSeries::default()
            }],
            ..MarketDocument::default()
        };
        mock_day(
            &mut server,
            "202501012200",
            200,
            &write_document(&type_doc).unwrap(),
        );
        mock_day(&mut server, "202501022200", 404, "no data");

        let dir = tempfile::tempdir().unwrap();
        let skip_log = SkipLog::new(dir.path().join("skips.log"));
        let mut collector = collector(format!("{}/api", server.url()), skip_log.clone());

        let query = DayQuery::generation_per_type("10Y1001A1001A796");
        let codes = vec!["B16".to_owned(), "B18".to_owned()];
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let matrix = collector.collect_production_range(&query, &codes, start, end);

        assert_eq!(matrix.len(), 192);
        assert_eq!(matrix[0], vec![10.0, 0.0]);
        assert_eq!(matrix[3], vec![10.0, 0.0]);
        assert_eq!(matrix[4], vec![0.0, 0.0]);
        // Day two is a zero block.
        assert!(matrix[96..].iter().all(|row| row == &vec![0.0, 0.0]));

        let log = std::fs::read_to_string(skip_log.path()).unwrap();
        assert!(log.contains("HTTP 404"));
    }

    #[test]
    fn test_flow_range_collects_and_zero_fills() {
        let mut server = mockito::Server::new();
        mock_day(
            &mut server,
            "202501012200",
            200,
            &flow_day_body("2025-01-01T22:00Z", "2025-01-02T22:00Z"),
        );
        mock_day(&mut server, "202501022200", 500, "boom");

        let dir = tempfile::tempdir().unwrap();
        let skip_log = SkipLog::new(dir.path().join("skips.log"));
        let mut collector = collector(format!("{}/api", server.url()), skip_log.clone());

        let query = DayQuery::physical_flow("10Y1001A1001A82H", "10YDK-1--------W");
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let slots = collector.collect_flow_range(&query, start, end);

        assert_eq!(slots.len(), 192);
        assert_eq!(slots[0], 700.0);
        assert_eq!(slots[95], 650.0);
        assert!(slots[96..].iter().all(|v| *v == 0.0));

        let log = std::fs::read_to_string(skip_log.path()).unwrap();
        assert!(log.contains("10Y1001A1001A82H->10YDK-1--------W\t2025-01-02\tHTTP 500"));
    }
}
