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

//! Error types for the collection pipeline.
//!
//! Failures are contained at the smallest scope possible: a single point,
//! then a single day, never the whole range. `SkipReason` is deliberately a
//! value rather than an error so a skipped day cannot be mistaken for
//! present data by a caller matching on `Result`.

use thiserror::Error;

/// Document-level failures from the XML codec. A parse failure is fatal to
/// the one document in hand, nothing wider.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("XML write error: {0}")]
    Write(String),
}

/// Failures building the HTTP client itself (not per-request errors).
#[derive(Debug, Error)]
pub enum FetcherError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Single-resource materialization failures. `MissingStart` is the one
/// truly day-fatal condition: without the period start instant no row can
/// be timestamped.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("document has no TimeSeries")]
    NoSeries,

    #[error("TimeSeries has no Period")]
    NoPeriod,

    #[error("period start instant missing or unparseable: '{0}'")]
    MissingStart(String),
}

/// Why a day produced no data. Day-scoped: the range loop records the
/// reason and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("max retries for throttling reached")]
    ThrottleRetriesExhausted,

    #[error("max retries for network errors reached")]
    NetworkRetriesExhausted,

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("empty response body")]
    EmptyBody,

    #[error("document error: {0}")]
    Document(String),

    #[error("resource not present in day document")]
    ResourceNotFound,

    #[error("materialize error: {0}")]
    Materialize(String),
}
