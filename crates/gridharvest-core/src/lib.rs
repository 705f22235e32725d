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

//! ENTSO-E collection pipeline: XML codec, hourly-to-quarter normalizer,
//! resource extractor, row materializer, rate-limited fetcher, range
//! collector, array store and skip log.
//!
//! Everything here is strictly sequential blocking I/O: the transparency API
//! enforces a per-account rate limit, so parallel day fetches would only
//! accelerate hitting the throttle.

pub mod collect;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod materialize;
pub mod normalize;
pub mod skiplog;
pub mod store;
pub mod xml;

pub use collect::RangeCollector;
pub use errors::{DocumentError, FetcherError, MaterializeError, SkipReason};
pub use extract::{ResourceKey, extract_resource};
pub use fetch::{Clock, DayFetch, DayQuery, Fetcher, FetcherConfig, RateLimiter, SystemClock};
pub use materialize::{DropRecord, flow_vector, hourly_rows, production_matrix};
pub use normalize::pad_hourly_to_quarter;
pub use skiplog::SkipLog;
pub use store::ArrayStore;
pub use xml::{parse_document, write_document};
