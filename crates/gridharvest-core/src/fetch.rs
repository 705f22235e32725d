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

//! Rate-limited day fetcher for the ENTSO-E transparency API.
//!
//! The API enforces 400 requests per sliding minute per account and answers
//! HTTP 429 with a multi-minute ban when exceeded. The limiter here stays
//! under the cap proactively; the retry loop handles the throttle and
//! transient network errors separately, and everything else fails the day.

use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate};
use rand::Rng;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::errors::{FetcherError, SkipReason};

/// Time source behind the limiter and retry sleeps, injectable in tests.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock, the only implementation outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Sliding-window request counter. `buffer` requests of headroom are kept
/// below the hard cap so bursts elsewhere on the account do not tip it over.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    buffer: u32,
    window: Duration,
    count: u32,
    window_start: Option<Instant>,
}

impl RateLimiter {
    pub fn new(max_per_window: u32, buffer: u32, window: Duration) -> Self {
        Self {
            max_per_window,
            buffer,
            window,
            count: 0,
            window_start: None,
        }
    }

    /// Block until another request is allowed to go out.
    pub fn before_request<C: Clock>(&mut self, clock: &C) {
        let now = clock.now();
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return;
        };
        let elapsed = now.duration_since(start);
        if elapsed >= self.window {
            self.window_start = Some(now);
            self.count = 0;
            return;
        }
        if self.count >= self.max_per_window.saturating_sub(self.buffer) {
            let wait = self.window - elapsed + Duration::from_secs(1);
            warn!(
                "⏳ request budget exhausted ({} in window), pausing {:.1}s",
                self.count,
                wait.as_secs_f64()
            );
            clock.sleep(wait);
            self.window_start = Some(clock.now());
            self.count = 0;
        }
    }

    pub fn record_request(&mut self) {
        self.count += 1;
    }

    /// Forget the current window, used after a server-side throttle ban.
    pub fn reset(&mut self) {
        self.window_start = None;
        self.count = 0;
    }
}

/// Tunables of the fetcher. Defaults encode the published API limits.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub base_url: String,
    pub token: String,
    pub max_requests_per_minute: u32,
    pub rate_limit_buffer: u32,
    pub max_retries: u32,
    pub throttle_cooldown: Duration,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    pub politeness_delay: Duration,
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://web-api.tp.entsoe.eu/api".to_owned(),
            token: String::new(),
            max_requests_per_minute: 400,
            rate_limit_buffer: 10,
            max_retries: 10,
            // The documented ban after a 429 lasts ten minutes; five extra
            // seconds of margin.
            throttle_cooldown: Duration::from_secs(605),
            backoff_base: Duration::from_secs(2),
            backoff_cap: Duration::from_secs(60),
            politeness_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(305),
        }
    }
}

/// Query parameters identifying one day document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayQuery {
    pub document_type: String,
    pub process_type: Option<String>,
    pub in_domain: String,
    pub out_domain: Option<String>,
    /// UTC boundary of the market day as `HHMM`, `2200` for CET winter.
    pub boundary_hhmm: String,
}

impl DayQuery {
    /// Actual generation output per generation unit (A73, realised).
    pub fn generation_per_unit(in_domain: impl Into<String>) -> Self {
        Self {
            document_type: "A73".to_owned(),
            process_type: Some("A16".to_owned()),
            in_domain: in_domain.into(),
            out_domain: None,
            boundary_hhmm: "2200".to_owned(),
        }
    }

    /// Actual generation aggregated per production type (A75, realised).
    pub fn generation_per_type(in_domain: impl Into<String>) -> Self {
        Self {
            document_type: "A75".to_owned(),
            process_type: Some("A16".to_owned()),
            in_domain: in_domain.into(),
            out_domain: None,
            boundary_hhmm: "2200".to_owned(),
        }
    }

    /// Physical cross-border flow (A11) from `out_domain` into `in_domain`.
    pub fn physical_flow(out_domain: impl Into<String>, in_domain: impl Into<String>) -> Self {
        Self {
            document_type: "A11".to_owned(),
            process_type: None,
            in_domain: in_domain.into(),
            out_domain: Some(out_domain.into()),
            boundary_hhmm: "2200".to_owned(),
        }
    }

    pub fn with_boundary(mut self, hhmm: impl Into<String>) -> Self {
        self.boundary_hhmm = hhmm.into();
        self
    }

    /// Human-readable query identity for logs and the skip log.
    pub fn label(&self) -> String {
        match &self.out_domain {
            Some(out) => format!("{}->{}", out, self.in_domain),
            None => self.in_domain.clone(),
        }
    }

    fn day_url(&self, config: &FetcherConfig, day: NaiveDate) -> String {
        let next = day
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        let mut url = format!(
            "{}?documentType={}",
            config.base_url, self.document_type
        );
        if let Some(process_type) = &self.process_type {
            url.push_str(&format!("&processType={process_type}"));
        }
        url.push_str(&format!("&in_Domain={}", self.in_domain));
        if let Some(out_domain) = &self.out_domain {
            url.push_str(&format!("&out_Domain={out_domain}"));
        }
        url.push_str(&format!(
            "&periodStart={}{}&periodEnd={}{}&securityToken={}",
            day.format("%Y%m%d"),
            self.boundary_hhmm,
            next.format("%Y%m%d"),
            self.boundary_hhmm,
            config.token
        ));
        url
    }
}

/// Outcome of fetching one day. A skip carries the reason for the audit
/// trail; the caller decides what a skipped day means for its output shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayFetch {
    Fetched(String),
    Skipped(SkipReason),
}

/// Blocking HTTP fetcher with the rate limiter and retry policy built in.
#[derive(Debug)]
pub struct Fetcher<C: Clock = SystemClock> {
    client: Client,
    config: FetcherConfig,
    limiter: RateLimiter,
    clock: C,
}

impl Fetcher<SystemClock> {
    pub fn new(config: FetcherConfig) -> Result<Self, FetcherError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Fetcher<C> {
    pub fn with_clock(config: FetcherConfig, clock: C) -> Result<Self, FetcherError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetcherError::ClientBuild(e.to_string()))?;
        let limiter = RateLimiter::new(
            config.max_requests_per_minute,
            config.rate_limit_buffer,
            Duration::from_secs(60),
        );
        Ok(Self {
            client,
            config,
            limiter,
            clock,
        })
    }

    /// Fetch the raw XML body for one market day.
    ///
    /// HTTP 429 sleeps out the throttle ban and resets the local window;
    /// network errors back off exponentially with jitter. Both give up after
    /// `max_retries` attempts. Any other non-success status fails the day
    /// immediately, retrying a 400 or 404 cannot change the answer.
    pub fn fetch_day(&mut self, query: &DayQuery, day: NaiveDate) -> DayFetch {
        let url = query.day_url(&self.config, day);
        debug!("📡 GET {} {}", query.document_type, day);
        let mut attempt = 0u32;
        loop {
            self.limiter.before_request(&self.clock);
            let outcome = self.client.get(&url).send().and_then(|resp| {
                let status = resp.status();
                resp.text().map(|body| (status, body))
            });
            self.limiter.record_request();

            match outcome {
                Ok((status, body)) if status.is_success() => {
                    if body.trim().is_empty() {
                        warn!("⚠️ empty body for {} on {}", query.label(), day);
                        return DayFetch::Skipped(SkipReason::EmptyBody);
                    }
                    return DayFetch::Fetched(body);
                }
                Ok((status, _)) if status == StatusCode::TOO_MANY_REQUESTS => {
                    attempt += 1;
                    if attempt > self.config.max_retries {
                        warn!("🚫 throttled {} times on {}, giving up", attempt - 1, day);
                        return DayFetch::Skipped(SkipReason::ThrottleRetriesExhausted);
                    }
                    warn!(
                        "🐢 HTTP 429 on {}, cooling down {}s (attempt {}/{})",
                        day,
                        self.config.throttle_cooldown.as_secs(),
                        attempt,
                        self.config.max_retries
                    );
                    self.clock.sleep(self.config.throttle_cooldown);
                    self.limiter.reset();
                }
                Ok((status, _)) => {
                    warn!("❌ HTTP {} for {} on {}", status.as_u16(), query.label(), day);
                    return DayFetch::Skipped(SkipReason::HttpStatus(status.as_u16()));
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > self.config.max_retries {
                        warn!("🚫 network error on {} after {} attempts: {}", day, attempt - 1, e);
                        return DayFetch::Skipped(SkipReason::NetworkRetriesExhausted);
                    }
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        "🔁 network error on {}: {}, retrying in {:.1}s (attempt {}/{})",
                        day,
                        e,
                        delay.as_secs_f64(),
                        attempt,
                        self.config.max_retries
                    );
                    self.clock.sleep(delay);
                }
            }
        }
    }

    /// Short fixed pause between consecutive requests of a range.
    pub fn politeness_pause(&self) {
        self.clock.sleep(self.config.politeness_delay);
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(5);
        let base = self
            .config
            .backoff_base
            .saturating_mul(1u32 << exp)
            .min(self.config.backoff_cap);
        let jitter_max = (base.as_millis() / 4) as u64;
        let jitter = if jitter_max == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_max)
        };
        (base + Duration::from_millis(jitter)).min(self.config.backoff_cap)
    }
}
