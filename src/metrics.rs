//! Prometheus-compatible metrics for the timegrid calendar core.
//!
//! This module provides observability metrics for monitoring fetch cycles
//! and cache behavior using the prometheus crate.

use prometheus::{self, Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Global metrics instance.
static METRICS: std::sync::OnceLock<Arc<Metrics>> = std::sync::OnceLock::new();

/// Get or initialize the global metrics instance.
pub fn get_metrics() -> Arc<Metrics> {
    METRICS.get_or_init(|| Arc::new(Metrics::new())).clone()
}

/// Default histogram buckets for latency tracking (in seconds).
/// Covers from 1ms to 10s with reasonable granularity.
fn default_latency_buckets() -> Vec<f64> {
    vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ]
}

/// All metrics for the calendar core.
pub struct Metrics {
    /// Prometheus registry for all metrics.
    pub registry: Registry,

    // =========================================================================
    // Counters
    // =========================================================================
    /// Total number of fetch cycles started.
    pub fetch_cycles_total: IntCounter,
    /// Total number of fetch cycles superseded before committing.
    pub fetch_cycles_superseded_total: IntCounter,
    /// Total number of sub-range fetch errors.
    pub fetch_errors_total: IntCounter,
    /// Total number of events merged into the cache.
    pub events_merged_total: IntCounter,
    /// Total number of requests answered entirely from the cache.
    pub cache_hits_total: IntCounter,
    /// Total number of requests that needed at least one fetch.
    pub cache_misses_total: IntCounter,

    // =========================================================================
    // Gauges
    // =========================================================================
    /// Current number of cached events.
    pub cached_events_count: IntGauge,

    // =========================================================================
    // Histograms (durations in seconds)
    // =========================================================================
    /// Fetch cycle duration in seconds, debounce excluded.
    pub fetch_duration_seconds: Histogram,

    /// Process start time.
    start_time: RwLock<Instant>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance with all metrics registered.
    pub fn new() -> Self {
        let registry = Registry::new();

        let fetch_cycles_total = IntCounter::new(
            "timegrid_fetch_cycles_total",
            "Total number of fetch cycles started",
        )
        .expect("failed to create counter");

        let fetch_cycles_superseded_total = IntCounter::new(
            "timegrid_fetch_cycles_superseded_total",
            "Total number of fetch cycles superseded before committing",
        )
        .expect("failed to create counter");

        let fetch_errors_total = IntCounter::new(
            "timegrid_fetch_errors_total",
            "Total number of sub-range fetch errors",
        )
        .expect("failed to create counter");

        let events_merged_total = IntCounter::new(
            "timegrid_events_merged_total",
            "Total number of events merged into the cache",
        )
        .expect("failed to create counter");

        let cache_hits_total = IntCounter::new(
            "timegrid_cache_hits_total",
            "Total number of requests answered entirely from the cache",
        )
        .expect("failed to create counter");

        let cache_misses_total = IntCounter::new(
            "timegrid_cache_misses_total",
            "Total number of requests that needed at least one fetch",
        )
        .expect("failed to create counter");

        let cached_events_count = IntGauge::new(
            "timegrid_cached_events_count",
            "Current number of cached events",
        )
        .expect("failed to create gauge");

        let fetch_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "timegrid_fetch_duration_seconds",
                "Fetch cycle duration in seconds",
            )
            .buckets(default_latency_buckets()),
        )
        .expect("failed to create histogram");

        registry
            .register(Box::new(fetch_cycles_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(fetch_cycles_superseded_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(fetch_errors_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(events_merged_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(cache_hits_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(cache_misses_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(cached_events_count.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(fetch_duration_seconds.clone()))
            .expect("failed to register metric");

        Self {
            registry,
            fetch_cycles_total,
            fetch_cycles_superseded_total,
            fetch_errors_total,
            events_merged_total,
            cache_hits_total,
            cache_misses_total,
            cached_events_count,
            fetch_duration_seconds,
            start_time: RwLock::new(Instant::now()),
        }
    }

    /// Uptime of this metrics instance.
    pub fn uptime(&self) -> Duration {
        self.start_time.read().elapsed()
    }

    /// Export metrics in Prometheus text format.
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    /// Export metrics as JSON.
    pub fn export_json(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetch_cycles_total: self.fetch_cycles_total.get(),
            fetch_cycles_superseded_total: self.fetch_cycles_superseded_total.get(),
            fetch_errors_total: self.fetch_errors_total.get(),
            events_merged_total: self.events_merged_total.get(),
            cache_hits_total: self.cache_hits_total.get(),
            cache_misses_total: self.cache_misses_total.get(),
            cached_events_count: self.cached_events_count.get(),
            fetch_duration: HistogramSnapshot::from_prometheus(&self.fetch_duration_seconds),
            uptime_seconds: self.uptime().as_secs(),
        }
    }

    /// Start a timer that records duration to a histogram when dropped.
    pub fn start_timer(histogram: &Histogram) -> HistogramTimer {
        HistogramTimer {
            histogram: histogram.clone(),
            start: Instant::now(),
        }
    }
}

/// Timer that records duration to a histogram when dropped.
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.histogram.observe(duration.as_secs_f64());
    }
}

impl HistogramTimer {
    /// Get the elapsed time without stopping the timer.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Snapshot of all metrics for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub fetch_cycles_total: u64,
    pub fetch_cycles_superseded_total: u64,
    pub fetch_errors_total: u64,
    pub events_merged_total: u64,
    pub cache_hits_total: u64,
    pub cache_misses_total: u64,
    pub cached_events_count: i64,
    pub fetch_duration: HistogramSnapshot,
    pub uptime_seconds: u64,
}

/// Snapshot of a histogram for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: f64,
    pub mean: Option<f64>,
}

impl HistogramSnapshot {
    /// Create a snapshot from a prometheus histogram.
    pub fn from_prometheus(h: &Histogram) -> Self {
        let sample_count = h.get_sample_count();
        let sample_sum = h.get_sample_sum();
        let mean = if sample_count > 0 {
            Some(sample_sum / sample_count as f64)
        } else {
            None
        };
        Self {
            count: sample_count,
            sum: sample_sum,
            mean,
        }
    }
}
