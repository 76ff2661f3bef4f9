//! Fetch coordinator that reconciles requested view windows against the
//! range cache.
//!
//! The coordinator handles:
//! - Debouncing rapid navigation into a single fetch cycle
//! - Computing the minimal missing sub-ranges against the cache
//! - Concurrent sub-range fetches with fan-out/fan-in
//! - Superseding in-flight cycles when a newer request arrives
//! - Partial-failure recovery and the sticky halt on auth failures
//! - Progress reporting via callbacks
//!
//! Cancellation is cooperative. Every request bumps a generation counter
//! and carries the value it drew as its cycle token; a cycle re-checks the
//! counter after its debounce sleep and again after its network calls, and
//! commits nothing if a newer cycle has taken over. The transport may still
//! complete a superseded call, but its results are provably discarded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::cache::RangeCache;
use crate::config::FetchConfig;
use crate::error::{Result, TimegridError};
use crate::event::{CalendarEvent, DateRange};
use crate::metrics::{get_metrics, Metrics};
use crate::source::SharedEventSource;

/// Progress event during a fetch cycle.
#[derive(Debug, Clone)]
pub enum FetchProgress {
    /// A cycle survived the debounce window and started fetching.
    CycleStarted { cycle: u64, range: DateRange },
    /// One missing sub-range was fetched and merged.
    SubRangeFetched {
        cycle: u64,
        range: DateRange,
        events: usize,
    },
    /// One missing sub-range failed; the cycle continues.
    SubRangeFailed {
        cycle: u64,
        range: DateRange,
        error: String,
    },
    /// A newer request took over before this cycle could commit.
    CycleSuperseded { cycle: u64 },
    /// The cycle committed and emitted its visible set.
    CycleComplete {
        cycle: u64,
        range: DateRange,
        visible: usize,
        duration_ms: u64,
    },
    /// Automatic fetching halted until a manual refresh.
    Halted { reason: String },
}

/// Options for a view request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    /// Treat the entire requested range as missing and bypass the halted
    /// state. Set by manual refresh.
    pub force_refresh: bool,
}

/// The fetch coordinator.
///
/// The only shared mutable state in the core: the range cache behind a
/// lock, the cycle generation counter, and the sticky halted flag. All
/// methods take `&self`; concurrent requests race on the generation
/// counter and the newest one wins.
pub struct FetchCoordinator {
    /// Event source.
    source: SharedEventSource,
    /// Fetch configuration.
    config: FetchConfig,
    /// The range cache. Mutated only by committing cycles.
    cache: RwLock<RangeCache>,
    /// Cycle generation counter; the current value identifies the one
    /// cycle allowed to commit.
    generation: AtomicU64,
    /// Sticky halt set on auth/not-found failures.
    halted: AtomicBool,
    /// Fallback events when a fetch fails against an empty cache.
    default_events: Vec<CalendarEvent>,
    /// Progress callback sender.
    progress_tx: Option<mpsc::UnboundedSender<FetchProgress>>,
}

impl FetchCoordinator {
    /// Create a coordinator with default options.
    pub fn new(source: SharedEventSource, config: FetchConfig) -> Self {
        Self {
            source,
            config,
            cache: RwLock::new(RangeCache::new()),
            generation: AtomicU64::new(0),
            halted: AtomicBool::new(false),
            default_events: Vec::new(),
            progress_tx: None,
        }
    }

    /// Set the progress callback channel.
    pub fn set_progress_channel(&mut self, tx: mpsc::UnboundedSender<FetchProgress>) {
        self.progress_tx = Some(tx);
    }

    /// Get a progress receiver.
    pub fn progress_channel(&mut self) -> mpsc::UnboundedReceiver<FetchProgress> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.progress_tx = Some(tx);
        rx
    }

    /// Request the events visible in a view window.
    ///
    /// Debounced by the configured quiescence window: rapid consecutive
    /// calls collapse into one fetch cycle for the final settled range.
    /// A request arriving while a cycle is in flight supersedes it; the
    /// superseded cycle commits nothing and returns whatever the cache
    /// held for its range at that point.
    ///
    /// Failures never surface as hard errors: failed sub-ranges fall back
    /// to cached (stale) data, and a total failure against an empty cache
    /// returns the configured default events.
    pub async fn request(
        &self,
        range: DateRange,
        options: RequestOptions,
    ) -> Result<Vec<CalendarEvent>> {
        let cycle = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if options.force_refresh {
            self.halted.store(false, Ordering::SeqCst);
        }
        if self.halted.load(Ordering::SeqCst) {
            debug!("Fetching halted, serving cached events for {}", range);
            return Ok(self.visible_events(&range).await);
        }

        // Quiescence window: a newer request landing during the sleep
        // takes over this cycle's slot.
        tokio::time::sleep(Duration::from_millis(self.config.debounce_ms)).await;
        if self.is_superseded(cycle) {
            return Ok(self.superseded(cycle, &range).await);
        }

        let metrics = get_metrics();
        metrics.fetch_cycles_total.inc();
        let timer = Metrics::start_timer(&metrics.fetch_duration_seconds);
        let started = Instant::now();

        self.report_progress(FetchProgress::CycleStarted { cycle, range });

        let missing = if options.force_refresh {
            vec![range]
        } else {
            self.cache.read().await.missing_ranges(&range)
        };

        if missing.is_empty() {
            metrics.cache_hits_total.inc();
            let visible = self.visible_events(&range).await;
            self.report_progress(FetchProgress::CycleComplete {
                cycle,
                range,
                visible: visible.len(),
                duration_ms: started.elapsed().as_millis() as u64,
            });
            return Ok(visible);
        }
        metrics.cache_misses_total.inc();

        // Fan out one call per missing sub-range; completion order is
        // irrelevant since the merge is commutative per event id.
        let results = join_all(
            missing
                .iter()
                .map(|sub| self.source.fetch_events(sub, options.force_refresh)),
        )
        .await;
        drop(timer);

        if self.is_superseded(cycle) {
            return Ok(self.superseded(cycle, &range).await);
        }

        let mut any_success = false;
        let visible = {
            let mut cache = self.cache.write().await;
            // The generation may have advanced while acquiring the lock;
            // only the current cycle may commit.
            if self.is_superseded(cycle) {
                drop(cache);
                return Ok(self.superseded(cycle, &range).await);
            }

            for (sub, result) in missing.iter().zip(results) {
                match result {
                    Ok(events) => {
                        any_success = true;
                        self.report_progress(FetchProgress::SubRangeFetched {
                            cycle,
                            range: *sub,
                            events: events.len(),
                        });
                        metrics.events_merged_total.inc_by(events.len() as u64);
                        cache.merge(events, *sub);
                    }
                    Err(error) => {
                        metrics.fetch_errors_total.inc();
                        self.report_progress(FetchProgress::SubRangeFailed {
                            cycle,
                            range: *sub,
                            error: error.to_string(),
                        });
                        if let TimegridError::Fetch(fetch_error) = &error {
                            if fetch_error.is_halting() {
                                self.halted.store(true, Ordering::SeqCst);
                                self.report_progress(FetchProgress::Halted {
                                    reason: fetch_error.to_string(),
                                });
                            }
                        }
                    }
                }
            }

            metrics.cached_events_count.set(cache.len() as i64);

            if !any_success && cache.is_empty() {
                debug!("All fetches failed against an empty cache, serving defaults");
                self.default_events.clone()
            } else {
                cache.events_overlapping(&range)
            }
        };

        self.report_progress(FetchProgress::CycleComplete {
            cycle,
            range,
            visible: visible.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        });

        Ok(visible)
    }

    /// View-scoped refresh: evict the view's cached events, collapse the
    /// cached bound, and force a re-fetch of the view. Clears the halted
    /// state, as any manual refresh does.
    pub async fn refresh_view(&self, range: DateRange) -> Result<Vec<CalendarEvent>> {
        self.cache.write().await.evict_view(&range);
        self.request(range, RequestOptions { force_refresh: true })
            .await
    }

    /// Full cache invalidation (external refresh signal).
    pub async fn invalidate(&self) {
        self.cache.write().await.invalidate();
        get_metrics().cached_events_count.set(0);
    }

    /// Reset for a session change: clear the halted state and the cache.
    pub async fn reset(&self) {
        self.halted.store(false, Ordering::SeqCst);
        self.invalidate().await;
    }

    /// Cached events overlapping a range, without fetching.
    pub async fn visible_events(&self, range: &DateRange) -> Vec<CalendarEvent> {
        self.cache.read().await.events_overlapping(range)
    }

    /// Whether the cache fully covers a range.
    pub async fn is_covered(&self, range: &DateRange) -> bool {
        self.cache.read().await.is_covered(range)
    }

    /// Whether automatic fetching is halted.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    fn is_superseded(&self, cycle: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != cycle
    }

    /// Handle a superseded cycle: commit nothing, report, and return the
    /// cache's current contents for the range.
    async fn superseded(&self, cycle: u64, range: &DateRange) -> Vec<CalendarEvent> {
        get_metrics().fetch_cycles_superseded_total.inc();
        self.report_progress(FetchProgress::CycleSuperseded { cycle });
        self.visible_events(range).await
    }

    /// Report progress.
    fn report_progress(&self, progress: FetchProgress) {
        if let Some(tx) = &self.progress_tx {
            if let Err(e) = tx.send(progress.clone()) {
                debug!("Failed to send progress event: {}", e);
            }
        }
        match &progress {
            FetchProgress::CycleStarted { cycle, range } => {
                debug!("Cycle {} started for {} (source {})", cycle, range, self.source.id());
            }
            FetchProgress::SubRangeFetched { range, events, .. } => {
                debug!("Fetched {} events for {}", events, range);
            }
            FetchProgress::SubRangeFailed { range, error, .. } => {
                warn!("Fetch failed for {}: {}", range, error);
            }
            FetchProgress::CycleSuperseded { cycle } => {
                debug!("Cycle {} superseded, results discarded", cycle);
            }
            FetchProgress::CycleComplete {
                cycle,
                visible,
                duration_ms,
                ..
            } => {
                info!(
                    "Cycle {} complete: {} events visible ({}ms)",
                    cycle, visible, duration_ms
                );
            }
            FetchProgress::Halted { reason } => {
                warn!("Automatic fetching halted: {}", reason);
            }
        }
    }
}

/// Builder for [`FetchCoordinator`].
pub struct FetchCoordinatorBuilder {
    source: Option<SharedEventSource>,
    config: FetchConfig,
    default_events: Vec<CalendarEvent>,
    progress_tx: Option<mpsc::UnboundedSender<FetchProgress>>,
}

impl Default for FetchCoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchCoordinatorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            source: None,
            config: FetchConfig::default(),
            default_events: Vec::new(),
            progress_tx: None,
        }
    }

    /// Set the event source.
    pub fn source(mut self, source: SharedEventSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the fetch configuration.
    pub fn config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the fallback events served when every fetch fails against an
    /// empty cache.
    pub fn default_events(mut self, events: Vec<CalendarEvent>) -> Self {
        self.default_events = events;
        self
    }

    /// Set the progress channel.
    pub fn progress_channel(mut self, tx: mpsc::UnboundedSender<FetchProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Build the coordinator.
    pub fn build(self) -> Result<FetchCoordinator> {
        let source = self
            .source
            .ok_or_else(|| crate::error::ConfigError::MissingField("source".to_string()))?;

        let mut coordinator = FetchCoordinator::new(source, self.config);
        coordinator.default_events = self.default_events;
        coordinator.progress_tx = self.progress_tx;
        Ok(coordinator)
    }
}

// ============================================================================
// Tests
// ============================================================================
