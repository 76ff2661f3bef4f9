//! Tests for the FetchCoordinator.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use timegrid::{
    CalendarEvent, Config, DateRange, FetchConfig, FetchCoordinator, FetchCoordinatorBuilder,
    FetchError, FetchProgress, RequestOptions, StaticEventSource,
};

/// 2025-03-10 is a Monday; days here are March 2025.
fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, d, 0, 0, 0).unwrap()
}

fn range(from: u32, to: u32) -> DateRange {
    DateRange::new(day(from), day(to))
}

fn event(id: &str, from: u32, to: u32) -> CalendarEvent {
    CalendarEvent::new(id, format!("Event {}", id), day(from), day(to))
}

fn fast_config() -> FetchConfig {
    FetchConfig {
        debounce_ms: 5,
        ..Default::default()
    }
}

fn coordinator_over(source: Arc<StaticEventSource>) -> FetchCoordinator {
    FetchCoordinatorBuilder::new()
        .source(source)
        .config(fast_config())
        .build()
        .unwrap()
}

fn ids(events: &[CalendarEvent]) -> Vec<&str> {
    events.iter().map(|e| e.id.as_str()).collect()
}

#[tokio::test]
async fn test_initial_fetch_covers_requested_window() {
    let source = Arc::new(StaticEventSource::new(vec![event("a", 11, 12)]));
    let coordinator = coordinator_over(source.clone());

    let visible = coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(ids(&visible), vec!["a"]);
    assert!(coordinator.is_covered(&range(10, 17)).await);
    // The empty cache made the whole window the single missing range.
    assert_eq!(source.recorded_ranges(), vec![range(10, 17)]);
}

#[tokio::test]
async fn test_window_extension_fetches_only_the_delta() {
    let source = Arc::new(StaticEventSource::new(vec![
        event("a", 11, 12),
        event("b", 18, 19),
    ]));
    let coordinator = coordinator_over(source.clone());

    coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();
    let visible = coordinator
        .request(range(13, 20), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(ids(&visible), vec!["b"]);
    assert_eq!(source.fetch_count(), 2);

    // The second fetch starts just past the cached bound, with no
    // redundant left-side refetch.
    let second = source.recorded_ranges()[1];
    assert_eq!(second.min, day(17) + chrono::Duration::milliseconds(1));
    assert_eq!(second.max, day(20));
    assert!(coordinator.is_covered(&range(10, 20)).await);
}

#[tokio::test]
async fn test_rapid_navigation_debounces_to_one_cycle() {
    let source = Arc::new(StaticEventSource::new(vec![
        event("a", 11, 12),
        event("b", 21, 22),
    ]));
    let coordinator = Arc::new(
        FetchCoordinatorBuilder::new()
            .source(source.clone())
            .config(FetchConfig {
                debounce_ms: 60,
                ..Default::default()
            })
            .build()
            .unwrap(),
    );

    // First navigation, immediately followed by a second: only the
    // settled range is fetched.
    let first = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            coordinator
                .request(range(10, 12), RequestOptions::default())
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let visible = coordinator
        .request(range(20, 22), RequestOptions::default())
        .await
        .unwrap();

    first.await.unwrap().unwrap();

    assert_eq!(source.fetch_count(), 1);
    assert_eq!(source.recorded_ranges(), vec![range(20, 22)]);
    assert_eq!(ids(&visible), vec!["b"]);
    assert!(!coordinator.is_covered(&range(10, 12)).await);
}

#[tokio::test]
async fn test_superseded_cycle_never_commits_late_results() {
    let source = Arc::new(
        StaticEventSource::new(vec![event("a", 11, 12), event("b", 21, 22)])
            .with_latency(Duration::from_millis(150)),
    );
    let coordinator = Arc::new(coordinator_over(source.clone()));

    // Cycle 1 passes its debounce and is waiting on the network when
    // cycle 2 arrives for a different window.
    let first = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            coordinator
                .request(range(10, 12), RequestOptions::default())
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(60)).await;
    let visible = coordinator
        .request(range(20, 22), RequestOptions::default())
        .await
        .unwrap();

    // Cycle 1's network call completed, but its results were discarded.
    first.await.unwrap().unwrap();
    assert_eq!(source.fetch_count(), 2);
    assert_eq!(ids(&visible), vec!["b"]);
    assert!(!coordinator.is_covered(&range(10, 12)).await);
    assert!(coordinator.visible_events(&range(10, 12)).await.is_empty());
    assert!(coordinator.is_covered(&range(20, 22)).await);
}

#[tokio::test]
async fn test_partial_failure_keeps_successful_subranges() {
    let source = Arc::new(StaticEventSource::new(vec![
        event("left", 10, 11),
        event("mid", 12, 13),
        event("right", 15, 16),
    ]));
    let coordinator = coordinator_over(source.clone());

    // Seed the middle of the window, then fail only the left gap.
    coordinator
        .request(range(12, 14), RequestOptions::default())
        .await
        .unwrap();
    source.fail_range(range(10, 11), FetchError::Timeout);

    let visible = coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();

    // The right sub-range merged; the left one did not grow the bound.
    assert_eq!(ids(&visible), vec!["mid", "right"]);
    assert!(!coordinator.is_covered(&range(10, 17)).await);
    assert!(coordinator.is_covered(&range(12, 17)).await);
}

#[tokio::test]
async fn test_total_failure_on_empty_cache_serves_defaults() {
    let source = Arc::new(StaticEventSource::new(vec![event("a", 11, 12)]));
    source.fail_range(range(1, 28), FetchError::Transport("offline".to_string()));

    let defaults = vec![event("server-rendered", 11, 12)];
    let coordinator = FetchCoordinatorBuilder::new()
        .source(source)
        .config(fast_config())
        .default_events(defaults)
        .build()
        .unwrap();

    let visible = coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(ids(&visible), vec!["server-rendered"]);
    assert!(!coordinator.is_covered(&range(10, 17)).await);
}

#[tokio::test]
async fn test_total_failure_with_cache_serves_stale_events() {
    let source = Arc::new(StaticEventSource::new(vec![event("a", 11, 12)]));
    let coordinator = coordinator_over(source.clone());

    coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();
    source.fail_range(range(1, 28), FetchError::Transport("offline".to_string()));

    // Force refresh fails, but the stale cache still answers.
    let visible = coordinator
        .request(range(10, 17), RequestOptions { force_refresh: true })
        .await
        .unwrap();

    assert_eq!(ids(&visible), vec!["a"]);
    assert!(coordinator.is_covered(&range(10, 17)).await);
}

#[tokio::test]
async fn test_auth_failure_halts_until_manual_refresh() {
    let source = Arc::new(StaticEventSource::new(vec![event("a", 11, 12)]));
    source.fail_range(
        range(1, 28),
        FetchError::AuthRequired("session expired".to_string()),
    );
    let coordinator = coordinator_over(source.clone());

    coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();
    assert!(coordinator.is_halted());
    assert_eq!(source.fetch_count(), 1);

    // Halted: further automatic requests never reach the source.
    coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(source.fetch_count(), 1);

    // A manual refresh clears the halt and fetches again.
    source.clear_failures();
    let visible = coordinator
        .request(range(10, 17), RequestOptions { force_refresh: true })
        .await
        .unwrap();

    assert!(!coordinator.is_halted());
    assert_eq!(source.fetch_count(), 2);
    assert_eq!(ids(&visible), vec!["a"]);
}

#[tokio::test]
async fn test_force_refresh_refetches_covered_window() {
    let source = Arc::new(StaticEventSource::new(vec![event("a", 11, 12)]));
    let coordinator = coordinator_over(source.clone());

    coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();

    // The event was recolored server-side; a covered request would serve
    // the stale copy, a forced one refetches.
    source.set_events(vec![event("a", 11, 12).with_color("#ff0000")]);
    let visible = coordinator
        .request(range(10, 17), RequestOptions { force_refresh: true })
        .await
        .unwrap();

    assert_eq!(source.fetch_count(), 2);
    assert_eq!(visible[0].color.as_deref(), Some("#ff0000"));
}

#[tokio::test]
async fn test_refresh_view_evicts_view_and_keeps_the_rest() {
    let source = Arc::new(StaticEventSource::new(vec![
        event("in_view", 11, 12),
        event("outside", 15, 16),
    ]));
    let coordinator = coordinator_over(source.clone());

    coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();

    source.set_events(vec![
        event("in_view", 11, 12).with_color("#00ff00"),
        event("outside", 15, 16),
    ]);
    let visible = coordinator.refresh_view(range(10, 13)).await.unwrap();

    assert_eq!(ids(&visible), vec!["in_view"]);
    assert_eq!(visible[0].color.as_deref(), Some("#00ff00"));

    // Events outside the view survive the eviction, but the collapsed
    // bound means their range reads as uncovered until refetched.
    let outside = coordinator.visible_events(&range(14, 17)).await;
    assert_eq!(ids(&outside), vec!["outside"]);
    assert!(!coordinator.is_covered(&range(14, 17)).await);
}

#[tokio::test]
async fn test_progress_channel_reports_cycle_lifecycle() {
    let source = Arc::new(StaticEventSource::new(vec![event("a", 11, 12)]));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let coordinator = FetchCoordinatorBuilder::new()
        .source(source)
        .config(fast_config())
        .progress_channel(tx)
        .build()
        .unwrap();

    coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(progress) = rx.try_recv() {
        events.push(progress);
    }

    assert!(events
        .iter()
        .any(|p| matches!(p, FetchProgress::CycleStarted { .. })));
    assert!(events
        .iter()
        .any(|p| matches!(p, FetchProgress::SubRangeFetched { events: 1, .. })));
    assert!(events
        .iter()
        .any(|p| matches!(p, FetchProgress::CycleComplete { visible: 1, .. })));
}

#[tokio::test]
async fn test_coordinator_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[fetch]
base_url = "https://calendar.example.com/api"
debounce_ms = 5

[layout]
pixels_per_minute = 0.75
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.fetch.debounce_ms, 5);
    assert_eq!(config.layout.pixels_per_minute, 0.75);

    let source = Arc::new(StaticEventSource::new(vec![event("a", 11, 12)]));
    let coordinator = FetchCoordinatorBuilder::new()
        .source(source)
        .config(config.fetch)
        .build()
        .unwrap();

    let visible = coordinator
        .request(range(10, 17), RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
}
