//! Tests for the day layout pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use timegrid::{
    layout_day, range_for_view, CalendarEvent, DateRange, FetchConfig, FetchCoordinatorBuilder,
    LayoutConfig, PositionedEvent, RequestOptions, StaticEventSource, ViewMode,
};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
}

fn day() -> DateRange {
    range_for_view(ViewMode::Day, at(12, 0))
}

fn event(id: &str, start: (u32, u32), end: (u32, u32)) -> CalendarEvent {
    CalendarEvent::new(
        id,
        format!("Event {}", id),
        at(start.0, start.1),
        at(end.0, end.1),
    )
}

fn by_id(positioned: &[PositionedEvent]) -> HashMap<&str, &PositionedEvent> {
    positioned.iter().map(|p| (p.event.id.as_str(), p)).collect()
}

#[test]
fn test_morning_pair_and_isolated_event() {
    // A[09:00-10:00] and B[09:30-10:30] share a two-column group;
    // C[11:00-12:00] stands alone at full width.
    let events = vec![
        event("a", (9, 0), (10, 0)),
        event("b", (9, 30), (10, 30)),
        event("c", (11, 0), (12, 0)),
    ];

    let positioned = layout_day(&events, &day(), &LayoutConfig::default());
    let map = by_id(&positioned);

    assert_eq!(map["a"].position.width_percent, 50.0);
    assert_eq!(map["a"].position.left_percent, 0.0);
    assert_eq!(map["b"].position.width_percent, 50.0);
    assert_eq!(map["b"].position.left_percent, 50.0);
    assert_eq!(map["c"].position.width_percent, 100.0);

    // Vertical geometry at the default one-pixel-per-minute scale.
    assert_eq!(map["a"].position.top, 540.0);
    assert_eq!(map["a"].position.height, 60.0);
    assert_eq!(map["c"].position.top, 660.0);
}

#[test]
fn test_overlapping_events_never_collide_horizontally() {
    let events = vec![
        event("a", (9, 0), (10, 30)),
        event("b", (9, 15), (11, 0)),
        event("c", (10, 0), (10, 45)),
        event("d", (10, 30), (12, 0)),
        event("e", (11, 30), (13, 0)),
        event("f", (14, 0), (15, 0)),
    ];

    let positioned = layout_day(&events, &day(), &LayoutConfig::default());
    assert_eq!(positioned.len(), events.len());

    for (i, a) in positioned.iter().enumerate() {
        for b in positioned.iter().skip(i + 1) {
            if a.event.overlaps_with(&b.event) {
                let a_right = a.position.left_percent + a.position.width_percent;
                let b_right = b.position.left_percent + b.position.width_percent;
                let disjoint = a_right <= b.position.left_percent + f32::EPSILON
                    || b_right <= a.position.left_percent + f32::EPSILON;
                assert!(
                    disjoint,
                    "{} and {} overlap in time but collide horizontally",
                    a.event.id, b.event.id
                );
            }
        }
    }
}

#[test]
fn test_columns_match_peak_concurrency() {
    // Staircase: never more than two events active at once, so two columns
    // suffice for the whole group.
    let events = vec![
        event("a", (9, 0), (11, 0)),
        event("b", (10, 0), (12, 0)),
        event("c", (11, 0), (13, 0)),
        event("d", (12, 0), (14, 0)),
    ];

    let positioned = layout_day(&events, &day(), &LayoutConfig::default());
    for p in &positioned {
        assert_eq!(p.position.width_percent, 50.0);
    }
}

#[test]
fn test_touching_events_flag_shared_edges() {
    let events = vec![
        event("first", (9, 0), (10, 0)),
        event("second", (10, 0), (11, 0)),
        event("detached", (13, 0), (14, 0)),
    ];

    let positioned = layout_day(&events, &day(), &LayoutConfig::default());
    let map = by_id(&positioned);

    assert!(map["first"].touching_bottom);
    assert!(!map["first"].touching_top);
    assert!(map["second"].touching_top);
    assert!(!map["second"].touching_bottom);
    assert!(!map["detached"].touching_top && !map["detached"].touching_bottom);

    // Touching events still occupy separate full-width groups.
    assert_eq!(map["first"].position.width_percent, 100.0);
    assert_eq!(map["second"].position.width_percent, 100.0);
}

#[test]
fn test_all_day_events_are_not_laid_out() {
    let events = vec![
        event("banner", (0, 0), (23, 59)).all_day_event(),
        event("meeting", (9, 0), (10, 0)),
    ];

    let positioned = layout_day(&events, &day(), &LayoutConfig::default());
    assert_eq!(positioned.len(), 1);
    assert_eq!(positioned[0].event.id, "meeting");
    // The all-day banner also does not square off the meeting's edges.
    assert!(!positioned[0].touching_top);
}

#[test]
fn test_custom_scale_produces_fractional_geometry() {
    let config = LayoutConfig {
        pixels_per_minute: 0.75,
        ..Default::default()
    };
    let positioned = layout_day(&[event("a", (9, 0), (9, 50))], &day(), &config);

    assert_eq!(positioned[0].position.top, 405.0);
    assert_eq!(positioned[0].position.height, 37.5);
}

#[tokio::test]
async fn test_fetched_events_flow_into_day_layout() {
    // End to end: fetch a week, then lay out the Monday.
    let monday = range_for_view(ViewMode::Day, at(12, 0));
    let week = range_for_view(ViewMode::Week, at(12, 0));

    let source = Arc::new(StaticEventSource::new(vec![
        event("standup", (9, 0), (9, 30)),
        event("review", (9, 15), (10, 0)),
        CalendarEvent::new(
            "tuesday",
            "Offsite",
            Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 11, 17, 0, 0).unwrap(),
        ),
    ]));
    let coordinator = FetchCoordinatorBuilder::new()
        .source(source)
        .config(FetchConfig {
            debounce_ms: 5,
            ..Default::default()
        })
        .build()
        .unwrap();

    let visible = coordinator
        .request(week, RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(visible.len(), 3);

    let monday_events: Vec<CalendarEvent> = visible
        .iter()
        .filter(|e| e.is_within(&monday))
        .cloned()
        .collect();
    let positioned = layout_day(&monday_events, &monday, &LayoutConfig::default());

    let map = by_id(&positioned);
    assert_eq!(positioned.len(), 2);
    assert_eq!(map["standup"].position.width_percent, 50.0);
    assert_eq!(map["review"].position.width_percent, 50.0);
}
