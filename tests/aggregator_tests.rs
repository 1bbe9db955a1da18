// Aggregator: reset protocol, stale-session guard, derived metrics

mod common;

use common::{seeded_aggregator, tagged};
use statpac::aggregator::{UpdateOutcome, WINDOW_CAPACITY};
use statpac::models::*;

fn label(i: usize) -> String {
    format!("00:00:{i:02}")
}

#[test]
fn blank_track_is_a_no_op() {
    let mut agg = seeded_aggregator(1);
    assert!(agg.track("").is_none());
    assert!(agg.track("   \t").is_none());
    assert_eq!(agg.session().tracked_name, None);
    assert_eq!(agg.session().phase, SessionPhase::Idle);

    let session = agg.track("react").unwrap().session;
    agg.on_snapshot_labeled(tagged(session, 100), label(0));
    assert!(agg.track(" ").is_none());
    assert_eq!(agg.session().tracked_name.as_deref(), Some("react"));
    assert_eq!(agg.downloads().len(), 1);
}

#[test]
fn track_trims_name_and_mints_increasing_sessions() {
    let mut agg = seeded_aggregator(2);
    let first = agg.track("  lodash ").unwrap();
    assert_eq!(first.name, "lodash");
    let second = agg.track("lodash").unwrap();
    assert!(second.session > first.session);
    assert_eq!(agg.session().phase, SessionPhase::Awaiting);
}

#[test]
fn retrack_resets_windows_and_base_even_for_same_name() {
    let mut agg = seeded_aggregator(3);
    let session = agg.track("react").unwrap().session;
    for i in 0..5 {
        agg.on_snapshot_labeled(tagged(session, 1_000 + i as u64), label(i));
    }
    assert_eq!(agg.downloads().len(), 5);
    assert_eq!(agg.session().base_downloads, Some(1_000));

    agg.track("react").unwrap();
    assert!(agg.downloads().is_empty());
    assert!(agg.rate().is_empty());
    assert_eq!(agg.session().base_downloads, None);
    assert!(agg.session().latest_snapshot.is_none());
    assert_eq!(agg.metrics().base_downloads, 0);
    assert_eq!(agg.metrics().incremental_downloads, 0);
}

#[test]
fn first_point_anchors_at_estimate_and_later_points_step_up() {
    let mut agg = seeded_aggregator(4);
    let session = agg.track("react").unwrap().session;
    agg.on_snapshot_labeled(tagged(session, 5_000), label(0));
    for i in 1..50 {
        agg.on_snapshot_labeled(tagged(session, 5_000), label(i % 60));
    }
    let values: Vec<u64> = agg.downloads().current().iter().map(|p| p.value).collect();
    assert_eq!(values.len(), WINDOW_CAPACITY);
    for pair in values.windows(2) {
        assert!((10..=14).contains(&(pair[1] - pair[0])));
    }

    let mut fresh = seeded_aggregator(5);
    let session = fresh.track("vue").unwrap().session;
    fresh.on_snapshot_labeled(tagged(session, 77_777), label(0));
    assert_eq!(fresh.downloads().last().unwrap().value, 77_777);
}

#[test]
fn both_series_get_one_point_per_snapshot_with_the_same_label() {
    let mut agg = seeded_aggregator(6);
    let session = agg.track("react").unwrap().session;
    for i in 0..3 {
        assert_eq!(
            agg.on_snapshot_labeled(tagged(session, 10), label(i)),
            UpdateOutcome::Applied
        );
    }
    assert_eq!(agg.downloads().len(), 3);
    assert_eq!(agg.rate().len(), 3);
    let d: Vec<&str> = agg.downloads().current().iter().map(|p| p.label.as_str()).collect();
    let r: Vec<&str> = agg.rate().current().iter().map(|p| p.label.as_str()).collect();
    assert_eq!(d, r);
}

#[test]
fn late_event_for_superseded_session_is_dropped() {
    let mut agg = seeded_aggregator(7);
    let a = agg.track("a").unwrap().session;
    assert_eq!(agg.on_snapshot_labeled(tagged(a, 100), label(0)), UpdateOutcome::Applied);

    let b = agg.track("b").unwrap().session;
    assert_eq!(agg.on_snapshot_labeled(tagged(a, 999), label(1)), UpdateOutcome::Stale);
    assert!(agg.downloads().is_empty());
    assert!(agg.rate().is_empty());
    assert!(agg.session().latest_snapshot.is_none());
    assert_eq!(agg.session().phase, SessionPhase::Awaiting);
    assert_eq!(agg.stale_dropped(), 1);

    agg.on_snapshot_labeled(tagged(b, 200), label(2));
    assert_eq!(agg.downloads().last().unwrap().value, 200);
}

#[test]
fn update_before_any_track_is_dropped() {
    let mut agg = seeded_aggregator(8);
    assert_eq!(
        agg.on_snapshot_labeled(tagged(SessionId(1), 10), label(0)),
        UpdateOutcome::Stale
    );
    assert_eq!(agg.session().phase, SessionPhase::Idle);
}

#[test]
fn incremental_downloads_from_fixed_base() {
    let mut agg = seeded_aggregator(9);
    let session = agg.track("react").unwrap().session;
    agg.on_snapshot_labeled(tagged(session, 1_000), label(0));
    agg.on_snapshot_labeled(tagged(session, 1_250), label(1));
    let metrics = agg.metrics();
    assert_eq!(metrics.base_downloads, 1_000);
    assert_eq!(metrics.incremental_downloads, 250);
}

#[test]
fn incremental_downloads_may_go_negative() {
    let mut agg = seeded_aggregator(10);
    let session = agg.track("react").unwrap().session;
    agg.on_snapshot_labeled(tagged(session, 1_000), label(0));
    agg.on_snapshot_labeled(tagged(session, 900), label(1));
    assert_eq!(agg.metrics().incremental_downloads, -100);
}

#[test]
fn incremental_downloads_saturate_on_huge_estimates() {
    let mut agg = seeded_aggregator(15);
    let session = agg.track("x").unwrap().session;
    agg.on_snapshot_labeled(tagged(session, 1), label(0));
    agg.on_snapshot_labeled(tagged(session, 1u64 << 63), label(1));
    assert_eq!(agg.metrics().incremental_downloads, i64::MAX);

    agg.on_snapshot_labeled(tagged(session, u64::MAX), label(2));
    assert_eq!(agg.metrics().incremental_downloads, i64::MAX);

    let session = agg.track("y").unwrap().session;
    agg.on_snapshot_labeled(tagged(session, u64::MAX), label(0));
    agg.on_snapshot_labeled(tagged(session, 0), label(1));
    assert_eq!(agg.metrics().incremental_downloads, i64::MIN);
}

#[test]
fn zero_base_yields_zero_incremental() {
    let mut agg = seeded_aggregator(11);
    let session = agg.track("brand-new").unwrap().session;
    agg.on_snapshot_labeled(tagged(session, 0), label(0));
    agg.on_snapshot_labeled(tagged(session, 40), label(1));
    assert_eq!(agg.metrics().incremental_downloads, 0);
}

#[test]
fn breakdown_defaults_absent_scores_to_zero() {
    let mut agg = seeded_aggregator(12);
    let session = agg.track("react").unwrap().session;
    let snapshot = Snapshot {
        maintenance: Some(0.8),
        popularity: Some(0.6),
        quality: None,
        ..Snapshot::default()
    };
    agg.on_snapshot_labeled(TaggedSnapshot { session, snapshot }, label(0));
    assert_eq!(
        agg.metrics().breakdown,
        Breakdown {
            maintenance: 0.8,
            popularity: 0.6,
            quality: 0.0
        }
    );
}

#[test]
fn dashboard_view_reflects_session() {
    let mut agg = seeded_aggregator(13);
    assert_eq!(agg.dashboard_view(ChannelStatus::Connecting), DashboardView::default());

    let session = agg.track("react").unwrap().session;
    let awaiting = agg.dashboard_view(ChannelStatus::Connected);
    assert_eq!(awaiting.phase, SessionPhase::Awaiting);
    assert_eq!(awaiting.package.as_deref(), Some("react"));
    assert!(awaiting.snapshot.is_none());

    agg.on_snapshot_labeled(tagged(session, 42), label(0));
    let live = agg.dashboard_view(ChannelStatus::Connected);
    assert_eq!(live.phase, SessionPhase::Live);
    assert_eq!(live.session, Some(session));
    assert_eq!(live.downloads.values, vec![42]);
    assert_eq!(live.downloads.labels, vec![label(0)]);
    assert_eq!(live.rate.values.len(), 1);
    assert_eq!(live.snapshot.unwrap().estimated_downloads, 42);
}

#[test]
fn wall_clock_labels_use_time_of_day_format() {
    let mut agg = seeded_aggregator(14);
    let session = agg.track("react").unwrap().session;
    agg.on_snapshot(tagged(session, 1));
    let label = &agg.downloads().last().unwrap().label;
    assert!(chrono::NaiveTime::parse_from_str(label, "%H:%M:%S").is_ok());
}
