//! End-to-end tracker scenarios against the test doubles

use transit_core::config::{StopConfig, TrackerConfig};
use transit_core::connection::{ConnectionState, CONNECT_ERROR};
use transit_core::render::{REALTIME_COLOR, SCHEDULED_COLOR};
use transit_core::testing::{
    DrawOp, FakeClock, FakeNetwork, FakeSystem, FixedGlyphs, RecordingStatus, RecordingSurface,
    ScriptedTransport,
};
use transit_core::traits::{Scheduler, TimerId, Uptime};
use transit_core::{Env, TimerQueue, TransitTracker};

const NOW: i64 = 1_700_000_000;
const SAMPLE: &str = include_str!("../config/tracker.toml");

struct Platform {
    clock: FakeClock,
    network: FakeNetwork,
    status: RecordingStatus,
    system: FakeSystem,
}

impl Platform {
    fn new() -> Self {
        Self {
            clock: FakeClock::synced(NOW),
            network: FakeNetwork::new(true),
            status: RecordingStatus::default(),
            system: FakeSystem::new(8000),
        }
    }

    fn env(&mut self) -> Env<'_> {
        Env {
            rtc: &self.clock,
            uptime: &self.clock,
            network: &self.network,
            status: &mut self.status,
            system: &mut self.system,
        }
    }
}

fn single_stop() -> TrackerConfig {
    TrackerConfig {
        base_url: "ws://feed.example/".to_string(),
        stops: vec![StopConfig {
            stop_id: "123".to_string(),
            time_offset_s: 0,
            routes: vec!["40".to_string()],
        }],
        ..TrackerConfig::default()
    }
}

fn trip_json(route: &str, headsign: &str, departure: i64, realtime: bool) -> String {
    format!(
        r#"{{"routeId":"{route}","stopId":"123","routeName":"{route}","headsign":"{headsign}","arrivalTime":{departure},"departureTime":{departure},"isRealtime":{realtime}}}"#
    )
}

fn schedule(trips: &[String]) -> String {
    format!(
        r#"{{"event":"schedule","data":{{"trips":[{}]}}}}"#,
        trips.join(",")
    )
}

#[test]
fn sample_config_builds_tracker() {
    let config = TrackerConfig::from_toml(SAMPLE).unwrap();
    let mut platform = Platform::new();
    let mut tracker =
        TransitTracker::new(config, ScriptedTransport::new(), TimerQueue::new()).unwrap();

    tracker.setup(&mut platform.env());

    let sent = &tracker.connection().transport().sent;
    let subscribe: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
    assert_eq!(subscribe["event"], "schedule:subscribe");
    assert_eq!(subscribe["data"]["feedCode"], "st");
    assert_eq!(
        subscribe["data"]["routeStopPairs"],
        "40_100236,1_13760,120;1_100039,1_13760,120;1_102574,1_1121,0"
    );
    assert_eq!(subscribe["data"]["limit"], 10);
    assert_eq!(subscribe["data"]["sortByDeparture"], true);
    assert_eq!(subscribe["data"]["listMode"], "sequential");
}

#[test]
fn sample_config_tables_shape_trips() {
    let config = TrackerConfig::from_toml(SAMPLE).unwrap();
    let mut platform = Platform::new();
    let mut tracker =
        TransitTracker::new(config, ScriptedTransport::new(), TimerQueue::new()).unwrap();
    tracker.setup(&mut platform.env());

    let text = schedule(&[
        trip_json("40_100236", "Downtown Station", NOW + 300, false),
        trip_json("1_100039", "Airport (Express)", NOW + 400, false),
    ]);
    tracker.connection_mut().transport_mut().push_text(&text);
    tracker.tick(&mut platform.env());

    let trips = tracker.store().snapshot();
    assert_eq!(trips[0].route_name, "1 Line");
    assert_eq!(trips[0].headsign, "Dtwn Stn");
    assert_eq!(trips[1].route_name, "E Line");
    assert_eq!(trips[1].headsign, "Airport");
}

#[test]
fn repeated_failures_raise_error_then_restart() {
    let mut platform = Platform::new();
    let mut tracker =
        TransitTracker::new(single_stop(), ScriptedTransport::new(), TimerQueue::new()).unwrap();
    tracker.connection_mut().transport_mut().fail_connects = true;

    tracker.setup(&mut platform.env());
    assert_eq!(tracker.scheduler().due_ms(TimerId::Reconnect), Some(5000));
    assert_eq!(platform.status.error, None);

    for attempt in 2..=15 {
        let due = tracker.scheduler().due_ms(TimerId::Reconnect).unwrap();
        platform.clock.set_uptime_ms(due);
        tracker.tick(&mut platform.env());

        assert_eq!(tracker.connection().attempts(), attempt);
        assert_eq!(platform.status.error.is_some(), attempt >= 3);
        assert_eq!(platform.system.restarts, u32::from(attempt == 15));
    }

    assert_eq!(platform.status.error, Some(CONNECT_ERROR));
    let due = tracker.scheduler().due_ms(TimerId::Reconnect).unwrap();
    assert_eq!(due - platform.clock.uptime_ms(), 15_000);
}

#[test]
fn dual_time_row_from_schedule_message() {
    let mut config = single_stop();
    config.display.dual_time = true;
    let mut platform = Platform::new();
    let mut tracker =
        TransitTracker::new(config, ScriptedTransport::new(), TimerQueue::new()).unwrap();
    tracker.setup(&mut platform.env());

    let text = schedule(&[
        trip_json("40", "Downtown", NOW + 300, false),
        trip_json("40", "Downtown", NOW + 720, true),
    ]);
    tracker.connection_mut().transport_mut().push_text(&text);
    tracker.tick(&mut platform.env());

    assert_eq!(tracker.rows().len(), 1);
    let row = tracker.rows().get(0).unwrap();
    let times: Vec<i64> = row.slots().map(|trip| trip.departure_time).collect();
    assert_eq!(times, [NOW + 300, NOW + 720]);

    let mut surface = RecordingSurface::new(128, 32);
    tracker.draw_schedule(&mut surface, &FixedGlyphs::default(), &platform.env());

    let labels: Vec<_> = surface
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Print { text, color, .. } if text.contains("min") => {
                Some((text.as_str(), *color))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        labels,
        [("5min, ", SCHEDULED_COLOR), ("12min", REALTIME_COLOR)]
    );
    assert!(surface
        .ops
        .iter()
        .any(|op| matches!(op, DrawOp::Pixel { .. })));
}

#[test]
fn paging_rotates_rows() {
    let mut config = single_stop();
    config.scroll.paging = true;
    config.scroll.trips_per_page = 1;
    config.scroll.page_min_dwell_ms = 5000;
    let mut platform = Platform::new();
    let mut tracker =
        TransitTracker::new(config, ScriptedTransport::new(), TimerQueue::new()).unwrap();
    tracker.setup(&mut platform.env());
    let text = schedule(&[
        trip_json("40", "Downtown", NOW + 300, false),
        trip_json("8", "Uptown", NOW + 400, false),
    ]);
    tracker.connection_mut().transport_mut().push_text(&text);
    tracker.tick(&mut platform.env());

    let glyphs = FixedGlyphs::default();
    let mut surface = RecordingSurface::new(128, 32);
    tracker.draw_schedule(&mut surface, &glyphs, &platform.env());
    assert_eq!(surface.printed(), ["40", "5min", "Downtown"]);

    platform.clock.set_uptime_ms(4000);
    surface.ops.clear();
    tracker.draw_schedule(&mut surface, &glyphs, &platform.env());
    assert_eq!(surface.printed()[0], "40");

    platform.clock.set_uptime_ms(5000);
    surface.ops.clear();
    tracker.draw_schedule(&mut surface, &glyphs, &platform.env());
    assert_eq!(surface.printed(), ["8", "6min", "Uptown"]);
}

fn headsign_x(surface: &RecordingSurface, headsign: &str) -> i32 {
    surface
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Print { x, text, .. } if text == headsign => Some(*x),
            _ => None,
        })
        .unwrap()
}

#[test]
fn page_waits_for_scroll_cycle() {
    const FIRST: &str = "Downtown via Transit Center";
    const SECOND: &str = "Uptown via Northgate Station Loop";

    let mut config = single_stop();
    config.scroll.paging = true;
    config.scroll.trips_per_page = 1;
    config.scroll.page_min_dwell_ms = 5000;
    let mut platform = Platform::new();
    let mut tracker =
        TransitTracker::new(config, ScriptedTransport::new(), TimerQueue::new()).unwrap();
    tracker.setup(&mut platform.env());
    let text = schedule(&[
        trip_json("40", FIRST, NOW + 300, false),
        trip_json("8", SECOND, NOW + 360, false),
    ]);
    tracker.connection_mut().transport_mut().push_text(&text);
    tracker.tick(&mut platform.env());

    // 128 px wide, 5 px glyphs: "40" leaves 93 px for the first headsign
    // (135 px), so it overflows by 42 px and cycles in
    // 3000 + 2 * 2800 + 1500 = 10100 ms.
    let glyphs = FixedGlyphs::default();
    let mut surface = RecordingSurface::new(128, 32);
    let mut draw_at = |uptime_ms: u64, surface: &mut RecordingSurface| {
        platform.clock.set_uptime_ms(uptime_ms);
        surface.ops.clear();
        tracker.draw_schedule(surface, &glyphs, &platform.env());
    };

    draw_at(0, &mut surface);
    assert_eq!(surface.printed()[0], "40");
    assert_eq!(headsign_x(&surface, FIRST), 13);

    // Past the minimum dwell but mid-scroll
    draw_at(5000, &mut surface);
    assert_eq!(surface.printed()[0], "40");
    assert!(headsign_x(&surface, FIRST) < 13);

    draw_at(10_099, &mut surface);
    assert_eq!(surface.printed()[0], "40");

    // Next page starts its own cycle at idle-left
    draw_at(10_100, &mut surface);
    assert_eq!(surface.printed()[0], "8");
    assert_eq!(headsign_x(&surface, SECOND), 8);

    draw_at(14_100, &mut surface);
    assert!(headsign_x(&surface, SECOND) < 8);
}

#[test]
fn shutdown_leaves_nothing_pending() {
    let mut platform = Platform::new();
    let mut tracker =
        TransitTracker::new(single_stop(), ScriptedTransport::new(), TimerQueue::new()).unwrap();
    tracker.connection_mut().transport_mut().fail_connects = true;
    tracker.setup(&mut platform.env());
    assert_eq!(tracker.scheduler().pending(), 2);

    tracker.on_shutdown();

    assert_eq!(tracker.scheduler().pending(), 0);
    assert_eq!(tracker.connection().state(), ConnectionState::ClosedPermanently);
}
