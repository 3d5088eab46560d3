//! Transit tracker component
//!
//! Ties the pieces together: configuration, the connection manager, the
//! schedule store, row composition, scroll timing and rendering. The
//! platform drives it from a single loop:
//!
//! ```text
//! setup() once
//! loop {
//!     tick()            timers, then inbound messages
//!     draw_schedule()   one display frame
//! }
//! on_shutdown()
//! ```

use alloc::vec::Vec;

use transit_protocol::Subscribe;

use crate::compose::{compose, ComposeOptions, ComposedRows};
use crate::config::{ConfigError, TrackerConfig};
use crate::connection::{
    ConnectOutcome, ConnectionManager, LinkUpdate, CONNECT_ERROR, HEALTH_CHECK_INTERVAL_MS,
    STALE_SCHEDULE_S,
};
use crate::localization::Localization;
use crate::render::{Placeholder, Readiness, Renderer, RowLayout, TOP_MARGIN};
use crate::schedule::{ScheduleStore, TripDecoder};
use crate::scroll::{Pager, ScrollClock};
use crate::timer::TimerQueue;
use crate::traits::{
    Connectivity, DisplaySurface, GlyphMetrics, MessageTransport, RealTimeClock, Scheduler,
    StatusSink, SystemControl, TimerId, Uptime,
};

/// Error status raised for an undecodable schedule
pub const PARSE_ERROR: &str = "Failed to parse schedule data";

/// Inbound events handled per tick
const MAX_UPDATES_PER_TICK: usize = 8;

/// Platform services borrowed for one call
pub struct Env<'a> {
    pub rtc: &'a dyn RealTimeClock,
    pub uptime: &'a dyn Uptime,
    pub network: &'a dyn Connectivity,
    pub status: &'a mut dyn StatusSink,
    pub system: &'a mut dyn SystemControl,
}

/// The arrivals display
pub struct TransitTracker<T, S = TimerQueue> {
    config: TrackerConfig,
    decoder: TripDecoder,
    store: ScheduleStore,
    connection: ConnectionManager<T>,
    compose_options: ComposeOptions,
    rows: ComposedRows,
    clock: ScrollClock,
    pager: Pager,
    localization: Localization,
    renderer: Renderer,
    scheduler: S,
}

impl<T: MessageTransport, S: Scheduler> TransitTracker<T, S> {
    /// Validate `config` and build the tracker around `transport`
    pub fn new(config: TrackerConfig, transport: T, scheduler: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let route_stop_pairs = config.route_stop_pairs();
        let subscribe = Subscribe {
            feed_code: &config.feed_code,
            route_stop_pairs: &route_stop_pairs,
            limit: config.limit,
            sort_by_departure: config.sort_by_departure(),
            list_mode: config.list_mode.as_str(),
        }
        .to_json()
        .map_err(|_| ConfigError::Subscribe)?;

        let decoder = TripDecoder::new(
            config.route_styles(),
            config.abbreviation_table(),
            config.default_color()?,
        );
        let connection = ConnectionManager::new(transport, config.base_url.clone(), subscribe);

        Ok(Self {
            decoder,
            store: ScheduleStore::new(),
            connection,
            compose_options: ComposeOptions::from(&config.display),
            rows: ComposedRows::default(),
            clock: ScrollClock::new(config.scroll),
            pager: Pager::new(),
            localization: config.localization(),
            renderer: Renderer::new(config.time_display),
            scheduler,
            config,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    /// Rows composed from the latest schedule
    pub fn rows(&self) -> &ComposedRows {
        &self.rows
    }

    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut ConnectionManager<T> {
        &mut self.connection
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn localization(&self) -> &Localization {
        &self.localization
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Log the configuration
    pub fn dump_config(&self) {
        let config = &self.config;
        info!("Transit Tracker:");
        info!("  Base URL: {}", config.base_url.as_str());
        info!("  Feed code: {}", config.feed_code.as_str());
        info!("  Limit: {}", config.limit);
        info!("  Time display: {:?}", config.time_display);
        info!("  List mode: {}", config.list_mode.as_str());
        info!("  Show units: {:?}", config.show_units);
        info!("  Route/stop pairs: {}", config.route_stop_pairs().as_str());
        info!("  Route styles: {}", config.route_styles().len());
        info!("  Abbreviations: {}", config.abbreviation_table().len());
        info!(
            "  Display: {:?}, dual time {}, {} rows",
            config.display.mode,
            config.display.dual_time,
            config.display.row_limit
        );
        info!(
            "  Scrolling: {}, paging: {} ({} per page)",
            config.scroll.scrolling,
            config.scroll.paging,
            config.scroll.trips_per_page
        );
    }

    /// Connect and start the health check
    pub fn setup(&mut self, env: &mut Env<'_>) {
        let now_ms = env.uptime.uptime_ms();
        self.connect(env);
        self.scheduler
            .set_interval(TimerId::HealthCheck, now_ms, HEALTH_CHECK_INTERVAL_MS);
    }

    /// Run due timers, then handle pending inbound messages
    pub fn tick(&mut self, env: &mut Env<'_>) {
        let now_ms = env.uptime.uptime_ms();
        while let Some(id) = self.scheduler.pop_due(now_ms) {
            self.on_timer(id, env);
        }

        for _ in 0..MAX_UPDATES_PER_TICK {
            let Some(update) = self.connection.poll(now_ms) else {
                break;
            };
            self.on_update(update, env);
        }
    }

    /// Dispatch a fired timer
    pub fn on_timer(&mut self, id: TimerId, env: &mut Env<'_>) {
        trace!("Timer {:?} fired", id);
        match id {
            TimerId::Connect | TimerId::Reconnect => self.connect(env),
            TimerId::HealthCheck => self.health_check(env),
        }
    }

    pub fn connect(&mut self, env: &mut Env<'_>) {
        let outcome = self.connection.connect(env.network, env.system);
        self.apply_outcome(outcome, env);
    }

    /// Close and connect again; repeated calls leave one pending retry
    pub fn reconnect(&mut self, env: &mut Env<'_>) {
        let outcome = self.connection.reconnect(env.network, env.system);
        self.apply_outcome(outcome, env);
    }

    /// Close the connection; `fully` prevents any reconnect
    pub fn close(&mut self, fully: bool) {
        self.connection.close(fully);
    }

    fn apply_outcome(&mut self, outcome: ConnectOutcome, env: &mut Env<'_>) {
        match outcome {
            ConnectOutcome::Connected => {
                env.status.clear_error();
                self.scheduler.cancel(TimerId::Reconnect);
            }
            ConnectOutcome::Failed(plan) => {
                if plan.raise_error {
                    env.status.set_error(CONNECT_ERROR);
                }
                if plan.restart {
                    env.system.restart();
                }
                let now_ms = env.uptime.uptime_ms();
                self.scheduler
                    .set_timeout(TimerId::Reconnect, now_ms, plan.delay_ms);
            }
            ConnectOutcome::Skipped(_) => {}
        }
    }

    /// Reconnect when the heartbeat went silent or the schedule went stale
    pub fn health_check(&mut self, env: &mut Env<'_>) {
        if !self.connection.is_connected() {
            return;
        }

        let now_ms = env.uptime.uptime_ms();
        if self.connection.heartbeat_expired(now_ms) {
            warn!("Heartbeat timeout, reconnecting");
            self.reconnect(env);
        } else if env.rtc.is_valid() && self.store.is_stale(env.rtc.timestamp(), STALE_SCHEDULE_S)
        {
            warn!("Schedule data is stale, reconnecting");
            self.reconnect(env);
        }
    }

    /// Apply one update from the link
    pub fn on_update(&mut self, update: LinkUpdate, env: &mut Env<'_>) {
        match update {
            LinkUpdate::Schedule(wires) => match self.decoder.decode_all(wires) {
                Ok(trips) => {
                    debug!("Schedule updated ({} trips)", trips.len());
                    self.store.update(trips);
                    env.status.clear_error();
                    self.recompose();
                }
                Err(e) => {
                    warn!("Rejected schedule: {:?}", e);
                    env.status.set_error(PARSE_ERROR);
                }
            },
            LinkUpdate::Malformed(_) => env.status.set_error(PARSE_ERROR),
            LinkUpdate::Closed { reconnect: true } => {
                self.scheduler
                    .defer(TimerId::Connect, env.uptime.uptime_ms());
            }
            LinkUpdate::Closed { reconnect: false }
            | LinkUpdate::Heartbeat
            | LinkUpdate::Ignored => {}
        }
    }

    /// Rebuild the display rows from the current snapshot
    pub fn recompose(&mut self) {
        let trips = self.store.snapshot();
        self.rows = compose(trips, &self.compose_options);
    }

    /// Draw one frame
    pub fn draw_schedule(
        &mut self,
        surface: &mut dyn DisplaySurface,
        glyphs: &dyn GlyphMetrics,
        env: &Env<'_>,
    ) {
        surface.clear();

        let readiness = Readiness {
            network_connected: env.network.is_connected(),
            time_synced: env.rtc.is_valid(),
            has_base_url: !self.config.base_url.is_empty(),
            has_error: env.status.has_error(),
            ever_connected: self.connection.ever_connected(),
            schedule_empty: self.rows.is_empty(),
        };
        if let Some(placeholder) = Placeholder::select(&readiness, self.renderer.time_display()) {
            self.renderer.draw_placeholder(surface, placeholder);
            return;
        }

        let now_ms = env.uptime.uptime_ms();
        let now = env.rtc.timestamp();
        let rows = self.rows.len();
        let per_page = if self.config.scroll.paging {
            self.config.scroll.trips_per_page
        } else {
            rows
        };

        let dwell_ms = u64::from(self.config.scroll.page_min_dwell_ms).max(self.clock.cycle_ms());
        if self.pager.update(now_ms, rows, per_page, dwell_ms) {
            self.clock.reset(now_ms);
        }
        self.clock.begin_frame(now_ms);

        let width = surface.width();
        let layouts: Vec<RowLayout<'_>> = self
            .pager
            .visible(rows, per_page)
            .filter_map(|index| self.rows.get(index))
            .map(|row| {
                self.renderer
                    .layout(row, glyphs, &self.localization, now, width)
            })
            .collect();

        let scroll = self.clock.config();
        let overflows: Vec<i32> = layouts
            .iter()
            .map(|layout| scroll.overflow(layout.headsign_width, layout.available_width()))
            .collect();
        self.clock.set_overflows(overflows.iter().copied());

        let mut y = TOP_MARGIN;
        for (layout, &overflow) in layouts.iter().zip(&overflows) {
            let offset = self.clock.offset(overflow, now_ms);
            self.renderer
                .draw_row(surface, layout, y, offset, self.clock.blink_frame());
            y += layout.line_height;
        }
    }

    /// Close for good and drop every pending timer
    pub fn on_shutdown(&mut self) {
        info!("Shutting down, closing connection");
        self.connection.close(true);
        self.scheduler.cancel_all();
    }
}
