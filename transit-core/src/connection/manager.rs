//! Connection lifecycle: connect, subscribe, heartbeat, backoff, restart
//!
//! The manager only decides. Scheduling retries, raising the error
//! status and restarting the device are carried out by the caller from
//! the returned [`ConnectOutcome`], so the policy is testable without a
//! scheduler.

use alloc::string::String;
use alloc::vec::Vec;

use transit_protocol::{Inbound, MessageError, WireTrip};

use super::state::{ConnectionState, LinkEvent};
use crate::traits::{Connectivity, MessageTransport, SystemControl, TransportEvent, WatchdogGuard};

/// Backoff step per consecutive failure
pub const RETRY_STEP_MS: u32 = 5000;

/// Backoff cap
pub const MAX_RETRY_DELAY_MS: u32 = 15000;

/// Consecutive failures before the error status is raised
pub const ERROR_AFTER_ATTEMPTS: u32 = 3;

/// Consecutive failures before the device is restarted
pub const RESTART_AFTER_ATTEMPTS: u32 = 15;

/// Silence after the last heartbeat that counts as a dead link
pub const HEARTBEAT_TIMEOUT_MS: u64 = 60_000;

/// Age of the newest departure that counts as a stale schedule
pub const STALE_SCHEDULE_S: i64 = 60;

/// Health check period
pub const HEALTH_CHECK_INTERVAL_MS: u32 = 10_000;

/// Watchdog timeout while a connect attempt is in progress
pub const CONNECT_WATCHDOG_MS: u32 = 20_000;

/// Error status raised after repeated connection failures
pub const CONNECT_ERROR: &str = "Failed to connect to WebSocket server";

/// Retry delay after `attempts` consecutive failures
pub fn retry_delay_ms(attempts: u32) -> u32 {
    attempts.saturating_mul(RETRY_STEP_MS).min(MAX_RETRY_DELAY_MS)
}

/// Why a connect call did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SkipReason {
    NoBaseUrl,
    PermanentlyClosed,
    AlreadyConnected,
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPlan {
    /// Consecutive failures so far
    pub attempts: u32,
    /// Delay before the next attempt
    pub delay_ms: u32,
    /// Raise the connection error status
    pub raise_error: bool,
    /// Restart the device
    pub restart: bool,
}

impl RetryPlan {
    pub fn after(attempts: u32) -> Self {
        Self {
            attempts,
            delay_ms: retry_delay_ms(attempts),
            raise_error: attempts >= ERROR_AFTER_ATTEMPTS,
            restart: attempts >= RESTART_AFTER_ATTEMPTS,
        }
    }
}

/// Result of a connect call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectOutcome {
    Skipped(SkipReason),
    Connected,
    Failed(RetryPlan),
}

/// Something that arrived on the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkUpdate {
    Heartbeat,
    /// New schedule, not yet converted
    Schedule(Vec<WireTrip>),
    /// Undecodable document
    Malformed(MessageError),
    /// The connection was lost; `reconnect` says whether to retry now
    Closed { reconnect: bool },
    /// Ping, pong or an unknown event
    Ignored,
}

/// Owns the transport and the connection policy
pub struct ConnectionManager<T> {
    transport: T,
    base_url: String,
    subscribe: String,
    state: ConnectionState,
    attempts: u32,
    last_heartbeat_ms: u64,
    ever_connected: bool,
}

impl<T: MessageTransport> ConnectionManager<T> {
    /// `subscribe` is the document sent after every successful connect
    pub fn new(transport: T, base_url: String, subscribe: String) -> Self {
        Self {
            transport,
            base_url,
            subscribe,
            state: ConnectionState::Disconnected,
            attempts: 0,
            last_heartbeat_ms: 0,
            ever_connected: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Consecutive failed attempts
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn ever_connected(&self) -> bool {
        self.ever_connected
    }

    /// Uptime of the last heartbeat, 0 if none since connecting
    pub fn last_heartbeat_ms(&self) -> u64 {
        self.last_heartbeat_ms
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn apply(&mut self, event: LinkEvent) {
        let next = self.state.transition(event);
        if next != self.state {
            trace!("Connection {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    /// Try to connect and subscribe
    pub fn connect(
        &mut self,
        network: &dyn Connectivity,
        system: &mut dyn SystemControl,
    ) -> ConnectOutcome {
        if self.base_url.is_empty() {
            warn!("No base URL set, not connecting");
            return ConnectOutcome::Skipped(SkipReason::NoBaseUrl);
        }
        if self.state.is_terminal() {
            warn!("Connection fully closed, not reconnecting");
            return ConnectOutcome::Skipped(SkipReason::PermanentlyClosed);
        }
        if self.state.is_connected() {
            if self.transport.is_open() {
                trace!("Not reconnecting, already connected");
                return ConnectOutcome::Skipped(SkipReason::AlreadyConnected);
            }
            // Lost without a close event
            self.apply(LinkEvent::TransportClosed);
        }

        let _watchdog = WatchdogGuard::new(system, CONNECT_WATCHDOG_MS);

        self.last_heartbeat_ms = 0;
        debug!(
            "Connecting to WebSocket server (attempt {}): {}",
            self.attempts,
            self.base_url.as_str()
        );
        self.apply(LinkEvent::ConnectRequested);

        let connected = if network.is_connected() {
            self.open_and_subscribe()
        } else {
            warn!("Not connected to network; skipping connection attempt");
            false
        };

        if connected {
            self.apply(LinkEvent::TransportOpened);
            info!("WebSocket connection opened");
            self.attempts = 0;
            self.ever_connected = true;
            return ConnectOutcome::Connected;
        }

        self.apply(LinkEvent::ConnectFailed);
        self.attempts = self.attempts.saturating_add(1);
        let plan = RetryPlan::after(self.attempts);
        warn!("Failed to connect, retrying in {}s", plan.delay_ms / 1000);
        if plan.restart {
            error!("{} consecutive connection failures, restarting", plan.attempts);
        }
        ConnectOutcome::Failed(plan)
    }

    fn open_and_subscribe(&mut self) -> bool {
        if self.transport.connect(&self.base_url).is_err() {
            return false;
        }
        trace!("Sending message: {}", self.subscribe.as_str());
        if self.transport.send_text(&self.subscribe).is_err() {
            warn!("Failed to send subscribe message");
            self.transport.close();
            return false;
        }
        true
    }

    /// Close and connect again
    pub fn reconnect(
        &mut self,
        network: &dyn Connectivity,
        system: &mut dyn SystemControl,
    ) -> ConnectOutcome {
        self.close(false);
        self.connect(network, system)
    }

    /// Close the transport; `fully` latches the permanent close
    pub fn close(&mut self, fully: bool) {
        if fully {
            self.apply(LinkEvent::FullCloseRequested);
        } else {
            self.apply(LinkEvent::CloseRequested);
        }
        self.transport.close();
        self.apply(LinkEvent::TransportClosed);
    }

    /// Whether the heartbeat has been silent for too long
    pub fn heartbeat_expired(&self, now_ms: u64) -> bool {
        self.last_heartbeat_ms != 0
            && now_ms.saturating_sub(self.last_heartbeat_ms) > HEARTBEAT_TIMEOUT_MS
    }

    /// Process one pending transport event
    pub fn poll(&mut self, now_ms: u64) -> Option<LinkUpdate> {
        let event = self.transport.poll()?;

        let update = match event {
            TransportEvent::Text(text) => {
                trace!("Received message: {}", text.as_str());
                match Inbound::parse(&text) {
                    Ok(Inbound::Heartbeat) => {
                        debug!("Received heartbeat");
                        // 0 means "no heartbeat yet"
                        self.last_heartbeat_ms = now_ms.max(1);
                        LinkUpdate::Heartbeat
                    }
                    Ok(Inbound::Schedule(trips)) => {
                        debug!("Received schedule update ({} trips)", trips.len());
                        LinkUpdate::Schedule(trips)
                    }
                    Ok(Inbound::Other) => LinkUpdate::Ignored,
                    Err(e) => {
                        warn!("Failed to parse message: {:?}", e);
                        LinkUpdate::Malformed(e)
                    }
                }
            }
            TransportEvent::Ping => {
                trace!("Received ping");
                LinkUpdate::Ignored
            }
            TransportEvent::Pong => {
                trace!("Received pong");
                LinkUpdate::Ignored
            }
            TransportEvent::Closed => {
                debug!("WebSocket connection closed");
                self.apply(LinkEvent::TransportClosed);
                LinkUpdate::Closed {
                    reconnect: !self.state.is_terminal() && self.attempts == 0,
                }
            }
        };

        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeNetwork, FakeSystem, ScriptedTransport};
    use alloc::string::ToString;
    use proptest::prelude::*;

    fn manager(url: &str) -> ConnectionManager<ScriptedTransport> {
        ConnectionManager::new(
            ScriptedTransport::new(),
            url.to_string(),
            r#"{"event":"schedule:subscribe"}"#.to_string(),
        )
    }

    #[test]
    fn test_backoff_values() {
        assert_eq!(retry_delay_ms(1), 5000);
        assert_eq!(retry_delay_ms(2), 10000);
        assert_eq!(retry_delay_ms(3), 15000);
        assert_eq!(retry_delay_ms(20), 15000);
        assert_eq!(retry_delay_ms(u32::MAX), 15000);
    }

    #[test]
    fn test_connect_sends_subscribe() {
        let mut m = manager("ws://feed");
        let network = FakeNetwork::new(true);
        let mut system = FakeSystem::new(5000);

        assert_eq!(m.connect(&network, &mut system), ConnectOutcome::Connected);
        assert_eq!(m.state(), ConnectionState::Connected);
        assert!(m.ever_connected());
        assert_eq!(m.transport().sent, [r#"{"event":"schedule:subscribe"}"#]);
        assert_eq!(m.transport().connected_urls, ["ws://feed"]);
        // Watchdog raised for the attempt, then restored
        assert_eq!(system.watchdog_history, [CONNECT_WATCHDOG_MS, 5000]);
    }

    #[test]
    fn test_connect_skips() {
        let network = FakeNetwork::new(true);
        let mut system = FakeSystem::new(5000);

        let mut m = manager("");
        assert_eq!(
            m.connect(&network, &mut system),
            ConnectOutcome::Skipped(SkipReason::NoBaseUrl)
        );

        let mut m = manager("ws://feed");
        m.connect(&network, &mut system);
        assert_eq!(
            m.connect(&network, &mut system),
            ConnectOutcome::Skipped(SkipReason::AlreadyConnected)
        );

        m.close(true);
        assert_eq!(
            m.connect(&network, &mut system),
            ConnectOutcome::Skipped(SkipReason::PermanentlyClosed)
        );
        assert_eq!(m.transport().connected_urls.len(), 1);
    }

    #[test]
    fn test_no_network_counts_as_failure() {
        let mut m = manager("ws://feed");
        let network = FakeNetwork::new(false);
        let mut system = FakeSystem::new(5000);

        let outcome = m.connect(&network, &mut system);

        assert_eq!(outcome, ConnectOutcome::Failed(RetryPlan::after(1)));
        assert!(m.transport().connected_urls.is_empty());
        assert_eq!(m.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_failure_escalation() {
        let mut m = manager("ws://feed");
        m.transport_mut().fail_connects = true;
        let network = FakeNetwork::new(true);
        let mut system = FakeSystem::new(5000);

        let ConnectOutcome::Failed(first) = m.connect(&network, &mut system) else {
            panic!("expected failure");
        };
        assert_eq!(first.delay_ms, 5000);
        assert!(!first.raise_error);

        m.connect(&network, &mut system);
        let ConnectOutcome::Failed(third) = m.connect(&network, &mut system) else {
            panic!("expected failure");
        };
        assert_eq!(third.delay_ms, 15000);
        assert!(third.raise_error);
        assert!(!third.restart);

        let mut last = third;
        for _ in 3..15 {
            if let ConnectOutcome::Failed(plan) = m.connect(&network, &mut system) {
                last = plan;
            }
        }
        assert_eq!(last.attempts, 15);
        assert!(last.restart);
    }

    #[test]
    fn test_success_resets_attempts() {
        let mut m = manager("ws://feed");
        let network = FakeNetwork::new(true);
        let mut system = FakeSystem::new(5000);

        m.transport_mut().fail_connects = true;
        m.connect(&network, &mut system);
        m.connect(&network, &mut system);
        assert_eq!(m.attempts(), 2);

        m.transport_mut().fail_connects = false;
        assert_eq!(m.connect(&network, &mut system), ConnectOutcome::Connected);
        assert_eq!(m.attempts(), 0);
    }

    #[test]
    fn test_heartbeat_tracking() {
        let mut m = manager("ws://feed");
        let network = FakeNetwork::new(true);
        let mut system = FakeSystem::new(5000);
        m.connect(&network, &mut system);

        assert!(!m.heartbeat_expired(1_000_000));

        m.transport_mut().push_text(r#"{"event":"heartbeat"}"#);
        assert_eq!(m.poll(10_000), Some(LinkUpdate::Heartbeat));
        assert_eq!(m.last_heartbeat_ms(), 10_000);
        assert!(!m.heartbeat_expired(70_000));
        assert!(m.heartbeat_expired(70_001));
    }

    #[test]
    fn test_connect_resets_heartbeat() {
        let mut m = manager("ws://feed");
        let network = FakeNetwork::new(true);
        let mut system = FakeSystem::new(5000);
        m.connect(&network, &mut system);
        m.transport_mut().push_text(r#"{"event":"heartbeat"}"#);
        m.poll(10_000);

        m.reconnect(&network, &mut system);

        assert_eq!(m.last_heartbeat_ms(), 0);
        assert!(!m.heartbeat_expired(1_000_000));
    }

    #[test]
    fn test_malformed_and_unknown() {
        let mut m = manager("ws://feed");
        m.transport_mut().push_text("not json");
        m.transport_mut().push_text(r#"{"event":"hello"}"#);
        m.transport_mut().push(TransportEvent::Ping);

        assert_eq!(m.poll(0), Some(LinkUpdate::Malformed(MessageError::InvalidJson)));
        assert_eq!(m.poll(0), Some(LinkUpdate::Ignored));
        assert_eq!(m.poll(0), Some(LinkUpdate::Ignored));
        assert_eq!(m.poll(0), None);
    }

    #[test]
    fn test_remote_close_requests_reconnect() {
        let mut m = manager("ws://feed");
        let network = FakeNetwork::new(true);
        let mut system = FakeSystem::new(5000);
        m.connect(&network, &mut system);

        m.transport_mut().remote_close();

        assert_eq!(m.poll(0), Some(LinkUpdate::Closed { reconnect: true }));
        assert_eq!(m.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_close_after_full_close_does_not_reconnect() {
        let mut m = manager("ws://feed");
        m.close(true);
        m.transport_mut().push(TransportEvent::Closed);

        assert_eq!(m.poll(0), Some(LinkUpdate::Closed { reconnect: false }));
        assert_eq!(m.state(), ConnectionState::ClosedPermanently);
    }

    #[test]
    fn test_close_while_retrying_does_not_reconnect() {
        let mut m = manager("ws://feed");
        let network = FakeNetwork::new(false);
        let mut system = FakeSystem::new(5000);
        m.connect(&network, &mut system);
        m.transport_mut().push(TransportEvent::Closed);

        assert_eq!(m.poll(0), Some(LinkUpdate::Closed { reconnect: false }));
    }

    #[test]
    fn test_failed_subscribe_counts_as_failure() {
        let mut m = manager("ws://feed");
        m.transport_mut().fail_sends = true;
        let network = FakeNetwork::new(true);
        let mut system = FakeSystem::new(5000);

        assert!(matches!(
            m.connect(&network, &mut system),
            ConnectOutcome::Failed(_)
        ));
        assert!(!m.transport().is_open());
    }

    proptest! {
        #[test]
        fn prop_backoff_is_linear_and_capped(n in 1u32..=20) {
            prop_assert_eq!(retry_delay_ms(n), core::cmp::min(15000, n * 5000));
        }

        #[test]
        fn prop_plan_thresholds(n in 1u32..=40) {
            let plan = RetryPlan::after(n);
            prop_assert_eq!(plan.raise_error, n >= 3);
            prop_assert_eq!(plan.restart, n >= 15);
        }
    }
}
