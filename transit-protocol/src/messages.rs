//! JSON documents exchanged with the schedule feed
//!
//! Outbound:
//! - `schedule:subscribe` with the route/stop selector and list options
//!
//! Inbound:
//! - `heartbeat`, no payload
//! - `schedule`, carrying the complete list of upcoming trips
//!
//! Any other inbound event is accepted and ignored.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Event names
pub const EVENT_SUBSCRIBE: &str = "schedule:subscribe";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_SCHEDULE: &str = "schedule";

/// Message encode/decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Not a JSON object with a string `event` field
    InvalidJson,
    /// `schedule` event without a `data` object
    MissingData,
    /// `schedule` payload does not match the trip schema
    InvalidSchedule,
    /// Outbound document could not be serialized
    Encode,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::InvalidJson => f.write_str("invalid JSON document"),
            MessageError::MissingData => f.write_str("schedule event without data"),
            MessageError::InvalidSchedule => f.write_str("invalid schedule payload"),
            MessageError::Encode => f.write_str("failed to encode message"),
        }
    }
}

/// Subscription request, sent once per successful connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscribe<'a> {
    /// Feed to query, omitted from the document when empty
    pub feed_code: &'a str,
    /// `route,stop,offset` triples joined by `;`
    pub route_stop_pairs: &'a str,
    /// Maximum number of trips the server should return
    pub limit: u32,
    /// Order by departure rather than arrival time
    pub sort_by_departure: bool,
    /// `sequential` or `nextPerRoute`
    pub list_mode: &'a str,
}

#[derive(Serialize)]
struct Outbound<'a, T> {
    event: &'a str,
    data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    feed_code: Option<&'a str>,
    route_stop_pairs: &'a str,
    limit: u32,
    sort_by_departure: bool,
    list_mode: &'a str,
}

impl<'a> Subscribe<'a> {
    /// Serialize to the wire document
    pub fn to_json(&self) -> Result<String, MessageError> {
        let document = Outbound {
            event: EVENT_SUBSCRIBE,
            data: SubscribeData {
                feed_code: Some(self.feed_code).filter(|code| !code.is_empty()),
                route_stop_pairs: self.route_stop_pairs,
                limit: self.limit,
                sort_by_departure: self.sort_by_departure,
                list_mode: self.list_mode,
            },
        };
        serde_json::to_string(&document).map_err(|_| MessageError::Encode)
    }
}

/// One trip as sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTrip {
    pub route_id: String,
    /// Older servers do not send a stop id
    #[serde(default)]
    pub stop_id: Option<String>,
    pub route_name: String,
    /// Hex RGB, with or without a leading `#`
    #[serde(default)]
    pub route_color: Option<String>,
    pub headsign: String,
    pub arrival_time: i64,
    pub departure_time: i64,
    #[serde(default)]
    pub is_realtime: bool,
}

impl WireTrip {
    /// Stop id, empty when the server did not send one
    pub fn stop_id(&self) -> &str {
        self.stop_id.as_deref().unwrap_or("")
    }
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ScheduleData {
    trips: Vec<WireTrip>,
}

/// Decoded inbound document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Server liveness signal
    Heartbeat,
    /// Full replacement schedule
    Schedule(Vec<WireTrip>),
    /// Any other event
    Other,
}

impl Inbound {
    /// Parse a text message from the server
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|_| MessageError::InvalidJson)?;

        match envelope.event.as_str() {
            EVENT_HEARTBEAT => Ok(Inbound::Heartbeat),
            EVENT_SCHEDULE => {
                let data = envelope.data.ok_or(MessageError::MissingData)?;
                let schedule: ScheduleData =
                    serde_json::from_value(data).map_err(|_| MessageError::InvalidSchedule)?;
                Ok(Inbound::Schedule(schedule.trips))
            }
            _ => Ok(Inbound::Other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscribe(feed_code: &str) -> Subscribe<'_> {
        Subscribe {
            feed_code,
            route_stop_pairs: "40,1_123,0;271,1_456,120",
            limit: 10,
            sort_by_departure: true,
            list_mode: "sequential",
        }
    }

    #[test]
    fn test_subscribe_document() {
        let json = subscribe("st").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["event"], "schedule:subscribe");
        assert_eq!(value["data"]["feedCode"], "st");
        assert_eq!(value["data"]["routeStopPairs"], "40,1_123,0;271,1_456,120");
        assert_eq!(value["data"]["limit"], 10);
        assert_eq!(value["data"]["sortByDeparture"], true);
        assert_eq!(value["data"]["listMode"], "sequential");
    }

    #[test]
    fn test_subscribe_omits_empty_feed_code() {
        let json = subscribe("").to_json().unwrap();
        assert!(!json.contains("feedCode"));
    }

    #[test]
    fn test_parse_heartbeat() {
        assert_eq!(Inbound::parse(r#"{"event":"heartbeat"}"#), Ok(Inbound::Heartbeat));
    }

    #[test]
    fn test_parse_schedule() {
        let text = r#"{"event":"schedule","data":{"trips":[
            {"routeId":"40","stopId":"123","routeName":"40","routeColor":"FF0000",
             "headsign":"Downtown","arrivalTime":1000,"departureTime":1010,"isRealtime":true},
            {"routeId":"8","routeName":"8","headsign":"Capitol Hill",
             "arrivalTime":1100,"departureTime":1100,"isRealtime":false}
        ]}}"#;

        let Inbound::Schedule(trips) = Inbound::parse(text).unwrap() else {
            panic!("expected schedule");
        };
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].stop_id(), "123");
        assert_eq!(trips[0].route_color.as_deref(), Some("FF0000"));
        assert!(trips[0].is_realtime);
        assert_eq!(trips[1].stop_id(), "");
        assert_eq!(trips[1].route_color, None);
        assert_eq!(trips[1].departure_time, 1100);
    }

    #[test]
    fn test_unknown_event_ignored() {
        assert_eq!(
            Inbound::parse(r#"{"event":"welcome","data":{"v":2}}"#),
            Ok(Inbound::Other)
        );
    }

    #[test]
    fn test_schedule_without_data() {
        assert_eq!(
            Inbound::parse(r#"{"event":"schedule"}"#),
            Err(MessageError::MissingData)
        );
    }

    #[test]
    fn test_schedule_with_bad_trip() {
        let text = r#"{"event":"schedule","data":{"trips":[{"routeId":"40"}]}}"#;
        assert_eq!(Inbound::parse(text), Err(MessageError::InvalidSchedule));
    }

    #[test]
    fn test_not_json() {
        assert_eq!(Inbound::parse("hello"), Err(MessageError::InvalidJson));
    }
}
