//! Schedule Feed Wire Protocol
//!
//! This crate defines the documents the tracker exchanges with the schedule
//! feed server over its persistent WebSocket connection. Framing is left to
//! the transport.
//!
//! # Protocol Overview
//!
//! Every application message is a single text message carrying a JSON
//! document with an `event` field:
//! ```text
//! tracker ──► {"event":"schedule:subscribe","data":{...}}
//! tracker ◄── {"event":"heartbeat"}
//! tracker ◄── {"event":"schedule","data":{"trips":[...]}}
//! ```
//!
//! The tracker subscribes once per successful connection and then only
//! listens; the server pushes a full schedule whenever it changes.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod messages;

pub use messages::{Inbound, MessageError, Subscribe, WireTrip};
