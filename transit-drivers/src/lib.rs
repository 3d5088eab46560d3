//! Transport and platform implementations
//!
//! This crate provides concrete host implementations of the traits
//! defined in transit-core:
//!
//! - WebSocket client on `tungstenite`, with rustls for `wss://`
//! - Host clocks and system services

#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod host;
pub mod websocket;

pub use websocket::{WsClient, WsError, DEFAULT_TIMEOUT};
