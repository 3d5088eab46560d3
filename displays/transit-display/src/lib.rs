//! Drawing for the transit tracker on `embedded-graphics` targets
//!
//! Adapts any [`DrawTarget`](embedded_graphics::draw_target::DrawTarget)
//! whose color converts from `Rgb888` to the core's
//! [`DisplaySurface`](transit_core::traits::DisplaySurface), and measures
//! text with the same monospace font it draws with.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod glyphs;
pub mod surface;

pub use glyphs::MonoGlyphs;
pub use surface::EgSurface;
