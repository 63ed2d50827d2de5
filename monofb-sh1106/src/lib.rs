//! SH1106 OLED framebuffer driver
//!
//! Presents a 128x64 SH1106 panel as a linear 1-bit-per-pixel framebuffer
//! and keeps the glass synchronized over I2C. Clients write bytes into the
//! frame; a fixed-period background task diffs the frame against a shadow
//! copy of the last pushed content and retransmits all eight pages on any
//! change. Foreground writes also push synchronously, so small updates
//! appear without waiting for the next tick.
//!
//! # Architecture
//!
//! ```text
//! client write ──► FrameStore ──┐
//!                               ├─ mutex ─► dirty? ─► pack_page ─► Transport ─► panel
//! refresh task ── Ticker ───────┘
//! ```
//!
//! One mutex serializes the store, the shadow copy and the bus handle, so
//! the panel observes updates in the order they complete under the lock.
//! Shared mappings of the store are the documented exception: a mapped
//! writer races the refresh pass and can tear one frame, which the next
//! pass repairs.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Keep this first so the log macros are in scope for the other modules.
#[macro_use]
mod fmt;

pub mod bus;
pub mod driver;
pub mod protocol;

#[cfg(test)]
mod testutil;

pub use bus::{Transport, TransportError};
pub use driver::{Config, Error, RefreshState, Sh1106Fb, DEFAULT_ADDRESS, REFRESH_INTERVAL_MS};
