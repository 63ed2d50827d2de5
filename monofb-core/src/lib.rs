//! Board-agnostic core logic for the monofb framebuffer driver
//!
//! This crate contains everything that does not touch a bus or a clock:
//!
//! - Display geometry constants
//! - The client-visible framebuffer store with its bounded write path
//! - The row-major to page-major pixel reformatter
//! - The shadow buffer used for change detection
//!
//! The hardware-facing half (I2C transport, SH1106 command protocol and
//! the refresh task) lives in `monofb-sh1106`.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod layout;
pub mod shadow;
pub mod store;

pub use layout::pack_page;
pub use shadow::ShadowBuffer;
pub use store::{FrameStore, MapRegion, StoreError};

/// Display width in pixels
pub const WIDTH: usize = 128;

/// Display height in pixels
pub const HEIGHT: usize = 64;

/// Number of 8-row pages the controller divides the display into
pub const PAGES: usize = HEIGHT / 8;

/// Bytes per row in the client-visible linear layout (1 bit per pixel)
pub const LINE_LENGTH: usize = WIDTH / 8;

/// Logical frame size in bytes
pub const FRAME_LEN: usize = LINE_LENGTH * HEIGHT;

/// Granularity the backing store is padded to, so the whole region can be
/// handed out for shared mapping
pub const MAP_PAGE_SIZE: usize = 4096;

/// Allocated size of the backing store (whole mapping pages)
pub const STORE_LEN: usize = ((FRAME_LEN + MAP_PAGE_SIZE - 1) / MAP_PAGE_SIZE) * MAP_PAGE_SIZE;
