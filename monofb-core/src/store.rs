//! Canonical pixel memory exposed to clients
//!
//! The store is the write target for both the bounded write path and for
//! shared mappings. It is padded to a whole mapping page so the full
//! region can be handed to a mapper; only the first [`FRAME_LEN`] bytes
//! carry pixels.

use crate::{FRAME_LEN, STORE_LEN};

/// Errors from the client-facing store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Write offset at or past the end of the logical frame
    OffsetOutOfRange,
    /// Requested mapping extends past the allocated region
    MapOutOfRange,
}

/// A validated window into the mappable region.
///
/// The mapping mechanism itself lives outside the driver; this descriptor
/// only guarantees the request fits the allocated store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MapRegion {
    /// Byte offset into the store
    pub offset: usize,
    /// Window length in bytes
    pub len: usize,
}

/// Client-visible framebuffer memory.
pub struct FrameStore {
    mem: [u8; STORE_LEN],
    pos: usize,
}

impl FrameStore {
    pub const fn new() -> Self {
        Self {
            mem: [0; STORE_LEN],
            pos: 0,
        }
    }

    /// Copy `data` into the frame at `offset`.
    ///
    /// An offset at or past the end of the logical frame is rejected
    /// without touching the memory. A payload that would run past the end
    /// is silently truncated. Returns the number of bytes written and
    /// leaves the position cursor just past them.
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<usize, StoreError> {
        if offset >= FRAME_LEN {
            return Err(StoreError::OffsetOutOfRange);
        }

        let len = data.len().min(FRAME_LEN - offset);
        self.mem[offset..offset + len].copy_from_slice(&data[..len]);
        self.pos = offset + len;
        Ok(len)
    }

    /// The pixel-carrying prefix of the store.
    pub fn frame(&self) -> &[u8] {
        &self.mem[..FRAME_LEN]
    }

    /// Position cursor left by the last write.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Validate a shared-mapping request against the allocated region.
    ///
    /// Mapped writes bypass the refresh lock; a mapper racing a refresh
    /// pass can put a torn frame on the glass until the next pass
    /// converges. Accepted trade-off, inherited from the fbdev model.
    pub fn map_region(&self, offset: usize, len: usize) -> Result<MapRegion, StoreError> {
        let end = offset.checked_add(len).ok_or(StoreError::MapOutOfRange)?;
        if end > STORE_LEN {
            return Err(StoreError::MapOutOfRange);
        }
        Ok(MapRegion { offset, len })
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_lands_at_offset_and_moves_cursor() {
        let mut store = FrameStore::new();

        let written = store.write(16, &[0xAB, 0xCD]).unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.position(), 18);
        assert_eq!(store.frame()[16], 0xAB);
        assert_eq!(store.frame()[17], 0xCD);
        assert_eq!(store.frame()[15], 0);
        assert_eq!(store.frame()[18], 0);
    }

    #[test]
    fn overrunning_write_is_truncated() {
        let mut store = FrameStore::new();

        let written = store.write(FRAME_LEN - 1, &[0xAA; 10]).unwrap();
        assert_eq!(written, 1);
        assert_eq!(store.position(), FRAME_LEN);
        assert_eq!(store.frame()[FRAME_LEN - 1], 0xAA);
    }

    #[test]
    fn write_past_end_is_rejected() {
        let mut store = FrameStore::new();

        assert_eq!(store.write(FRAME_LEN, &[1]), Err(StoreError::OffsetOutOfRange));
        assert_eq!(store.position(), 0);
        assert!(store.frame().iter().all(|&b| b == 0));
    }

    #[test]
    fn map_requests_are_bounded_by_the_region() {
        let store = FrameStore::new();

        assert_eq!(
            store.map_region(0, STORE_LEN),
            Ok(MapRegion {
                offset: 0,
                len: STORE_LEN
            })
        );
        assert_eq!(
            store.map_region(STORE_LEN - 8, 8).map(|r| r.offset),
            Ok(STORE_LEN - 8)
        );
        assert_eq!(store.map_region(1, STORE_LEN), Err(StoreError::MapOutOfRange));
        assert_eq!(
            store.map_region(usize::MAX, 2),
            Err(StoreError::MapOutOfRange)
        );
    }
}
