//! Change detection against the last pushed frame

use crate::FRAME_LEN;

/// Snapshot of the pixel content most recently pushed to the panel.
///
/// Only the refresh path touches this: it compares, captures right before
/// a push, and nothing else reads it. There is no region-level tracking;
/// one differing byte makes the whole frame dirty.
pub struct ShadowBuffer {
    last: [u8; FRAME_LEN],
}

impl ShadowBuffer {
    pub const fn new() -> Self {
        Self {
            last: [0; FRAME_LEN],
        }
    }

    /// Whether `frame` differs from the last pushed content.
    pub fn is_dirty(&self, frame: &[u8]) -> bool {
        self.last[..] != frame[..FRAME_LEN]
    }

    /// Record `frame` as pushed.
    pub fn capture(&mut self, frame: &[u8]) {
        self.last.copy_from_slice(&frame[..FRAME_LEN]);
    }
}

impl Default for ShadowBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_shadow_matches_blank_frame() {
        let shadow = ShadowBuffer::new();
        let frame = [0u8; FRAME_LEN];
        assert!(!shadow.is_dirty(&frame));
    }

    #[test]
    fn dirty_check_is_idempotent_after_capture() {
        let mut shadow = ShadowBuffer::new();
        let mut frame = [0u8; FRAME_LEN];
        frame[200] = 0x5A;

        assert!(shadow.is_dirty(&frame));
        shadow.capture(&frame);
        assert!(!shadow.is_dirty(&frame));
        // Second check with no intervening write stays clean.
        assert!(!shadow.is_dirty(&frame));
    }

    #[test]
    fn single_byte_change_dirties_the_frame() {
        let mut shadow = ShadowBuffer::new();
        let mut frame = [0u8; FRAME_LEN];
        shadow.capture(&frame);

        frame[FRAME_LEN - 1] ^= 0x01;
        assert!(shadow.is_dirty(&frame));
    }

    #[test]
    fn bytes_past_the_logical_frame_are_ignored() {
        let shadow = ShadowBuffer::new();
        let mut region = [0u8; FRAME_LEN + 64];
        region[FRAME_LEN + 3] = 0xFF;
        assert!(!shadow.is_dirty(&region));
    }
}
