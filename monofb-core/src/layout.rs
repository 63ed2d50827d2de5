//! Row-major to page-major pixel reformatting
//!
//! Clients see the framebuffer as a linear 1-bit-per-pixel bitmap:
//! row-major, `WIDTH / 8` bytes per row, bit `x % 8` of byte `x / 8`
//! within a row. The SH1106 wants pages instead: horizontal bands of 8
//! rows where each byte holds one 8-pixel column, bit `y % 8` selecting
//! the row inside the band.

use crate::{FRAME_LEN, LINE_LENGTH, WIDTH};

/// Rebuild one controller page from the linear frame.
///
/// `frame` must hold at least [`FRAME_LEN`] bytes and `page` must be below
/// `PAGES`. The destination is zeroed first so bits from a previous pass
/// cannot leak through.
pub fn pack_page(frame: &[u8], page: usize, out: &mut [u8; WIDTH]) {
    debug_assert!(frame.len() >= FRAME_LEN);

    out.fill(0);
    for row in 0..8 {
        let y = page * 8 + row;
        for x in 0..WIDTH {
            let src = frame[y * LINE_LENGTH + x / 8];
            if src & (1 << (x % 8)) != 0 {
                out[x] |= 1 << row;
            }
        }
    }
}
