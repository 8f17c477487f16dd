// src/pixels.rs

//! Composite raster storage and the subtractive ink blend.
//!
//! ## Layout
//!
//! A document's raster is one contiguous RGBA8 buffer logically partitioned
//! into **blocks**. A block is the pixel rectangle covering one grid
//! row-pair at one column: `font.width` wide, `font.height` tall, at
//! `(col * font.width, block_row * font.height)`. Blocks never overlap in
//! the raster; the half-row stagger is expressed by blending odd-row glyphs
//! into their neighbouring blocks at a vertical half-height offset, not by
//! overlapping storage.
//!
//! ## Transparency
//!
//! Unstamped pixels hold the transparent sentinel: white with zero alpha.
//! Ink forces alpha fully opaque, so alpha doubles as an "ever stamped"
//! flag per pixel.

use crate::color::Cmy;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// The transparent sentinel: blank paper, zero alpha.
pub const TRANSPARENT: [u8; 4] = [0xff, 0xff, 0xff, 0x00];

/// A block's pixel rectangle within the composite raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

/// A contiguous RGBA8 pixel buffer.
#[derive(Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Allocates a raster with every pixel set to the transparent sentinel.
    pub fn new(width: usize, height: usize) -> Self {
        let mut data = vec![0u8; width * height * BYTES_PER_PIXEL];
        for px in data.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&TRANSPARENT);
        }
        Raster {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major, `width * 4` bytes per row.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The pixel at `(x, y)` as `[r, g, b, a]`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let at = (x + y * self.width) * BYTES_PER_PIXEL;
        [
            self.data[at],
            self.data[at + 1],
            self.data[at + 2],
            self.data[at + 3],
        ]
    }

    /// Resets every pixel of `rect` to the transparent sentinel.
    pub fn clear_rect(&mut self, rect: BlockRect) {
        for y in rect.y..rect.y + rect.h {
            let row = (rect.x + y * self.width) * BYTES_PER_PIXEL;
            for px in self.data[row..row + rect.w * BYTES_PER_PIXEL]
                .chunks_exact_mut(BYTES_PER_PIXEL)
            {
                px.copy_from_slice(&TRANSPARENT);
            }
        }
    }

    /// Copies `rect`'s pixels out as a tightly packed RGBA buffer, for
    /// upload to a presentation texture.
    pub fn rect_pixels(&self, rect: BlockRect) -> Vec<u8> {
        let mut out = Vec::with_capacity(rect.w * rect.h * BYTES_PER_PIXEL);
        for y in rect.y..rect.y + rect.h {
            let row = (rect.x + y * self.width) * BYTES_PER_PIXEL;
            out.extend_from_slice(&self.data[row..row + rect.w * BYTES_PER_PIXEL]);
        }
        out
    }

    /// Stamps a glyph mask into `rect` with subtractive ink.
    ///
    /// The mask is `rect.w * rect.h` booleans. `offset` shifts the mask
    /// vertically within the rect: positive pushes it down (mask top lands
    /// at `rect.y + offset`, bottom rows clip), negative pulls it up (the
    /// first `-offset` mask rows clip, the rest land at `rect.y`). Every
    /// set mask pixel saturating-subtracts the ink from RGB and forces
    /// alpha opaque; clear mask pixels are untouched.
    pub fn blend_mask(&mut self, rect: BlockRect, mask: &[bool], ink: Cmy, offset: isize) {
        debug_assert_eq!(mask.len(), rect.w * rect.h);

        let (mask_start_row, dest_start_row, rows) = if offset < 0 {
            let skip = (-offset) as usize;
            (skip, 0, rect.h.saturating_sub(skip))
        } else {
            let down = offset as usize;
            (0, down, rect.h.saturating_sub(down))
        };

        for row in 0..rows {
            let mask_row = &mask[(mask_start_row + row) * rect.w..][..rect.w];
            let dest_y = rect.y + dest_start_row + row;
            let dest = (rect.x + dest_y * self.width) * BYTES_PER_PIXEL;
            for (x, &on) in mask_row.iter().enumerate() {
                if !on {
                    continue;
                }
                let px = &mut self.data[dest + x * BYTES_PER_PIXEL..][..BYTES_PER_PIXEL];
                px[0] = px[0].saturating_sub(ink.c);
                px[1] = px[1].saturating_sub(ink.m);
                px[2] = px[2].saturating_sub(ink.y);
                px[3] = 0xff;
            }
        }
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: BlockRect = BlockRect {
        x: 0,
        y: 0,
        w: 2,
        h: 4,
    };

    fn full_mask() -> Vec<bool> {
        vec![true; RECT.w * RECT.h]
    }

    #[test]
    fn new_raster_is_transparent() {
        let raster = Raster::new(3, 2);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(raster.pixel(x, y), TRANSPARENT);
            }
        }
    }

    #[test]
    fn blend_subtracts_and_opaques() {
        let mut raster = Raster::new(2, 4);
        let ink = Cmy {
            c: 0x10,
            m: 0x20,
            y: 0x30,
        };
        raster.blend_mask(RECT, &full_mask(), ink, 0);
        assert_eq!(raster.pixel(0, 0), [0xef, 0xdf, 0xcf, 0xff]);
    }

    #[test]
    fn blend_clamps_at_zero() {
        let mut raster = Raster::new(2, 4);
        for _ in 0..3 {
            raster.blend_mask(RECT, &full_mask(), Cmy::BLACK, 0);
        }
        assert_eq!(raster.pixel(1, 3), [0, 0, 0, 0xff]);
    }

    #[test]
    fn blend_is_monotonic_per_channel() {
        let mut raster = Raster::new(2, 4);
        let ink = Cmy {
            c: 0x40,
            m: 0x40,
            y: 0x40,
        };
        let mut prev = raster.pixel(0, 0);
        for _ in 0..5 {
            raster.blend_mask(RECT, &full_mask(), ink, 0);
            let cur = raster.pixel(0, 0);
            assert!(cur[0] <= prev[0] && cur[1] <= prev[1] && cur[2] <= prev[2]);
            prev = cur;
        }
    }

    #[test]
    fn positive_offset_lands_in_lower_half() {
        let mut raster = Raster::new(2, 4);
        // Mask rows 0..2 land at y = 2..4; rows 2..4 clip off the bottom.
        raster.blend_mask(RECT, &full_mask(), Cmy::BLACK, 2);
        assert_eq!(raster.pixel(0, 0), TRANSPARENT);
        assert_eq!(raster.pixel(0, 1), TRANSPARENT);
        assert_eq!(raster.pixel(0, 2), [0, 0, 0, 0xff]);
        assert_eq!(raster.pixel(0, 3), [0, 0, 0, 0xff]);
    }

    #[test]
    fn negative_offset_lands_in_upper_half() {
        let mut raster = Raster::new(2, 4);
        // Mask rows 2..4 land at y = 0..2.
        raster.blend_mask(RECT, &full_mask(), Cmy::BLACK, -2);
        assert_eq!(raster.pixel(0, 0), [0, 0, 0, 0xff]);
        assert_eq!(raster.pixel(0, 1), [0, 0, 0, 0xff]);
        assert_eq!(raster.pixel(0, 2), TRANSPARENT);
        assert_eq!(raster.pixel(0, 3), TRANSPARENT);
    }

    #[test]
    fn untouched_pixels_keep_sentinel() {
        let mut raster = Raster::new(2, 4);
        let mut mask = vec![false; 8];
        mask[0] = true;
        raster.blend_mask(RECT, &mask, Cmy::BLACK, 0);
        assert_eq!(raster.pixel(0, 0), [0, 0, 0, 0xff]);
        assert_eq!(raster.pixel(1, 0), TRANSPARENT);
    }

    #[test]
    fn clear_rect_restores_sentinel() {
        let mut raster = Raster::new(4, 4);
        let rect = BlockRect {
            x: 2,
            y: 0,
            w: 2,
            h: 4,
        };
        raster.blend_mask(rect, &full_mask(), Cmy::BLACK, 0);
        raster.clear_rect(rect);
        assert_eq!(raster.pixel(2, 0), TRANSPARENT);
        assert_eq!(raster.pixel(3, 3), TRANSPARENT);
    }
}
