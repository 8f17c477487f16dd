// src/font.rs

//! Glyph masks extracted from a 16x16 sprite sheet.
//!
//! A font image is divided into a 16x16 grid of cells, one cell per code
//! point 0..=255. Each cell becomes a boolean occupancy mask: a pixel is
//! inked when its channel sum falls below the near-white threshold. Cells
//! with no inked pixel at all have no glyph and are rejected on stroke
//! insertion. Fonts are immutable and shared between documents via `Arc`.

use anyhow::{Context, Result};
use image::GenericImageView;
use log::debug;
use std::path::Path;
use std::sync::Arc;

/// Channel sum at or above which a pixel counts as blank paper.
const NEAR_WHITE_SUM: u32 = 0xff;

/// Number of glyph cells per sheet axis.
const SHEET_CELLS: u32 = 16;

/// An immutable set of up to 256 boolean glyph masks.
pub struct Font {
    width: usize,
    height: usize,
    masks: Vec<Option<Box<[bool]>>>,
}

impl Font {
    /// Loads a font from a sprite sheet image on disk.
    ///
    /// The cell size is `image_size / 16` per axis; sheets whose dimensions
    /// are not multiples of 16 are handled by sampling cell origins at
    /// `(i * width) / 16`, so no sheet pixel is silently dropped.
    pub fn load(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("failed to load font sheet '{}'", path.display()))?;
        Self::from_image(&img)
            .with_context(|| format!("font sheet '{}' unusable", path.display()))
    }

    /// Extracts glyph masks from a decoded sheet image.
    pub fn from_image(img: &image::DynamicImage) -> Result<Arc<Self>> {
        let (img_w, img_h) = img.dimensions();
        let cell_w = (img_w / SHEET_CELLS) as usize;
        let cell_h = (img_h / SHEET_CELLS) as usize;

        anyhow::ensure!(
            cell_w > 0 && cell_h > 0,
            "sheet is {}x{} but must be at least 16x16",
            img_w,
            img_h
        );

        let mut masks: Vec<Option<Box<[bool]>>> = Vec::with_capacity(256);
        let mut present = 0usize;

        for row in 0..SHEET_CELLS {
            for col in 0..SHEET_CELLS {
                let origin_x = (col * img_w) / SHEET_CELLS;
                let origin_y = (row * img_h) / SHEET_CELLS;
                let mask = extract_mask(img, origin_x, origin_y, cell_w, cell_h);
                if mask.is_some() {
                    present += 1;
                }
                masks.push(mask);
            }
        }

        debug!(
            "font sheet {}x{}: cell {}x{}, {} of 256 glyphs present",
            img_w, img_h, cell_w, cell_h, present
        );

        Ok(Arc::new(Font {
            width: cell_w,
            height: cell_h,
            masks,
        }))
    }

    /// Builds a font directly from masks. Intended for tests, where a
    /// deterministic two-pixel glyph beats decoding an image fixture.
    ///
    /// Masks must each be `width * height` long.
    pub fn from_masks(
        width: usize,
        height: usize,
        glyphs: impl IntoIterator<Item = (u8, Vec<bool>)>,
    ) -> Arc<Self> {
        let mut masks: Vec<Option<Box<[bool]>>> = (0..256).map(|_| None).collect();
        for (code, mask) in glyphs {
            assert_eq!(mask.len(), width * height, "mask size mismatch");
            masks[code as usize] = Some(mask.into_boxed_slice());
        }
        Arc::new(Font {
            width,
            height,
            masks,
        })
    }

    /// Glyph cell width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Glyph cell height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The occupancy mask for a code point, or `None` if the sheet cell
    /// was blank.
    pub fn mask(&self, glyph: u8) -> Option<&[bool]> {
        self.masks[glyph as usize].as_deref()
    }
}

fn extract_mask(
    img: &image::DynamicImage,
    origin_x: u32,
    origin_y: u32,
    cell_w: usize,
    cell_h: usize,
) -> Option<Box<[bool]>> {
    let mut mask = vec![false; cell_w * cell_h];
    let mut inked = false;

    for y in 0..cell_h {
        for x in 0..cell_w {
            let px = img.get_pixel(origin_x + x as u32, origin_y + y as u32);
            let [r, g, b, _a] = px.0;
            if (r as u32) + (g as u32) + (b as u32) < NEAR_WHITE_SUM {
                mask[x + y * cell_w] = true;
                inked = true;
            }
        }
    }

    inked.then(|| mask.into_boxed_slice())
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let present = self.masks.iter().filter(|m| m.is_some()).count();
        f.debug_struct("Font")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("glyphs", &present)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn sheet_with_one_glyph() -> DynamicImage {
        // 32x32 sheet: 2x2 pixel cells. Ink a single pixel in cell (1, 0),
        // i.e. code point 1.
        let mut img = RgbaImage::from_pixel(32, 32, Rgba([0xff, 0xff, 0xff, 0xff]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 0xff]));
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn blank_cells_have_no_mask() {
        let font = Font::from_image(&sheet_with_one_glyph()).unwrap();
        assert_eq!(font.width(), 2);
        assert_eq!(font.height(), 2);
        assert!(font.mask(0).is_none());
        assert!(font.mask(b'A').is_none());
    }

    #[test]
    fn inked_cell_yields_occupancy_mask() {
        let font = Font::from_image(&sheet_with_one_glyph()).unwrap();
        let mask = font.mask(1).expect("glyph 1 should exist");
        assert_eq!(mask, &[true, false, false, false]);
    }

    #[test]
    fn near_white_pixels_do_not_ink() {
        // Channel sum exactly at the threshold is blank paper.
        let mut img = RgbaImage::from_pixel(16, 16, Rgba([0xff, 0xff, 0xff, 0xff]));
        img.put_pixel(0, 0, Rgba([0x55, 0x55, 0x55, 0xff]));
        let font = Font::from_image(&DynamicImage::ImageRgba8(img)).unwrap();
        assert!(font.mask(0).is_none());
    }

    #[test]
    fn tiny_sheet_rejected() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(8, 8));
        assert!(Font::from_image(&img).is_err());
    }
}
