// src/doc.rs

//! The document: a stroke grid with an incrementally composited raster.
//!
//! ## Grid and blocks
//!
//! A document is `cols x rows` cells; each cell holds a stack of strokes,
//! front (index 0) = most recently applied. Grid rows pack two to a raster
//! **block**: even row `r` owns block row `r / 2` at vertical offset 0,
//! while odd row `r` is split across the block above (lower half, positive
//! offset) and the block below (upper half, negative offset). This halves
//! vertical raster storage and gives adjacent rows the overlapping look of
//! an alternating stamp mechanism.
//!
//! Editing recomposites only the touched block(s): adding a stroke blends
//! just that glyph into the existing pixels, while deleting replays the
//! whole block region from the surviving stacks, because subtractive ink
//! cannot be un-blended.
//!
//! ## Presentation boundary
//!
//! A document optionally carries a [`TextureSink`]; every finished block is
//! pushed through it. Without a sink (headless) all compositing still
//! happens, nothing is published.

use crate::color::Palette;
use crate::font::Font;
use crate::pixels::{BlockRect, Raster};
use log::{trace, warn};
use std::sync::Arc;
use thiserror::Error;

/// One glyph+color mark in a cell's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub color: u8,
    pub glyph: u8,
}

/// Errors constructing a document.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("document grid must be at least 1x1, got {cols}x{rows}")]
    EmptyGrid { cols: usize, rows: usize },
}

/// Receives finished block pixels from the compositor.
///
/// Implemented by the presentation layer over whatever texture primitive it
/// has; the engine only ever pushes tightly packed RGBA rects through it.
pub trait TextureSink {
    fn upload(&mut self, rect: BlockRect, pixels: &[u8]);
}

/// A grid-addressed document of stamped marks plus its composite raster.
pub struct Doc {
    font: Arc<Font>,
    palette: Arc<Palette>,
    cols: usize,
    rows: usize,
    /// Per-cell stroke stacks, row-major; index 0 of a stack is the front.
    cells: Vec<Vec<Stroke>>,
    raster: Raster,
    sink: Option<Box<dyn TextureSink>>,
}

impl Doc {
    /// Creates an empty document. Every block starts fully transparent.
    pub fn new(
        font: Arc<Font>,
        palette: Arc<Palette>,
        cols: usize,
        rows: usize,
    ) -> Result<Self, DocError> {
        if cols < 1 || rows < 1 {
            return Err(DocError::EmptyGrid { cols, rows });
        }

        let raster = Raster::new(font.width() * cols, font.height() * rows.div_ceil(2));

        Ok(Doc {
            font,
            palette,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
            raster,
            sink: None,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn font(&self) -> &Arc<Font> {
        &self.font
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// The composite raster all blocks are published from.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Composite raster dimensions: `font.w * cols` by `font.h * ceil(rows/2)`.
    pub fn texture_size(&self) -> (usize, usize) {
        (self.raster.width(), self.raster.height())
    }

    /// A cell's stroke stack, front-to-back. Empty for out-of-range cells.
    pub fn strokes(&self, col: usize, row: usize) -> &[Stroke] {
        if col >= self.cols || row >= self.rows {
            return &[];
        }
        &self.cells[col + row * self.cols]
    }

    /// Stamps a stroke at a cell.
    ///
    /// No effect (returns `None`) when the cell is out of range, the glyph
    /// has no mask, or the color is outside the palette. Glyph 0 is never
    /// insertable even when the font sheet inks cell 0: the save format
    /// reserves a glyph byte of 0 as its cell terminator. A duplicate
    /// `(color, glyph)` is raised to the front without recompositing; the
    /// pixel state is already correct. Otherwise the stroke is prepended
    /// and only its own ink is blended into the touched block(s).
    pub fn add_stroke(&mut self, col: usize, row: usize, color: u8, glyph: u8) -> Option<Stroke> {
        if col >= self.cols || row >= self.rows {
            trace!("add_stroke: ({col},{row}) outside {}x{}", self.cols, self.rows);
            return None;
        }
        if glyph == 0 {
            trace!("add_stroke: glyph 0 is reserved as the save-format terminator");
            return None;
        }
        if self.font.mask(glyph).is_none() {
            trace!("add_stroke: glyph {glyph} has no mask");
            return None;
        }
        if self.palette.ink(color).is_none() {
            warn!(
                "add_stroke: color {color} outside palette of {}",
                self.palette.num_colors()
            );
            return None;
        }

        let stroke = Stroke { color, glyph };
        let cell = &mut self.cells[col + row * self.cols];

        if let Some(at) = cell.iter().position(|s| *s == stroke) {
            // Raise: same ink already on the page, only the stack order moves.
            cell.remove(at);
            cell.insert(0, stroke);
            return Some(stroke);
        }

        cell.insert(0, stroke);
        self.draw_stroke(col, row, color, glyph);
        Some(stroke)
    }

    /// Removes the front stroke of a cell and replays the block region.
    ///
    /// Returns the new front stroke, if any. Removal can expose ink that
    /// the deleted stroke had darkened over, so the block is rebuilt from
    /// the surviving stacks rather than pixel-adjusted.
    pub fn del_stroke(&mut self, col: usize, row: usize) -> Option<Stroke> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let cell = &mut self.cells[col + row * self.cols];
        if cell.is_empty() {
            return None;
        }
        cell.remove(0);
        let front = cell.first().copied();
        self.draw_pos(col, row);
        front
    }

    /// Rebuilds every block from the stroke stacks and republishes.
    pub fn draw_doc(&mut self) {
        for row in (0..self.rows).step_by(2) {
            for col in 0..self.cols {
                self.draw_pos(col, row);
            }
        }
    }

    /// Attaches a presentation sink and publishes the whole document.
    pub fn attach_sink(&mut self, sink: Box<dyn TextureSink>) {
        self.sink = Some(sink);
        self.draw_doc();
    }

    /// Detaches the sink; the document keeps compositing headless.
    pub fn detach_sink(&mut self) -> Option<Box<dyn TextureSink>> {
        self.sink.take()
    }

    /// Pixel rect of the block owned by even row `row` at column `col`.
    fn block_rect(&self, col: usize, row: usize) -> BlockRect {
        debug_assert_eq!(row % 2, 0);
        BlockRect {
            x: col * self.font.width(),
            y: (row / 2) * self.font.height(),
            w: self.font.width(),
            h: self.font.height(),
        }
    }

    /// Half a glyph height: the vertical stagger between adjacent rows.
    fn half_height(&self) -> isize {
        (self.font.height() / 2) as isize
    }

    /// Incremental path: blends one new stroke into the existing pixels of
    /// every block the cell touches. Must match a full replay exactly,
    /// which holds because clamped subtraction accumulates the same total
    /// regardless of the order ink arrives in.
    fn draw_stroke(&mut self, col: usize, row: usize, color: u8, glyph: u8) {
        if row % 2 == 1 {
            self.blend_into_block(col, row - 1, self.half_height(), color, glyph);
            self.publish_block(col, row - 1);
            if row + 1 < self.rows {
                self.blend_into_block(col, row + 1, -self.half_height(), color, glyph);
                self.publish_block(col, row + 1);
            }
        } else {
            self.blend_into_block(col, row, 0, color, glyph);
            self.publish_block(col, row);
        }
    }

    /// Full replay of one even row's block: reset to transparent, then
    /// replay the row's own cell and the halves of both odd neighbours.
    /// An odd `row` redirects to the even rows whose blocks it shares.
    fn draw_pos(&mut self, col: usize, row: usize) {
        if row % 2 == 1 {
            self.draw_pos(col, row - 1);
            if row + 1 < self.rows {
                self.draw_pos(col, row + 1);
            }
            return;
        }

        let rect = self.block_rect(col, row);
        self.raster.clear_rect(rect);
        self.replay_cell(col, row, 0);
        if row > 0 {
            // Odd row above: only its lower mask half reaches this block.
            self.replay_cell(col, row - 1, -self.half_height());
        }
        if row + 1 < self.rows {
            // Odd row below: its upper mask half sits in this block's bottom.
            self.replay_cell(col, row + 1, self.half_height());
        }
        self.publish_block(col, row);
    }

    /// Replays every stroke of `(col, row)` into the block of the even row
    /// the offset points at, front-to-back.
    fn replay_cell(&mut self, col: usize, row: usize, offset: isize) {
        let block_row = if offset > 0 {
            row - 1
        } else if offset < 0 {
            row + 1
        } else {
            row
        };
        let rect = self.block_rect(col, block_row);
        // Stacks are shallow; the copy keeps the borrow on cells out of the
        // blend loop.
        let strokes: Vec<Stroke> = self.cells[col + row * self.cols].clone();
        for stroke in strokes {
            self.blend_stroke(rect, offset, stroke.color, stroke.glyph);
        }
    }

    fn blend_into_block(&mut self, col: usize, even_row: usize, offset: isize, color: u8, glyph: u8) {
        let rect = self.block_rect(col, even_row);
        self.blend_stroke(rect, offset, color, glyph);
    }

    fn blend_stroke(&mut self, rect: BlockRect, offset: isize, color: u8, glyph: u8) {
        // Both were validated on insertion; a miss here is a logic error.
        let Some(mask) = self.font.mask(glyph) else {
            warn!("blend_stroke: glyph {glyph} lost its mask");
            return;
        };
        let Some(ink) = self.palette.ink(color) else {
            warn!("blend_stroke: color {color} outside palette");
            return;
        };
        self.raster.blend_mask(rect, mask, ink, offset);
    }

    /// Pushes a finished block to the sink, if one is attached.
    fn publish_block(&mut self, col: usize, even_row: usize) {
        let rect = self.block_rect(col, even_row);
        if let Some(sink) = self.sink.as_mut() {
            let pixels = self.raster.rect_pixels(rect);
            sink.upload(rect, &pixels);
        }
    }
}

impl std::fmt::Debug for Doc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Doc")
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("font", &self.font)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
