// src/select.rs

//! Rectangular multi-region selection and region copy/paste.
//!
//! Selections are plain grid rectangles with unordered corners; either
//! corner may be the later one, and normalization happens at use. Copy
//! takes the bounding box of every **active** rectangle's normalized
//! extents (the union bounding box; see DESIGN.md for why normalization
//! happens per rectangle) and replays the covered strokes into a fresh
//! clipboard document. Paste replays a
//! document into another through `add_stroke`, so occlusion and
//! dedup-and-raise behave exactly as manual editing would.

use crate::doc::Doc;
use log::{debug, trace};

/// One selection rectangle. Corners are unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub active: bool,
    pub start_col: usize,
    pub start_row: usize,
    pub end_col: usize,
    pub end_row: usize,
}

impl Selection {
    pub fn new(start_col: usize, start_row: usize, end_col: usize, end_row: usize) -> Self {
        Selection {
            active: true,
            start_col,
            start_row,
            end_col,
            end_row,
        }
    }

    /// Corner-ordered extents: `(lo_col, lo_row, hi_col, hi_row)`, inclusive.
    pub fn extents(&self) -> (usize, usize, usize, usize) {
        let (lo_col, hi_col) = minmax(self.start_col, self.end_col);
        let (lo_row, hi_row) = minmax(self.start_row, self.end_row);
        (lo_col, lo_row, hi_col, hi_row)
    }
}

fn minmax(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Inclusive bounding box over the normalized extents of all active
/// selections. `None` when nothing is active.
pub fn bounding_box(selections: &[Selection]) -> Option<(usize, usize, usize, usize)> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for sel in selections.iter().filter(|s| s.active) {
        let (lo_col, lo_row, hi_col, hi_row) = sel.extents();
        bounds = Some(match bounds {
            None => (lo_col, lo_row, hi_col, hi_row),
            Some((bl, bt, br, bb)) => (
                bl.min(lo_col),
                bt.min(lo_row),
                br.max(hi_col),
                bb.max(hi_row),
            ),
        });
    }
    bounds
}

/// Copies the selected region of `doc` into a fresh document sized to the
/// bounding box, sharing the source's font and palette.
///
/// Stroke stacks are reproduced cell-for-cell in source order. Returns
/// `None` when no selection is active.
pub fn copy_selection(doc: &Doc, selections: &[Selection]) -> Option<Doc> {
    let (lo_col, lo_row, hi_col, hi_row) = bounding_box(selections)?;

    let cols = hi_col - lo_col + 1;
    let rows = hi_row - lo_row + 1;
    debug!("copy_selection: ({lo_col},{lo_row})-({hi_col},{hi_row}) -> {cols}x{rows}");

    // Bounding box corners come from in-grid coordinates, so the size is
    // always valid.
    let mut clip = Doc::new(doc.font().clone(), doc.palette().clone(), cols, rows).ok()?;

    for row in lo_row..=hi_row {
        for col in lo_col..=hi_col {
            // Back-to-front keeps the copied stack in source order.
            for stroke in doc.strokes(col, row).iter().rev() {
                clip.add_stroke(col - lo_col, row - lo_row, stroke.color, stroke.glyph);
            }
        }
    }

    Some(clip)
}

/// Replays every stroke of `src` into `dest` translated by `(at_col,
/// at_row)`. Strokes landing outside `dest` are dropped silently, exactly
/// as typing off the grid would be.
pub fn paste_doc(dest: &mut Doc, src: &Doc, at_col: usize, at_row: usize) {
    trace!(
        "paste_doc: {}x{} at ({at_col},{at_row})",
        src.cols(),
        src.rows()
    );
    for row in 0..src.rows() {
        for col in 0..src.cols() {
            for stroke in src.strokes(col, row).iter().rev() {
                dest.add_stroke(at_col + col, at_row + row, stroke.color, stroke.glyph);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Palette;
    use crate::doc::Stroke;
    use crate::font::Font;

    const GLYPH_A: u8 = b'A';
    const GLYPH_B: u8 = b'B';

    fn test_doc(cols: usize, rows: usize) -> Doc {
        let font = Font::from_masks(
            2,
            2,
            [(GLYPH_A, vec![true; 4]), (GLYPH_B, vec![true, false, true, false])],
        );
        Doc::new(font, Palette::stock(), cols, rows).unwrap()
    }

    #[test]
    fn extents_normalize_unordered_corners() {
        let sel = Selection::new(4, 1, 2, 3);
        assert_eq!(sel.extents(), (2, 1, 4, 3));
    }

    #[test]
    fn bounding_box_spans_all_active_rects() {
        // (0,0)-(2,1) and (1,1)-(1,1) together bound (0,0)-(2,1).
        let sels = [Selection::new(0, 0, 2, 1), Selection::new(1, 1, 1, 1)];
        assert_eq!(bounding_box(&sels), Some((0, 0, 2, 1)));
    }

    #[test]
    fn inactive_rects_are_ignored() {
        let mut far = Selection::new(9, 9, 9, 9);
        far.active = false;
        let sels = [Selection::new(1, 1, 2, 2), far];
        assert_eq!(bounding_box(&sels), Some((1, 1, 2, 2)));
        assert_eq!(bounding_box(&[far]), None);
    }

    #[test]
    fn copy_produces_bounding_box_sized_doc() {
        let doc = test_doc(5, 5);
        let sels = [Selection::new(0, 0, 2, 1), Selection::new(1, 1, 1, 1)];
        let clip = copy_selection(&doc, &sels).unwrap();
        assert_eq!((clip.cols(), clip.rows()), (3, 2));
    }

    #[test]
    fn copy_preserves_stacks_at_translated_cells() {
        let mut doc = test_doc(5, 5);
        doc.add_stroke(2, 3, 0, GLYPH_A);
        doc.add_stroke(2, 3, 1, GLYPH_B);
        doc.add_stroke(1, 2, 1, GLYPH_A);

        let sels = [Selection::new(1, 2, 3, 4)];
        let clip = copy_selection(&doc, &sels).unwrap();
        assert_eq!((clip.cols(), clip.rows()), (3, 3));
        assert_eq!(
            clip.strokes(1, 1),
            &[
                Stroke { color: 1, glyph: GLYPH_B },
                Stroke { color: 0, glyph: GLYPH_A },
            ]
        );
        assert_eq!(clip.strokes(0, 0), &[Stroke { color: 1, glyph: GLYPH_A }]);
    }

    #[test]
    fn copy_with_no_active_selection_yields_nothing() {
        let doc = test_doc(3, 3);
        assert!(copy_selection(&doc, &[]).is_none());
    }

    #[test]
    fn paste_translates_and_clips() {
        let mut src = test_doc(2, 2);
        src.add_stroke(0, 0, 0, GLYPH_A);
        src.add_stroke(1, 1, 1, GLYPH_B);

        let mut dest = test_doc(3, 3);
        paste_doc(&mut dest, &src, 2, 2);
        assert_eq!(dest.strokes(2, 2), &[Stroke { color: 0, glyph: GLYPH_A }]);
        // (3,3) falls off the grid and is dropped.
        assert!(dest.strokes(0, 0).is_empty());
    }

    #[test]
    fn copy_then_paste_reproduces_region() {
        let mut doc = test_doc(4, 4);
        doc.add_stroke(1, 1, 0, GLYPH_A);
        doc.add_stroke(1, 1, 1, GLYPH_B);
        doc.add_stroke(2, 2, 1, GLYPH_A);

        let clip = copy_selection(&doc, &[Selection::new(1, 1, 2, 2)]).unwrap();
        let mut fresh = test_doc(4, 4);
        paste_doc(&mut fresh, &clip, 1, 1);

        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(fresh.strokes(col, row), doc.strokes(col, row));
            }
        }
        assert_eq!(fresh.raster().data(), doc.raster().data());
    }
}
