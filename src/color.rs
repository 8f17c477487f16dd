// src/color.rs

//! Subtractive ink palette.
//!
//! A `Palette` is an ordered list of CMY ink strengths indexed by color id.
//! Stamping a glyph subtracts the ink from the page's RGB channels, so
//! stronger ink means a darker mark. Palettes are shared between documents
//! via `Arc`; a document holds its own handle for its whole lifetime.

use std::sync::Arc;

/// One ink: how much cyan, magenta, and yellow a stamp deposits.
///
/// Each component is subtracted (saturating) from the corresponding
/// R/G/B channel of every masked pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cmy {
    pub c: u8,
    pub m: u8,
    pub y: u8,
}

impl Cmy {
    /// Full-strength ink on every channel, i.e. solid black.
    pub const BLACK: Cmy = Cmy {
        c: 0xff,
        m: 0xff,
        y: 0xff,
    };
}

/// An ordered, shared set of inks. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    inks: Vec<Cmy>,
}

impl Palette {
    /// Creates a palette from an ink list. Returns `None` for an empty list;
    /// a palette must contain at least one color.
    pub fn new(inks: Vec<Cmy>) -> Option<Arc<Self>> {
        if inks.is_empty() {
            return None;
        }
        Some(Arc::new(Palette { inks }))
    }

    /// The stock two-ink palette: black, plus a cyan-less red-leaning ink.
    pub fn stock() -> Arc<Self> {
        Arc::new(Palette {
            inks: vec![
                Cmy::BLACK,
                Cmy {
                    c: 0x00,
                    m: 0xff,
                    y: 0xff,
                },
            ],
        })
    }

    pub fn num_colors(&self) -> usize {
        self.inks.len()
    }

    /// Ink for a color id, or `None` if the id is out of range.
    pub fn ink(&self, color: u8) -> Option<Cmy> {
        self.inks.get(color as usize).copied()
    }

    /// The RGB a single stamp of `color` leaves on a white page.
    ///
    /// Used by callers that tint a cursor or swatch to match the ink.
    pub fn rgb_preview(&self, color: u8) -> Option<(u8, u8, u8)> {
        let ink = self.ink(color)?;
        Some((0xff - ink.c, 0xff - ink.m, 0xff - ink.y))
    }
}
