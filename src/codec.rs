// src/codec.rs

//! Versioned binary persistence for documents.
//!
//! ## Format (version 0)
//!
//! ```text
//! "SYN"            3-byte magic tag
//! version          1 byte, currently 0
//! cols, rows       u16 little-endian each, both >= 1
//! cells            rows * cols records, row-major
//! ```
//!
//! Each cell record is a run of `(glyph, color)` byte pairs terminated by a
//! glyph byte of 0; a lone 0 means the cell is empty. Strokes are written
//! front-to-back. On load each cell's pairs are re-inserted **back-to-front**
//! through `add_stroke`, so the rebuilt front-to-back order equals the saved
//! order exactly and round-trips are order-preserving.
//!
//! Save and load are synchronous whole-buffer operations; any read or write
//! fault aborts the operation with no document returned.
//!
//! The codec does not decide which font and palette a loaded document gets:
//! that default-resolution policy belongs to the caller and comes in as an
//! [`AssetSource`].

use crate::color::Palette;
use crate::doc::Doc;
use crate::font::Font;
use log::debug;
use std::io::{self, Read, Write};
use std::sync::Arc;
use thiserror::Error;

/// Magic tag opening every document file.
pub const MAGIC: [u8; 3] = *b"SYN";

/// Newest format version this codec writes.
pub const VERSION: u8 = 0;

/// Why a load or save was abandoned.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("not a synthotype document (bad magic tag)")]
    BadMagic,
    #[error("unrecognized format version {0}")]
    UnknownVersion(u8),
    #[error("invalid document size {cols}x{rows}")]
    InvalidSize { cols: u16, rows: u16 },
    #[error("document exceeds the format's {max}x{max} limit")]
    TooLarge { max: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Assets(#[from] anyhow::Error),
}

/// Supplies the font and palette a freshly loaded document should use.
///
/// The usual resolution chain (current document's assets, else the first
/// document's, else engine defaults) lives with the buffer collection; the
/// codec only consumes whatever this yields.
pub trait AssetSource {
    fn assets(&mut self) -> anyhow::Result<(Arc<Font>, Arc<Palette>)>;
}

/// A fixed font/palette pair, the trivial asset source.
pub struct FixedAssets(pub Arc<Font>, pub Arc<Palette>);

impl AssetSource for FixedAssets {
    fn assets(&mut self) -> anyhow::Result<(Arc<Font>, Arc<Palette>)> {
        Ok((self.0.clone(), self.1.clone()))
    }
}

/// Writes a document in the current format version.
pub fn save_doc<W: Write>(doc: &Doc, writer: &mut W) -> Result<(), CodecError> {
    let max = u16::MAX as usize;
    if doc.cols() > max || doc.rows() > max {
        return Err(CodecError::TooLarge { max });
    }

    writer.write_all(&MAGIC)?;
    writer.write_all(&[VERSION])?;
    writer.write_all(&(doc.cols() as u16).to_le_bytes())?;
    writer.write_all(&(doc.rows() as u16).to_le_bytes())?;

    for row in 0..doc.rows() {
        for col in 0..doc.cols() {
            for stroke in doc.strokes(col, row) {
                writer.write_all(&[stroke.glyph, stroke.color])?;
            }
            writer.write_all(&[0])?;
        }
    }

    Ok(())
}

/// Reads a document, taking font and palette from `assets`.
///
/// Strokes whose glyph has no mask in the resolved font are dropped by
/// `add_stroke`, same as they would be when typed.
pub fn load_doc<R: Read>(
    reader: &mut R,
    assets: &mut dyn AssetSource,
) -> Result<Doc, CodecError> {
    let mut magic = [0u8; 3];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(CodecError::BadMagic);
    }

    let version = read_byte(reader)?;
    if version != 0 {
        return Err(CodecError::UnknownVersion(version));
    }

    let cols = read_u16(reader)?;
    let rows = read_u16(reader)?;
    if cols < 1 || rows < 1 {
        return Err(CodecError::InvalidSize { cols, rows });
    }

    let (font, palette) = assets.assets().map_err(CodecError::Assets)?;

    let mut doc = Doc::new(font, palette, cols as usize, rows as usize)
        .map_err(|_| CodecError::InvalidSize { cols, rows })?;

    let mut pairs: Vec<(u8, u8)> = Vec::new();
    for row in 0..rows as usize {
        for col in 0..cols as usize {
            pairs.clear();
            loop {
                let glyph = read_byte(reader)?;
                if glyph == 0 {
                    break;
                }
                let color = read_byte(reader)?;
                pairs.push((glyph, color));
            }
            // File order is front-to-back; prepend-insertion wants the back
            // of the stack first.
            for &(glyph, color) in pairs.iter().rev() {
                doc.add_stroke(col, row, color, glyph);
            }
        }
    }

    debug!("loaded {}x{} document", cols, rows);
    Ok(doc)
}

fn read_byte<R: Read>(reader: &mut R) -> Result<u8, CodecError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16, CodecError> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}
