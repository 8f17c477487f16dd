// src/lib.rs

//! Synthotype document engine.
//!
//! A grid-addressed document of stamped glyph/color marks, composited
//! incrementally into a raster the way a stencil duplicator lays ink:
//! rows stagger by half a glyph height, two grid rows share each raster
//! block, and overlapping stamps darken subtractively in CMY.
//!
//! The engine is synchronous and single-threaded; share a document across
//! threads only behind external mutual exclusion. Presentation and input
//! layers live elsewhere: the only outward surface is the
//! [`doc::TextureSink`] trait blocks are published through, and the only
//! inward surface is plain method calls.

/// Editable buffers, the workspace, and the clipboard.
pub mod buffer;
/// Binary document persistence.
pub mod codec;
/// Subtractive ink palettes.
pub mod color;
/// Engine defaults from a config file.
pub mod config;
/// The stroke grid and block compositor.
pub mod doc;
/// Glyph masks from sprite sheets.
pub mod font;
/// Raster storage and the ink blend.
pub mod pixels;
/// Selection rectangles and region copy/paste.
pub mod select;

pub use buffer::{Buffer, Workspace, WorkspaceAssets};
pub use color::{Cmy, Palette};
pub use doc::{Doc, Stroke, TextureSink};
pub use font::Font;
