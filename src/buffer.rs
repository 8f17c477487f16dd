// src/buffer.rs

//! Editable buffers and the workspace that owns them.
//!
//! A `Buffer` wraps one document with everything a typist session needs:
//! cursor position, active ink, margins, tab stops, and the selection list.
//! A `Workspace` owns the buffer collection, tracks which buffer is
//! current, and holds the clipboard document; callers pass it into every
//! call instead of the engine keeping process-wide state.

use crate::codec::{self, AssetSource, CodecError};
use crate::color::Palette;
use crate::config::Config;
use crate::doc::{Doc, Stroke};
use crate::font::Font;
use crate::select::{self, Selection};
use anyhow::{Context, Result};
use log::{debug, trace};
use std::io::{Read, Write};
use std::sync::Arc;

/// One document plus its editing state.
#[derive(Debug)]
pub struct Buffer {
    doc: Doc,
    cursor_col: usize,
    cursor_row: usize,
    color: u8,
    top_margin: usize,
    bottom_margin: usize,
    left_margin: usize,
    right_margin: usize,
    h_tabs: Vec<bool>,
    v_tabs: Vec<bool>,
    selections: Vec<Selection>,
}

impl Buffer {
    /// Wraps a document; margins open to the full grid, cursor at the
    /// top-left, first palette color active.
    pub fn new(doc: Doc) -> Self {
        let cols = doc.cols();
        let rows = doc.rows();
        Buffer {
            h_tabs: vec![false; cols],
            v_tabs: vec![false; rows],
            doc,
            cursor_col: 0,
            cursor_row: 0,
            color: 0,
            top_margin: 0,
            bottom_margin: rows,
            left_margin: 0,
            right_margin: cols - 1,
            selections: Vec::new(),
        }
    }

    pub fn doc(&self) -> &Doc {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Doc {
        &mut self.doc
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_col, self.cursor_row)
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    /// Selects the active ink. Rejected if the palette has no such color.
    pub fn set_color(&mut self, color: u8) -> bool {
        if self.doc.palette().ink(color).is_none() {
            return false;
        }
        self.color = color;
        true
    }

    /// Moves the carriage. Negative coordinates wrap around the grid, and
    /// any move deactivates the newest selection rectangle.
    pub fn move_to(&mut self, col: isize, row: isize) {
        if let Some(sel) = self.selections.first_mut() {
            sel.active = false;
        }

        let mut col = col;
        let mut row = row;
        while col < 0 {
            col += self.doc.cols() as isize;
        }
        while row < 0 {
            row += self.doc.rows() as isize;
        }
        self.cursor_col = col as usize;
        self.cursor_row = row as usize;
        self.constrain_cursor();
    }

    /// Clamps the cursor back inside the margins.
    pub fn constrain_cursor(&mut self) {
        if self.cursor_col > self.right_margin {
            self.cursor_col = self.right_margin;
        }
        if self.cursor_col < self.left_margin {
            self.cursor_col = self.left_margin;
        }
        if self.cursor_row >= self.bottom_margin {
            self.cursor_row = self.bottom_margin - 1;
        }
        if self.cursor_row < self.top_margin {
            self.cursor_row = self.top_margin;
        }
    }

    /// Stamps a glyph at the cursor with the active ink and advances one
    /// column. Returns the stamped stroke, `None` when the glyph has no
    /// mask (the carriage still advances, like a typewriter on a dead key).
    pub fn type_glyph(&mut self, glyph: u8) -> Option<Stroke> {
        let stroke = self
            .doc
            .add_stroke(self.cursor_col, self.cursor_row, self.color, glyph);
        self.move_to(self.cursor_col as isize + 1, self.cursor_row as isize);
        stroke
    }

    /// Sets margins, clamping them to the grid. `right` is the last usable
    /// column; `bottom` is one past the last usable row.
    pub fn set_margins(&mut self, top: usize, bottom: usize, left: usize, right: usize) {
        self.top_margin = top.min(self.doc.rows() - 1);
        self.bottom_margin = bottom.clamp(self.top_margin + 1, self.doc.rows());
        self.left_margin = left.min(self.doc.cols() - 1);
        self.right_margin = right.clamp(self.left_margin, self.doc.cols() - 1);
        self.constrain_cursor();
    }

    pub fn set_h_tab(&mut self, col: usize, set: bool) {
        if let Some(tab) = self.h_tabs.get_mut(col) {
            *tab = set;
        }
    }

    pub fn set_v_tab(&mut self, row: usize, set: bool) {
        if let Some(tab) = self.v_tabs.get_mut(row) {
            *tab = set;
        }
    }

    /// Next horizontal tab stop strictly right of `col`.
    pub fn next_h_tab(&self, col: usize) -> Option<usize> {
        self.h_tabs
            .iter()
            .enumerate()
            .skip(col + 1)
            .find_map(|(i, &set)| set.then_some(i))
    }

    /// Next vertical tab stop strictly below `row`.
    pub fn next_v_tab(&self, row: usize) -> Option<usize> {
        self.v_tabs
            .iter()
            .enumerate()
            .skip(row + 1)
            .find_map(|(i, &set)| set.then_some(i))
    }

    /// Opens a new selection rectangle; newest first.
    pub fn add_selection(&mut self, start_col: usize, start_row: usize, end_col: usize, end_row: usize) {
        self.selections
            .insert(0, Selection::new(start_col, start_row, end_col, end_row));
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn clear_selection(&mut self) {
        self.selections.clear();
    }

    /// Copies the selected region into a clipboard document.
    pub fn copy_selection(&self) -> Option<Doc> {
        select::copy_selection(&self.doc, &self.selections)
    }
}

/// The buffer collection, current-buffer choice, and clipboard.
#[derive(Debug, Default)]
pub struct Workspace {
    buffers: Vec<Buffer>,
    current: usize,
    clipboard: Option<Doc>,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace::default()
    }

    /// Adds a buffer and returns its index. The first buffer added becomes
    /// current.
    pub fn add_buffer(&mut self, buffer: Buffer) -> usize {
        self.buffers.push(buffer);
        self.buffers.len() - 1
    }

    /// Creates a buffer from the configured defaults: configured font
    /// sheet, palette, and grid size.
    pub fn add_default_buffer(&mut self, config: &Config) -> Result<usize> {
        let font = Font::load(&config.font_path)?;
        let doc = Doc::new(font, config.palette(), config.cols, config.rows)
            .context("configured grid size is empty")?;
        Ok(self.add_buffer(Buffer::new(doc)))
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn current(&self) -> Option<&Buffer> {
        self.buffers.get(self.current)
    }

    pub fn current_mut(&mut self) -> Option<&mut Buffer> {
        self.buffers.get_mut(self.current)
    }

    pub fn buffer(&self, index: usize) -> Option<&Buffer> {
        self.buffers.get(index)
    }

    /// Makes `index` the current buffer. Out-of-range choices are ignored.
    pub fn choose(&mut self, index: usize) {
        if index < self.buffers.len() {
            self.current = index;
        }
    }

    /// Removes a buffer. The current choice moves to the next buffer, or
    /// the last remaining one.
    pub fn remove_buffer(&mut self, index: usize) {
        if index >= self.buffers.len() {
            return;
        }
        self.buffers.remove(index);
        if self.current >= self.buffers.len() && !self.buffers.is_empty() {
            self.current = self.buffers.len() - 1;
        }
    }

    pub fn clipboard(&self) -> Option<&Doc> {
        self.clipboard.as_ref()
    }

    /// Copies the current buffer's selection to the workspace clipboard.
    pub fn copy_selection(&mut self) -> bool {
        let Some(clip) = self.current().and_then(Buffer::copy_selection) else {
            return false;
        };
        debug!("clipboard now {}x{}", clip.cols(), clip.rows());
        self.clipboard = Some(clip);
        true
    }

    /// Pastes the clipboard into the current buffer at a grid offset.
    pub fn paste(&mut self, at_col: usize, at_row: usize) -> bool {
        let Some(clip) = self.clipboard.take() else {
            return false;
        };
        let pasted = match self.current_mut() {
            Some(buffer) => {
                select::paste_doc(buffer.doc_mut(), &clip, at_col, at_row);
                true
            }
            None => false,
        };
        self.clipboard = Some(clip);
        pasted
    }

    /// Saves the current buffer's document.
    pub fn save_current<W: Write>(&self, writer: &mut W) -> Result<(), CodecError> {
        match self.current() {
            Some(buffer) => codec::save_doc(buffer.doc(), writer),
            None => Err(CodecError::Assets(anyhow::anyhow!("no buffer to save"))),
        }
    }

    /// Loads a document into a new buffer and returns its index.
    ///
    /// Font and palette resolve through [`WorkspaceAssets`]: the current
    /// buffer if any, else the first buffer, else the configured defaults.
    pub fn load_buffer<R: Read>(
        &mut self,
        reader: &mut R,
        config: &Config,
    ) -> Result<usize, CodecError> {
        let doc = codec::load_doc(reader, &mut WorkspaceAssets::new(self, config))?;
        Ok(self.add_buffer(Buffer::new(doc)))
    }
}

/// The workspace's asset resolution chain, as the codec sees it.
///
/// Borrows the workspace immutably, so `load_buffer` splits the load into
/// two steps: resolve and decode first, then push the new buffer.
pub struct WorkspaceAssets<'a> {
    workspace: &'a Workspace,
    config: &'a Config,
}

impl<'a> WorkspaceAssets<'a> {
    pub fn new(workspace: &'a Workspace, config: &'a Config) -> Self {
        WorkspaceAssets { workspace, config }
    }
}

impl AssetSource for WorkspaceAssets<'_> {
    fn assets(&mut self) -> Result<(Arc<Font>, Arc<Palette>)> {
        let existing = self
            .workspace
            .current()
            .or_else(|| self.workspace.buffers.first());
        if let Some(buffer) = existing {
            trace!("load assets: sharing an existing buffer's font/palette");
            return Ok((buffer.doc().font().clone(), buffer.doc().palette().clone()));
        }
        trace!("load assets: falling back to configured defaults");
        let font = Font::load(&self.config.font_path)?;
        Ok((font, self.config.palette()))
    }
}
