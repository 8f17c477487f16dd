// src/config.rs

//! Engine defaults, deserializable from a JSON file.
//!
//! Nothing here is global: callers load (or default) a `Config` and pass
//! it into the workspace calls that need default assets. Defaults match
//! the stock machine: the sheet named `font` beside the working directory,
//! a 15x20 page, and the two-ink black/red palette.

use crate::color::{Cmy, Palette};
use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the glyph sprite sheet image.
    pub font_path: PathBuf,
    /// Default grid width for new buffers.
    pub cols: usize,
    /// Default grid height for new buffers.
    pub rows: usize,
    /// Palette inks, color id 0 first.
    pub inks: Vec<InkConfig>,
}

/// One configured ink strength triple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InkConfig {
    pub c: u8,
    pub m: u8,
    pub y: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            font_path: PathBuf::from("font"),
            cols: 15,
            rows: 20,
            inks: vec![
                InkConfig {
                    c: 0xff,
                    m: 0xff,
                    y: 0xff,
                },
                InkConfig {
                    c: 0x00,
                    m: 0xff,
                    y: 0xff,
                },
            ],
        }
    }
}

impl Config {
    /// Reads a configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config '{}'", path.display()))?;
        Ok(config)
    }

    /// Builds the configured palette. An empty ink list falls back to the
    /// stock palette; a palette must have at least one color.
    pub fn palette(&self) -> Arc<Palette> {
        let inks: Vec<Cmy> = self
            .inks
            .iter()
            .map(|ink| Cmy {
                c: ink.c,
                m: ink.m,
                y: ink.y,
            })
            .collect();
        match Palette::new(inks) {
            Some(palette) => palette,
            None => {
                warn!("config lists no inks; using the stock palette");
                Palette::stock()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_machine() {
        let config = Config::default();
        assert_eq!(config.cols, 15);
        assert_eq!(config.rows, 20);
        assert_eq!(config.palette().num_colors(), 2);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{ "cols": 40 }"#).unwrap();
        assert_eq!(config.cols, 40);
        assert_eq!(config.rows, 20);
        assert_eq!(config.font_path, PathBuf::from("font"));
    }

    #[test]
    fn empty_ink_list_falls_back_to_stock() {
        let config: Config = serde_json::from_str(r#"{ "inks": [] }"#).unwrap();
        assert_eq!(config.palette().num_colors(), 2);
    }

    #[test]
    fn configured_inks_are_used() {
        let config: Config =
            serde_json::from_str(r#"{ "inks": [{ "c": 1, "m": 2, "y": 3 }] }"#).unwrap();
        let palette = config.palette();
        assert_eq!(palette.num_colors(), 1);
        assert_eq!(palette.ink(0), Some(Cmy { c: 1, m: 2, y: 3 }));
    }
}
