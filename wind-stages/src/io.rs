//! Reading chain configurations and tile streams.
//!
//! Configurations are YAML (`.yaml`/`.yml`) or JSON (anything else). Tiles
//! are JSON Lines: one tile object per line, blank lines ignored.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use stagechain::ChainConfig;
use thiserror::Error;

use crate::tile::Tile;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: invalid tile: {source}")]
    Tile {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parse a chain configuration, choosing the format from the extension.
pub fn load_config(path: &Path) -> Result<ChainConfig, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if is_yaml {
        Ok(serde_yaml::from_str(&text)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

/// Lazily read tiles from a JSON Lines source.
pub fn read_tiles<B: BufRead>(reader: B) -> impl Iterator<Item = Result<Tile, InputError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line_no = index + 1;
            match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(
                    serde_json::from_str(&line).map_err(|source| InputError::Tile {
                        line: line_no,
                        source,
                    }),
                ),
                Err(source) => Some(Err(InputError::Read {
                    line: line_no,
                    source,
                })),
            }
        })
}

/// Write one tile as a single JSON line.
pub fn write_tile<W: Write>(mut writer: W, tile: &Tile) -> io::Result<()> {
    serde_json::to_writer(&mut writer, tile)?;
    writer.write_all(b"\n")
}
