//! # wind-stages
//!
//! Wind transform stages for [`stagechain`] chains over [`Tile`] records,
//! plus the readers used by the `chain-run` binary.
//!
//! | Stage | Parameters | Effect |
//! |-------|------------|--------|
//! | `ComputeSpeedDirFromUV` | `wind_u_var_name`, `wind_v_var_name` | adds `wind_speed` and `wind_dir` |
//! | `WindDirSpeedToUV` | `u_or_v` | replaces speed with the u or v component |
//!
//! ```
//! use stagechain::{Chain, StageSpec};
//! use wind_stages::{ShapedArray, Tile, installed};
//!
//! let chain = Chain::build(
//!     installed(),
//!     vec![StageSpec::new("ComputeSpeedDirFromUV")
//!         .param("wind_u_var_name", "uwnd")
//!         .param("wind_v_var_name", "vwnd")],
//! )
//! .unwrap();
//!
//! let tile = Tile::new(ShapedArray::from_values(&[3.0]))
//!     .with_meta("vwnd", ShapedArray::from_values(&[4.0]));
//! let out = chain.run(tile).unwrap();
//! assert_eq!(out[0].meta("wind_speed"), Some(&ShapedArray::from_values(&[5.0])));
//! ```

pub mod components;
pub mod installed;
pub mod io;
pub mod runner;
pub mod speed_direction;
pub mod tile;

pub use components::{Component, WindDirSpeedToUv};
pub use installed::{installed, register_all};
pub use io::{InputError, load_config, read_tiles, write_tile};
pub use runner::{RunError, run_tiles};
pub use speed_direction::ComputeSpeedDirFromUv;
pub use tile::{MetaArray, ShapedArray, Tile, TileSummary};
