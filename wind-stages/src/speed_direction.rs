//! Wind speed and direction from u/v components.

use stagechain::{Emitted, ParamError, Parameters, Stage, StageError, emit};

use crate::tile::{Tile, check_pair};

pub const NAME: &str = "ComputeSpeedDirFromUV";

/// Speed and meteorological direction (degrees the wind blows from,
/// clockwise from north, in `[0, 360)`) of one `(u, v)` vector.
pub fn speed_direction(u: f64, v: f64) -> (f64, f64) {
    let speed = (u * u + v * v).sqrt();
    let direction = (-u).atan2(-v).to_degrees().rem_euclid(360.0);
    (speed, direction)
}

/// Adds `wind_speed` and `wind_dir` metadata computed from the u and v
/// components of a tile.
///
/// One component is the tile's data variable and the other is a metadata
/// array; whichever of the two configured names is found in the metadata
/// decides which is which (v is looked for first).
#[derive(Debug, Clone)]
pub struct ComputeSpeedDirFromUv {
    wind_u_var_name: String,
    wind_v_var_name: String,
}

impl ComputeSpeedDirFromUv {
    pub fn new(wind_u_var_name: impl Into<String>, wind_v_var_name: impl Into<String>) -> Self {
        ComputeSpeedDirFromUv {
            wind_u_var_name: wind_u_var_name.into(),
            wind_v_var_name: wind_v_var_name.into(),
        }
    }

    pub fn from_params(params: &Parameters) -> Result<Self, ParamError> {
        Ok(Self::new(
            params.get_str("wind_u_var_name")?,
            params.get_str("wind_v_var_name")?,
        ))
    }

    fn compute(&self, mut tile: Tile) -> Result<Tile, StageError> {
        let (wind_u, wind_v) = if let Some(v) = tile.meta(&self.wind_v_var_name) {
            (&tile.variable_data, v)
        } else if let Some(u) = tile.meta(&self.wind_u_var_name) {
            (u, &tile.variable_data)
        } else {
            return Err(StageError::MissingField {
                stage: NAME.to_string(),
                field: format!("{} or {}", self.wind_u_var_name, self.wind_v_var_name),
                context: tile.describe(),
            });
        };
        check_pair(NAME, wind_u, wind_v)?;

        let speed = wind_u.zip_map(wind_v, |u, v| speed_direction(u, v).0);
        let direction = wind_u.zip_map(wind_v, |u, v| speed_direction(u, v).1);

        tile.push_meta("wind_speed", speed);
        tile.push_meta("wind_dir", direction);
        Ok(tile)
    }
}

impl Stage<Tile> for ComputeSpeedDirFromUv {
    fn process(&self, tile: Tile) -> Emitted<Tile> {
        emit::result(self.compute(tile))
    }

    fn name(&self) -> &str {
        NAME
    }
}
