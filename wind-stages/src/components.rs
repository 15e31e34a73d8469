//! Wind u/v components from speed and direction.

use std::str::FromStr;

use stagechain::{Emitted, ParamError, Parameters, Stage, StageError, emit};

use crate::tile::{Tile, check_pair};

pub const NAME: &str = "WindDirSpeedToUV";

/// Which component becomes the tile's data variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    U,
    V,
}

impl FromStr for Component {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "u" => Ok(Component::U),
            "v" => Ok(Component::V),
            _ => Err(ParamError::new(
                "u_or_v",
                format!("must be 'u' or 'v', got '{s}'"),
            )),
        }
    }
}

/// `(u, v)` of a wind with the given speed, blowing towards `direction`
/// degrees clockwise from north.
pub fn components(speed: f64, direction: f64) -> (f64, f64) {
    let (sin, cos) = direction.to_radians().sin_cos();
    (speed * sin, speed * cos)
}

/// Replaces a wind speed variable with one of its u/v components.
///
/// The direction is read from the `wind_dir` metadata array. The original
/// speed is kept as `wind_speed` metadata and the other component is added
/// as `wind_u` or `wind_v`.
#[derive(Debug, Clone)]
pub struct WindDirSpeedToUv {
    component: Component,
}

impl WindDirSpeedToUv {
    pub fn new(component: Component) -> Self {
        WindDirSpeedToUv { component }
    }

    pub fn from_params(params: &Parameters) -> Result<Self, ParamError> {
        Ok(Self::new(params.get_str("u_or_v")?.parse()?))
    }

    pub fn component(&self) -> Component {
        self.component
    }

    fn compute(&self, mut tile: Tile) -> Result<Tile, StageError> {
        let direction = tile.meta("wind_dir").ok_or_else(|| StageError::MissingField {
            stage: NAME.to_string(),
            field: "wind_dir".to_string(),
            context: tile.describe(),
        })?;
        let speed = &tile.variable_data;
        check_pair(NAME, speed, direction)?;

        let wind_u = speed.zip_map(direction, |s, d| components(s, d).0);
        let wind_v = speed.zip_map(direction, |s, d| components(s, d).1);

        let (variable, other_name, other) = match self.component {
            Component::U => (wind_u, "wind_v", wind_v),
            Component::V => (wind_v, "wind_u", wind_u),
        };
        let speed = std::mem::replace(&mut tile.variable_data, variable);
        tile.push_meta("wind_speed", speed);
        tile.push_meta(other_name, other);
        Ok(tile)
    }
}

impl Stage<Tile> for WindDirSpeedToUv {
    fn process(&self, tile: Tile) -> Emitted<Tile> {
        emit::result(self.compute(tile))
    }

    fn name(&self) -> &str {
        NAME
    }
}
