//! The stages this crate installs, and the registry holding them.

use once_cell::sync::Lazy;
use stagechain::{ParamSchema, Registry, Stage};

use crate::components::{self, WindDirSpeedToUv};
use crate::speed_direction::{self, ComputeSpeedDirFromUv};
use crate::tile::Tile;

static INSTALLED: Lazy<Registry<Tile>> = Lazy::new(|| {
    let mut registry = Registry::new();
    register_all(&mut registry);
    registry
});

/// Registry with every installed wind stage.
pub fn installed() -> &'static Registry<Tile> {
    &INSTALLED
}

/// Add the wind stages to an application's own registry.
pub fn register_all(registry: &mut Registry<Tile>) {
    registry.register(
        speed_direction::NAME,
        ParamSchema::new()
            .required("wind_u_var_name")
            .required("wind_v_var_name"),
        |params| {
            let stage: Box<dyn Stage<Tile>> = Box::new(ComputeSpeedDirFromUv::from_params(params)?);
            Ok(stage)
        },
    );
    registry.register(
        components::NAME,
        ParamSchema::new().required("u_or_v"),
        |params| {
            let stage: Box<dyn Stage<Tile>> = Box::new(WindDirSpeedToUv::from_params(params)?);
            Ok(stage)
        },
    );
}
