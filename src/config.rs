//! Serializable chain configuration.
//!
//! A configuration is an ordered list of stage specifications:
//!
//! ```text
//! processors:
//!   - name: ComputeSpeedDirFromUV
//!     config:
//!       wind_u_var_name: uwnd
//!       wind_v_var_name: vwnd
//!   - name: WindDirSpeedToUV
//!     config:
//!       u_or_v: u
//! ```
//!
//! Reading the file is left to the caller; these types only describe its
//! shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::Parameters;

/// One stage of a chain: the registered name and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,
    #[serde(default, alias = "config")]
    pub parameters: Parameters,
}

impl StageSpec {
    pub fn new(name: impl Into<String>) -> Self {
        StageSpec {
            name: name.into(),
            parameters: Parameters::new(),
        }
    }

    /// Add a parameter, returning `self` for chaining.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name, value);
        self
    }
}

/// An ordered list of stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(alias = "stages")]
    pub processors: Vec<StageSpec>,
}

impl From<Vec<StageSpec>> for ChainConfig {
    fn from(processors: Vec<StageSpec>) -> Self {
        ChainConfig { processors }
    }
}
