//! Tile records.
//!
//! A tile carries one data variable plus an ordered list of named metadata
//! arrays. Arrays are stored flat in row-major order next to their shape;
//! masked cells are `None` (`null` on the wire).

use serde::{Deserialize, Serialize};
use stagechain::StageError;

/// A flat array with its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedArray {
    pub shape: Vec<usize>,
    pub values: Vec<Option<f64>>,
}

impl ShapedArray {
    pub fn new(shape: Vec<usize>, values: Vec<Option<f64>>) -> Self {
        ShapedArray { shape, values }
    }

    /// A one-dimensional array with no masked cells.
    pub fn from_values(values: &[f64]) -> Self {
        ShapedArray {
            shape: vec![values.len()],
            values: values.iter().copied().map(Some).collect(),
        }
    }

    /// Number of cells implied by the shape.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Combine two arrays cell by cell. A cell masked in either input is
    /// masked in the output.
    pub fn zip_map(&self, other: &ShapedArray, f: impl Fn(f64, f64) -> f64) -> ShapedArray {
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(f(*a, *b)),
                _ => None,
            })
            .collect();
        ShapedArray {
            shape: self.shape.clone(),
            values,
        }
    }
}

/// A named metadata array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaArray {
    pub name: String,
    pub data: ShapedArray,
}

/// Where a tile came from, used in error messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileSummary {
    #[serde(default)]
    pub granule: Option<String>,
    #[serde(default)]
    pub section_spec: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub variable_data: ShapedArray,
    #[serde(default)]
    pub meta_data: Vec<MetaArray>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<TileSummary>,
}

impl Tile {
    pub fn new(variable_data: ShapedArray) -> Self {
        Tile {
            variable_data,
            meta_data: Vec::new(),
            summary: None,
        }
    }

    pub fn with_meta(mut self, name: impl Into<String>, data: ShapedArray) -> Self {
        self.push_meta(name, data);
        self
    }

    /// First metadata array called `name`.
    pub fn meta(&self, name: &str) -> Option<&ShapedArray> {
        self.meta_data
            .iter()
            .find(|m| m.name == name)
            .map(|m| &m.data)
    }

    pub fn push_meta(&mut self, name: impl Into<String>, data: ShapedArray) {
        self.meta_data.push(MetaArray {
            name: name.into(),
            data,
        });
    }

    /// `granule <g> slice <s>` when the tile has a summary.
    pub fn describe(&self) -> Option<String> {
        self.summary.as_ref().map(|s| {
            format!(
                "granule {} slice {}",
                s.granule.as_deref().unwrap_or("unknown"),
                s.section_spec.as_deref().unwrap_or("unknown")
            )
        })
    }
}

/// Check that two arrays can be combined cell by cell.
pub(crate) fn check_pair(
    stage: &str,
    first: &ShapedArray,
    second: &ShapedArray,
) -> Result<(), StageError> {
    if first.shape != second.shape {
        return Err(StageError::ShapeMismatch {
            stage: stage.to_string(),
            expected: first.shape.clone(),
            found: second.shape.clone(),
        });
    }
    for array in [first, second] {
        if array.values.len() != array.size() {
            return Err(StageError::failed(
                stage,
                format!(
                    "array of shape {:?} holds {} values",
                    array.shape,
                    array.values.len()
                ),
            ));
        }
    }
    Ok(())
}
