//! Debug trace types for chain execution.
//!
//! A trace counts the records seen at every pipe point while an input is
//! driven through the chain: `pipe_points[0]` is the input, `pipe_points[i]`
//! is the output of stage `i - 1`. Length is `num_stages + 1`.

use std::fmt;

use crate::error::{StageError, TraceMismatch};

/// A stage failure observed while tracing.
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    /// Index of the stage that raised the error.
    pub stage_index: usize,
    pub error: StageError,
}

/// Record counts at each pipe point of one or more executions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionTrace {
    /// Names of each stage in the chain.
    pub stage_names: Vec<String>,
    /// Records that passed each pipe point.
    pub pipe_points: Vec<usize>,
    /// Failures, in the order they happened.
    pub failures: Vec<StageFailure>,
}

impl ExecutionTrace {
    pub fn new(stage_names: Vec<String>) -> Self {
        let pipe_points = vec![0; stage_names.len() + 1];
        ExecutionTrace {
            stage_names,
            pipe_points,
            failures: Vec::new(),
        }
    }

    pub(crate) fn record_input(&mut self) {
        self.pipe_points[0] += 1;
    }

    pub(crate) fn record_output(&mut self, stage_index: usize) {
        self.pipe_points[stage_index + 1] += 1;
    }

    pub(crate) fn record_failure(&mut self, stage_index: usize, error: StageError) {
        self.failures.push(StageFailure { stage_index, error });
    }

    pub fn inputs(&self) -> usize {
        self.pipe_points.first().copied().unwrap_or(0)
    }

    /// Terminal records.
    pub fn outputs(&self) -> usize {
        self.pipe_points.last().copied().unwrap_or(0)
    }

    /// Fold another trace of the same chain into this one.
    ///
    /// An empty (default) trace adopts `other` as is. Traces of chains with
    /// different stages are rejected and `self` is left unchanged.
    pub fn absorb(&mut self, other: ExecutionTrace) -> Result<(), TraceMismatch> {
        if self.pipe_points.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.stage_names != other.stage_names
            || self.pipe_points.len() != other.pipe_points.len()
        {
            return Err(TraceMismatch {
                expected: self.stage_names.clone(),
                found: other.stage_names,
            });
        }
        for (mine, theirs) in self.pipe_points.iter_mut().zip(other.pipe_points) {
            *mine += theirs;
        }
        self.failures.extend(other.failures);
        Ok(())
    }
}

impl fmt::Display for ExecutionTrace {
    /// `3 in -> StageA 3 -> StageB 6`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in", self.inputs())?;
        for (name, count) in self.stage_names.iter().zip(self.pipe_points.iter().skip(1)) {
            write!(f, " -> {name} {count}")?;
        }
        if !self.failures.is_empty() {
            write!(f, " ({} failed)", self.failures.len())?;
        }
        Ok(())
    }
}
