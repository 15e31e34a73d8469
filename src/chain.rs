//! An ordered, immutable composition of stages.

use std::fmt;
use std::sync::Arc;

use crate::builder::ChainBuilder;
use crate::config::StageSpec;
use crate::error::{ChainError, StageError};
use crate::executor::{Execution, Stream};
use crate::registry::Registry;
use crate::stage::{Emitted, Record, Stage};
use crate::trace::ExecutionTrace;

/// A non-empty sequence of stages that behaves as a single stage.
///
/// Cloning a chain is cheap: clones share the same stage instances.
pub struct Chain<R> {
    stages: Arc<[Box<dyn Stage<R>>]>,
    name: String,
}

impl<R: Record> Chain<R> {
    /// Assemble already constructed stages. Fails on an empty list.
    pub fn new(stages: Vec<Box<dyn Stage<R>>>) -> Result<Self, ChainError> {
        if stages.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        let name = stages
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(" | ");
        Ok(Chain {
            stages: Arc::from(stages),
            name,
        })
    }

    /// Resolve `specs` against `registry` and assemble the result.
    pub fn build<I>(registry: &Registry<R>, specs: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = StageSpec>,
    {
        ChainBuilder::new(registry).build(specs)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Drive one record through every stage, lazily.
    pub fn execute(&self, record: R) -> Execution<R> {
        Execution::new(Arc::clone(&self.stages), record)
    }

    /// Drive a sequence of records through the chain, one after another.
    pub fn stream<I>(&self, inputs: I) -> Stream<R, I::IntoIter>
    where
        I: IntoIterator<Item = R>,
    {
        Stream::new(self.clone(), inputs.into_iter())
    }

    /// Run one record to completion while counting records at every pipe
    /// point. Stops at the first stage error, which is kept in the trace.
    pub fn execute_traced(&self, record: R) -> (Vec<R>, ExecutionTrace) {
        let mut execution = Execution::traced(Arc::clone(&self.stages), record);
        let mut outputs = Vec::new();
        for item in execution.by_ref() {
            match item {
                Ok(record) => outputs.push(record),
                Err(_) => break,
            }
        }
        let trace = execution.take_trace().unwrap_or_default();
        (outputs, trace)
    }

    /// Run one record to completion, collecting every terminal record.
    pub fn run(&self, record: R) -> Result<Vec<R>, StageError> {
        self.execute(record).collect()
    }
}

impl<R> Clone for Chain<R> {
    fn clone(&self) -> Self {
        Chain {
            stages: Arc::clone(&self.stages),
            name: self.name.clone(),
        }
    }
}

impl<R> fmt::Debug for Chain<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("len", &self.stages.len())
            .finish()
    }
}

impl<R: Record> Stage<R> for Chain<R> {
    fn process(&self, record: R) -> Emitted<R> {
        Box::new(self.execute(record))
    }

    /// Stage names joined with `" | "`.
    fn name(&self) -> &str {
        &self.name
    }
}
