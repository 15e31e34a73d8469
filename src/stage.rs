//! The stage contract.
//!
//! A `Stage` takes ownership of one record and returns a lazy sequence of
//! zero or more output records. Any item of that sequence may be a
//! `StageError`, which is fatal for the record being processed.

use std::fmt;

use crate::error::StageError;

/// Anything that can flow through a chain.
///
/// Records are moved into stages and out of their output sequences, so the
/// only requirement is that they can be sent along with the sequence that
/// owns them.
pub trait Record: Send + 'static {}

impl<T: Send + 'static> Record for T {}

/// Lazy output of one `Stage::process` call.
pub type Emitted<R> = Box<dyn Iterator<Item = Result<R, StageError>> + Send>;

/// A pipeline stage that processes records one at a time.
///
/// Unlike a plain `map`, `process` returns a sequence so a stage can drop a
/// record, pass it on, or fan it out. The sequence is pulled on demand by
/// the executor; nothing after the first item needs to be computed until it
/// is asked for.
pub trait Stage<R>: Send + Sync {
    /// Process a single input record, returning zero or more output records.
    fn process(&self, record: R) -> Emitted<R>;

    /// The display name of this stage.
    fn name(&self) -> &str;
}

/// Stage backed by a closure. See [`from_fn`].
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> fmt::Debug for FnStage<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

impl<R, F> Stage<R> for FnStage<F>
where
    R: Record,
    F: Fn(R) -> Emitted<R> + Send + Sync,
{
    fn process(&self, record: R) -> Emitted<R> {
        (self.f)(record)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build a stage from a closure.
///
/// ```
/// use stagechain::{Stage, emit, stage};
///
/// let upper = stage::from_fn("upper", |s: String| emit::one(s.to_uppercase()));
/// let out: Vec<String> = upper.process("abc".to_string()).map(Result::unwrap).collect();
/// assert_eq!(out, vec!["ABC"]);
/// ```
pub fn from_fn<R, F>(name: impl Into<String>, f: F) -> FnStage<F>
where
    R: Record,
    F: Fn(R) -> Emitted<R> + Send + Sync,
{
    FnStage {
        name: name.into(),
        f,
    }
}
