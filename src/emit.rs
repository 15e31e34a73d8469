//! Constructors for the common shapes of stage output.

use std::iter;

use crate::error::StageError;
use crate::stage::{Emitted, Record};

/// Exactly one record.
pub fn one<R: Record>(record: R) -> Emitted<R> {
    Box::new(iter::once(Ok(record)))
}

/// No records; the input is dropped.
pub fn none<R: Record>() -> Emitted<R> {
    Box::new(iter::empty())
}

/// Every record of `records`, in order, pulled lazily.
pub fn many<R, I>(records: I) -> Emitted<R>
where
    R: Record,
    I: IntoIterator<Item = R>,
    I::IntoIter: Send + 'static,
{
    Box::new(records.into_iter().map(Ok))
}

/// A single fatal error.
pub fn fail<R: Record>(error: StageError) -> Emitted<R> {
    Box::new(iter::once(Err(error)))
}

/// One record or one error.
pub fn result<R: Record>(result: Result<R, StageError>) -> Emitted<R> {
    Box::new(iter::once(result))
}
