//! Record-at-a-time chain executor.
//!
//! Drives one input record through every stage of a chain, depth first.
//! Each stage's output sequence is suspended on an explicit stack, one entry
//! per stage depth, so a record emitted by stage `i` is pushed all the way
//! through stages `i+1..n` before stage `i` is asked for its next record.
//! Nothing runs until the caller pulls the next terminal record.

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::chain::Chain;
use crate::error::StageError;
use crate::stage::{Emitted, Record, Stage};
use crate::trace::ExecutionTrace;

/// Lazy execution of a chain on one input record.
///
/// Created by [`Chain::execute`]. Yields terminal records in depth-first
/// order; the first stage error is yielded as `Err` and ends the execution.
/// Dropping an unfinished execution drops every suspended stage sequence.
pub struct Execution<R> {
    stages: Arc<[Box<dyn Stage<R>>]>,
    pending: Option<R>,
    stack: Vec<Emitted<R>>,
    trace: Option<ExecutionTrace>,
}

impl<R: Record> Execution<R> {
    pub(crate) fn new(stages: Arc<[Box<dyn Stage<R>>]>, record: R) -> Self {
        let stack = Vec::with_capacity(stages.len());
        Execution {
            stages,
            pending: Some(record),
            stack,
            trace: None,
        }
    }

    pub(crate) fn traced(stages: Arc<[Box<dyn Stage<R>>]>, record: R) -> Self {
        let names = stages.iter().map(|s| s.name().to_string()).collect();
        let mut execution = Self::new(stages, record);
        execution.trace = Some(ExecutionTrace::new(names));
        execution
    }

    /// Number of suspended stage sequences.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Names of the stages with a suspended sequence, outermost first.
    pub fn position(&self) -> Vec<&str> {
        self.stages[..self.stack.len()]
            .iter()
            .map(|s| s.name())
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_none() && self.stack.is_empty()
    }

    pub(crate) fn take_trace(&mut self) -> Option<ExecutionTrace> {
        self.trace.take()
    }
}

impl<R: Record> Iterator for Execution<R> {
    type Item = Result<R, StageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.pending.take() {
            if let Some(trace) = &mut self.trace {
                trace.record_input();
            }
            let first = self.stages[0].process(record);
            self.stack.push(first);
        }

        loop {
            let depth = self.stack.len();
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(Err(error)) => {
                    let stage_index = depth - 1;
                    tracing::debug!(
                        stage = self.stages[stage_index].name(),
                        %error,
                        "stage failed, abandoning record"
                    );
                    if let Some(trace) = &mut self.trace {
                        trace.record_failure(stage_index, error.clone());
                    }
                    self.stack.clear();
                    return Some(Err(error));
                }
                Some(Ok(record)) => {
                    if let Some(trace) = &mut self.trace {
                        trace.record_output(depth - 1);
                    }
                    if depth == self.stages.len() {
                        return Some(Ok(record));
                    }
                    let next = self.stages[depth].process(record);
                    self.stack.push(next);
                }
            }
        }
    }
}

impl<R: Record> FusedIterator for Execution<R> {}

/// Lazy execution of a chain over a sequence of input records.
///
/// Created by [`Chain::stream`]. Each input is fully drained before the next
/// one is pulled. A stage error is yielded in place of the failing input's
/// remaining output and the stream moves on to the next input; callers that
/// want to stop at the first error simply stop pulling.
pub struct Stream<R, I> {
    chain: Chain<R>,
    inputs: I,
    current: Option<Execution<R>>,
}

impl<R, I> Stream<R, I> {
    pub(crate) fn new(chain: Chain<R>, inputs: I) -> Self {
        Stream {
            chain,
            inputs,
            current: None,
        }
    }
}

impl<R, I> Iterator for Stream<R, I>
where
    R: Record,
    I: Iterator<Item = R>,
{
    type Item = Result<R, StageError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(execution) = &mut self.current {
                if let Some(item) = execution.next() {
                    return Some(item);
                }
                self.current = None;
            }
            let record = self.inputs.next()?;
            self.current = Some(self.chain.execute(record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit;
    use crate::stage::from_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn boxed<S: Stage<String> + 'static>(stage: S) -> Box<dyn Stage<String>> {
        Box::new(stage)
    }

    fn identity(name: &str) -> Box<dyn Stage<String>> {
        boxed(from_fn(name, |r: String| emit::one(r)))
    }

    fn split(suffixes: &'static [&'static str]) -> Box<dyn Stage<String>> {
        boxed(from_fn("split", move |r: String| {
            emit::many(suffixes.iter().map(move |s| format!("{r}{s}")))
        }))
    }

    fn duplicate() -> Box<dyn Stage<String>> {
        boxed(from_fn("duplicate", |r: String| emit::many(vec![r.clone(), r])))
    }

    fn chain(stages: Vec<Box<dyn Stage<String>>>) -> Chain<String> {
        Chain::new(stages).unwrap()
    }

    fn run(chain: &Chain<String>, input: &str) -> Vec<Result<String, StageError>> {
        chain.execute(input.to_string()).collect()
    }

    fn ok(values: &[&str]) -> Vec<Result<String, StageError>> {
        values.iter().map(|v| Ok(v.to_string())).collect()
    }

    // --- Ordering ---

    #[test]
    fn test_identity_chain_yields_input() {
        let chain = chain(vec![identity("a"), identity("b"), identity("c")]);
        assert_eq!(run(&chain, "r"), ok(&["r"]));
    }

    #[test]
    fn test_single_stage_chain() {
        let chain = chain(vec![split(&["1", "2"])]);
        assert_eq!(run(&chain, "r"), ok(&["r1", "r2"]));
    }

    #[test]
    fn test_fan_out_then_identity() {
        let chain = chain(vec![split(&["1", "2"]), identity("id")]);
        assert_eq!(run(&chain, "r"), ok(&["r1", "r2"]));
    }

    #[test]
    fn test_fan_out_is_depth_first() {
        let chain = chain(vec![split(&["a", "b"]), duplicate()]);
        assert_eq!(run(&chain, ""), ok(&["a", "a", "b", "b"]));
    }

    #[test]
    fn test_three_level_fan_out() {
        let chain = chain(vec![
            split(&["a", "b"]),
            boxed(from_fn("split2", |r: String| {
                emit::many(vec![format!("{r}1"), format!("{r}2")])
            })),
            duplicate(),
        ]);
        assert_eq!(
            run(&chain, ""),
            ok(&["a1", "a1", "a2", "a2", "b1", "b1", "b2", "b2"])
        );
    }

    #[test]
    fn test_dropping_stage_ends_branch() {
        let chain = chain(vec![
            split(&["keep", "drop", "keep2"]),
            boxed(from_fn("filter", |r: String| {
                if r.contains("drop") {
                    emit::none()
                } else {
                    emit::one(r)
                }
            })),
        ]);
        assert_eq!(run(&chain, "x"), ok(&["xkeep", "xkeep2"]));
    }

    #[test]
    fn test_empty_first_stage_yields_nothing() {
        let chain = chain(vec![boxed(from_fn("hole", |_r: String| emit::none())), identity("id")]);
        assert!(run(&chain, "x").is_empty());
    }

    // --- Errors ---

    #[test]
    fn test_error_after_first_branch() {
        let chain = chain(vec![
            split(&["1", "2", "3"]),
            boxed(from_fn("check", |r: String| {
                if r.ends_with('2') {
                    emit::fail(StageError::failed("check", format!("rejected {r}")))
                } else {
                    emit::many(vec![format!("{r}a"), format!("{r}b")])
                }
            })),
        ]);
        let mut execution = chain.execute("r".to_string());
        assert_eq!(execution.next(), Some(Ok("r1a".to_string())));
        assert_eq!(execution.next(), Some(Ok("r1b".to_string())));
        assert_eq!(
            execution.next(),
            Some(Err(StageError::failed("check", "rejected r2")))
        );
        assert_eq!(execution.next(), None);
        assert_eq!(execution.next(), None);
        assert!(execution.is_finished());
    }

    #[test]
    fn test_error_mid_sequence_keeps_earlier_output() {
        let chain = chain(vec![boxed(from_fn("partial", |r: String| {
            let items: Emitted<String> = Box::new(
                vec![
                    Ok(r.clone()),
                    Err(StageError::failed("partial", "broke")),
                    Ok(r),
                ]
                .into_iter(),
            );
            items
        }))]);
        assert_eq!(
            run(&chain, "x"),
            vec![Ok("x".to_string()), Err(StageError::failed("partial", "broke"))]
        );
    }

    // --- Laziness ---

    #[test]
    fn test_nothing_runs_before_first_pull() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let chain = chain(vec![boxed(from_fn("count", move |r: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            emit::one(r)
        }))]);
        let mut execution = chain.execute("x".to_string());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(execution.depth(), 0);
        assert!(!execution.is_finished());
        execution.next();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_pull_expands_one_branch() {
        let downstream = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&downstream);
        let chain = chain(vec![
            boxed(from_fn("wide", |r: String| {
                emit::many((0..1000).map(move |i| format!("{r}{i}")))
            })),
            boxed(from_fn("count", move |r: String| {
                counter.fetch_add(1, Ordering::SeqCst);
                emit::one(r)
            })),
        ]);
        let mut execution = chain.execute("r".to_string());
        assert_eq!(execution.next(), Some(Ok("r0".to_string())));
        assert_eq!(downstream.load(Ordering::SeqCst), 1);
        assert_eq!(execution.depth(), 2);
        assert_eq!(execution.position(), vec!["wide", "count"]);
    }

    #[test]
    fn test_depth_bounded_by_chain_length() {
        let chain = chain(vec![split(&["a", "b", "c"]), duplicate(), duplicate()]);
        let mut execution = chain.execute(String::new());
        let mut outputs = 0;
        while let Some(item) = execution.next() {
            assert!(item.is_ok());
            assert!(execution.depth() <= 3);
            outputs += 1;
        }
        assert_eq!(outputs, 12);
    }

    // --- Cancellation ---

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Output sequence that owns a `DropCounter` for as long as it lives.
    struct Guarded {
        items: std::vec::IntoIter<String>,
        _counter: DropCounter,
    }

    impl Iterator for Guarded {
        type Item = Result<String, StageError>;

        fn next(&mut self) -> Option<Self::Item> {
            self.items.next().map(Ok)
        }
    }

    fn guarded_fan_out(drops: &Arc<AtomicUsize>, width: usize) -> Box<dyn Stage<String>> {
        let drops = Arc::clone(drops);
        boxed(from_fn("guarded", move |r: String| {
            let items: Vec<String> = (0..width).map(|i| format!("{r}{i}")).collect();
            let sequence: Emitted<String> = Box::new(Guarded {
                items: items.into_iter(),
                _counter: DropCounter(Arc::clone(&drops)),
            });
            sequence
        }))
    }

    #[test]
    fn test_drop_releases_suspended_sequences() {
        let drops = Arc::new(AtomicUsize::new(0));
        let chain = chain(vec![guarded_fan_out(&drops, 10), identity("id")]);
        let mut execution = chain.execute("r".to_string());
        assert_eq!(execution.next(), Some(Ok("r0".to_string())));
        assert_eq!(execution.depth(), 2);
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        drop(execution);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_releases_suspended_sequences() {
        let drops = Arc::new(AtomicUsize::new(0));
        let chain = chain(vec![
            guarded_fan_out(&drops, 10),
            boxed(from_fn("reject", |r: String| {
                if r.ends_with('1') {
                    emit::fail(StageError::failed("reject", r))
                } else {
                    emit::one(r)
                }
            })),
        ]);
        let mut execution = chain.execute("r".to_string());
        assert_eq!(execution.next(), Some(Ok("r0".to_string())));
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        assert!(matches!(execution.next(), Some(Err(_))));
        // Released by the failure itself, not by dropping the execution.
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert_eq!(execution.depth(), 0);
        assert!(execution.is_finished());
    }

    // --- Streams ---

    #[test]
    fn test_stream_preserves_input_order() {
        let chain = chain(vec![duplicate()]);
        let out: Vec<String> = chain
            .stream(vec!["a".to_string(), "b".to_string()])
            .map(Result::unwrap)
            .collect();
        assert_eq!(out, vec!["a", "a", "b", "b"]);
    }

    #[test]
    fn test_stream_continues_after_error() {
        let chain = chain(vec![boxed(from_fn("even", |r: String| {
            if r.len() % 2 == 0 {
                emit::one(r)
            } else {
                emit::fail(StageError::failed("even", r))
            }
        }))]);
        let out: Vec<_> = chain
            .stream(["ab", "c", "de"].map(String::from))
            .collect();
        assert_eq!(
            out,
            vec![
                Ok("ab".to_string()),
                Err(StageError::failed("even", "c")),
                Ok("de".to_string())
            ]
        );
    }

    #[test]
    fn test_stream_of_nothing() {
        let chain = chain(vec![duplicate()]);
        assert_eq!(chain.stream(Vec::<String>::new()).count(), 0);
    }
}
