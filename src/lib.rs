//! # stagechain
//!
//! Configuration-driven chains of record transform stages.
//!
//! A chain is built from an ordered list of stage specifications (a stage
//! name plus named parameters). Each name is resolved through a
//! [`Registry`] populated by the application, required parameters are
//! checked against the stage's declared [`ParamSchema`], and the stages are
//! assembled into a [`Chain`].
//!
//! ## Execution model
//!
//! - **One record in, many out**: a stage maps one record to a lazy sequence
//!   of zero or more records
//! - **Depth first**: every record emitted by stage `i` is driven through
//!   stages `i+1..n` before stage `i` is asked for another
//! - **Pull based**: nothing runs until the caller asks for the next output
//! - **Fatal errors**: a stage error ends the current input's execution
//!
//! ## Example
//!
//! ```
//! use stagechain::{Chain, ParamSchema, Registry, StageSpec, emit, stage};
//!
//! let mut registry: Registry<String> = Registry::new();
//! registry.register("Split", ParamSchema::new().required("parts"), |params| {
//!     let parts: Vec<String> = params.get("parts")?;
//!     Ok(Box::new(stage::from_fn("Split", move |r: String| {
//!         emit::many(parts.iter().map(|p| format!("{r}-{p}")).collect::<Vec<_>>())
//!     })))
//! });
//! registry.register("Upper", ParamSchema::new(), |_| {
//!     Ok(Box::new(stage::from_fn("Upper", |r: String| emit::one(r.to_uppercase()))))
//! });
//!
//! let chain = Chain::build(
//!     &registry,
//!     vec![
//!         StageSpec::new("Split").param("parts.1", "b").param("parts.0", "a"),
//!         StageSpec::new("Upper"),
//!     ],
//! )
//! .unwrap();
//!
//! let out: Vec<String> = chain.execute("x".to_string()).map(Result::unwrap).collect();
//! assert_eq!(out, vec!["X-A", "X-B"]);
//! ```

pub mod builder;
pub mod chain;
pub mod config;
pub mod emit;
pub mod error;
pub mod executor;
pub mod params;
pub mod registry;
pub mod stage;
pub mod trace;

pub use builder::ChainBuilder;
pub use chain::Chain;
pub use config::{ChainConfig, StageSpec};
pub use error::{ChainError, ParamError, StageError, TraceMismatch};
pub use executor::{Execution, Stream};
pub use params::Parameters;
pub use registry::{Constructor, ParamSchema, Registration, Registry};
pub use stage::{Emitted, FnStage, Record, Stage};
pub use trace::{ExecutionTrace, StageFailure};
