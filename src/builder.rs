//! Chain builder: stage specifications in, validated chain out.
//!
//! Building happens in two passes. The first resolves every stage name,
//! folds flattened list keys and checks required parameters; the second
//! runs the constructors. A configuration naming an unknown stage or
//! leaving out a parameter therefore never constructs anything.

use crate::chain::Chain;
use crate::config::{ChainConfig, StageSpec};
use crate::error::ChainError;
use crate::params::Parameters;
use crate::registry::{Registration, Registry};
use crate::stage::{Record, Stage};

/// Builds chains from specifications using a registry.
pub struct ChainBuilder<'r, R> {
    registry: &'r Registry<R>,
}

/// A specification that passed validation and is ready to construct.
struct Resolved<'r, R> {
    name: String,
    registration: &'r Registration<R>,
    parameters: Parameters,
}

impl<'r, R: Record> ChainBuilder<'r, R> {
    pub fn new(registry: &'r Registry<R>) -> Self {
        ChainBuilder { registry }
    }

    /// Build a chain from specifications, in order.
    ///
    /// Fails at the first specification that cannot be resolved, validated
    /// or constructed. No partially built chain is ever returned.
    pub fn build<I>(&self, specs: I) -> Result<Chain<R>, ChainError>
    where
        I: IntoIterator<Item = StageSpec>,
    {
        let resolved = specs
            .into_iter()
            .map(|spec| self.resolve(spec))
            .collect::<Result<Vec<_>, _>>()?;

        if resolved.is_empty() {
            return Err(ChainError::EmptyChain);
        }

        let stages = resolved
            .into_iter()
            .map(|r| self.construct(r))
            .collect::<Result<Vec<_>, _>>()?;

        let chain = Chain::new(stages)?;
        tracing::debug!(chain = %chain.name(), stages = chain.len(), "chain assembled");
        Ok(chain)
    }

    pub fn build_config(&self, config: ChainConfig) -> Result<Chain<R>, ChainError> {
        self.build(config.processors)
    }

    /// Build a single stage from its specification.
    pub fn build_stage(&self, spec: StageSpec) -> Result<Box<dyn Stage<R>>, ChainError> {
        let resolved = self.resolve(spec)?;
        self.construct(resolved)
    }

    fn resolve(&self, spec: StageSpec) -> Result<Resolved<'r, R>, ChainError> {
        let StageSpec {
            name,
            mut parameters,
        } = spec;

        let Some(registration) = self.registry.get(&name) else {
            return Err(ChainError::StageNotFound(name));
        };

        if let Err(e) = parameters.expand_list_keys() {
            return Err(ChainError::InvalidListParameter {
                stage: name,
                parameter: e.parameter,
                reason: e.reason,
            });
        }

        let schema = registration.schema();
        let missing = schema.missing(&parameters);
        if !missing.is_empty() {
            return Err(ChainError::MissingParameters {
                stage: name,
                missing,
            });
        }

        for extra in parameters.names().filter(|p| !schema.declares(p)) {
            tracing::warn!(stage = %name, parameter = extra, "ignoring undeclared parameter");
        }

        Ok(Resolved {
            name,
            registration,
            parameters,
        })
    }

    fn construct(&self, resolved: Resolved<'r, R>) -> Result<Box<dyn Stage<R>>, ChainError> {
        let Resolved {
            name,
            registration,
            parameters,
        } = resolved;
        let stage = registration
            .construct(&parameters)
            .map_err(|e| e.into_chain_error(&name))?;
        tracing::debug!(stage = %name, parameters = parameters.len(), "built stage");
        Ok(stage)
    }
}
