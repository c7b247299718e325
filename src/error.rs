//! Error Taxonomy
//!
//! Every error here is fatal for the signal stream that produced it.
//! The viewer replays a trusted log; a missing or duplicated id means the
//! log is corrupt, so nothing is retried or defaulted.

use thiserror::Error;

use crate::world::deposit::DepositId;
use crate::world::entity::EntityId;
use crate::world::signal::SignalKind;

/// Registry and descriptor errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Entity id is in neither partition.
    #[error("entity #{0} not found")]
    EntityNotFound(EntityId),

    /// Deposit id is not in the deposit collection.
    #[error("deposit #{0} not found")]
    DepositNotFound(DepositId),

    /// Spawn named an id that is already registered.
    #[error("entity #{0} already exists")]
    DuplicateEntity(EntityId),

    /// Deposit birth named an id that is already registered.
    #[error("deposit #{0} already exists")]
    DuplicateDeposit(DepositId),

    /// Map descriptor failed validation.
    #[error("invalid map descriptor: {0}")]
    InvalidDescriptor(String),
}

impl StateError {
    /// Is this a `NotFound` error (entity or deposit)?
    pub fn is_not_found(&self) -> bool {
        matches!(self, StateError::EntityNotFound(_) | StateError::DepositNotFound(_))
    }

    /// Is this a `DuplicateID` error (entity or deposit)?
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StateError::DuplicateEntity(_) | StateError::DuplicateDeposit(_))
    }
}

/// A signal whose preconditions did not hold against the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("contract violation applying {signal:?} signal: {source}")]
pub struct ContractViolation {
    /// Kind of the offending signal.
    pub signal: SignalKind,
    /// Registry failure underneath.
    #[source]
    pub source: StateError,
}

impl ContractViolation {
    /// Wrap a registry error raised while applying `signal`.
    pub fn new(signal: SignalKind, source: StateError) -> Self {
        Self { signal, source }
    }

    /// The registry error underneath.
    pub fn cause(&self) -> &StateError {
        &self.source
    }
}
