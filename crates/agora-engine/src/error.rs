//! Error types for the debate engine.

use agora_core::{ArgumentId, GraphError, RelationKey, RelationKind};
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while deriving semantics or applying moves.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid graph construction or mutation.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A move referenced a relation the shared graph does not contain.
    #[error("unknown {kind} relation {key}")]
    UnknownRelation { kind: RelationKind, key: RelationKey },

    /// The active attack/support graph contains a dependency cycle, so the
    /// numeric evaluation has no processing order. Acyclicity is a
    /// precondition supplied by whoever builds the graph.
    #[error("evaluation cycle through argument {argument}")]
    EvaluationCycle { argument: ArgumentId },

    /// Target-set search walks all 2^n subsets of the modifiable attacks and
    /// refuses to start beyond the hard cap.
    #[error("{count} modifiable attacks exceed the target-set search cap of {max}")]
    TooManyModifiableAttacks { count: usize, max: usize },

    /// A receipt was replayed against a relation that no longer matches it.
    #[error("stale move receipt for {kind} relation {key}")]
    StaleReceipt { kind: RelationKind, key: RelationKey },
}
