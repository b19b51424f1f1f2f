//! The shared gameboard: an argument graph plus its derived state.
//!
//! The board owns the public [`ArgumentGraph`] and keeps the grounded status
//! and numeric evaluation in step with it. Mutation goes exclusively through
//! [`Gameboard::apply_move`], which settles the acting agent's accounts and
//! returns a [`MoveReceipt`]; reverting with the receipt restores the exact
//! pre-move weight, so speculative play (simulate, inspect, undo) never
//! drifts the board.

use std::collections::BTreeSet;

use agora_core::{ArgumentGraph, Move, Topic, Weight};
use tracing::{debug, info};

use crate::agent::Agent;
use crate::error::{EngineError, EngineResult};
use crate::grounded::{self, IssueStatus};
use crate::quad;
use crate::targets::{self, TargetSet};

/// Proof that a specific move was applied, carrying what is needed to undo it.
///
/// The pre- and post-move weights are kept opaque; a receipt can only restore
/// the state it witnessed, and reverting out of order is detected.
#[derive(Debug, Clone, Copy)]
pub struct MoveReceipt {
    /// The move that was applied.
    pub mv: Move,
    /// Topics the voter's expertise shared with the relation.
    pub impact: usize,
    /// Issue status before the move.
    pub status_before: IssueStatus,
    /// Issue evaluation before the move.
    pub evaluation_before: f64,
    previous: Weight,
    applied: Weight,
}

impl MoveReceipt {
    /// Whether the move changed the issue's grounded status.
    pub fn flipped_status(&self, board: &Gameboard) -> bool {
        board.status != self.status_before
    }
}

/// Observed effect of a speculatively applied move.
#[derive(Debug, Clone, Copy)]
pub struct MoveOutcome {
    /// Grounded status of the issue with the move in place.
    pub status: IssueStatus,
    /// Issue evaluation with the move in place.
    pub evaluation: f64,
    /// Impact the move carried.
    pub impact: usize,
}

/// The public debate graph together with its derived semantics.
#[derive(Debug, Clone)]
pub struct Gameboard {
    graph: ArgumentGraph,
    status: IssueStatus,
    evaluation: f64,
    target_sets: Option<Vec<TargetSet>>,
}

impl Gameboard {
    /// Wrap a graph, deriving its initial status and evaluation.
    pub fn new(mut graph: ArgumentGraph) -> EngineResult<Self> {
        let evaluation = quad::evaluate(&mut graph)?;
        let status = grounded::issue_status(&graph);
        info!(%status, evaluation, "board_created");
        Ok(Self {
            graph,
            status,
            evaluation,
            target_sets: None,
        })
    }

    /// The underlying graph.
    pub fn graph(&self) -> &ArgumentGraph {
        &self.graph
    }

    /// Current grounded status of the issue.
    pub fn status(&self) -> IssueStatus {
        self.status
    }

    /// Current numeric evaluation of the issue.
    pub fn evaluation(&self) -> f64 {
        self.evaluation
    }

    /// Apply an agent's move and settle the agent's accounts.
    ///
    /// Beyond casting the vote, this marks the relation as played, spends
    /// the agent's lie budget when the vote contradicts its beliefs, and
    /// records the per-move tallies. Budget enforcement stays with the
    /// strategies; the board only keeps the ledger honest, so a driver that
    /// applies moves directly cannot leave `lies_used` behind.
    pub fn apply_move(&mut self, mv: Move, agent: &mut Agent) -> EngineResult<MoveReceipt> {
        let truthful = agent
            .truthful_move(mv.kind, mv.key)
            .map_or(true, |t| t.polarity == mv.polarity);
        let wished = agent.wished_evaluation();
        let distance_before = (self.evaluation - wished).abs();

        let receipt = self.cast_vote(mv, &agent.expertise)?;

        let delta = self.evaluation - receipt.evaluation_before;
        let toward = (self.evaluation - wished).abs() < distance_before;
        agent.mark_played(mv.kind, mv.key);
        agent.record_move(truthful, delta, toward);
        Ok(receipt)
    }

    /// Cast a vote on a relation and re-derive the board state.
    ///
    /// The vote's magnitude is the overlap between `expertise` and the
    /// relation's topics, signed by the move's polarity. A move with no
    /// topic overlap is legal and leaves the weights untouched.
    fn cast_vote(
        &mut self,
        mv: Move,
        expertise: &BTreeSet<Topic>,
    ) -> EngineResult<MoveReceipt> {
        let status_before = self.status;
        let evaluation_before = self.evaluation;

        let relation = self
            .graph
            .relation_mut(mv.kind, mv.key)
            .ok_or(EngineError::UnknownRelation {
                kind: mv.kind,
                key: mv.key,
            })?;
        let impact = relation.topic_overlap(expertise);
        let previous = relation.weight;
        relation.weight.vote(mv.polarity.sign() * impact as f64);
        let applied = relation.weight;

        self.rederive()?;
        self.target_sets = None;
        debug!(
            kind = %mv.kind,
            key = %mv.key,
            impact,
            status = %self.status,
            evaluation = self.evaluation,
            "move_applied"
        );
        Ok(MoveReceipt {
            mv,
            impact,
            status_before,
            evaluation_before,
            previous,
            applied,
        })
    }

    /// Undo a move, restoring the exact weight recorded in the receipt.
    ///
    /// Fails with [`EngineError::StaleReceipt`] when the relation has been
    /// voted on since the receipt was issued.
    pub fn revert_move(&mut self, receipt: &MoveReceipt) -> EngineResult<()> {
        let relation = self
            .graph
            .relation_mut(receipt.mv.kind, receipt.mv.key)
            .ok_or(EngineError::UnknownRelation {
                kind: receipt.mv.kind,
                key: receipt.mv.key,
            })?;
        if relation.weight != receipt.applied {
            return Err(EngineError::StaleReceipt {
                kind: receipt.mv.kind,
                key: receipt.mv.key,
            });
        }
        relation.weight = receipt.previous;

        self.rederive()?;
        self.target_sets = None;
        Ok(())
    }

    /// Apply a move, observe its effect, and revert it.
    pub fn simulate_move(
        &mut self,
        mv: Move,
        expertise: &BTreeSet<Topic>,
    ) -> EngineResult<MoveOutcome> {
        let receipt = self.cast_vote(mv, expertise)?;
        let outcome = MoveOutcome {
            status: self.status,
            evaluation: self.evaluation,
            impact: receipt.impact,
        };
        self.revert_move(&receipt)?;
        Ok(outcome)
    }

    /// The minimal target sets of the current board, computed on demand and
    /// cached until the next mutation.
    pub fn target_sets(&mut self) -> EngineResult<&[TargetSet]> {
        if self.target_sets.is_none() {
            self.target_sets = Some(targets::target_sets(&mut self.graph)?);
        }
        // The branch above guarantees the cache is filled.
        Ok(self.target_sets.as_deref().unwrap_or_default())
    }

    /// Restore every weight to its baseline and re-derive.
    pub fn reset(&mut self) -> EngineResult<()> {
        self.graph.reset_to_baseline();
        self.rederive()?;
        self.target_sets = None;
        info!(status = %self.status, "board_reset");
        Ok(())
    }

    fn rederive(&mut self) -> EngineResult<()> {
        self.evaluation = quad::evaluate(&mut self.graph)?;
        self.status = grounded::issue_status(&self.graph);
        Ok(())
    }
}
