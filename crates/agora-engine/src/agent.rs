//! Debate participants.
//!
//! An agent carries a private belief graph over the same arguments and
//! relations as the public board, an expertise set that scales its votes, and
//! budgets limiting dishonest play. Its team is not declared but derived:
//! whatever the grounded semantics of its own beliefs says about the issue.

use std::collections::BTreeSet;
use std::fmt;

use agora_core::{
    ArgumentGraph, Move, Polarity, RelationKey, RelationKind, Topic, Weight,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Gameboard;
use crate::error::{EngineError, EngineResult};
use crate::grounded::{self, IssueStatus};
use crate::quad;

/// Side of the debate, derived from the agent's beliefs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    /// Believes the issue holds.
    Pro,
    /// Believes the issue fails.
    Con,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Pro => write!(f, "pro"),
            Team::Con => write!(f, "con"),
        }
    }
}

/// What a prospective vote would do to a relation's activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteImpact {
    /// Pushes the balance further into its current state.
    Reinforce,
    /// Erodes the balance without crossing zero (or has no effect at all).
    Weaken,
    /// Crosses zero: the relation's activation toggles.
    Flip,
}

/// Classify the effect a vote of the given polarity and impact would have on
/// a relation currently holding `weight`.
///
/// An asserted balance `m` flips under a negative vote of impact `i` when
/// `i >= m` (the new balance `m - i` is no longer positive); a retracted
/// balance `d` flips under a positive vote only when `i > d`. Fixed weights
/// and zero-impact votes never change anything.
pub fn classify_vote(weight: Weight, polarity: Polarity, impact: usize) -> VoteImpact {
    if impact == 0 {
        return VoteImpact::Weaken;
    }
    let impact = impact as f64;
    match (weight, polarity) {
        (Weight::Fixed, _) => VoteImpact::Weaken,
        (Weight::Asserted(_), Polarity::Positive) => VoteImpact::Reinforce,
        (Weight::Retracted(_), Polarity::Negative) => VoteImpact::Reinforce,
        (Weight::Asserted(m), Polarity::Negative) => {
            if impact >= m {
                VoteImpact::Flip
            } else {
                VoteImpact::Weaken
            }
        }
        (Weight::Retracted(d), Polarity::Positive) => {
            if impact > d {
                VoteImpact::Flip
            } else {
                VoteImpact::Weaken
            }
        }
    }
}

/// Per-agent tally of how it has played, kept as raw counters for external
/// profiling.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MoveStats {
    /// Non-pass moves played.
    pub moves_played: u32,
    /// Moves voted with the agent's true polarity.
    pub truthful_moves: u32,
    /// Moves voted against the agent's true polarity.
    pub lies: u32,
    /// Passes with nothing worth playing.
    pub honest_passes: u32,
    /// Passes concealing a playable truthful move.
    pub dishonest_passes: u32,
    /// Moves that brought the issue evaluation closer to the wished extreme.
    pub moves_toward_goal: u32,
    /// Moves that pushed it away.
    pub moves_against_goal: u32,
    /// Signed issue-evaluation change of each played move, in play order.
    pub evaluation_deltas: Vec<f64>,
}

/// A debate participant.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Display name, used in logs and summaries.
    pub name: String,
    /// Topics this agent is knowledgeable about.
    pub expertise: BTreeSet<Topic>,
    /// Running tally of played moves.
    pub stats: MoveStats,
    belief: ArgumentGraph,
    team: Team,
    belief_evaluation: f64,
    played: BTreeSet<(RelationKind, RelationKey)>,
    lie_budget: u32,
    lies_used: u32,
    conceal_budget: u32,
    conceals_used: u32,
}

impl Agent {
    /// Create an agent from its beliefs.
    ///
    /// The belief graph is evaluated once up front; its grounded status on
    /// the issue decides the team, and its numeric evaluation becomes the
    /// goal value strategies steer the public board towards.
    pub fn new(
        name: impl Into<String>,
        expertise: BTreeSet<Topic>,
        mut belief: ArgumentGraph,
        lie_budget: u32,
        conceal_budget: u32,
    ) -> EngineResult<Self> {
        let belief_evaluation = quad::evaluate(&mut belief)?;
        let team = match grounded::issue_status(&belief) {
            IssueStatus::In => Team::Pro,
            IssueStatus::Out => Team::Con,
        };
        let name = name.into();
        debug!(agent = %name, %team, belief_evaluation, "agent_created");
        Ok(Self {
            name,
            expertise,
            stats: MoveStats::default(),
            belief,
            team,
            belief_evaluation,
            played: BTreeSet::new(),
            lie_budget,
            lies_used: 0,
            conceal_budget,
            conceals_used: 0,
        })
    }

    /// The side this agent's beliefs put it on.
    pub fn team(&self) -> Team {
        self.team
    }

    /// The agent's private graph.
    pub fn belief(&self) -> &ArgumentGraph {
        &self.belief
    }

    /// Numeric evaluation of the issue under the agent's beliefs.
    pub fn belief_evaluation(&self) -> f64 {
        self.belief_evaluation
    }

    /// The issue evaluation this agent would like the board to reach: the
    /// extreme on its own side of the midpoint.
    pub fn wished_evaluation(&self) -> f64 {
        if self.belief_evaluation >= 0.5 {
            1.0
        } else {
            0.0
        }
    }

    /// Whether the board currently agrees with this agent about the issue.
    pub fn is_winning(&self, board: &Gameboard) -> bool {
        match self.team {
            Team::Pro => board.status().is_in(),
            Team::Con => !board.status().is_in(),
        }
    }

    /// Classify what this agent's truthful vote would do to a relation on the
    /// public board.
    pub fn classify_impact(
        &self,
        board: &Gameboard,
        kind: RelationKind,
        key: RelationKey,
    ) -> EngineResult<VoteImpact> {
        let mv = self
            .truthful_move(kind, key)
            .ok_or(EngineError::UnknownRelation { kind, key })?;
        let relation = board
            .graph()
            .relation(kind, key)
            .ok_or(EngineError::UnknownRelation { kind, key })?;
        let impact = relation.topic_overlap(&self.expertise);
        Ok(classify_vote(relation.weight, mv.polarity, impact))
    }

    /// Whether this agent has already voted on the given relation.
    pub fn has_played(&self, kind: RelationKind, key: RelationKey) -> bool {
        self.played.contains(&(kind, key))
    }

    /// Record a vote on a relation; each agent votes on a relation at most
    /// once per debate.
    pub fn mark_played(&mut self, kind: RelationKind, key: RelationKey) {
        self.played.insert((kind, key));
    }

    /// Relations from the belief graph this agent has not voted on yet, in
    /// graph order, attacks first. Fixed relations are skipped; votes cannot
    /// move them.
    pub fn unplayed_relations(&self) -> Vec<(RelationKind, RelationKey)> {
        let attacks = self
            .belief
            .attacks
            .iter()
            .map(|r| (RelationKind::Attack, r));
        let supports = self
            .belief
            .supports
            .iter()
            .map(|r| (RelationKind::Support, r));
        attacks
            .chain(supports)
            .filter(|(_, r)| !r.weight.is_fixed())
            .map(|(kind, r)| (kind, r.key))
            .filter(|(kind, key)| !self.has_played(*kind, *key))
            .collect()
    }

    /// Attacks from the belief graph this agent has not voted on yet.
    pub fn unplayed_attacks(&self) -> Vec<RelationKey> {
        self.belief
            .attacks
            .iter()
            .filter(|r| !r.weight.is_fixed())
            .map(|r| r.key)
            .filter(|key| !self.has_played(RelationKind::Attack, *key))
            .collect()
    }

    /// The move this agent honestly believes in for the given relation:
    /// a positive vote if the relation is active in its beliefs, negative
    /// otherwise. `None` when the beliefs do not contain the relation.
    pub fn truthful_move(&self, kind: RelationKind, key: RelationKey) -> Option<Move> {
        let relation = self.belief.relation(kind, key)?;
        Some(Move {
            kind,
            key,
            polarity: Polarity::truthful(relation.weight.is_active()),
        })
    }

    /// The inverse of [`Agent::truthful_move`]; playing it is a lie.
    pub fn lying_move(&self, kind: RelationKind, key: RelationKey) -> Option<Move> {
        let relation = self.belief.relation(kind, key)?;
        Some(Move {
            kind,
            key,
            polarity: Polarity::truthful(!relation.weight.is_active()),
        })
    }

    /// Whether the agent may still lie within its budget.
    pub fn can_lie(&self) -> bool {
        self.lies_used < self.lie_budget
    }

    /// Whether the agent may still conceal a playable move within its budget.
    pub fn can_conceal(&self) -> bool {
        self.conceals_used < self.conceal_budget
    }

    /// Record a played move and its observed effect on the issue evaluation.
    pub fn record_move(&mut self, truthful: bool, evaluation_delta: f64, toward_goal: bool) {
        self.stats.moves_played += 1;
        if truthful {
            self.stats.truthful_moves += 1;
        } else {
            self.record_lie();
        }
        if toward_goal {
            self.stats.moves_toward_goal += 1;
        } else {
            self.stats.moves_against_goal += 1;
        }
        self.stats.evaluation_deltas.push(evaluation_delta);
    }

    /// Spend one unit of the lie budget.
    pub fn record_lie(&mut self) {
        self.lies_used += 1;
        self.stats.lies += 1;
    }

    /// Spend one unit of the conceal budget.
    pub fn record_conceal(&mut self) {
        self.conceals_used += 1;
        self.stats.dishonest_passes += 1;
    }

    /// Lies played so far.
    pub fn lies_used(&self) -> u32 {
        self.lies_used
    }

    /// Dishonest passes played so far.
    pub fn conceals_used(&self) -> u32 {
        self.conceals_used
    }

    /// Forget all per-debate state: played relations, budgets spent, stats.
    pub fn reset(&mut self) {
        self.played.clear();
        self.lies_used = 0;
        self.conceals_used = 0;
        self.stats = MoveStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(names: &[&str]) -> BTreeSet<Topic> {
        names.iter().map(|t| t.to_string()).collect()
    }

    fn belief_graph(attack_active: bool) -> ArgumentGraph {
        let mut g = ArgumentGraph::new();
        let issue = g.add_argument(Weight::Fixed, topics(&["economy"]));
        let a1 = g.add_argument(Weight::Fixed, topics(&["law"]));
        let weight = if attack_active {
            Weight::Asserted(0.0)
        } else {
            Weight::Retracted(0.0)
        };
        g.add_attack(a1, issue, weight).unwrap();
        g
    }

    #[test]
    fn test_team_follows_belief_status() {
        let con = Agent::new("c", topics(&["law"]), belief_graph(true), 0, 0).unwrap();
        assert_eq!(con.team(), Team::Con);

        let pro = Agent::new("p", topics(&["law"]), belief_graph(false), 0, 0).unwrap();
        assert_eq!(pro.team(), Team::Pro);
    }

    #[test]
    fn test_truthful_and_lying_moves_are_opposites() {
        let agent = Agent::new("a", topics(&["law"]), belief_graph(true), 1, 0).unwrap();
        let key = agent.belief().attacks[0].key;
        let truth = agent.truthful_move(RelationKind::Attack, key).unwrap();
        let lie = agent.lying_move(RelationKind::Attack, key).unwrap();
        assert_eq!(truth.polarity, Polarity::Positive);
        assert_eq!(lie.polarity, Polarity::Negative);
    }

    #[test]
    fn test_budgets_deplete() {
        let mut agent = Agent::new("a", topics(&[]), belief_graph(true), 1, 1).unwrap();
        assert!(agent.can_lie());
        agent.record_lie();
        assert!(!agent.can_lie());

        assert!(agent.can_conceal());
        agent.record_conceal();
        assert!(!agent.can_conceal());
        assert_eq!(agent.stats.lies, 1);
        assert_eq!(agent.stats.dishonest_passes, 1);
    }

    #[test]
    fn test_played_relations_are_excluded() {
        let mut agent = Agent::new("a", topics(&[]), belief_graph(true), 0, 0).unwrap();
        assert_eq!(agent.unplayed_relations().len(), 1);
        let (kind, key) = agent.unplayed_relations()[0];
        agent.mark_played(kind, key);
        assert!(agent.unplayed_relations().is_empty());
    }

    #[test]
    fn test_classify_vote_thresholds() {
        use VoteImpact::*;

        // Zero impact never changes anything.
        assert_eq!(classify_vote(Weight::Asserted(3.0), Polarity::Negative, 0), Weaken);
        // Votes along the current state reinforce it.
        assert_eq!(classify_vote(Weight::Asserted(3.0), Polarity::Positive, 2), Reinforce);
        assert_eq!(classify_vote(Weight::Retracted(3.0), Polarity::Negative, 2), Reinforce);
        // An asserted balance flips at impact == balance …
        assert_eq!(classify_vote(Weight::Asserted(3.0), Polarity::Negative, 2), Weaken);
        assert_eq!(classify_vote(Weight::Asserted(3.0), Polarity::Negative, 3), Flip);
        // … while a retracted balance needs strictly more.
        assert_eq!(classify_vote(Weight::Retracted(3.0), Polarity::Positive, 3), Weaken);
        assert_eq!(classify_vote(Weight::Retracted(3.0), Polarity::Positive, 4), Flip);
        // Fixed weights ignore votes entirely.
        assert_eq!(classify_vote(Weight::Fixed, Polarity::Negative, 9), Weaken);
    }

    #[test]
    fn test_wished_evaluation_is_the_nearer_extreme() {
        let con = Agent::new("c", topics(&[]), belief_graph(true), 0, 0).unwrap();
        // Belief evaluation 0.25 (active attack): wishes the issue to zero.
        assert_eq!(con.wished_evaluation(), 0.0);

        let pro = Agent::new("p", topics(&[]), belief_graph(false), 0, 0).unwrap();
        assert_eq!(pro.wished_evaluation(), 1.0);
    }
}
