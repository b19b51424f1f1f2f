//! Core domain types shared across the Agora workspace.
//!
//! A debate is fought over a mutable graph of arguments connected by weighted
//! attack and support relations. This crate holds the leaf model: identifiers,
//! the explicit tri-state [`Weight`], arguments, relations, moves, and the raw
//! [`ArgumentGraph`] aggregate. All acceptability semantics (grounded status,
//! numeric evaluation, target sets) live in `agora-engine`.

use std::collections::BTreeSet;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A topic label attached to arguments, relations, and agent expertise.
pub type Topic = String;

/// Identifier for arguments within an [`ArgumentGraph`].
///
/// Identifiers are dense: the n-th argument added to a graph gets id `n`.
/// Argument `0` is, by convention, the issue the debate is about.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArgumentId(pub u32);

impl ArgumentId {
    /// The distinguished issue argument.
    pub const ISSUE: ArgumentId = ArgumentId(0);

    /// Position of this argument in the graph's argument list.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArgumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Errors raised while building or mutating the raw graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A relation endpoint references an argument the graph does not contain.
    #[error("unknown argument: {0}")]
    UnknownArgument(ArgumentId),

    /// Arguments cannot attack or support themselves.
    #[error("self-relation on argument {0}")]
    SelfRelation(ArgumentId),

    /// A relation with the same endpoints already exists in this collection.
    #[error("duplicate {kind} relation {key}")]
    DuplicateRelation { kind: RelationKind, key: RelationKey },

    /// Fixed weights cannot change sign.
    #[error("cannot flip the sign of a fixed weight")]
    FixedFlip,
}

/// Tri-state weight of an argument or relation.
///
/// Replaces the usual single-float encoding (huge sentinel = fixed, sign =
/// asserted/retracted) with an explicit tag plus magnitude. Whether an element
/// currently counts in the semantics is decided by the *tag*, so
/// `Asserted(0.0)` ("on the board, zero net votes") and `Retracted(0.0)`
/// ("off the board, zero net votes") are distinct, representable states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Weight {
    /// Immutable element; always active, never voted on.
    Fixed,
    /// Currently on the board, with the accumulated vote mass in its favor.
    Asserted(f64),
    /// Currently off the board, with the accumulated vote mass against it.
    Retracted(f64),
}

impl Weight {
    /// Whether this element currently counts in the semantics.
    pub fn is_active(&self) -> bool {
        matches!(self, Weight::Fixed | Weight::Asserted(_))
    }

    /// Whether this element can ever change state.
    pub fn is_fixed(&self) -> bool {
        matches!(self, Weight::Fixed)
    }

    /// Signed vote balance: `Asserted(m)` ⇒ `+m`, `Retracted(d)` ⇒ `-d`.
    ///
    /// Returns `None` for fixed weights, which have no finite balance.
    pub fn signed_balance(&self) -> Option<f64> {
        match self {
            Weight::Fixed => None,
            Weight::Asserted(m) => Some(*m),
            Weight::Retracted(d) => Some(-d),
        }
    }

    /// Accumulate a signed vote. A positive balance classifies as asserted,
    /// anything else as retracted. Fixed weights ignore votes.
    pub fn vote(&mut self, delta: f64) {
        if delta == 0.0 {
            return;
        }
        if let Some(balance) = self.signed_balance() {
            let new = balance + delta;
            *self = if new > 0.0 {
                Weight::Asserted(new)
            } else {
                Weight::Retracted(-new)
            };
        }
    }

    /// Swap asserted/retracted while preserving the magnitude.
    ///
    /// This is the primitive behind target-set search: it toggles whether the
    /// element counts, without forgetting its vote mass.
    pub fn flip(&mut self) -> Result<(), GraphError> {
        *self = match *self {
            Weight::Fixed => return Err(GraphError::FixedFlip),
            Weight::Asserted(m) => Weight::Retracted(m),
            Weight::Retracted(d) => Weight::Asserted(d),
        };
        Ok(())
    }

    /// The pre-debate state this weight resets to: fixed stays fixed, mutable
    /// elements keep their tag but drop all accumulated votes.
    pub fn baseline(&self) -> Weight {
        match self {
            Weight::Fixed => Weight::Fixed,
            Weight::Asserted(_) => Weight::Asserted(0.0),
            Weight::Retracted(_) => Weight::Retracted(0.0),
        }
    }
}

/// A node in the debate graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argument {
    /// Unique identifier; `ArgumentId::ISSUE` is the debate's issue.
    pub id: ArgumentId,
    /// Current weight classification.
    pub weight: Weight,
    /// Baseline the weight returns to between debates.
    pub baseline: Weight,
    /// Topics this argument refers to.
    pub topics: BTreeSet<Topic>,
    /// Numeric evaluation in `[0, 1]`, or `None` when not yet evaluated.
    pub eval: Option<f64>,
}

/// The two kinds of directed relation between arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// The source argument attacks the target.
    Attack,
    /// The source argument supports the target.
    Support,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Attack => write!(f, "attack"),
            RelationKind::Support => write!(f, "support"),
        }
    }
}

/// Identity of a relation: the ordered pair of its endpoints.
///
/// Weight is mutable state and deliberately not part of the identity, so a
/// key taken from an agent's private graph addresses the same relation on the
/// shared board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationKey {
    /// Originating argument.
    pub source: ArgumentId,
    /// Argument being attacked or supported.
    pub target: ArgumentId,
}

impl RelationKey {
    /// Create a key for the `source -> target` pair.
    pub fn new(source: ArgumentId, target: ArgumentId) -> Self {
        Self { source, target }
    }
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} -> {})", self.source, self.target)
    }
}

/// A directed, weighted edge between two arguments.
///
/// Attacks and supports share this structure; the collection a relation is
/// stored in determines its kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Endpoint pair; the relation's identity.
    pub key: RelationKey,
    /// Current weight, accumulated additively as votes are cast.
    pub weight: Weight,
    /// Baseline the weight returns to between debates.
    pub baseline: Weight,
    /// Union of the endpoint arguments' topic sets.
    pub topics: BTreeSet<Topic>,
}

impl Relation {
    /// Number of topics shared between this relation and the given expertise.
    ///
    /// This is the impact a vote by an agent with that expertise would carry.
    pub fn topic_overlap(&self, expertise: &BTreeSet<Topic>) -> usize {
        expertise.iter().filter(|t| self.topics.contains(*t)).count()
    }
}

/// Direction of a vote on a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Vote in favor of the relation.
    Positive,
    /// Vote against the relation.
    Negative,
}

impl Polarity {
    /// The truthful polarity for an agent whose private copy of the relation
    /// is (in)active.
    pub fn truthful(belief_active: bool) -> Self {
        if belief_active {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }

    /// `+1.0` or `-1.0`.
    pub fn sign(&self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

/// A signed vote on one attack or support relation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Whether the vote lands on an attack or a support.
    pub kind: RelationKind,
    /// The relation being voted on.
    pub key: RelationKey,
    /// Vote direction.
    pub polarity: Polarity,
}

/// The raw mutable debate graph: ordered arguments, attacks, and supports.
///
/// Arguments and relations are created once; only their weights and
/// evaluations mutate afterwards. Everything status-related (grounded
/// extension, numeric evaluation, target sets) is computed by the engine crate
/// on top of this structure.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ArgumentGraph {
    /// All arguments, in creation order; `arguments[i].id == ArgumentId(i)`.
    pub arguments: Vec<Argument>,
    /// All attack relations, in creation order.
    pub attacks: Vec<Relation>,
    /// All support relations, in creation order.
    pub supports: Vec<Relation>,
}

impl ArgumentGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument and return its id. The first argument added is the
    /// issue.
    pub fn add_argument(
        &mut self,
        weight: Weight,
        topics: impl IntoIterator<Item = Topic>,
    ) -> ArgumentId {
        let id = ArgumentId(self.arguments.len() as u32);
        self.arguments.push(Argument {
            id,
            weight,
            baseline: weight.baseline(),
            topics: topics.into_iter().collect(),
            eval: None,
        });
        id
    }

    /// Add an attack from `source` to `target` with the given initial weight.
    pub fn add_attack(
        &mut self,
        source: ArgumentId,
        target: ArgumentId,
        weight: Weight,
    ) -> Result<RelationKey, GraphError> {
        self.add_relation(RelationKind::Attack, source, target, weight)
    }

    /// Add a support from `source` to `target` with the given initial weight.
    pub fn add_support(
        &mut self,
        source: ArgumentId,
        target: ArgumentId,
        weight: Weight,
    ) -> Result<RelationKey, GraphError> {
        self.add_relation(RelationKind::Support, source, target, weight)
    }

    fn add_relation(
        &mut self,
        kind: RelationKind,
        source: ArgumentId,
        target: ArgumentId,
        weight: Weight,
    ) -> Result<RelationKey, GraphError> {
        if source == target {
            return Err(GraphError::SelfRelation(source));
        }
        let key = RelationKey::new(source, target);
        if self.relation(kind, key).is_some() {
            return Err(GraphError::DuplicateRelation { kind, key });
        }
        let src = self
            .argument(source)
            .ok_or(GraphError::UnknownArgument(source))?;
        let tgt = self
            .argument(target)
            .ok_or(GraphError::UnknownArgument(target))?;
        let topics: BTreeSet<Topic> = src.topics.union(&tgt.topics).cloned().collect();
        let relation = Relation {
            key,
            weight,
            baseline: weight.baseline(),
            topics,
        };
        match kind {
            RelationKind::Attack => self.attacks.push(relation),
            RelationKind::Support => self.supports.push(relation),
        }
        Ok(key)
    }

    /// Look up an argument by id.
    pub fn argument(&self, id: ArgumentId) -> Option<&Argument> {
        self.arguments.get(id.index())
    }

    /// Look up an argument by id, mutably.
    pub fn argument_mut(&mut self, id: ArgumentId) -> Option<&mut Argument> {
        self.arguments.get_mut(id.index())
    }

    /// The evaluation of the issue, if derived.
    pub fn issue_eval(&self) -> Option<f64> {
        self.argument(ArgumentId::ISSUE).and_then(|a| a.eval)
    }

    fn relations(&self, kind: RelationKind) -> &[Relation] {
        match kind {
            RelationKind::Attack => &self.attacks,
            RelationKind::Support => &self.supports,
        }
    }

    /// Find a relation of the given kind by its endpoint pair.
    pub fn relation(&self, kind: RelationKind, key: RelationKey) -> Option<&Relation> {
        self.relations(kind).iter().find(|r| r.key == key)
    }

    /// Find a relation of the given kind by its endpoint pair, mutably.
    pub fn relation_mut(&mut self, kind: RelationKind, key: RelationKey) -> Option<&mut Relation> {
        let rels = match kind {
            RelationKind::Attack => &mut self.attacks,
            RelationKind::Support => &mut self.supports,
        };
        rels.iter_mut().find(|r| r.key == key)
    }

    /// Indices (into `attacks`) of the attacks that are not fixed.
    ///
    /// This is the subset target-set search operates on; keeping it small is
    /// what bounds that search.
    pub fn modifiable_attack_indices(&self) -> Vec<usize> {
        self.attacks
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.weight.is_fixed())
            .map(|(i, _)| i)
            .collect()
    }

    /// Restore every weight to its baseline and clear all evaluations.
    ///
    /// Used between independent debates over the same scenario.
    pub fn reset_to_baseline(&mut self) {
        for arg in &mut self.arguments {
            arg.weight = arg.baseline;
            arg.eval = None;
        }
        for rel in self.attacks.iter_mut().chain(self.supports.iter_mut()) {
            rel.weight = rel.baseline;
        }
    }

    /// Number of arguments.
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// Total number of relations (attacks plus supports).
    pub fn relation_count(&self) -> usize {
        self.attacks.len() + self.supports.len()
    }

    /// Build a petgraph view restricted to the currently active relations.
    ///
    /// Node `i` of the returned graph corresponds to `arguments[i]`; edges are
    /// labeled with their kind. Inactive relations are omitted entirely, so
    /// cycles among retracted relations do not show up here.
    pub fn active_digraph(&self) -> DiGraph<ArgumentId, RelationKind> {
        let mut graph = DiGraph::with_capacity(self.arguments.len(), self.relation_count());
        for arg in &self.arguments {
            graph.add_node(arg.id);
        }
        for (kind, rels) in [
            (RelationKind::Attack, &self.attacks),
            (RelationKind::Support, &self.supports),
        ] {
            for rel in rels.iter().filter(|r| r.weight.is_active()) {
                graph.add_edge(
                    NodeIndex::new(rel.key.source.index()),
                    NodeIndex::new(rel.key.target.index()),
                    kind,
                );
            }
        }
        graph
    }
}
