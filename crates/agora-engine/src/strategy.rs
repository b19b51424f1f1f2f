//! Decision procedures agents play by.
//!
//! A strategy reads the acting agent's private beliefs and the shared board
//! and proposes the next move, or `None` to pass. Strategies never select a
//! relation the agent has already voted on; any simulation they do goes
//! through [`Gameboard::simulate_move`], which reverts before returning, so
//! the board is unchanged when `propose` comes back. Ties among equally good
//! candidates are broken through the injected random source, never an
//! ambient one.

use agora_core::{Move, Polarity, RelationKind};
use rand::{Rng, RngCore};
use tracing::debug;

use crate::agent::{classify_vote, Agent, VoteImpact};
use crate::board::Gameboard;
use crate::error::EngineResult;

/// Everything a strategy may look at (and, for simulation, temporarily
/// mutate) while deciding.
pub struct StrategyContext<'a> {
    /// The acting agent.
    pub agent: &'a mut Agent,
    /// The shared board. Strategies must leave it as they found it.
    pub board: &'a mut Gameboard,
    /// Tie-breaking randomness.
    pub rng: &'a mut dyn RngCore,
}

/// A pluggable decision procedure.
pub trait Strategy {
    /// Stable identifier for lookups and logs.
    fn id(&self) -> &'static str;

    /// Human-readable account of the procedure.
    fn description(&self) -> &'static str;

    /// Decide the agent's next move; `None` is a pass.
    fn propose(&self, ctx: &mut StrategyContext<'_>) -> EngineResult<Option<Move>>;
}

/// How target-set-driven strategies walk the enumerated sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSetOrdering {
    /// Enumeration order, as produced by the subset walk.
    Unordered,
    /// Ascending by set size, so cheaper cuts are considered first.
    #[default]
    BySize,
}

fn pick<T: Copy>(rng: &mut dyn RngCore, items: &[T]) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.random_range(0..items.len())])
    }
}

/// Uniformly picks any unplayed attack from the agent's beliefs.
#[derive(Debug, Default)]
pub struct NaiveRandom;

impl Strategy for NaiveRandom {
    fn id(&self) -> &'static str {
        "naive-random"
    }

    fn description(&self) -> &'static str {
        "vote truthfully on a uniformly random unplayed attack"
    }

    fn propose(&self, ctx: &mut StrategyContext<'_>) -> EngineResult<Option<Move>> {
        let candidates = ctx.agent.unplayed_attacks();
        Ok(pick(ctx.rng, &candidates)
            .and_then(|key| ctx.agent.truthful_move(RelationKind::Attack, key)))
    }
}

/// As [`NaiveRandom`], but only bothers to move while losing.
#[derive(Debug, Default)]
pub struct WinAwareRandom;

impl Strategy for WinAwareRandom {
    fn id(&self) -> &'static str {
        "win-aware-random"
    }

    fn description(&self) -> &'static str {
        "pass while winning, otherwise vote on a random unplayed attack"
    }

    fn propose(&self, ctx: &mut StrategyContext<'_>) -> EngineResult<Option<Move>> {
        if ctx.agent.is_winning(ctx.board) {
            return Ok(None);
        }
        NaiveRandom.propose(ctx)
    }
}

/// Simulates every unplayed attack and keeps only those that flip the
/// issue's grounded status.
#[derive(Debug, Default)]
pub struct IssueFlip;

impl Strategy for IssueFlip {
    fn id(&self) -> &'static str {
        "issue-flip"
    }

    fn description(&self) -> &'static str {
        "while losing, play a truthful attack vote that flips the issue status"
    }

    fn propose(&self, ctx: &mut StrategyContext<'_>) -> EngineResult<Option<Move>> {
        if ctx.agent.is_winning(ctx.board) {
            return Ok(None);
        }
        let current = ctx.board.status();
        let mut flippers = Vec::new();
        for key in ctx.agent.unplayed_attacks() {
            let Some(mv) = ctx.agent.truthful_move(RelationKind::Attack, key) else {
                continue;
            };
            let outcome = ctx.board.simulate_move(mv, &ctx.agent.expertise)?;
            if outcome.status != current {
                flippers.push(mv);
            }
        }
        debug!(agent = %ctx.agent.name, flippers = flippers.len(), "issue_flip_candidates");
        Ok(pick(ctx.rng, &flippers))
    }
}

/// How a truthful vote on a target-set attack would land.
struct TargetCandidate {
    mv: Move,
    impact: VoteImpact,
}

/// Walk the board's target sets and collect the attacks whose truthful vote
/// the `accept` predicate likes. Scanning stops before any set larger than
/// the first one that yielded a candidate.
fn scan_target_sets(
    ctx: &mut StrategyContext<'_>,
    ordering: TargetSetOrdering,
    accept: impl Fn(VoteImpact, bool, usize) -> bool,
) -> EngineResult<Vec<TargetCandidate>> {
    let mut sets = ctx.board.target_sets()?.to_vec();
    if ordering == TargetSetOrdering::BySize {
        sets.sort_by_key(|s| s.len());
    }

    let mut candidates: Vec<TargetCandidate> = Vec::new();
    let mut found_size = None;
    for set in &sets {
        if let Some(size) = found_size {
            if set.len() > size {
                break;
            }
        }
        for &key in &set.attacks {
            if ctx.agent.has_played(RelationKind::Attack, key) {
                continue;
            }
            if candidates.iter().any(|c| c.mv.key == key) {
                continue;
            }
            let Some(mv) = ctx.agent.truthful_move(RelationKind::Attack, key) else {
                continue;
            };
            let Some(relation) = ctx.board.graph().relation(RelationKind::Attack, key) else {
                continue;
            };
            let overlap = relation.topic_overlap(&ctx.agent.expertise);
            let disagrees = mv.polarity != Polarity::truthful(relation.weight.is_active());
            let impact = classify_vote(relation.weight, mv.polarity, overlap);
            if accept(impact, disagrees, overlap) {
                candidates.push(TargetCandidate { mv, impact });
                found_size = Some(set.len());
            }
        }
    }
    Ok(candidates)
}

fn pick_candidate(
    rng: &mut dyn RngCore,
    mut candidates: Vec<TargetCandidate>,
    prefer_flips: bool,
) -> Option<Move> {
    if prefer_flips && candidates.iter().any(|c| c.impact == VoteImpact::Flip) {
        candidates.retain(|c| c.impact == VoteImpact::Flip);
    }
    let moves: Vec<Move> = candidates.into_iter().map(|c| c.mv).collect();
    pick(rng, &moves)
}

/// Plays a target-set attack whose sign the agent can single-handedly flip.
#[derive(Debug, Default)]
pub struct TargetSetCut {
    /// How to walk the enumerated sets.
    pub ordering: TargetSetOrdering,
}

impl Strategy for TargetSetCut {
    fn id(&self) -> &'static str {
        "target-set-cut"
    }

    fn description(&self) -> &'static str {
        "while losing, flip a target-set attack within reach of one vote"
    }

    fn propose(&self, ctx: &mut StrategyContext<'_>) -> EngineResult<Option<Move>> {
        if ctx.agent.is_winning(ctx.board) {
            return Ok(None);
        }
        let candidates =
            scan_target_sets(ctx, self.ordering, |impact, _, _| impact == VoteImpact::Flip)?;
        Ok(pick_candidate(ctx.rng, candidates, false))
    }
}

/// As [`TargetSetCut`], but also settles for merely eroding an attack it
/// cannot yet flip.
#[derive(Debug, Default)]
pub struct TargetSetWeaken {
    /// How to walk the enumerated sets.
    pub ordering: TargetSetOrdering,
    /// Discard weaken-only candidates whenever a flip is available.
    pub prefer_flips: bool,
}

fn weaken_accept(impact: VoteImpact, disagrees: bool, overlap: usize) -> bool {
    impact == VoteImpact::Flip || (impact == VoteImpact::Weaken && disagrees && overlap > 0)
}

impl Strategy for TargetSetWeaken {
    fn id(&self) -> &'static str {
        "target-set-weaken"
    }

    fn description(&self) -> &'static str {
        "while losing, flip or at least erode a target-set attack"
    }

    fn propose(&self, ctx: &mut StrategyContext<'_>) -> EngineResult<Option<Move>> {
        if ctx.agent.is_winning(ctx.board) {
            return Ok(None);
        }
        let candidates = scan_target_sets(ctx, self.ordering, weaken_accept)?;
        Ok(pick_candidate(ctx.rng, candidates, self.prefer_flips))
    }
}

/// Attacks while losing, defends while winning.
///
/// Losing play is [`TargetSetWeaken`]; winning play reinforces a target-set
/// attack whose public sign already agrees with the agent's beliefs, making
/// it costlier for opponents to flip.
#[derive(Debug, Default)]
pub struct TargetSetWeakenReinforce {
    /// How to walk the enumerated sets.
    pub ordering: TargetSetOrdering,
    /// Discard weaken-only candidates whenever a flip is available.
    pub prefer_flips: bool,
}

impl Strategy for TargetSetWeakenReinforce {
    fn id(&self) -> &'static str {
        "target-set-weaken-reinforce"
    }

    fn description(&self) -> &'static str {
        "erode target-set attacks while losing, entrench them while winning"
    }

    fn propose(&self, ctx: &mut StrategyContext<'_>) -> EngineResult<Option<Move>> {
        if ctx.agent.is_winning(ctx.board) {
            let candidates = scan_target_sets(ctx, self.ordering, |impact, _, _| {
                impact == VoteImpact::Reinforce
            })?;
            return Ok(pick_candidate(ctx.rng, candidates, false));
        }
        let candidates = scan_target_sets(ctx, self.ordering, weaken_accept)?;
        Ok(pick_candidate(ctx.rng, candidates, self.prefer_flips))
    }
}

/// Steers the issue evaluation toward the extreme on the agent's side,
/// lying and concealing within budget.
#[derive(Debug, Default)]
pub struct NumericGoal;

impl Strategy for NumericGoal {
    fn id(&self) -> &'static str {
        "numeric-goal"
    }

    fn description(&self) -> &'static str {
        "assert the inactive relation that moves the evaluation furthest toward the agent's goal"
    }

    fn propose(&self, ctx: &mut StrategyContext<'_>) -> EngineResult<Option<Move>> {
        let current_eval = ctx.board.evaluation();
        let wished = ctx.agent.wished_evaluation();

        // Candidate moves assert a relation currently off the shared board.
        // Asserting one the agent privately retracts is a lie and needs
        // budget; simulated no-ops are dropped as neutral.
        let mut candidates: Vec<(Move, bool, f64)> = Vec::new();
        for (kind, key) in ctx.agent.unplayed_relations() {
            let Some(relation) = ctx.board.graph().relation(kind, key) else {
                continue;
            };
            if relation.weight.is_active() {
                continue;
            }
            let Some(truthful_mv) = ctx.agent.truthful_move(kind, key) else {
                continue;
            };
            let truthful = truthful_mv.polarity == Polarity::Positive;
            if !truthful && !ctx.agent.can_lie() {
                continue;
            }
            let mv = if truthful {
                truthful_mv
            } else {
                let Some(lie) = ctx.agent.lying_move(kind, key) else {
                    continue;
                };
                lie
            };
            let outcome = ctx.board.simulate_move(mv, &ctx.agent.expertise)?;
            if outcome.evaluation == current_eval {
                continue;
            }
            candidates.push((mv, truthful, outcome.evaluation));
        }

        if candidates.is_empty() {
            ctx.agent.stats.honest_passes += 1;
            return Ok(None);
        }

        let best = candidates
            .iter()
            .min_by(|a, b| (a.2 - wished).abs().total_cmp(&(b.2 - wished).abs()))
            .copied();
        let Some((best_mv, _, best_eval)) = best else {
            return Ok(None);
        };

        if (best_eval - wished).abs() >= (current_eval - wished).abs() {
            // Every effective move hurts; a truthful one can be concealed
            // within budget or, failing that, must be played openly. An
            // all-lie candidate list is passed on honestly.
            let truthful_mv = candidates.iter().find(|(_, truthful, _)| *truthful);
            return match truthful_mv {
                Some((mv, _, _)) => {
                    if ctx.agent.can_conceal() {
                        ctx.agent.record_conceal();
                        debug!(agent = %ctx.agent.name, "numeric_goal_conceal");
                        Ok(None)
                    } else {
                        Ok(Some(*mv))
                    }
                }
                None => {
                    ctx.agent.stats.honest_passes += 1;
                    Ok(None)
                }
            };
        }

        debug!(
            agent = %ctx.agent.name,
            best_eval,
            wished,
            "numeric_goal_move"
        );
        Ok(Some(best_mv))
    }
}

/// Lookup table of the built-in strategies.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Add a strategy.
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    /// Find a strategy by id.
    pub fn get(&self, id: &str) -> Option<&dyn Strategy> {
        self.strategies
            .iter()
            .find(|s| s.id() == id)
            .map(|s| s.as_ref())
    }

    /// Ids of every registered strategy, in registration order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.id()).collect()
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    /// All seven built-in strategies, simplest first.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NaiveRandom));
        registry.register(Box::new(WinAwareRandom));
        registry.register(Box::new(IssueFlip));
        registry.register(Box::new(TargetSetCut::default()));
        registry.register(Box::new(TargetSetWeaken {
            ordering: TargetSetOrdering::BySize,
            prefer_flips: true,
        }));
        registry.register(Box::new(TargetSetWeakenReinforce {
            ordering: TargetSetOrdering::BySize,
            prefer_flips: true,
        }));
        registry.register(Box::new(NumericGoal));
        registry
    }
}
