//! Integration tests for agora-engine using isolated scenario builders.

use std::collections::BTreeSet;

use agora_core::{
    ArgumentGraph, ArgumentId, Move, Polarity, RelationKey, RelationKind, Topic, Weight,
};
use agora_engine::{
    grounded_extension, issue_status, Agent, Debate, DebateConfig, EngineError, Gameboard,
    IssueFlip, IssueStatus, NumericGoal, StrategyRegistry, TargetSetWeakenReinforce, WinAwareRandom,
};

// ============================================================================
// Scenario Builders (isolated, no filesystem)
// ============================================================================

/// Builder for debate scenarios: a public graph plus per-agent belief
/// overrides on relation weights.
#[derive(Default)]
struct ScenarioBuilder {
    arguments: Vec<BTreeSet<Topic>>,
    attacks: Vec<(usize, usize, Weight)>,
    supports: Vec<(usize, usize, Weight)>,
}

impl ScenarioBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn argument(mut self, topics: &[&str]) -> Self {
        self.arguments
            .push(topics.iter().map(|t| t.to_string()).collect());
        self
    }

    fn attack(mut self, source: usize, target: usize, weight: Weight) -> Self {
        self.attacks.push((source, target, weight));
        self
    }

    fn support(mut self, source: usize, target: usize, weight: Weight) -> Self {
        self.supports.push((source, target, weight));
        self
    }

    /// Materialize the graph, optionally overriding relation weights by
    /// `(kind, source, target)` for an agent's private view.
    fn build_with(&self, overrides: &[(RelationKind, usize, usize, Weight)]) -> ArgumentGraph {
        let mut graph = ArgumentGraph::new();
        for topics in &self.arguments {
            graph.add_argument(Weight::Fixed, topics.iter().cloned());
        }
        let lookup = |kind: RelationKind, s: usize, t: usize, base: Weight| {
            overrides
                .iter()
                .find(|(k, os, ot, _)| *k == kind && *os == s && *ot == t)
                .map(|(_, _, _, w)| *w)
                .unwrap_or(base)
        };
        for &(s, t, w) in &self.attacks {
            let weight = lookup(RelationKind::Attack, s, t, w);
            graph
                .add_attack(ArgumentId(s as u32), ArgumentId(t as u32), weight)
                .expect("valid attack");
        }
        for &(s, t, w) in &self.supports {
            let weight = lookup(RelationKind::Support, s, t, w);
            graph
                .add_support(ArgumentId(s as u32), ArgumentId(t as u32), weight)
                .expect("valid support");
        }
        graph
    }

    fn build(&self) -> ArgumentGraph {
        self.build_with(&[])
    }
}

fn topics(names: &[&str]) -> BTreeSet<Topic> {
    names.iter().map(|t| t.to_string()).collect()
}

fn key(s: u32, t: u32) -> RelationKey {
    RelationKey::new(ArgumentId(s), ArgumentId(t))
}

/// The three-argument chain scenario: attack 1 -> 0 and attack 2 -> 1, both
/// active; topics chosen so every expertise overlap is 1.
fn chain_scenario() -> ScenarioBuilder {
    ScenarioBuilder::new()
        .argument(&["economy"])
        .argument(&["law"])
        .argument(&["law"])
        .attack(1, 0, Weight::Asserted(0.0))
        .attack(2, 1, Weight::Asserted(0.0))
}

/// A wider board with five arguments, four modifiable attacks, and a fixed
/// support, giving the target-set walk something non-trivial to chew on.
fn wide_scenario() -> ScenarioBuilder {
    ScenarioBuilder::new()
        .argument(&["economy", "law"])
        .argument(&["law"])
        .argument(&["economy"])
        .argument(&["law", "health"])
        .argument(&["health"])
        .attack(1, 0, Weight::Asserted(0.0))
        .attack(2, 0, Weight::Asserted(0.0))
        .attack(3, 1, Weight::Retracted(0.0))
        .attack(4, 2, Weight::Retracted(0.0))
        .support(4, 0, Weight::Fixed)
}

// ============================================================================
// Grounded semantics and evaluation
// ============================================================================

#[test]
fn test_chain_scenario_grounded_extension() {
    let graph = chain_scenario().build();
    let extension = grounded_extension(&graph);
    assert_eq!(extension, vec![ArgumentId(0), ArgumentId(2)]);
    assert_eq!(issue_status(&graph), IssueStatus::In);
}

#[test]
fn test_chain_scenario_flip_changes_status() {
    let mut graph = chain_scenario().build();
    graph
        .relation_mut(RelationKind::Attack, key(2, 1))
        .unwrap()
        .weight
        .flip()
        .unwrap();
    // The issue is defeated by the now-undefended argument 1; the unattacked
    // argument 2 stays grounded even though its attack is retracted.
    assert_eq!(
        grounded_extension(&graph),
        vec![ArgumentId(1), ArgumentId(2)]
    );
    assert_eq!(issue_status(&graph), IssueStatus::Out);
}

#[test]
fn test_grounded_status_is_deterministic() {
    let graph = wide_scenario().build();
    let first = grounded_extension(&graph);
    let second = grounded_extension(&graph);
    assert_eq!(first, second);
}

#[test]
fn test_evaluation_stays_in_unit_interval() {
    let mut graph = wide_scenario().build();
    agora_engine::evaluate(&mut graph).unwrap();
    for argument in &graph.arguments {
        let eval = argument.eval.unwrap();
        assert!((0.0..=1.0).contains(&eval), "eval {eval} out of range");
    }
}

#[test]
fn test_cyclic_board_is_rejected() {
    let graph = ScenarioBuilder::new()
        .argument(&["economy"])
        .argument(&["law"])
        .attack(1, 0, Weight::Asserted(0.0))
        .attack(0, 1, Weight::Asserted(0.0))
        .build();
    assert!(matches!(
        Gameboard::new(graph),
        Err(EngineError::EvaluationCycle { .. })
    ));
}

// ============================================================================
// Target sets
// ============================================================================

#[test]
fn test_chain_scenario_has_one_target_set() {
    let mut board = Gameboard::new(chain_scenario().build()).unwrap();
    let sets = board.target_sets().unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].attacks, vec![key(2, 1)]);
}

#[test]
fn test_target_sets_are_pairwise_incomparable() {
    let mut board = Gameboard::new(wide_scenario().build()).unwrap();
    let sets = board.target_sets().unwrap().to_vec();
    assert!(!sets.is_empty());
    for (i, a) in sets.iter().enumerate() {
        for (j, b) in sets.iter().enumerate() {
            if i == j {
                continue;
            }
            let a_keys: BTreeSet<_> = a.attacks.iter().collect();
            let b_keys: BTreeSet<_> = b.attacks.iter().collect();
            assert!(
                !a_keys.is_subset(&b_keys),
                "target set {i} is contained in {j}"
            );
        }
    }
}

#[test]
fn test_target_sets_are_sound_and_minimal() -> anyhow::Result<()> {
    let mut graph = wide_scenario().build();
    let baseline = issue_status(&graph);
    let sets = {
        let mut board = Gameboard::new(graph.clone())?;
        board.target_sets()?.to_vec()
    };
    assert!(!sets.is_empty());

    let flip_all = |graph: &mut ArgumentGraph, keys: &[RelationKey]| {
        for &k in keys {
            graph
                .relation_mut(RelationKind::Attack, k)
                .unwrap()
                .weight
                .flip()
                .unwrap();
        }
    };

    for set in &sets {
        // Flipping exactly the set changes the status.
        flip_all(&mut graph, &set.attacks);
        assert_ne!(issue_status(&graph), baseline);
        flip_all(&mut graph, &set.attacks);

        // No strict subset does.
        for skip in 0..set.attacks.len() {
            let subset: Vec<RelationKey> = set
                .attacks
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, k)| *k)
                .collect();
            if subset.is_empty() {
                continue;
            }
            flip_all(&mut graph, &subset);
            assert_eq!(issue_status(&graph), baseline);
            flip_all(&mut graph, &subset);
        }
    }
    Ok(())
}

// ============================================================================
// Moves and receipts
// ============================================================================

#[test]
fn test_apply_then_revert_is_bit_exact() {
    let scenario = wide_scenario();
    let mut board = Gameboard::new(scenario.build()).unwrap();
    let status = board.status();
    let evaluation = board.evaluation();
    let weights: Vec<Weight> = board.graph().attacks.iter().map(|r| r.weight).collect();

    let belief =
        scenario.build_with(&[(RelationKind::Attack, 1, 0, Weight::Retracted(0.0))]);
    let mut agent = Agent::new("doubter", topics(&["law", "economy"]), belief, 0, 0).unwrap();
    let mv = Move {
        kind: RelationKind::Attack,
        key: key(1, 0),
        polarity: Polarity::Negative,
    };
    let receipt = board.apply_move(mv, &mut agent).unwrap();
    assert_eq!(receipt.impact, 2);
    assert_eq!(agent.stats.moves_played, 1);
    assert_eq!(agent.stats.truthful_moves, 1);
    board.revert_move(&receipt).unwrap();

    assert_eq!(board.status(), status);
    assert_eq!(board.evaluation(), evaluation);
    let restored: Vec<Weight> = board.graph().attacks.iter().map(|r| r.weight).collect();
    assert_eq!(weights, restored);
}

// ============================================================================
// Debates
// ============================================================================

/// Con agent believing attack 2 -> 1 is retracted, against a Pro agent who
/// agrees with the public board.
fn chain_debate(seed: u64, con_strategy: Box<dyn agora_engine::Strategy>) -> Debate {
    let scenario = chain_scenario();
    let board = Gameboard::new(scenario.build()).unwrap();
    let mut debate = Debate::new(board, DebateConfig { max_rounds: 50, seed });

    let con_belief =
        scenario.build_with(&[(RelationKind::Attack, 2, 1, Weight::Retracted(0.0))]);
    let con = Agent::new("con", topics(&["law", "economy"]), con_belief, 1, 1).unwrap();
    let pro = Agent::new("pro", topics(&["law"]), scenario.build(), 1, 1).unwrap();

    debate.add_participant(con, con_strategy);
    debate.add_participant(pro, Box::new(WinAwareRandom));
    debate
}

#[test]
fn test_issue_flip_debate_ends_with_con_winning() {
    let summary = chain_debate(11, Box::new(IssueFlip)).run().unwrap();
    assert_eq!(summary.final_status, IssueStatus::Out);
    assert!(summary.agents[0].winning);
    assert!(!summary.agents[1].winning);
    assert!(summary.moves_played >= 1);
}

#[test]
fn test_seeded_debates_reproduce() {
    for strategy in [0, 1] {
        let make = || -> Box<dyn agora_engine::Strategy> {
            if strategy == 0 {
                Box::new(IssueFlip)
            } else {
                Box::new(TargetSetWeakenReinforce::default())
            }
        };
        let a = chain_debate(23, make()).run().unwrap();
        let b = chain_debate(23, make()).run().unwrap();
        assert_eq!(a.rounds, b.rounds);
        assert_eq!(a.moves_played, b.moves_played);
        assert_eq!(a.final_status, b.final_status);
        assert_eq!(a.final_evaluation, b.final_evaluation);
    }
}

#[test]
fn test_budgets_are_conserved_in_play() -> anyhow::Result<()> {
    // Numeric-goal agents with tight budgets on a board full of inactive
    // relations they disagree about.
    let scenario = wide_scenario();
    let board = Gameboard::new(scenario.build()).unwrap();
    let mut debate = Debate::new(board, DebateConfig { max_rounds: 50, seed: 5 });

    let optimist = scenario.build_with(&[
        (RelationKind::Attack, 3, 1, Weight::Asserted(0.0)),
        (RelationKind::Attack, 4, 2, Weight::Asserted(0.0)),
    ]);
    let pessimist = scenario.build();
    debate.add_participant(
        Agent::new("optimist", topics(&["law", "health"]), optimist, 1, 1).unwrap(),
        Box::new(NumericGoal),
    );
    debate.add_participant(
        Agent::new("pessimist", topics(&["economy", "health"]), pessimist, 1, 1).unwrap(),
        Box::new(NumericGoal),
    );

    let summary = debate.run()?;
    for report in &summary.agents {
        assert!(report.stats.lies <= 1, "{} lied beyond budget", report.name);
        assert!(
            report.stats.dishonest_passes <= 1,
            "{} concealed beyond budget",
            report.name
        );
        assert_eq!(
            report.stats.moves_played as usize,
            report.stats.evaluation_deltas.len()
        );
    }
    Ok(())
}

#[test]
fn test_registry_covers_every_strategy_in_a_debate() {
    let registry = StrategyRegistry::default();
    for id in registry.ids() {
        // Each strategy must at least produce a legal proposal on the chain
        // scenario without disturbing the board.
        let scenario = chain_scenario();
        let mut board = Gameboard::new(scenario.build()).unwrap();
        let status = board.status();
        let con_belief =
            scenario.build_with(&[(RelationKind::Attack, 2, 1, Weight::Retracted(0.0))]);
        let mut agent = Agent::new("con", topics(&["law", "economy"]), con_belief, 1, 1).unwrap();

        let strategy = registry.get(id).unwrap();
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(1);
        let mut ctx = agora_engine::StrategyContext {
            agent: &mut agent,
            board: &mut board,
            rng: &mut rng,
        };
        let proposal = strategy.propose(&mut ctx).unwrap();
        assert_eq!(board.status(), status, "{id} left the board mutated");
        if let Some(mv) = proposal {
            assert!(board.graph().relation(mv.kind, mv.key).is_some());
        }
    }
}

#[test]
fn test_reset_supports_back_to_back_debates() {
    let mut debate = chain_debate(2, Box::new(IssueFlip));
    let first = debate.run().unwrap();
    debate.reset().unwrap();
    let second = debate.run().unwrap();
    assert_eq!(first.final_status, second.final_status);
    assert_eq!(first.moves_played, second.moves_played);
}
