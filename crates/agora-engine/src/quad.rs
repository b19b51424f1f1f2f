//! QUAD-style numeric evaluation of arguments.
//!
//! Every argument gets a value in `[0, 1]` combining a constant base score
//! with the values of its direct, currently active attackers and supporters.
//! Parents must be evaluated before children, so the active-edge graph is
//! topologically sorted first; a cycle is a fatal input-contract violation
//! reported as [`EngineError::EvaluationCycle`], never a silent stall.

use agora_core::{ArgumentGraph, ArgumentId, GraphError, RelationKind};
use petgraph::algo::toposort;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Base score every argument starts from.
pub const BASE_SCORE: f64 = 0.5;

/// Combine attacker and supporter values into one evaluation.
///
/// Either aggregate is "nil" when it has no inputs, or when every input is
/// exactly zero (an attacker with no force is no evidence at all, not
/// evidence of strength). With both aggregates nil the base score stands;
/// with one nil the other wins; otherwise they average.
fn combine(attackers: &[f64], supporters: &[f64]) -> f64 {
    let attack = if attackers.is_empty() || attackers.iter().all(|v| *v == 0.0) {
        None
    } else {
        let mut v = BASE_SCORE;
        for a in attackers {
            v -= v * a;
        }
        Some(v)
    };

    let support = if supporters.is_empty() || supporters.iter().all(|v| *v == 0.0) {
        None
    } else {
        let mut v = BASE_SCORE;
        for s in supporters {
            v += (1.0 - v) * s;
        }
        Some(v)
    };

    match (attack, support) {
        (None, None) => BASE_SCORE,
        (Some(a), None) => a,
        (None, Some(s)) => s,
        (Some(a), Some(s)) => (a + s) / 2.0,
    }
}

/// Evaluate every argument and return the issue's evaluation.
///
/// Previous evaluations are discarded first; on success every argument holds
/// `Some(eval)` with `eval` in `[0, 1]`, and the issue's evaluation is
/// returned. Requires the graph restricted to active edges to be acyclic.
pub fn evaluate(graph: &mut ArgumentGraph) -> EngineResult<f64> {
    for arg in &mut graph.arguments {
        arg.eval = None;
    }

    let dg = graph.active_digraph();
    let order = toposort(&dg, None).map_err(|cycle| EngineError::EvaluationCycle {
        argument: dg[cycle.node_id()],
    })?;

    let mut evals: Vec<Option<f64>> = vec![None; graph.argument_count()];
    for node in order {
        let mut attackers = Vec::new();
        let mut supporters = Vec::new();
        for edge in dg.edges_directed(node, Direction::Incoming) {
            let parent = edge.source();
            let value = match evals[parent.index()] {
                Some(v) => v,
                // Unreachable after a successful toposort; kept as a hard
                // failure rather than a silent default.
                None => {
                    return Err(EngineError::EvaluationCycle {
                        argument: dg[parent],
                    })
                }
            };
            match edge.weight() {
                RelationKind::Attack => attackers.push(value),
                RelationKind::Support => supporters.push(value),
            }
        }

        let value = combine(&attackers, &supporters);
        evals[node.index()] = Some(value);
        if let Some(arg) = graph.arguments.get_mut(node.index()) {
            arg.eval = Some(value);
        }
    }

    let issue_eval = graph
        .issue_eval()
        .ok_or(EngineError::Graph(GraphError::UnknownArgument(
            ArgumentId::ISSUE,
        )))?;
    debug!(issue_eval, "evaluation_complete");
    Ok(issue_eval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Weight;

    fn arg(graph: &mut ArgumentGraph) -> ArgumentId {
        graph.add_argument(Weight::Fixed, ["t1".to_string()])
    }

    #[test]
    fn test_unattacked_issue_scores_base() {
        let mut g = ArgumentGraph::new();
        arg(&mut g);
        assert_eq!(evaluate(&mut g).unwrap(), BASE_SCORE);
    }

    #[test]
    fn test_single_attacker_halves_base() {
        let mut g = ArgumentGraph::new();
        let issue = arg(&mut g);
        let a1 = arg(&mut g);
        g.add_attack(a1, issue, Weight::Asserted(5.0)).unwrap();

        // a1 is unattacked (0.5); issue = 0.5 - 0.5 * 0.5.
        assert_eq!(evaluate(&mut g).unwrap(), 0.25);
        assert_eq!(g.argument(a1).unwrap().eval, Some(0.5));
    }

    #[test]
    fn test_single_supporter_lifts_base() {
        let mut g = ArgumentGraph::new();
        let issue = arg(&mut g);
        let s1 = arg(&mut g);
        g.add_support(s1, issue, Weight::Asserted(5.0)).unwrap();

        assert_eq!(evaluate(&mut g).unwrap(), 0.75);
    }

    #[test]
    fn test_balanced_attack_and_support_average() {
        let mut g = ArgumentGraph::new();
        let issue = arg(&mut g);
        let a1 = arg(&mut g);
        let s1 = arg(&mut g);
        g.add_attack(a1, issue, Weight::Asserted(1.0)).unwrap();
        g.add_support(s1, issue, Weight::Asserted(1.0)).unwrap();

        // mean(0.25, 0.75)
        assert_eq!(evaluate(&mut g).unwrap(), 0.5);
    }

    #[test]
    fn test_inactive_relations_are_ignored() {
        let mut g = ArgumentGraph::new();
        let issue = arg(&mut g);
        let a1 = arg(&mut g);
        g.add_attack(a1, issue, Weight::Retracted(0.0)).unwrap();

        assert_eq!(evaluate(&mut g).unwrap(), BASE_SCORE);
    }

    #[test]
    fn test_zero_valued_attackers_are_no_evidence() {
        // A lone zero-force attacker leaves the base score untouched …
        assert_eq!(combine(&[0.0], &[]), BASE_SCORE);
        // … and does not drag the support aggregate into an average.
        assert_eq!(combine(&[0.0], &[0.8]), 0.9);
        // A non-zero attacker alongside a zero one still counts.
        assert_eq!(combine(&[0.0, 0.5], &[]), 0.25);
    }

    #[test]
    fn test_all_evals_in_unit_interval() {
        let mut g = ArgumentGraph::new();
        let ids: Vec<ArgumentId> = (0..6).map(|_| arg(&mut g)).collect();
        g.add_attack(ids[1], ids[0], Weight::Asserted(1.0)).unwrap();
        g.add_support(ids[2], ids[0], Weight::Asserted(1.0)).unwrap();
        g.add_attack(ids[3], ids[1], Weight::Asserted(1.0)).unwrap();
        g.add_support(ids[4], ids[1], Weight::Asserted(1.0)).unwrap();
        g.add_attack(ids[5], ids[2], Weight::Asserted(1.0)).unwrap();

        evaluate(&mut g).unwrap();
        for a in &g.arguments {
            let v = a.eval.unwrap();
            assert!((0.0..=1.0).contains(&v), "eval {v} out of range");
        }
    }

    #[test]
    fn test_active_cycle_is_fatal() {
        let mut g = ArgumentGraph::new();
        let issue = arg(&mut g);
        let a1 = arg(&mut g);
        g.add_attack(a1, issue, Weight::Asserted(1.0)).unwrap();
        g.add_attack(issue, a1, Weight::Asserted(1.0)).unwrap();

        assert!(matches!(
            evaluate(&mut g),
            Err(EngineError::EvaluationCycle { .. })
        ));
    }

    #[test]
    fn test_retracted_cycle_is_harmless() {
        let mut g = ArgumentGraph::new();
        let issue = arg(&mut g);
        let a1 = arg(&mut g);
        g.add_attack(a1, issue, Weight::Asserted(1.0)).unwrap();
        g.add_attack(issue, a1, Weight::Retracted(0.0)).unwrap();

        assert_eq!(evaluate(&mut g).unwrap(), 0.25);
    }
}
