//! Grounded-extension computation over the active attack relations.
//!
//! Support relations play no role here; the grounded extension is the least
//! fixpoint of "accept everything that no surviving candidate attacks".

use std::fmt;

use agora_core::{ArgumentGraph, ArgumentId};
use serde::{Deserialize, Serialize};

/// Binary acceptability of the issue under grounded semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    /// The issue belongs to the grounded extension.
    In,
    /// The issue does not belong to the grounded extension.
    Out,
}

impl IssueStatus {
    /// Whether the issue is accepted.
    pub fn is_in(&self) -> bool {
        matches!(self, IssueStatus::In)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueStatus::In => write!(f, "IN"),
            IssueStatus::Out => write!(f, "OUT"),
        }
    }
}

/// Compute the grounded extension by iterative labeling.
///
/// Every argument starts as a candidate. Each pass accepts the candidates
/// that receive no active attack from another current candidate, then evicts
/// everything a newly accepted argument actively attacks. A pass that accepts
/// nothing is the termination signal, so the loop runs at most
/// `argument_count` passes. The result is deterministic for a fixed graph.
pub fn grounded_extension(graph: &ArgumentGraph) -> Vec<ArgumentId> {
    let n = graph.argument_count();
    // candidate[i]: still possibly grounded (accepted arguments stay in).
    let mut candidate = vec![true; n];
    let mut accepted = vec![false; n];

    loop {
        let mut newly_accepted: Vec<usize> = Vec::new();

        for i in 0..n {
            if !candidate[i] || accepted[i] {
                continue;
            }
            let attacked = graph.attacks.iter().any(|att| {
                att.key.target.index() == i
                    && att.weight.is_active()
                    && candidate[att.key.source.index()]
            });
            if !attacked {
                accepted[i] = true;
                newly_accepted.push(i);
            }
        }

        if newly_accepted.is_empty() {
            break;
        }

        // Arguments actively attacked by an accepted argument are defeated.
        for &i in &newly_accepted {
            for att in &graph.attacks {
                if att.key.source.index() == i && att.weight.is_active() {
                    candidate[att.key.target.index()] = false;
                }
            }
        }
    }

    accepted
        .iter()
        .enumerate()
        .filter(|(_, a)| **a)
        .map(|(i, _)| ArgumentId(i as u32))
        .collect()
}

/// Status of the issue: [`IssueStatus::In`] iff argument 0 is grounded.
pub fn issue_status(graph: &ArgumentGraph) -> IssueStatus {
    if grounded_extension(graph).contains(&ArgumentId::ISSUE) {
        IssueStatus::In
    } else {
        IssueStatus::Out
    }
}
