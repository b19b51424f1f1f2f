//! Enumeration of minimal target sets.
//!
//! A target set is a minimal set of non-fixed attacks such that flipping the
//! activation of exactly those attacks changes the issue's grounded status.
//! The search walks every subset of the modifiable attacks as a bitmask,
//! pruning supersets of sets already found, so the result contains only
//! minimal sets. The walk is exponential in the number of modifiable attacks
//! and is therefore refused outright past a hard cap.

use agora_core::{ArgumentGraph, RelationKey};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::grounded;

/// Largest number of modifiable attacks the subset walk will accept.
pub const MAX_MODIFIABLE_ATTACKS: usize = 20;

/// A minimal set of attacks whose joint activation flip changes the issue's
/// grounded status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    /// Endpoint pairs of the attacks in the set.
    pub attacks: Vec<RelationKey>,
}

impl TargetSet {
    /// Number of attacks in the set.
    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    /// True when the set is empty (never produced by the search).
    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    /// True when the set contains the given attack.
    pub fn contains(&self, key: RelationKey) -> bool {
        self.attacks.contains(&key)
    }
}

/// Enumerate all minimal target sets of the graph.
///
/// The graph is mutated during the search but restored bit-for-bit before
/// returning. Ascending bitmask order visits every subset before any of its
/// supersets, so pruning against the found masks is what enforces minimality.
pub fn target_sets(graph: &mut ArgumentGraph) -> EngineResult<Vec<TargetSet>> {
    let modifiable = graph.modifiable_attack_indices();
    if modifiable.len() > MAX_MODIFIABLE_ATTACKS {
        warn!(
            count = modifiable.len(),
            max = MAX_MODIFIABLE_ATTACKS,
            "target_set_search_refused"
        );
        return Err(EngineError::TooManyModifiableAttacks {
            count: modifiable.len(),
            max: MAX_MODIFIABLE_ATTACKS,
        });
    }

    let baseline = grounded::issue_status(graph);
    let mut found_masks: Vec<u32> = Vec::new();
    let mut sets = Vec::new();

    for mask in 1u32..(1u32 << modifiable.len()) {
        if found_masks.iter().any(|f| mask & f == *f) {
            continue;
        }

        // Modifiable indices never point at fixed attacks, so these flips
        // cannot fail.
        flip_mask(graph, &modifiable, mask)?;
        let status = grounded::issue_status(graph);
        flip_mask(graph, &modifiable, mask)?;

        if status != baseline {
            found_masks.push(mask);
            sets.push(TargetSet {
                attacks: mask_keys(graph, &modifiable, mask),
            });
        }
    }

    debug!(
        modifiable = modifiable.len(),
        sets = sets.len(),
        "target_sets_enumerated"
    );
    Ok(sets)
}

fn flip_mask(graph: &mut ArgumentGraph, modifiable: &[usize], mask: u32) -> EngineResult<()> {
    for (bit, &idx) in modifiable.iter().enumerate() {
        if mask >> bit & 1 == 1 {
            graph.attacks[idx].weight.flip()?;
        }
    }
    Ok(())
}

fn mask_keys(graph: &ArgumentGraph, modifiable: &[usize], mask: u32) -> Vec<RelationKey> {
    modifiable
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask >> bit & 1 == 1)
        .map(|(_, &idx)| graph.attacks[idx].key)
        .collect()
}
