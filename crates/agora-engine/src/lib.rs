//! Argumentation semantics and strategic move selection over a shared debate
//! graph.
//!
//! This crate turns the raw [`agora_core::ArgumentGraph`] into a playable
//! debate: it derives acceptability, enumerates the graph's points of
//! leverage, and lets agents with private beliefs fight over the issue.
//!
//! ## Core Concepts
//!
//! - **Grounded status**: binary acceptability of the issue, the least
//!   fixpoint of "accept what no surviving candidate attacks"
//! - **Evaluation**: a continuous `[0, 1]` score combining each argument's
//!   active attackers and supporters over a 0.5 base
//! - **Target set**: a minimal set of non-fixed attacks whose joint
//!   activation flip changes the issue's grounded status
//! - **Gameboard**: the shared graph plus its derived state, mutated only
//!   through receipted moves so speculation can always be undone
//! - **Agent**: private beliefs, topic expertise scaling its votes, and
//!   budgets bounding dishonest play
//! - **Strategy**: a pluggable decision procedure proposing the next move,
//!   from uniform-random up to numeric goal seeking with lies and
//!   concealment
//!
//! ## Play Model
//!
//! ```text
//! Debate = round-robin over participants:
//!     strategy.propose(agent, board, rng) -> Option<Move>
//!     Some(move) => board.apply_move(..) -> MoveReceipt, tallies updated
//!     None       => pass; a full round of passes ends the debate
//! ```
//!
//! All randomness is injected and seedable, so whole debates replay
//! deterministically.

pub mod agent;
pub mod board;
pub mod debate;
mod error;
pub mod grounded;
pub mod quad;
pub mod strategy;
pub mod targets;

pub use agent::{classify_vote, Agent, MoveStats, Team, VoteImpact};
pub use board::{Gameboard, MoveOutcome, MoveReceipt};
pub use debate::{AgentReport, Debate, DebateConfig, DebateSummary, Participant};
pub use error::{EngineError, EngineResult};
pub use grounded::{grounded_extension, issue_status, IssueStatus};
pub use quad::{evaluate, BASE_SCORE};
pub use strategy::{
    IssueFlip, NaiveRandom, NumericGoal, Strategy, StrategyContext, StrategyRegistry,
    TargetSetCut, TargetSetOrdering, TargetSetWeaken, TargetSetWeakenReinforce, WinAwareRandom,
};
pub use targets::{target_sets, TargetSet, MAX_MODIFIABLE_ATTACKS};
