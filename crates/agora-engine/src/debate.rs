//! Round-robin debate runner.
//!
//! One debate plays agents against a shared board in a fixed turn order.
//! Each turn the acting agent's strategy proposes a move; non-pass moves are
//! applied and recorded, and the debate ends after a full round of passes or
//! when the round cap is hit. All randomness comes from one seeded generator,
//! so a debate replays identically for the same seed.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::{Agent, MoveStats, Team};
use crate::board::Gameboard;
use crate::error::EngineResult;
use crate::grounded::IssueStatus;
use crate::strategy::{Strategy, StrategyContext};

/// Knobs for a debate run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Hard cap on full rounds, guarding against non-converging play.
    pub max_rounds: usize,
    /// Seed for the shared random source.
    pub seed: u64,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: 100,
            seed: 0,
        }
    }
}

/// An agent together with the strategy it plays.
pub struct Participant {
    /// The agent.
    pub agent: Agent,
    /// Its decision procedure.
    pub strategy: Box<dyn Strategy>,
}

/// Final standing of one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReport {
    /// Agent name.
    pub name: String,
    /// Side the agent argued for.
    pub team: Team,
    /// Whether the final board agrees with the agent.
    pub winning: bool,
    /// The agent's move tally.
    pub stats: MoveStats,
}

/// Outcome of a finished debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSummary {
    /// Rounds played, including the closing all-pass round.
    pub rounds: usize,
    /// Non-pass moves applied to the board.
    pub moves_played: usize,
    /// Grounded status of the issue at the end.
    pub final_status: IssueStatus,
    /// Numeric evaluation of the issue at the end.
    pub final_evaluation: f64,
    /// Per-agent standings, in turn order.
    pub agents: Vec<AgentReport>,
}

/// A single debate over one board.
pub struct Debate {
    board: Gameboard,
    participants: Vec<Participant>,
    config: DebateConfig,
}

impl Debate {
    /// Set up a debate over the given board.
    pub fn new(board: Gameboard, config: DebateConfig) -> Self {
        Self {
            board,
            participants: Vec::new(),
            config,
        }
    }

    /// Seat an agent with the strategy it will play; turn order is seating
    /// order.
    pub fn add_participant(&mut self, agent: Agent, strategy: Box<dyn Strategy>) {
        self.participants.push(Participant { agent, strategy });
    }

    /// The shared board.
    pub fn board(&self) -> &Gameboard {
        &self.board
    }

    /// Play the debate to completion.
    pub fn run(&mut self) -> EngineResult<DebateSummary> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut rounds = 0;
        let mut moves_played = 0;

        for round in 1..=self.config.max_rounds {
            rounds = round;
            let mut passes = 0;

            for participant in &mut self.participants {
                let conceals_before = participant.agent.conceals_used();
                let honest_passes_before = participant.agent.stats.honest_passes;
                let proposal = {
                    let mut ctx = StrategyContext {
                        agent: &mut participant.agent,
                        board: &mut self.board,
                        rng: &mut rng,
                    };
                    participant.strategy.propose(&mut ctx)?
                };

                match proposal {
                    Some(mv) => {
                        // The board settles the agent's accounts (played set,
                        // lie budget, per-move tallies) as part of the apply.
                        self.board.apply_move(mv, &mut participant.agent)?;
                        moves_played += 1;
                        debug!(
                            round,
                            agent = %participant.agent.name,
                            kind = %mv.kind,
                            key = %mv.key,
                            status = %self.board.status(),
                            "debate_move"
                        );
                    }
                    None => {
                        // Strategies that account for their own passes are
                        // left alone; for the rest, a pass here is honest.
                        if participant.agent.conceals_used() == conceals_before
                            && participant.agent.stats.honest_passes == honest_passes_before
                        {
                            participant.agent.stats.honest_passes += 1;
                        }
                        passes += 1;
                        debug!(round, agent = %participant.agent.name, "debate_pass");
                    }
                }
            }

            if passes == self.participants.len() {
                break;
            }
        }

        let summary = DebateSummary {
            rounds,
            moves_played,
            final_status: self.board.status(),
            final_evaluation: self.board.evaluation(),
            agents: self
                .participants
                .iter()
                .map(|p| AgentReport {
                    name: p.agent.name.clone(),
                    team: p.agent.team(),
                    winning: p.agent.is_winning(&self.board),
                    stats: p.agent.stats.clone(),
                })
                .collect(),
        };
        info!(
            rounds = summary.rounds,
            moves = summary.moves_played,
            status = %summary.final_status,
            evaluation = summary.final_evaluation,
            "debate_finished"
        );
        Ok(summary)
    }

    /// Restore the board and every agent to their pre-debate state.
    pub fn reset(&mut self) -> EngineResult<()> {
        self.board.reset()?;
        for participant in &mut self.participants {
            participant.agent.reset();
        }
        Ok(())
    }
}
