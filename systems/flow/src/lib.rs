#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Phase state machine that sequences lobby, build, turret placement,
//! combat, and defeat.
//!
//! The system never touches the world directly: it consumes the event batch
//! of the current frame together with two read-only facts (how many
//! courtyards exist and the current turret budgets), forwards display
//! updates to the injected [`UiSink`], and answers with phase-transition
//! commands for the next apply round.

use bastion_defence_core::{Command, Event, GameOverReason, Phase, TurretCaps, UiSink};

/// Pure system that reacts to world events with phase transitions.
#[derive(Debug, Default)]
pub struct Flow;

impl Flow {
    /// Creates a new flow system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes world events and immutable facts to emit flow commands.
    ///
    /// A fatal `AllWallsDestroyed` in the batch takes precedence: wave-clear
    /// and timer-expiry transitions arriving alongside it are suppressed so a
    /// lost game never simultaneously advances to the next wave.
    pub fn handle<S>(
        &mut self,
        events: &[Event],
        courtyard_count: usize,
        caps: TurretCaps,
        sink: &mut S,
        out: &mut Vec<Command>,
    ) where
        S: UiSink,
    {
        let fatal = events
            .iter()
            .any(|event| matches!(event, Event::AllWallsDestroyed));

        for event in events {
            match event {
                Event::CountdownUpdated { remaining } => sink.set_time(*remaining),
                Event::PhaseChanged { phase, wave } => {
                    sink.set_round(*wave);
                    match phase {
                        Phase::Lobby => {
                            sink.set_status("Press Start to begin.", false);
                            sink.set_start_enabled(true);
                        }
                        Phase::Build => {
                            sink.set_status(
                                &format!("Wave {wave}: Build walls (R rotate, Space skip)"),
                                false,
                            );
                            sink.set_start_enabled(false);
                        }
                        Phase::Turret => {
                            sink.set_status(
                                &format!(
                                    "Place up to {} turrets (R rotate, Space skip). Total cap: {}",
                                    caps.max_this_wave, caps.max_total,
                                ),
                                false,
                            );
                        }
                        Phase::Combat => {
                            sink.set_status("Defend your walls (aim cursor, click to fire)", false);
                        }
                        Phase::GameOver => {}
                    }
                }
                Event::BannerFinished { .. } => out.push(Command::StartPhaseTimer),
                Event::TurretBudgetExhausted => {
                    if !fatal {
                        out.push(Command::BeginCombatPhase);
                    }
                }
                Event::WaveCleared { .. } => {
                    if !fatal {
                        out.push(Command::EndCombatAndStartNextWave);
                    }
                }
                Event::PhaseTimerExpired { phase } => {
                    if fatal {
                        continue;
                    }
                    match phase {
                        Phase::Build => {
                            if courtyard_count == 0 {
                                out.push(Command::EndGame {
                                    reason: GameOverReason::NoCourtyard,
                                });
                            } else {
                                out.push(Command::BeginTurretPhase);
                            }
                        }
                        Phase::Turret => out.push(Command::BeginCombatPhase),
                        Phase::Combat => out.push(Command::EndCombatAndStartNextWave),
                        Phase::Lobby | Phase::GameOver => {}
                    }
                }
                Event::AllWallsDestroyed => out.push(Command::EndGame {
                    reason: GameOverReason::AllWallsDestroyed,
                }),
                Event::GameEnded { reason } => {
                    sink.set_status(&format!("Game Over: {reason}!"), true);
                    sink.set_start_enabled(true);
                }
            }
        }
    }
}
