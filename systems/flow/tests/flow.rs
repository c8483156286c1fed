use std::time::Duration;

use bastion_defence_core::{Command, Event, GameOverReason, Phase, TurretCaps, UiSink};
use bastion_defence_system_flow::Flow;

#[derive(Debug, Default)]
struct RecordingSink {
    times: Vec<Duration>,
    rounds: Vec<u32>,
    statuses: Vec<(String, bool)>,
    start_enabled: Vec<bool>,
}

impl UiSink for RecordingSink {
    fn set_time(&mut self, remaining: Duration) {
        self.times.push(remaining);
    }

    fn set_round(&mut self, wave: u32) {
        self.rounds.push(wave);
    }

    fn set_status(&mut self, message: &str, game_over: bool) {
        self.statuses.push((message.to_owned(), game_over));
    }

    fn set_start_enabled(&mut self, enabled: bool) {
        self.start_enabled.push(enabled);
    }
}

fn caps() -> TurretCaps {
    TurretCaps {
        placed_this_wave: 0,
        total: 0,
        max_this_wave: 2,
        max_total: 5,
    }
}

fn run(events: &[Event], courtyard_count: usize) -> (Vec<Command>, RecordingSink) {
    let mut flow = Flow::new();
    let mut sink = RecordingSink::default();
    let mut out = Vec::new();
    flow.handle(events, courtyard_count, caps(), &mut sink, &mut out);
    (out, sink)
}

#[test]
fn build_expiry_without_courtyard_ends_the_game() {
    let (out, _) = run(&[Event::PhaseTimerExpired { phase: Phase::Build }], 0);
    assert_eq!(
        out,
        vec![Command::EndGame {
            reason: GameOverReason::NoCourtyard,
        }],
    );
}

#[test]
fn build_expiry_with_a_courtyard_opens_turret_placement() {
    let (out, _) = run(&[Event::PhaseTimerExpired { phase: Phase::Build }], 1);
    assert_eq!(out, vec![Command::BeginTurretPhase]);
}

#[test]
fn turret_expiry_begins_combat() {
    let (out, _) = run(
        &[Event::PhaseTimerExpired {
            phase: Phase::Turret,
        }],
        1,
    );
    assert_eq!(out, vec![Command::BeginCombatPhase]);
}

#[test]
fn surviving_the_combat_clock_rolls_to_the_next_wave() {
    let (out, _) = run(
        &[Event::PhaseTimerExpired {
            phase: Phase::Combat,
        }],
        1,
    );
    assert_eq!(out, vec![Command::EndCombatAndStartNextWave]);
}

#[test]
fn wave_clear_rolls_to_the_next_wave() {
    let (out, _) = run(&[Event::WaveCleared { wave: 3 }], 1);
    assert_eq!(out, vec![Command::EndCombatAndStartNextWave]);
}

#[test]
fn exhausted_turret_budget_forces_combat() {
    let (out, _) = run(&[Event::TurretBudgetExhausted], 1);
    assert_eq!(out, vec![Command::BeginCombatPhase]);
}

#[test]
fn losing_every_wall_preempts_simultaneous_transitions() {
    let (out, _) = run(
        &[
            Event::AllWallsDestroyed,
            Event::WaveCleared { wave: 2 },
            Event::PhaseTimerExpired {
                phase: Phase::Combat,
            },
        ],
        1,
    );
    assert_eq!(
        out,
        vec![Command::EndGame {
            reason: GameOverReason::AllWallsDestroyed,
        }],
        "a lost game must not also advance to the next wave",
    );
}

#[test]
fn finished_banner_starts_the_phase_timer() {
    let (out, _) = run(&[Event::BannerFinished { phase: Phase::Build }], 1);
    assert_eq!(out, vec![Command::StartPhaseTimer]);
}

#[test]
fn countdown_updates_reach_the_sink() {
    let (_, sink) = run(
        &[Event::CountdownUpdated {
            remaining: Duration::from_secs(12),
        }],
        1,
    );
    assert_eq!(sink.times, vec![Duration::from_secs(12)]);
}

#[test]
fn entering_the_turret_phase_announces_the_budgets() {
    let (_, sink) = run(
        &[Event::PhaseChanged {
            phase: Phase::Turret,
            wave: 2,
        }],
        1,
    );
    assert_eq!(sink.rounds, vec![2]);
    let (message, game_over) = &sink.statuses[0];
    assert!(message.contains("Place up to 2 turrets"));
    assert!(message.contains("Total cap: 5"));
    assert!(!game_over);
}

#[test]
fn entering_the_lobby_re_enables_the_start_control() {
    let (_, sink) = run(
        &[Event::PhaseChanged {
            phase: Phase::Lobby,
            wave: 1,
        }],
        0,
    );
    assert_eq!(sink.start_enabled, vec![true]);
    assert_eq!(sink.statuses[0].0, "Press Start to begin.");
}

#[test]
fn defeat_reports_the_reason_and_re_enables_start() {
    let (_, sink) = run(
        &[Event::GameEnded {
            reason: GameOverReason::AllWallsDestroyed,
        }],
        0,
    );
    assert_eq!(
        sink.statuses,
        vec![("Game Over: all walls destroyed!".to_owned(), true)],
    );
    assert_eq!(sink.start_enabled, vec![true]);
}
