//! Fixed-step tick driver wiring the world, the systems, and the pilot.

use std::time::Duration;

use anyhow::Result;
use bastion_defence_core::{Command, Phase};
use bastion_defence_rendering::RenderingBackend;
use bastion_defence_system_flow::Flow;
use bastion_defence_system_spawning::{Config as SpawnConfig, Spawning};
use bastion_defence_world::{apply, query, World};

use crate::config::RunConfig;
use crate::layout_transfer::{FortressLayoutSnapshot, LayoutTurret};
use crate::pilot::Pilot;
use crate::scene::build_scene;
use crate::text_backend::AsciiBackend;
use crate::ui::CliSink;

/// Simulated frame length; the driver steps at a fixed 60 Hz.
const TICK_INTERVAL: Duration = Duration::from_micros(16_667);

/// Upper bound on a single simulation step, guarding against large gaps.
const MAX_STEP: Duration = Duration::from_millis(50);

/// Spawn stream label mixed into the run seed.
const SPAWN_STREAM: u64 = 0x626f_6174_73;

/// Result of one headless run.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) ticks: u64,
    pub(crate) wave_reached: u32,
    pub(crate) defeat: Option<String>,
}

/// Owns the simulation and advances it one bounded step at a time.
#[derive(Debug)]
pub(crate) struct Driver {
    world: World,
    flow: Flow,
    spawning: Spawning,
    pilot: Pilot,
    sink: CliSink,
}

impl Driver {
    pub(crate) fn new(config: &RunConfig) -> Self {
        Self {
            world: World::new(config.seed),
            flow: Flow::new(),
            spawning: Spawning::new(SpawnConfig::new(config.seed ^ SPAWN_STREAM)),
            pilot: Pilot::new(config.seed),
            sink: CliSink::default(),
        }
    }

    pub(crate) fn run(&mut self, config: &RunConfig) -> Result<Outcome> {
        self.pump(Command::ResetToLobby);
        if self.sink.start_enabled {
            self.pump(Command::StartGame);
        }

        let mut backend = config.render_every.map(|_| AsciiBackend::new());

        for tick in 0..config.max_ticks {
            self.step();

            if let (Some(every), Some(backend)) = (config.render_every, backend.as_mut()) {
                if every > 0 && tick % every == 0 {
                    backend.present(&build_scene(&self.world))?;
                }
            }

            if self.sink.game_over {
                return Ok(Outcome {
                    ticks: tick + 1,
                    wave_reached: query::wave(&self.world),
                    defeat: Some(self.sink.last_status.clone()),
                });
            }
            if query::wave(&self.world) > config.waves {
                return Ok(Outcome {
                    ticks: tick + 1,
                    wave_reached: config.waves,
                    defeat: None,
                });
            }
        }

        Ok(Outcome {
            ticks: config.max_ticks,
            wave_reached: query::wave(&self.world).saturating_sub(1),
            defeat: None,
        })
    }

    /// One driver frame: pilot input first, then a bounded simulation step.
    fn step(&mut self) {
        let dt = TICK_INTERVAL.min(MAX_STEP);
        for command in self.pilot.act(&self.world, dt) {
            self.pump(command);
        }
        self.pump(Command::Tick { dt });
    }

    /// Applies a command, then lets the systems react until the frame is
    /// quiescent.
    fn pump(&mut self, command: Command) {
        let mut commands = vec![command];
        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                apply(&mut self.world, command, &mut events);
            }
            if events.is_empty() {
                break;
            }

            let mut next = Vec::new();
            self.spawning
                .handle(&events, query::island(&self.world), &mut next);
            self.flow.handle(
                &events,
                query::courtyard_regions(&self.world).len(),
                query::turret_caps(&self.world),
                &mut self.sink,
                &mut next,
            );
            commands = next;
        }

        debug_assert!(
            query::phase(&self.world) != Phase::GameOver || !query::timer_running(&self.world),
            "the phase clock must never run after defeat",
        );
    }

    /// Captures the current fortress as a transfer snapshot.
    pub(crate) fn layout_snapshot(&self) -> FortressLayoutSnapshot {
        let grid = query::tile_grid(&self.world);
        FortressLayoutSnapshot {
            columns: grid.columns(),
            rows: grid.rows(),
            walls: query::wall_tiles(&self.world).iter().copied().collect(),
            turrets: query::turret_view(&self.world)
                .iter()
                .map(|turret| LayoutTurret {
                    anchor: turret.anchor,
                    orientation: turret.orientation,
                })
                .collect(),
        }
    }
}
