#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn planner that launches each combat wave's boats.
//!
//! The system watches for combat-phase entries and answers with one
//! [`Command::SpawnBoat`] per enemy, with kinematics fully resolved up
//! front: boats ring the island at evenly spaced angles with random jitter,
//! drift in a random initial direction at the wave's speed, and start their
//! shot clocks at a random offset so volleys never synchronize.

use std::f32::consts::TAU;

use bastion_defence_core::{
    boat_count_for_wave, boat_health_for_wave, boat_move_speed_for_wave,
    boat_shot_interval_for_wave, Command, Event, IslandGeometry, Phase, PixelPoint,
};

/// Boats surface between 1.35 and 1.45 island radii from the centre.
const SPAWN_RADIUS_BASE: f32 = 1.35;
const SPAWN_RADIUS_JITTER: f32 = 0.10;

/// Maximum angular jitter applied on top of the even spacing, in radians.
const SPAWN_ANGLE_JITTER: f32 = 0.5;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided random seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that deterministically emits boat spawn commands.
#[derive(Debug)]
pub struct Spawning {
    rng: SplitMix64,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: SplitMix64::new(config.rng_seed),
        }
    }

    /// Consumes events and the island geometry to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], island: IslandGeometry, out: &mut Vec<Command>) {
        for event in events {
            if let Event::PhaseChanged {
                phase: Phase::Combat,
                wave,
            } = event
            {
                self.spawn_wave(*wave, island, out);
            }
        }
    }

    fn spawn_wave(&mut self, wave: u32, island: IslandGeometry, out: &mut Vec<Command>) {
        let count = boat_count_for_wave(wave);
        let health = boat_health_for_wave(wave);
        let speed = boat_move_speed_for_wave(wave);
        let interval = boat_shot_interval_for_wave(wave);

        for index in 0..count {
            let angle =
                TAU * index as f32 / count as f32 + self.rng.next_unit() * SPAWN_ANGLE_JITTER;
            let radius_factor = SPAWN_RADIUS_BASE + self.rng.next_unit() * SPAWN_RADIUS_JITTER;
            let position = island.point_at_angle(angle, radius_factor);

            let heading = self.rng.next_unit() * TAU;
            let velocity = PixelPoint::new(heading.cos() * speed, heading.sin() * speed);
            let bob_phase = self.rng.next_unit() * TAU;
            let shot_cooldown = interval.mul_f32(self.rng.next_unit());

            out.push(Command::SpawnBoat {
                position,
                velocity,
                heading,
                bob_phase,
                health,
                shot_cooldown,
                shot_interval: interval,
            });
        }
    }
}

#[derive(Clone, Debug)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed };
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32 {
        const SCALE: f32 = 1.0 / (1u32 << 24) as f32;
        ((self.next_u64() >> 40) as f32) * SCALE
    }
}
