//! Scripted pilot that plays the game during headless demonstration runs.
//!
//! The pilot stands in for the pointer/keyboard input layer: it lays a
//! closed wall ring out of I-pieces, repairs battle damage between waves,
//! fills the courtyard with turrets, and returns fire at the nearest boat.

use std::time::Duration;

use bastion_defence_core::{Command, Phase, Piece, PieceKind, PixelPoint, Rotation, TileCoord};
use bastion_defence_world::{query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wall segments composing the fortress ring: three horizontal I-pieces on
/// the top and bottom edges, one vertical I-piece per side.
const RING_SEGMENTS: [(PieceKind, u8, TileCoord); 8] = [
    (PieceKind::I, 0, TileCoord::new(19, 15)),
    (PieceKind::I, 0, TileCoord::new(23, 15)),
    (PieceKind::I, 0, TileCoord::new(27, 15)),
    (PieceKind::I, 0, TileCoord::new(19, 20)),
    (PieceKind::I, 0, TileCoord::new(23, 20)),
    (PieceKind::I, 0, TileCoord::new(27, 20)),
    (PieceKind::I, 1, TileCoord::new(19, 16)),
    (PieceKind::I, 1, TileCoord::new(30, 16)),
];

/// Anchors tried, in order, when placing turrets inside the ring.
const TURRET_ANCHORS: [TileCoord; 6] = [
    TileCoord::new(21, 16),
    TileCoord::new(21, 18),
    TileCoord::new(24, 16),
    TileCoord::new(24, 18),
    TileCoord::new(27, 16),
    TileCoord::new(27, 18),
];

const FIRE_INTERVAL: Duration = Duration::from_millis(400);

/// Deterministic scripted player issuing commands once per frame.
#[derive(Debug)]
pub(crate) struct Pilot {
    rng: ChaCha8Rng,
    last_phase: Phase,
    turret_cursor: usize,
    fire_cooldown: Duration,
}

impl Pilot {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            last_phase: Phase::Lobby,
            turret_cursor: 0,
            fire_cooldown: Duration::ZERO,
        }
    }

    /// Decides this frame's input commands from the current world snapshot.
    pub(crate) fn act(&mut self, world: &World, dt: Duration) -> Vec<Command> {
        let phase = query::phase(world);
        if phase != self.last_phase {
            self.last_phase = phase;
            self.turret_cursor = 0;
            self.fire_cooldown = Duration::ZERO;
        }

        match phase {
            Phase::Build => self.build_step(world),
            Phase::Turret => self.turret_step(world),
            Phase::Combat => self.combat_step(world, dt),
            Phase::Lobby | Phase::GameOver => Vec::new(),
        }
    }

    fn build_step(&mut self, world: &World) -> Vec<Command> {
        let walls = query::wall_tiles(world);
        for (kind, rotations, anchor) in RING_SEGMENTS {
            let piece = Piece::new(kind, Rotation::new(rotations));
            let cells = piece.cells(anchor);
            if cells.iter().all(|cell| walls.contains(cell)) {
                continue;
            }

            // Clear damaged remnants before re-laying the segment.
            if let Some(cell) = cells.iter().copied().find(|cell| walls.contains(cell)) {
                return vec![Command::SetBuildHover { anchor: cell }, Command::EraseWall];
            }

            let current = query::current_piece(world);
            if current.kind() != kind {
                return vec![Command::DrawNextPiece];
            }
            if current.rotation().quarter_turns() != rotations {
                return vec![Command::RotatePiece];
            }
            return vec![Command::SetBuildHover { anchor }, Command::PlaceWalls];
        }

        vec![Command::SkipPhase]
    }

    fn turret_step(&mut self, world: &World) -> Vec<Command> {
        if query::turret_caps(world).exhausted() {
            return vec![Command::SkipPhase];
        }

        while self.turret_cursor < TURRET_ANCHORS.len() {
            let anchor = TURRET_ANCHORS[self.turret_cursor];
            self.turret_cursor += 1;

            let occupied = query::turret_view(world)
                .iter()
                .any(|turret| turret.footprint().contains(&anchor));
            if occupied {
                continue;
            }
            return vec![Command::SetTurretHover { anchor }, Command::PlaceTurret];
        }

        vec![Command::SkipPhase]
    }

    fn combat_step(&mut self, world: &World, dt: Duration) -> Vec<Command> {
        self.fire_cooldown = self.fire_cooldown.saturating_sub(dt);
        if !self.fire_cooldown.is_zero() {
            return Vec::new();
        }

        let boats = query::boat_view(world).into_vec();
        let Some(target) = boats.first() else {
            return Vec::new();
        };

        self.fire_cooldown = FIRE_INTERVAL;
        let jitter_x: f32 = self.rng.gen_range(-4.0..4.0);
        let jitter_y: f32 = self.rng.gen_range(-4.0..4.0);
        vec![Command::FireTurrets {
            aim: PixelPoint::new(
                target.position.x + jitter_x,
                target.position.y + jitter_y,
            ),
        }]
    }
}
