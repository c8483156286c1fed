#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bastion Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches. The crate also
//! carries the shared gameplay vocabulary: tile and pixel coordinates, the
//! island ellipse, tetromino wall pieces, turret orientations, and the wave
//! scaling formulas.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Length of every build, turret, and combat phase countdown.
pub const ROUND_SECONDS: Duration = Duration::from_secs(30);

/// Height of the scrolling phase banner measured in pixels.
pub const BANNER_HEIGHT: f32 = 28.0;

/// Vertical scroll speed of the phase banner in pixels per second.
pub const BANNER_SPEED: f32 = 140.0;

/// Location of a single grid tile expressed as integer tile indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the tile displaced by the provided offsets.
    #[must_use]
    pub const fn offset_by(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned bounding box over a set of tiles, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileBounds {
    min: TileCoord,
    max: TileCoord,
}

impl TileBounds {
    /// Creates a degenerate bounding box covering a single tile.
    #[must_use]
    pub const fn at(tile: TileCoord) -> Self {
        Self {
            min: tile,
            max: tile,
        }
    }

    /// Returns the bounding box grown to include the provided tile.
    #[must_use]
    pub fn including(self, tile: TileCoord) -> Self {
        Self {
            min: TileCoord::new(self.min.x().min(tile.x()), self.min.y().min(tile.y())),
            max: TileCoord::new(self.max.x().max(tile.x()), self.max.y().max(tile.y())),
        }
    }

    /// Smallest tile contained in the box.
    #[must_use]
    pub const fn min(&self) -> TileCoord {
        self.min
    }

    /// Largest tile contained in the box.
    #[must_use]
    pub const fn max(&self) -> TileCoord {
        self.max
    }
}

/// Continuous position expressed in internal playfield pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelPoint {
    x: f32,
    y: f32,
}

impl PixelPoint {
    /// Creates a new pixel-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component in pixels.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component in pixels.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Describes the discrete tile layout of the playfield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_length: f32,
}

impl TileGrid {
    /// Creates a new tile grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, tile_length: f32) -> Self {
        Self {
            columns,
            rows,
            tile_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square tile expressed in pixels.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total width of the grid measured in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the grid measured in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Reports whether the provided tile lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.x() >= 0
            && tile.y() >= 0
            && tile.x() < self.columns as i32
            && tile.y() < self.rows as i32
    }

    /// Pixel-space centre of the provided tile.
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> PixelPoint {
        PixelPoint::new(
            tile.x() as f32 * self.tile_length + self.tile_length * 0.5,
            tile.y() as f32 * self.tile_length + self.tile_length * 0.5,
        )
    }

    /// Tile whose area contains the provided pixel-space point.
    ///
    /// The result may lie outside the grid; combine with [`Self::contains`]
    /// when bounds matter.
    #[must_use]
    pub fn tile_containing(&self, point: PixelPoint) -> TileCoord {
        TileCoord::new(
            (point.x() / self.tile_length).floor() as i32,
            (point.y() / self.tile_length).floor() as i32,
        )
    }
}

/// Elliptical island carved into the playfield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IslandGeometry {
    center: PixelPoint,
    radius_x: f32,
    radius_y: f32,
}

impl IslandGeometry {
    /// Creates a new island ellipse from its centre and radii.
    #[must_use]
    pub const fn new(center: PixelPoint, radius_x: f32, radius_y: f32) -> Self {
        Self {
            center,
            radius_x,
            radius_y,
        }
    }

    /// Pixel-space centre of the ellipse.
    #[must_use]
    pub const fn center(&self) -> PixelPoint {
        self.center
    }

    /// Horizontal radius of the ellipse in pixels.
    #[must_use]
    pub const fn radius_x(&self) -> f32 {
        self.radius_x
    }

    /// Vertical radius of the ellipse in pixels.
    #[must_use]
    pub const fn radius_y(&self) -> f32 {
        self.radius_y
    }

    /// Reports whether a point lies within the ellipse scaled by the
    /// provided per-axis factors.
    #[must_use]
    pub fn contains_scaled(&self, point: PixelPoint, scale_x: f32, scale_y: f32) -> bool {
        let dx = (point.x() - self.center.x()) / (self.radius_x * scale_x);
        let dy = (point.y() - self.center.y()) / (self.radius_y * scale_y);
        dx * dx + dy * dy <= 1.0
    }

    /// Point on the scaled ellipse perimeter at the provided angle.
    #[must_use]
    pub fn point_at_angle(&self, angle: f32, radius_factor: f32) -> PixelPoint {
        PixelPoint::new(
            self.center.x() + angle.cos() * self.radius_x * radius_factor,
            self.center.y() + angle.sin() * self.radius_y * radius_factor,
        )
    }
}

/// Orientation of a two-cell turret footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Footprint spans the anchor and the tile to its east.
    Horizontal,
    /// Footprint spans the anchor and the tile to its south.
    Vertical,
}

impl Orientation {
    /// Returns the opposite orientation.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Resolves the two-cell footprint anchored at the provided tile.
    #[must_use]
    pub const fn footprint(self, anchor: TileCoord) -> [TileCoord; 2] {
        match self {
            Self::Horizontal => [anchor, anchor.offset_by(1, 0)],
            Self::Vertical => [anchor, anchor.offset_by(0, 1)],
        }
    }
}

/// Tetromino shapes available for wall construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    /// Four cells in a row.
    I,
    /// Two-by-two square.
    O,
    /// Three cells with a central stem.
    T,
    /// Right-leaning step.
    S,
    /// Left-leaning step.
    Z,
    /// Hook opening toward the east.
    J,
    /// Hook opening toward the west.
    L,
}

impl PieceKind {
    /// Every piece shape, in draw-table order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Base cell offsets of the shape in its unrotated state.
    #[must_use]
    pub const fn base_offsets(self) -> [TileCoord; 4] {
        match self {
            Self::I => [
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(2, 0),
                TileCoord::new(3, 0),
            ],
            Self::O => [
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
            ],
            Self::T => [
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
                TileCoord::new(2, 1),
            ],
            Self::S => [
                TileCoord::new(1, 0),
                TileCoord::new(2, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
            ],
            Self::Z => [
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(1, 1),
                TileCoord::new(2, 1),
            ],
            Self::J => [
                TileCoord::new(0, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
                TileCoord::new(2, 1),
            ],
            Self::L => [
                TileCoord::new(2, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
                TileCoord::new(2, 1),
            ],
        }
    }
}

/// Quarter-turn rotation state of a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rotation(u8);

impl Rotation {
    /// Creates a rotation, wrapping the provided quarter-turn count.
    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    /// Number of quarter turns applied, in the range `0..4`.
    #[must_use]
    pub const fn quarter_turns(&self) -> u8 {
        self.0
    }

    /// Returns the rotation advanced by one quarter turn.
    #[must_use]
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % 4)
    }
}

/// Tetromino wall piece combining a shape with its rotation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: Rotation,
}

impl Piece {
    /// Creates a piece in the provided rotation state.
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: Rotation) -> Self {
        Self { kind, rotation }
    }

    /// Shape of the piece.
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Rotation state of the piece.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Returns the piece rotated by one further quarter turn.
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self {
            kind: self.kind,
            rotation: self.rotation.next(),
        }
    }

    /// Cell offsets of the piece after applying its rotation.
    ///
    /// Each quarter turn maps `(x, y)` to `(y, -x)` and then renormalizes the
    /// offsets so the minimum x and minimum y are both zero.
    #[must_use]
    pub fn offsets(&self) -> [TileCoord; 4] {
        let mut offsets = self.kind.base_offsets();
        for _ in 0..self.rotation.quarter_turns() {
            for offset in &mut offsets {
                *offset = TileCoord::new(offset.y(), -offset.x());
            }
            normalize_offsets(&mut offsets);
        }
        offsets
    }

    /// Absolute cells covered by the piece when anchored at the provided tile.
    #[must_use]
    pub fn cells(&self, anchor: TileCoord) -> [TileCoord; 4] {
        self.offsets()
            .map(|offset| anchor.offset_by(offset.x(), offset.y()))
    }
}

fn normalize_offsets(offsets: &mut [TileCoord; 4]) {
    let min_x = offsets.iter().map(TileCoord::x).min().unwrap_or(0);
    let min_y = offsets.iter().map(TileCoord::y).min().unwrap_or(0);
    for offset in offsets {
        *offset = TileCoord::new(offset.x() - min_x, offset.y() - min_y);
    }
}

/// Gameplay phases sequenced by the flow state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Idle state before a game starts.
    Lobby,
    /// Wall construction phase.
    Build,
    /// Turret placement phase.
    Turret,
    /// Active combat against the wave's boats.
    Combat,
    /// Terminal state after a defeat.
    GameOver,
}

/// Reasons a running game can end in defeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    /// The build phase ended without a single enclosed courtyard.
    NoCourtyard,
    /// Boat fire destroyed every wall tile during combat.
    AllWallsDestroyed,
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCourtyard => write!(f, "no courtyard"),
            Self::AllWallsDestroyed => write!(f, "all walls destroyed"),
        }
    }
}

/// Snapshot of the turret placement budgets derived from courtyard occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurretCaps {
    /// Turrets placed since the current wave's turret phase opened.
    pub placed_this_wave: u32,
    /// Turrets currently standing, regardless of placement wave.
    pub total: u32,
    /// Placement budget for the current wave.
    pub max_this_wave: u32,
    /// Ceiling on simultaneously standing turrets.
    pub max_total: u32,
}

impl TurretCaps {
    /// Reports whether any further placement is possible this wave.
    #[must_use]
    pub const fn exhausted(&self) -> bool {
        self.placed_this_wave >= self.max_this_wave || self.total >= self.max_total
    }
}

/// Distinguishes who fired a projectile, and therefore what it can hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    /// Fired by a boat; collides with wall tiles.
    Boat,
    /// Fired by a turret; collides with boats.
    Turret,
}

/// Number of boats spawned for the provided one-based wave.
#[must_use]
pub const fn boat_count_for_wave(wave: u32) -> u32 {
    3 + wave
}

/// Hit points assigned to each boat in the provided wave.
#[must_use]
pub const fn boat_health_for_wave(wave: u32) -> u32 {
    1 + wave / 2
}

/// Cruising speed of boats in the provided wave, in pixels per second.
#[must_use]
pub fn boat_move_speed_for_wave(wave: u32) -> f32 {
    22.0 + 3.0 * wave as f32
}

/// Delay between successive shots from a single boat.
#[must_use]
pub fn boat_shot_interval_for_wave(wave: u32) -> Duration {
    Duration::from_secs_f32((2.5 - 0.1 * wave as f32).max(1.0))
}

/// Speed of boat projectiles in the provided wave, in pixels per second.
#[must_use]
pub fn boat_projectile_speed_for_wave(wave: u32) -> f32 {
    (105.0 + 5.0 * wave as f32).min(180.0)
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a new game from the lobby or game-over screen.
    StartGame,
    /// Returns the simulation to the lobby, clearing the fortress.
    ResetToLobby,
    /// Re-enters the build phase without resetting the fortress.
    BeginBuildPhase,
    /// Transitions from building into turret placement.
    BeginTurretPhase,
    /// Transitions from turret placement into combat.
    BeginCombatPhase,
    /// Finishes a survived combat phase and opens the next wave's build.
    EndCombatAndStartNextWave,
    /// Ends the game in defeat.
    EndGame {
        /// Cause of the defeat.
        reason: GameOverReason,
    },
    /// Skips the remainder of the current build or turret phase.
    SkipPhase,
    /// Starts the current phase countdown once the banner has cleared.
    StartPhaseTimer,
    /// Moves the build-phase hover ghost to the provided anchor tile.
    SetBuildHover {
        /// Tile anchoring the piece preview.
        anchor: TileCoord,
    },
    /// Rotates the pending wall piece by a quarter turn.
    RotatePiece,
    /// Commits the hovered wall piece into the wall set.
    PlaceWalls,
    /// Erases the single wall tile under the hover anchor.
    EraseWall,
    /// Discards the pending piece and draws the next one.
    DrawNextPiece,
    /// Moves the turret-phase hover ghost to the provided anchor tile.
    SetTurretHover {
        /// Tile anchoring the turret preview.
        anchor: TileCoord,
    },
    /// Toggles the pending turret between horizontal and vertical.
    RotateTurret,
    /// Commits the hovered turret placement.
    PlaceTurret,
    /// Erases the turret whose footprint covers the hover anchor.
    EraseTurret,
    /// Fires every eligible turret at the provided aim point.
    FireTurrets {
        /// Pixel-space point the turrets shoot toward.
        aim: PixelPoint,
    },
    /// Adds a boat to the active wave with fully resolved kinematics.
    SpawnBoat {
        /// Initial pixel-space position.
        position: PixelPoint,
        /// Initial velocity in pixels per second.
        velocity: PixelPoint,
        /// Initial facing angle in radians.
        heading: f32,
        /// Phase offset of the idle bobbing animation.
        bob_phase: f32,
        /// Hit points the boat starts with.
        health: u32,
        /// Delay before the boat's first shot.
        shot_cooldown: Duration,
        /// Delay between the boat's subsequent shots.
        shot_interval: Duration,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the simulation entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
        /// One-based wave number the phase belongs to.
        wave: u32,
    },
    /// Reports that the phase banner finished scrolling off the playfield.
    BannerFinished {
        /// Phase whose banner completed.
        phase: Phase,
    },
    /// Reports the remaining phase time after a countdown update.
    CountdownUpdated {
        /// Time left on the phase clock.
        remaining: Duration,
    },
    /// Reports that the phase countdown reached zero or was skipped.
    PhaseTimerExpired {
        /// Phase whose countdown ran out.
        phase: Phase,
    },
    /// Reports that no further turret placements are possible this wave.
    TurretBudgetExhausted,
    /// Confirms that every boat in the wave was destroyed.
    WaveCleared {
        /// One-based wave number that was cleared.
        wave: u32,
    },
    /// Reports that boat fire removed the last remaining wall tile.
    AllWallsDestroyed,
    /// Confirms that the game ended in defeat.
    GameEnded {
        /// Cause of the defeat.
        reason: GameOverReason,
    },
}

/// Output sink for discrete UI updates emitted by the flow system.
///
/// Adapters implement this to surface countdowns, wave numbers, and status
/// text however they present them; the simulation core never references a
/// display surface directly.
pub trait UiSink {
    /// Displays the remaining phase time.
    fn set_time(&mut self, remaining: Duration);

    /// Displays the current wave number.
    fn set_round(&mut self, wave: u32);

    /// Displays a status message, flagged when it announces a defeat.
    fn set_status(&mut self, message: &str, game_over: bool);

    /// Enables or disables the start control.
    fn set_start_enabled(&mut self, enabled: bool);
}
