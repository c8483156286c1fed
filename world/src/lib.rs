#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bastion Defence.
//!
//! The [`World`] owns the complete simulation state: the island grid, the
//! wall set, courtyard regions, turrets, boats, projectiles, and the phase
//! clock. Adapters and systems never mutate it directly; every change flows
//! through [`apply`], which executes a [`Command`], upholds the enclosure
//! invariant (courtyards are recomputed synchronously after every wall or
//! turret mutation), and broadcasts [`Event`] values describing what
//! happened. Read access goes through the [`query`] module.

use std::collections::BTreeSet;
use std::time::Duration;

use bastion_defence_core::{
    Command, Event, IslandGeometry, Orientation, Phase, Piece, PieceKind, PixelPoint, Rotation,
    TileCoord, TileGrid, BANNER_HEIGHT, BANNER_SPEED, ROUND_SECONDS,
};

mod combat;
mod enclosure;
mod rng;
mod turrets;

pub use enclosure::CourtyardRegion;

use combat::{Boat, Projectile};
use enclosure::CourtyardField;
use rng::{labeled_seed, SplitMix64};
use turrets::Turret;

pub(crate) const INTERNAL_WIDTH: f32 = 384.0;
pub(crate) const INTERNAL_HEIGHT: f32 = 288.0;
const TILE_LENGTH: f32 = 8.0;
const GRID_COLUMNS: u32 = 48;
const GRID_ROWS: u32 = 36;

const ISLAND_CENTER_X: f32 = INTERNAL_WIDTH * 0.52;
const ISLAND_CENTER_Y: f32 = INTERNAL_HEIGHT * 0.52;
const ISLAND_RADIUS_X: f32 = INTERNAL_WIDTH * 0.37;
const ISLAND_RADIUS_Y: f32 = INTERNAL_HEIGHT * 0.30;

/// Island mask shrink applied when validating wall placement; keeps a thin
/// buffer of beach between edge walls and the waterline.
const LAND_MASK_SCALE: f32 = 0.98;

const PIECE_STREAM: u64 = 0x7069_6563_6573;
const COMBAT_STREAM: u64 = 0x636f_6d62_6174;

const BUILD_BANNER: &str = "Create your fortress";
const TURRET_BANNER: &str = "Place your turrets";
const COMBAT_BANNER: &str = "Combat!";

#[derive(Clone, Copy, Debug)]
struct Banner {
    active: bool,
    y: f32,
    text: &'static str,
}

impl Banner {
    const fn inactive() -> Self {
        Self {
            active: false,
            y: 0.0,
            text: "",
        }
    }
}

/// Transient placement preview recomputed on every relevant input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverGhost {
    /// Tile the cursor currently anchors.
    pub anchor: TileCoord,
    /// Cells the pending piece or turret would occupy.
    pub cells: Vec<TileCoord>,
    /// Whether committing at this anchor would currently succeed.
    pub valid: bool,
}

/// Represents the authoritative Bastion Defence world state.
///
/// Constructed with every collection present and the lobby phase entered, so
/// no consumer ever observes a partially initialized aggregate.
#[derive(Debug)]
pub struct World {
    grid: TileGrid,
    island: IslandGeometry,
    enclosure: CourtyardField,
    walls: BTreeSet<TileCoord>,
    courtyards: Vec<CourtyardRegion>,
    courtyard_tiles: BTreeSet<TileCoord>,
    turrets: Vec<Turret>,
    turrets_placed_this_wave: u32,
    turret_orientation: Orientation,
    piece: Piece,
    hover: Option<HoverGhost>,
    boats: Vec<Boat>,
    projectiles: Vec<Projectile>,
    phase: Phase,
    wave: u32,
    time_left: Duration,
    timer_running: bool,
    banner: Banner,
    piece_rng: SplitMix64,
    combat_rng: SplitMix64,
}

impl World {
    /// Creates a new world in the lobby, seeded for deterministic replay.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let grid = TileGrid::new(GRID_COLUMNS, GRID_ROWS, TILE_LENGTH);
        let island = IslandGeometry::new(
            PixelPoint::new(ISLAND_CENTER_X, ISLAND_CENTER_Y),
            ISLAND_RADIUS_X,
            ISLAND_RADIUS_Y,
        );
        let enclosure = CourtyardField::new(GRID_COLUMNS, GRID_ROWS, |tile| {
            island.contains_scaled(grid.tile_center(tile), LAND_MASK_SCALE, LAND_MASK_SCALE)
        });

        let mut world = Self {
            grid,
            island,
            enclosure,
            walls: BTreeSet::new(),
            courtyards: Vec::new(),
            courtyard_tiles: BTreeSet::new(),
            turrets: Vec::new(),
            turrets_placed_this_wave: 0,
            turret_orientation: Orientation::Horizontal,
            piece: Piece::new(PieceKind::I, Rotation::default()),
            hover: None,
            boats: Vec::new(),
            projectiles: Vec::new(),
            phase: Phase::Lobby,
            wave: 1,
            time_left: ROUND_SECONDS,
            timer_running: false,
            banner: Banner::inactive(),
            piece_rng: SplitMix64::new(labeled_seed(seed, PIECE_STREAM)),
            combat_rng: SplitMix64::new(labeled_seed(seed, COMBAT_STREAM)),
        };
        world.draw_piece();
        world.recompute_courtyards();
        world
    }

    /// Recomputes the courtyard regions from the current wall layout.
    ///
    /// Invoked internally after every invalidating mutation; running it again
    /// without intervening mutations leaves the regions unchanged.
    pub fn recompute_courtyards(&mut self) {
        let walls = &self.walls;
        self.courtyards = self.enclosure.rebuild(|tile| walls.contains(&tile));
        self.courtyard_tiles.clear();
        for region in &self.courtyards {
            for tile in region.tiles() {
                let _ = self.courtyard_tiles.insert(*tile);
            }
        }
    }

    fn reset_fortress(&mut self) {
        self.walls.clear();
        self.turrets.clear();
        self.boats.clear();
        self.projectiles.clear();
        self.turrets_placed_this_wave = 0;
        self.turret_orientation = Orientation::Horizontal;
        self.hover = None;
        self.draw_piece();
        self.recompute_courtyards();
    }

    fn prepare_next_wave(&mut self) {
        self.projectiles.clear();
        self.boats.clear();

        // Turrets age one wave at a time and crumble after the third.
        self.turrets.retain_mut(|turret| {
            turret.life = turret.life.saturating_sub(1);
            turret.life > 0
        });

        self.recompute_courtyards();
        self.turrets_placed_this_wave = 0;
        self.draw_piece();
    }

    fn enter_build(&mut self, out_events: &mut Vec<Event>) {
        self.phase = Phase::Build;
        self.hover = None;
        self.start_banner(BUILD_BANNER);
        out_events.push(Event::PhaseChanged {
            phase: Phase::Build,
            wave: self.wave,
        });
        out_events.push(Event::CountdownUpdated {
            remaining: self.time_left,
        });
    }

    fn start_banner(&mut self, text: &'static str) {
        self.banner = Banner {
            active: true,
            y: -BANNER_HEIGHT,
            text,
        };
        self.timer_running = false;
        self.time_left = ROUND_SECONDS;
    }

    fn draw_piece(&mut self) {
        let index = self.piece_rng.next_index(PieceKind::ALL.len());
        self.piece = Piece::new(PieceKind::ALL[index], Rotation::default());
    }

    fn is_land_tile(&self, tile: TileCoord) -> bool {
        self.island
            .contains_scaled(self.grid.tile_center(tile), LAND_MASK_SCALE, LAND_MASK_SCALE)
    }

    fn resolve_build_hover(&self, anchor: TileCoord) -> HoverGhost {
        let cells = self.piece.cells(anchor);
        let valid = cells.iter().all(|cell| {
            self.grid.contains(*cell) && self.is_land_tile(*cell) && !self.walls.contains(cell)
        });
        HoverGhost {
            anchor,
            cells: cells.to_vec(),
            valid,
        }
    }

    pub(crate) fn refresh_hover(&mut self) {
        let Some(anchor) = self.hover.as_ref().map(|ghost| ghost.anchor) else {
            return;
        };
        self.hover = match self.phase {
            Phase::Build => Some(self.resolve_build_hover(anchor)),
            Phase::Turret => Some(self.resolve_turret_hover(anchor)),
            _ => None,
        };
    }

    fn place_hovered_walls(&mut self) {
        let Some(anchor) = self.hover.as_ref().map(|ghost| ghost.anchor) else {
            return;
        };
        let ghost = self.resolve_build_hover(anchor);
        if !ghost.valid {
            return;
        }

        for cell in &ghost.cells {
            let _ = self.walls.insert(*cell);
        }
        self.recompute_courtyards();
        self.draw_piece();
        self.refresh_hover();
    }

    fn erase_wall_at_hover(&mut self) {
        let Some(anchor) = self.hover.as_ref().map(|ghost| ghost.anchor) else {
            return;
        };
        let _ = self.walls.remove(&anchor);
        self.recompute_courtyards();
        self.refresh_hover();
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands whose preconditions do not hold are silent no-ops; the world
/// never panics or reports errors for invalid input.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame => {
            if !matches!(world.phase, Phase::Lobby | Phase::GameOver) {
                return;
            }
            world.wave = 1;
            world.reset_fortress();
            world.enter_build(out_events);
        }
        Command::ResetToLobby => {
            world.phase = Phase::Lobby;
            world.wave = 1;
            world.timer_running = false;
            world.time_left = ROUND_SECONDS;
            world.banner = Banner::inactive();
            world.reset_fortress();
            out_events.push(Event::PhaseChanged {
                phase: Phase::Lobby,
                wave: world.wave,
            });
            out_events.push(Event::CountdownUpdated {
                remaining: world.time_left,
            });
        }
        Command::BeginBuildPhase => {
            if world.phase != Phase::Lobby {
                return;
            }
            world.enter_build(out_events);
        }
        Command::BeginTurretPhase => {
            if world.phase != Phase::Build {
                return;
            }
            world.phase = Phase::Turret;
            world.turrets_placed_this_wave = 0;
            world.hover = None;
            world.start_banner(TURRET_BANNER);
            out_events.push(Event::PhaseChanged {
                phase: Phase::Turret,
                wave: world.wave,
            });
            out_events.push(Event::CountdownUpdated {
                remaining: world.time_left,
            });
        }
        Command::BeginCombatPhase => {
            if world.phase != Phase::Turret {
                return;
            }
            world.phase = Phase::Combat;
            world.hover = None;
            world.start_banner(COMBAT_BANNER);
            out_events.push(Event::PhaseChanged {
                phase: Phase::Combat,
                wave: world.wave,
            });
            out_events.push(Event::CountdownUpdated {
                remaining: world.time_left,
            });
        }
        Command::EndCombatAndStartNextWave => {
            if world.phase != Phase::Combat {
                return;
            }
            world.wave += 1;
            world.prepare_next_wave();
            world.enter_build(out_events);
        }
        Command::EndGame { reason } => {
            if !matches!(world.phase, Phase::Build | Phase::Turret | Phase::Combat) {
                return;
            }
            world.phase = Phase::GameOver;
            world.timer_running = false;
            world.banner = Banner::inactive();
            out_events.push(Event::GameEnded { reason });
        }
        Command::SkipPhase => {
            if !matches!(world.phase, Phase::Build | Phase::Turret) {
                return;
            }
            world.time_left = Duration::ZERO;
            world.timer_running = false;
            out_events.push(Event::CountdownUpdated {
                remaining: Duration::ZERO,
            });
            out_events.push(Event::PhaseTimerExpired { phase: world.phase });
        }
        Command::StartPhaseTimer => {
            if !matches!(world.phase, Phase::Build | Phase::Turret | Phase::Combat) {
                return;
            }
            world.timer_running = true;
            world.time_left = ROUND_SECONDS;
            out_events.push(Event::CountdownUpdated {
                remaining: world.time_left,
            });
        }
        Command::SetBuildHover { anchor } => {
            if world.phase != Phase::Build {
                return;
            }
            world.hover = Some(world.resolve_build_hover(anchor));
        }
        Command::RotatePiece => {
            if world.phase != Phase::Build {
                return;
            }
            world.piece = world.piece.rotated();
            world.refresh_hover();
        }
        Command::PlaceWalls => {
            if world.phase != Phase::Build {
                return;
            }
            world.place_hovered_walls();
        }
        Command::EraseWall => {
            if world.phase != Phase::Build {
                return;
            }
            world.erase_wall_at_hover();
        }
        Command::DrawNextPiece => {
            if world.phase != Phase::Build {
                return;
            }
            world.draw_piece();
            world.refresh_hover();
        }
        Command::SetTurretHover { anchor } => {
            if world.phase != Phase::Turret {
                return;
            }
            world.hover = Some(world.resolve_turret_hover(anchor));
        }
        Command::RotateTurret => {
            if world.phase != Phase::Turret {
                return;
            }
            world.turret_orientation = world.turret_orientation.toggled();
            world.refresh_hover();
        }
        Command::PlaceTurret => {
            if world.phase != Phase::Turret {
                return;
            }
            world.place_hovered_turret();
        }
        Command::EraseTurret => {
            if world.phase != Phase::Turret {
                return;
            }
            world.erase_turret_at_hover();
        }
        Command::FireTurrets { aim } => {
            if world.phase != Phase::Combat {
                return;
            }
            world.fire_turrets(aim);
        }
        Command::SpawnBoat {
            position,
            velocity,
            heading,
            bob_phase,
            health,
            shot_cooldown,
            shot_interval,
        } => {
            if world.phase != Phase::Combat {
                return;
            }
            world.boats.push(Boat {
                position: glam::Vec2::new(position.x(), position.y()),
                velocity: glam::Vec2::new(velocity.x(), velocity.y()),
                heading,
                bob_phase,
                health,
                shot_cooldown,
                shot_interval,
            });
        }
        Command::Tick { dt } => {
            let dt_secs = dt.as_secs_f32();

            if world.banner.active {
                world.banner.y += BANNER_SPEED * dt_secs;
                if world.banner.y >= INTERNAL_HEIGHT {
                    world.banner.active = false;
                    out_events.push(Event::BannerFinished { phase: world.phase });
                }
            }

            // Safety net: once no further placement is possible, the turret
            // phase has nothing left to wait for.
            if world.phase == Phase::Turret
                && !world.banner.active
                && world.turret_caps().exhausted()
            {
                world.timer_running = false;
                out_events.push(Event::TurretBudgetExhausted);
            }

            if world.phase == Phase::Combat && !world.banner.active {
                world.step_combat(dt, out_events);
            }

            if world.timer_running && !world.banner.active {
                world.time_left = world.time_left.saturating_sub(dt);
                out_events.push(Event::CountdownUpdated {
                    remaining: world.time_left,
                });
                if world.time_left.is_zero() {
                    world.timer_running = false;
                    out_events.push(Event::PhaseTimerExpired { phase: world.phase });
                }
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use bastion_defence_core::{
        IslandGeometry, Orientation, Phase, Piece, ProjectileKind, TileCoord, TileGrid, TurretCaps,
    };
    use glam::Vec2;

    use super::{CourtyardRegion, HoverGhost, World};

    /// Phase the simulation is currently in.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// One-based number of the current wave.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Remaining time on the phase countdown.
    #[must_use]
    pub fn time_left(world: &World) -> Duration {
        world.time_left
    }

    /// Whether the phase countdown is currently ticking.
    #[must_use]
    pub fn timer_running(world: &World) -> bool {
        world.timer_running
    }

    /// Scrolling banner overlay, if one is active.
    #[must_use]
    pub fn banner(world: &World) -> Option<BannerSnapshot> {
        world.banner.active.then_some(BannerSnapshot {
            text: world.banner.text,
            y: world.banner.y,
        })
    }

    /// The playfield tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> TileGrid {
        world.grid
    }

    /// The island ellipse carved into the playfield.
    #[must_use]
    pub fn island(world: &World) -> IslandGeometry {
        world.island
    }

    /// Every currently standing wall tile, in deterministic order.
    #[must_use]
    pub fn wall_tiles(world: &World) -> &BTreeSet<TileCoord> {
        &world.walls
    }

    /// Courtyard regions sorted by descending size.
    #[must_use]
    pub fn courtyard_regions(world: &World) -> &[CourtyardRegion] {
        &world.courtyards
    }

    /// Union of all courtyard region tiles.
    #[must_use]
    pub fn courtyard_tiles(world: &World) -> &BTreeSet<TileCoord> {
        &world.courtyard_tiles
    }

    /// Courtyard tiles not occupied by walls or turret footprints.
    #[must_use]
    pub fn empty_courtyard_tiles(world: &World) -> usize {
        world.empty_courtyard_tiles()
    }

    /// Current turret placement budgets.
    #[must_use]
    pub fn turret_caps(world: &World) -> TurretCaps {
        world.turret_caps()
    }

    /// Captures a read-only view of the standing turrets.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        TurretView {
            snapshots: world
                .turrets
                .iter()
                .map(|turret| TurretSnapshot {
                    anchor: turret.anchor,
                    orientation: turret.orientation,
                    life: turret.life,
                    placed_wave: turret.placed_wave,
                })
                .collect(),
        }
    }

    /// Captures a read-only view of the wave's boats.
    #[must_use]
    pub fn boat_view(world: &World) -> BoatView {
        BoatView {
            snapshots: world
                .boats
                .iter()
                .map(|boat| BoatSnapshot {
                    position: boat.position,
                    heading: boat.heading,
                    bob_phase: boat.bob_phase,
                    health: boat.health,
                })
                .collect(),
        }
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView {
            snapshots: world
                .projectiles
                .iter()
                .map(|projectile| ProjectileSnapshot {
                    position: projectile.position,
                    kind: projectile.kind,
                })
                .collect(),
        }
    }

    /// Current placement preview, if the cursor hovers the grid.
    #[must_use]
    pub fn hover(world: &World) -> Option<&HoverGhost> {
        world.hover.as_ref()
    }

    /// Wall piece pending placement.
    #[must_use]
    pub fn current_piece(world: &World) -> Piece {
        world.piece
    }

    /// Orientation the next turret would be placed with.
    #[must_use]
    pub fn turret_orientation(world: &World) -> Orientation {
        world.turret_orientation
    }

    /// Snapshot of the scrolling phase banner.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BannerSnapshot {
        /// Text displayed on the banner.
        pub text: &'static str,
        /// Vertical position of the banner's top edge in pixels.
        pub y: f32,
    }

    /// Immutable representation of a single turret's state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TurretSnapshot {
        /// Anchor tile of the turret footprint.
        pub anchor: TileCoord,
        /// Orientation of the two-cell footprint.
        pub orientation: Orientation,
        /// Waves remaining before the turret ages out.
        pub life: u8,
        /// Wave during which the turret was placed.
        pub placed_wave: u32,
    }

    impl TurretSnapshot {
        /// Cells occupied by the turret.
        #[must_use]
        pub const fn footprint(&self) -> [TileCoord; 2] {
            self.orientation.footprint(self.anchor)
        }
    }

    /// Read-only snapshot describing all standing turrets.
    #[derive(Clone, Debug, Default)]
    pub struct TurretView {
        snapshots: Vec<TurretSnapshot>,
    }

    impl TurretView {
        /// Iterator over the captured turret snapshots in placement order.
        pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<TurretSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single boat's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BoatSnapshot {
        /// Pixel-space position of the boat's centre.
        pub position: Vec2,
        /// Facing angle in radians.
        pub heading: f32,
        /// Phase offset of the idle bobbing animation.
        pub bob_phase: f32,
        /// Remaining hit points.
        pub health: u32,
    }

    /// Read-only snapshot describing the wave's boats.
    #[derive(Clone, Debug, Default)]
    pub struct BoatView {
        snapshots: Vec<BoatSnapshot>,
    }

    impl BoatView {
        /// Iterator over the captured boat snapshots in spawn order.
        pub fn iter(&self) -> impl Iterator<Item = &BoatSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<BoatSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a projectile in flight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Pixel-space position of the projectile.
        pub position: Vec2,
        /// Which side fired the projectile.
        pub kind: ProjectileKind,
    }

    /// Read-only snapshot describing the projectiles in flight.
    #[derive(Clone, Debug, Default)]
    pub struct ProjectileView {
        snapshots: Vec<ProjectileSnapshot>,
    }

    impl ProjectileView {
        /// Iterator over the captured projectile snapshots.
        pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
            self.snapshots
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_defence_core::GameOverReason;

    fn start_game(world: &mut World) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::StartGame, &mut events);
        events
    }

    fn tick(world: &mut World, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Tick { dt }, &mut events);
        events
    }

    #[test]
    fn new_world_starts_in_a_clean_lobby() {
        let world = World::new(1);
        assert_eq!(query::phase(&world), Phase::Lobby);
        assert!(query::wall_tiles(&world).is_empty());
        assert!(query::courtyard_regions(&world).is_empty());
        assert!(!query::timer_running(&world));
        assert!(query::banner(&world).is_none());
    }

    #[test]
    fn identical_seeds_draw_identical_pieces() {
        let mut first = World::new(5);
        let mut second = World::new(5);
        for _ in 0..8 {
            first.draw_piece();
            second.draw_piece();
            assert_eq!(first.piece, second.piece);
        }
    }

    #[test]
    fn start_game_opens_the_build_phase_behind_a_banner() {
        let mut world = World::new(2);
        let events = start_game(&mut world);

        assert_eq!(query::phase(&world), Phase::Build);
        assert!(events.contains(&Event::PhaseChanged {
            phase: Phase::Build,
            wave: 1,
        }));
        let banner = query::banner(&world).expect("build entry shows a banner");
        assert_eq!(banner.text, "Create your fortress");
        assert!(!query::timer_running(&world));
    }

    #[test]
    fn start_game_is_ignored_mid_game() {
        let mut world = World::new(2);
        let _ = start_game(&mut world);
        let events = start_game(&mut world);
        assert!(events.is_empty());
    }

    #[test]
    fn banner_scrolls_out_and_signals_completion() {
        let mut world = World::new(3);
        let _ = start_game(&mut world);

        let events = tick(&mut world, Duration::from_secs(3));
        assert!(events.contains(&Event::BannerFinished { phase: Phase::Build }));
        assert!(query::banner(&world).is_none());
    }

    #[test]
    fn countdown_runs_only_after_the_timer_starts() {
        let mut world = World::new(3);
        let _ = start_game(&mut world);
        let _ = tick(&mut world, Duration::from_secs(3));

        let mut events = Vec::new();
        apply(&mut world, Command::StartPhaseTimer, &mut events);
        assert!(query::timer_running(&world));
        assert_eq!(query::time_left(&world), ROUND_SECONDS);

        let events = tick(&mut world, Duration::from_secs(1));
        assert!(events.contains(&Event::CountdownUpdated {
            remaining: Duration::from_secs(29),
        }));
    }

    #[test]
    fn expiring_timer_emits_the_phase_transition_signal() {
        let mut world = World::new(3);
        let _ = start_game(&mut world);
        let _ = tick(&mut world, Duration::from_secs(3));
        let mut events = Vec::new();
        apply(&mut world, Command::StartPhaseTimer, &mut events);

        let events = tick(&mut world, Duration::from_secs(31));
        assert!(events.contains(&Event::PhaseTimerExpired { phase: Phase::Build }));
        assert!(!query::timer_running(&world));
        assert_eq!(query::time_left(&world), Duration::ZERO);
    }

    #[test]
    fn skip_phase_short_circuits_the_countdown() {
        let mut world = World::new(4);
        let _ = start_game(&mut world);

        let mut events = Vec::new();
        apply(&mut world, Command::SkipPhase, &mut events);
        assert!(events.contains(&Event::PhaseTimerExpired { phase: Phase::Build }));
        assert_eq!(query::time_left(&world), Duration::ZERO);
    }

    #[test]
    fn hovered_piece_places_walls_on_land() {
        let mut world = World::new(5);
        let _ = start_game(&mut world);
        world.piece = Piece::new(PieceKind::O, Rotation::default());

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetBuildHover {
                anchor: TileCoord::new(22, 17),
            },
            &mut events,
        );
        assert!(query::hover(&world).expect("hover set").valid);

        apply(&mut world, Command::PlaceWalls, &mut events);
        assert_eq!(query::wall_tiles(&world).len(), 4);
        assert!(query::wall_tiles(&world).contains(&TileCoord::new(22, 17)));
    }

    #[test]
    fn erase_removes_a_single_wall_tile_at_the_anchor() {
        let mut world = World::new(5);
        let _ = start_game(&mut world);
        world.piece = Piece::new(PieceKind::O, Rotation::default());

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetBuildHover {
                anchor: TileCoord::new(22, 17),
            },
            &mut events,
        );
        apply(&mut world, Command::PlaceWalls, &mut events);
        apply(&mut world, Command::EraseWall, &mut events);

        assert_eq!(query::wall_tiles(&world).len(), 3);
        assert!(!query::wall_tiles(&world).contains(&TileCoord::new(22, 17)));
    }

    #[test]
    fn water_hover_is_invalid_and_never_places() {
        let mut world = World::new(6);
        let _ = start_game(&mut world);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetBuildHover {
                anchor: TileCoord::new(0, 0),
            },
            &mut events,
        );
        assert!(!query::hover(&world).expect("hover set").valid);

        apply(&mut world, Command::PlaceWalls, &mut events);
        assert!(query::wall_tiles(&world).is_empty());
    }

    #[test]
    fn turret_placement_is_rejected_without_a_courtyard() {
        let mut world = World::new(7);
        let _ = start_game(&mut world);
        let mut events = Vec::new();
        apply(&mut world, Command::BeginTurretPhase, &mut events);

        apply(
            &mut world,
            Command::SetTurretHover {
                anchor: TileCoord::new(22, 17),
            },
            &mut events,
        );
        assert!(!query::hover(&world).expect("hover set").valid);

        apply(&mut world, Command::PlaceTurret, &mut events);
        assert!(query::turret_view(&world).into_vec().is_empty());
    }

    #[test]
    fn exhausted_turret_budget_trips_the_safety_net() {
        let mut world = World::new(8);
        let _ = start_game(&mut world);
        let mut events = Vec::new();
        apply(&mut world, Command::BeginTurretPhase, &mut events);
        let _ = tick(&mut world, Duration::from_secs(3));

        // No courtyard: both caps are 1, so a single standing turret
        // saturates the budget.
        world.turrets.push(Turret {
            anchor: TileCoord::new(22, 17),
            orientation: Orientation::Horizontal,
            life: 3,
            placed_wave: 1,
        });
        world.turrets_placed_this_wave = 1;

        let events = tick(&mut world, Duration::from_millis(16));
        assert!(events.contains(&Event::TurretBudgetExhausted));
    }

    #[test]
    fn boats_spawn_only_during_combat() {
        let mut world = World::new(9);
        let _ = start_game(&mut world);

        let spawn = Command::SpawnBoat {
            position: PixelPoint::new(10.0, 10.0),
            velocity: PixelPoint::new(1.0, 0.0),
            heading: 0.0,
            bob_phase: 0.0,
            health: 2,
            shot_cooldown: Duration::from_secs(1),
            shot_interval: Duration::from_secs(2),
        };

        let mut events = Vec::new();
        apply(&mut world, spawn.clone(), &mut events);
        assert!(query::boat_view(&world).into_vec().is_empty());

        apply(&mut world, Command::BeginTurretPhase, &mut events);
        apply(&mut world, Command::BeginCombatPhase, &mut events);
        apply(&mut world, spawn, &mut events);
        assert_eq!(query::boat_view(&world).into_vec().len(), 1);
    }

    #[test]
    fn next_wave_keeps_walls_and_ages_turrets() {
        let mut world = World::new(10);
        let _ = start_game(&mut world);
        world.piece = Piece::new(PieceKind::O, Rotation::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetBuildHover {
                anchor: TileCoord::new(22, 17),
            },
            &mut events,
        );
        apply(&mut world, Command::PlaceWalls, &mut events);

        world.turrets.push(Turret {
            anchor: TileCoord::new(25, 17),
            orientation: Orientation::Horizontal,
            life: 1,
            placed_wave: 1,
        });
        world.turrets.push(Turret {
            anchor: TileCoord::new(25, 19),
            orientation: Orientation::Horizontal,
            life: 3,
            placed_wave: 1,
        });

        apply(&mut world, Command::BeginTurretPhase, &mut events);
        apply(&mut world, Command::BeginCombatPhase, &mut events);
        apply(&mut world, Command::EndCombatAndStartNextWave, &mut events);

        assert_eq!(query::wave(&world), 2);
        assert_eq!(query::phase(&world), Phase::Build);
        assert_eq!(query::wall_tiles(&world).len(), 4, "walls survive the wave");
        let turrets = query::turret_view(&world).into_vec();
        assert_eq!(turrets.len(), 1, "spent turrets crumble");
        assert_eq!(turrets[0].life, 2);
    }

    #[test]
    fn begin_build_phase_only_fires_from_the_lobby() {
        let mut world = World::new(13);
        let mut events = Vec::new();
        apply(&mut world, Command::BeginBuildPhase, &mut events);
        assert_eq!(query::phase(&world), Phase::Build);

        events.clear();
        apply(&mut world, Command::BeginBuildPhase, &mut events);
        assert!(events.is_empty(), "re-entry outside the lobby must no-op");
    }

    #[test]
    fn rotate_turret_toggles_the_pending_orientation() {
        let mut world = World::new(14);
        let _ = start_game(&mut world);
        let mut events = Vec::new();
        apply(&mut world, Command::BeginTurretPhase, &mut events);

        assert_eq!(query::turret_orientation(&world), Orientation::Horizontal);
        apply(&mut world, Command::RotateTurret, &mut events);
        assert_eq!(query::turret_orientation(&world), Orientation::Vertical);
        apply(&mut world, Command::RotateTurret, &mut events);
        assert_eq!(query::turret_orientation(&world), Orientation::Horizontal);
    }

    #[test]
    fn end_game_stops_the_clock_and_reports_the_reason() {
        let mut world = World::new(11);
        let _ = start_game(&mut world);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::EndGame {
                reason: GameOverReason::NoCourtyard,
            },
            &mut events,
        );

        assert_eq!(query::phase(&world), Phase::GameOver);
        assert!(events.contains(&Event::GameEnded {
            reason: GameOverReason::NoCourtyard,
        }));
        assert!(!query::timer_running(&world));
        assert!(query::banner(&world).is_none());
    }

    #[test]
    fn reset_to_lobby_clears_the_fortress() {
        let mut world = World::new(12);
        let _ = start_game(&mut world);
        world.piece = Piece::new(PieceKind::O, Rotation::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetBuildHover {
                anchor: TileCoord::new(22, 17),
            },
            &mut events,
        );
        apply(&mut world, Command::PlaceWalls, &mut events);

        apply(&mut world, Command::ResetToLobby, &mut events);
        assert_eq!(query::phase(&world), Phase::Lobby);
        assert_eq!(query::wave(&world), 1);
        assert!(query::wall_tiles(&world).is_empty());
        assert!(query::hover(&world).is_none());
    }
}
