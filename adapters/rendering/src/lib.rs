#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Bastion Defence adapters.
//!
//! The simulation exposes read-only snapshots; adapters condense them into a
//! [`Scene`] — a backend-agnostic description of one frame — and hand it to a
//! [`RenderingBackend`] for presentation. Nothing in this crate draws pixels;
//! it only fixes the vocabulary shared between the simulation queries and
//! whatever surface ultimately displays them.

use std::time::Duration;

use anyhow::Result as AnyResult;
use bastion_defence_core::{
    IslandGeometry, Orientation, Phase, PixelPoint, ProjectileKind, TileCoord, TileGrid,
};
use glam::Vec2;

/// Turret visible within the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneTurret {
    /// Anchor tile of the turret footprint.
    pub anchor: TileCoord,
    /// Orientation of the two-cell footprint.
    pub orientation: Orientation,
    /// Waves remaining before the turret ages out.
    pub life: u8,
}

impl SceneTurret {
    /// Cells occupied by the turret.
    #[must_use]
    pub const fn footprint(&self) -> [TileCoord; 2] {
        self.orientation.footprint(self.anchor)
    }
}

/// Boat visible within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBoat {
    /// Pixel-space position of the boat's centre.
    pub position: Vec2,
    /// Facing angle in radians.
    pub heading: f32,
    /// Remaining hit points.
    pub health: u32,
}

/// Projectile visible within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Pixel-space position of the projectile.
    pub position: Vec2,
    /// Which side fired the projectile.
    pub kind: ProjectileKind,
}

/// Placement preview shown under the cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneHover {
    /// Cells the pending piece or turret would occupy.
    pub cells: Vec<TileCoord>,
    /// Whether committing at this location would currently succeed.
    pub valid: bool,
}

/// Scrolling phase banner overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneBanner {
    /// Text displayed on the banner.
    pub text: String,
    /// Vertical position of the banner's top edge in pixels.
    pub y: f32,
}

/// Backend-agnostic description of one frame of the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the playfield.
    pub tile_grid: TileGrid,
    /// Island ellipse carved into the playfield.
    pub island: IslandGeometry,
    /// Phase the simulation is currently in.
    pub phase: Phase,
    /// One-based number of the current wave.
    pub wave: u32,
    /// Remaining time on the phase countdown.
    pub time_left: Duration,
    /// Standing wall tiles.
    pub walls: Vec<TileCoord>,
    /// Tiles belonging to enclosed courtyards.
    pub courtyard_tiles: Vec<TileCoord>,
    /// Turrets standing on the island.
    pub turrets: Vec<SceneTurret>,
    /// Boats circling the island.
    pub boats: Vec<SceneBoat>,
    /// Projectiles in flight.
    pub projectiles: Vec<SceneProjectile>,
    /// Placement preview under the cursor, if any.
    pub hover: Option<SceneHover>,
    /// Scrolling banner overlay, if active.
    pub banner: Option<SceneBanner>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    #[allow(clippy::too_many_arguments)] // Scene construction intentionally enumerates every channel explicitly.
    pub fn new(
        tile_grid: TileGrid,
        island: IslandGeometry,
        phase: Phase,
        wave: u32,
        time_left: Duration,
        walls: Vec<TileCoord>,
        courtyard_tiles: Vec<TileCoord>,
        turrets: Vec<SceneTurret>,
        boats: Vec<SceneBoat>,
        projectiles: Vec<SceneProjectile>,
        hover: Option<SceneHover>,
        banner: Option<SceneBanner>,
    ) -> Self {
        Self {
            tile_grid,
            island,
            phase,
            wave,
            time_left,
            walls,
            courtyard_tiles,
            turrets,
            boats,
            projectiles,
            hover,
            banner,
        }
    }

    /// Reports whether the provided tile lies on the visible island.
    #[must_use]
    pub fn is_island_tile(&self, tile: TileCoord) -> bool {
        self.island
            .contains_scaled(self.tile_grid.tile_center(tile), 1.0, 1.0)
    }

    /// Tile under the provided pixel-space position, if it is on the grid.
    #[must_use]
    pub fn tile_under(&self, position: Vec2) -> Option<TileCoord> {
        let tile = self
            .tile_grid
            .tile_containing(PixelPoint::new(position.x, position.y));
        self.tile_grid.contains(tile).then_some(tile)
    }
}

/// Presentation surface capable of displaying Bastion Defence scenes.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}
