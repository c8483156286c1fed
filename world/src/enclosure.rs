//! Boundary-seeded courtyard detector for the island wall layout.

use std::collections::VecDeque;

use bastion_defence_core::{TileBounds, TileCoord};

/// Enclosed pockets smaller than this are ignored as degenerate.
const MIN_REGION_TILES: usize = 6;

const DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Connected component of land tiles unreachable from the grid boundary
/// without crossing a wall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourtyardRegion {
    tiles: Vec<TileCoord>,
    bounds: TileBounds,
}

impl CourtyardRegion {
    /// Tiles that compose the region, in discovery order.
    #[must_use]
    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    /// Bounding box enclosing every tile of the region.
    #[must_use]
    pub const fn bounds(&self) -> TileBounds {
        self.bounds
    }

    /// Number of tiles contained in the region.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tiles.len()
    }
}

/// Dense flood-fill workspace reused across courtyard recomputations.
///
/// The land mask is fixed per island geometry and computed once; the
/// reachability and component buffers are cleared on every rebuild so the
/// detector can run after each placement or erase without allocating.
#[derive(Clone, Debug)]
pub(crate) struct CourtyardField {
    width: i32,
    height: i32,
    land: Vec<bool>,
    reachable: Vec<bool>,
    enclosed: Vec<bool>,
    visited: Vec<bool>,
    queue: VecDeque<TileCoord>,
}

impl CourtyardField {
    /// Creates a field for the provided grid, sampling the land mask once.
    pub(crate) fn new<F>(width: u32, height: u32, is_land: F) -> Self
    where
        F: Fn(TileCoord) -> bool,
    {
        let width = width as i32;
        let height = height as i32;
        let cell_count = (width * height).max(0) as usize;

        let mut land = vec![false; cell_count];
        for y in 0..height {
            for x in 0..width {
                land[(y * width + x) as usize] = is_land(TileCoord::new(x, y));
            }
        }

        Self {
            width,
            height,
            land,
            reachable: vec![false; cell_count],
            enclosed: vec![false; cell_count],
            visited: vec![false; cell_count],
            queue: VecDeque::new(),
        }
    }

    /// Recomputes the courtyard regions for the provided wall layout.
    ///
    /// Deterministic and idempotent: the same wall set always yields the same
    /// region list, sorted by descending size.
    pub(crate) fn rebuild<F>(&mut self, is_wall: F) -> Vec<CourtyardRegion>
    where
        F: Fn(TileCoord) -> bool,
    {
        self.reachable.fill(false);
        self.enclosed.fill(false);
        self.visited.fill(false);
        self.queue.clear();

        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }

        // Seed from every boundary tile, water and land alike.
        for x in 0..self.width {
            self.seed(TileCoord::new(x, 0), &is_wall);
            self.seed(TileCoord::new(x, self.height - 1), &is_wall);
        }
        for y in 0..self.height {
            self.seed(TileCoord::new(0, y), &is_wall);
            self.seed(TileCoord::new(self.width - 1, y), &is_wall);
        }

        while let Some(tile) = self.queue.pop_front() {
            for (dx, dy) in DIRS {
                let next = tile.offset_by(dx, dy);
                let Some(index) = self.index(next) else {
                    continue;
                };
                if self.reachable[index] || is_wall(next) {
                    continue;
                }
                self.reachable[index] = true;
                self.queue.push_back(next);
            }
        }

        // Enclosed tiles are land, not walls, and cut off from the boundary.
        for y in 0..self.height {
            for x in 0..self.width {
                let tile = TileCoord::new(x, y);
                let index = (y * self.width + x) as usize;
                self.enclosed[index] =
                    self.land[index] && !self.reachable[index] && !is_wall(tile);
            }
        }

        let mut regions = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let start = TileCoord::new(x, y);
                let start_index = (y * self.width + x) as usize;
                if !self.enclosed[start_index] || self.visited[start_index] {
                    continue;
                }

                let mut tiles = Vec::new();
                let mut bounds = TileBounds::at(start);
                self.visited[start_index] = true;
                self.queue.push_back(start);

                while let Some(tile) = self.queue.pop_front() {
                    tiles.push(tile);
                    bounds = bounds.including(tile);

                    for (dx, dy) in DIRS {
                        let next = tile.offset_by(dx, dy);
                        let Some(index) = self.index(next) else {
                            continue;
                        };
                        if !self.enclosed[index] || self.visited[index] {
                            continue;
                        }
                        self.visited[index] = true;
                        self.queue.push_back(next);
                    }
                }

                regions.push(CourtyardRegion { tiles, bounds });
            }
        }

        regions.retain(|region| region.size() >= MIN_REGION_TILES);
        regions.sort_by(|a, b| b.size().cmp(&a.size()));
        regions
    }

    fn seed<F>(&mut self, tile: TileCoord, is_wall: &F)
    where
        F: Fn(TileCoord) -> bool,
    {
        let Some(index) = self.index(tile) else {
            return;
        };
        if self.reachable[index] || is_wall(tile) {
            return;
        }
        self.reachable[index] = true;
        self.queue.push_back(tile);
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.x() >= 0 && tile.y() >= 0 && tile.x() < self.width && tile.y() < self.height {
            Some((tile.y() * self.width + tile.x()) as usize)
        } else {
            None
        }
    }
}
