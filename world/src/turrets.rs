//! Turret registry and the courtyard-derived placement constraint engine.

use std::collections::BTreeSet;

use bastion_defence_core::{Orientation, TileCoord, TurretCaps};

use crate::{HoverGhost, World};

/// Waves a freshly placed turret survives before aging out.
pub(crate) const TURRET_LIFE: u8 = 3;

/// Empty courtyard tiles required per additional turret in a single wave.
const TILES_PER_WAVE_TURRET: usize = 20;

/// Hard ceiling on turret placements within one wave.
const WAVE_TURRET_CAP: u32 = 4;

/// Empty courtyard tiles required per turret in the total cap.
const TILES_PER_TOTAL_TURRET: usize = 6;

/// Turret stored inside the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Turret {
    pub(crate) anchor: TileCoord,
    pub(crate) orientation: Orientation,
    pub(crate) life: u8,
    pub(crate) placed_wave: u32,
}

impl Turret {
    pub(crate) fn footprint(&self) -> [TileCoord; 2] {
        self.orientation.footprint(self.anchor)
    }
}

impl World {
    /// Counts courtyard tiles not occupied by walls or turret footprints.
    pub(crate) fn empty_courtyard_tiles(&self) -> usize {
        if self.courtyard_tiles.is_empty() {
            return 0;
        }

        let occupied = self.turret_occupied_tiles();
        self.courtyard_tiles
            .iter()
            .filter(|tile| !self.walls.contains(*tile) && !occupied.contains(*tile))
            .count()
    }

    pub(crate) fn max_turrets_this_wave(&self) -> u32 {
        let earned = 1 + (self.empty_courtyard_tiles() / TILES_PER_WAVE_TURRET) as u32;
        earned.min(WAVE_TURRET_CAP)
    }

    pub(crate) fn max_total_turrets(&self) -> u32 {
        ((self.empty_courtyard_tiles() / TILES_PER_TOTAL_TURRET) as u32).max(1)
    }

    pub(crate) fn turret_caps(&self) -> TurretCaps {
        TurretCaps {
            placed_this_wave: self.turrets_placed_this_wave,
            total: self.turrets.len() as u32,
            max_this_wave: self.max_turrets_this_wave(),
            max_total: self.max_total_turrets(),
        }
    }

    /// Resolves the turret placement preview for the provided anchor.
    ///
    /// Validity covers grid bounds, courtyard membership, wall and turret
    /// overlap, and both placement budgets.
    pub(crate) fn resolve_turret_hover(&self, anchor: TileCoord) -> HoverGhost {
        let cells = self.turret_orientation.footprint(anchor);
        let mut valid = !self.turret_caps().exhausted();

        for cell in cells {
            if !self.grid.contains(cell)
                || !self.courtyard_tiles.contains(&cell)
                || self.walls.contains(&cell)
                || self.turret_covering(cell).is_some()
            {
                valid = false;
                break;
            }
        }

        HoverGhost {
            anchor,
            cells: cells.to_vec(),
            valid,
        }
    }

    /// Commits the hovered turret placement, re-validating every constraint.
    ///
    /// The cached hover validity is never trusted: budgets and occupancy are
    /// re-evaluated against the current state before anything mutates.
    pub(crate) fn place_hovered_turret(&mut self) {
        let Some(anchor) = self.hover.as_ref().map(|ghost| ghost.anchor) else {
            return;
        };
        if !self.resolve_turret_hover(anchor).valid {
            return;
        }

        self.turrets.push(Turret {
            anchor,
            orientation: self.turret_orientation,
            life: TURRET_LIFE,
            placed_wave: self.wave,
        });
        self.turrets_placed_this_wave += 1;

        self.recompute_courtyards();
        self.refresh_hover();
    }

    /// Removes the first turret whose footprint covers the hover anchor.
    ///
    /// The per-wave counter is only refunded for turrets placed this wave.
    pub(crate) fn erase_turret_at_hover(&mut self) {
        let Some(anchor) = self.hover.as_ref().map(|ghost| ghost.anchor) else {
            return;
        };
        if let Some(index) = self.turret_covering(anchor) {
            let removed = self.turrets.remove(index);
            if removed.placed_wave == self.wave {
                self.turrets_placed_this_wave = self.turrets_placed_this_wave.saturating_sub(1);
            }
        }

        self.recompute_courtyards();
        self.refresh_hover();
    }

    /// Index of the first turret whose footprint includes the provided tile.
    pub(crate) fn turret_covering(&self, tile: TileCoord) -> Option<usize> {
        self.turrets
            .iter()
            .position(|turret| turret.footprint().contains(&tile))
    }

    fn turret_occupied_tiles(&self) -> BTreeSet<TileCoord> {
        let mut occupied = BTreeSet::new();
        for turret in &self.turrets {
            for cell in turret.footprint() {
                let _ = occupied.insert(cell);
            }
        }
        occupied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_defence_core::Orientation;

    fn world_with_square_courtyard(side: i32) -> World {
        let mut world = World::new(11);
        for y in 0..side {
            for x in 0..side {
                let _ = world.courtyard_tiles.insert(TileCoord::new(10 + x, 10 + y));
            }
        }
        world
    }

    #[test]
    fn wave_budget_grows_with_empty_space_and_caps_at_four() {
        let world = world_with_square_courtyard(5);
        assert_eq!(world.empty_courtyard_tiles(), 25);
        assert_eq!(world.max_turrets_this_wave(), 2);

        let world = world_with_square_courtyard(12);
        assert_eq!(world.empty_courtyard_tiles(), 144);
        assert_eq!(world.max_turrets_this_wave(), 4);
    }

    #[test]
    fn total_cap_never_drops_below_one() {
        let world = World::new(11);
        assert_eq!(world.empty_courtyard_tiles(), 0);
        assert_eq!(world.max_total_turrets(), 1);
        assert_eq!(world.max_turrets_this_wave(), 1);
    }

    #[test]
    fn turret_footprints_reduce_the_empty_count() {
        let mut world = world_with_square_courtyard(5);
        world.turrets.push(Turret {
            anchor: TileCoord::new(10, 10),
            orientation: Orientation::Horizontal,
            life: TURRET_LIFE,
            placed_wave: 1,
        });
        assert_eq!(world.empty_courtyard_tiles(), 23);
    }

    #[test]
    fn hover_rejects_footprints_straddling_the_courtyard_edge() {
        let mut world = world_with_square_courtyard(3);
        world.turret_orientation = Orientation::Horizontal;

        assert!(world.resolve_turret_hover(TileCoord::new(10, 10)).valid);
        // Anchor on the eastern rim: second cell falls outside the courtyard.
        assert!(!world.resolve_turret_hover(TileCoord::new(12, 10)).valid);
    }

    #[test]
    fn hover_rejects_overlap_with_standing_turrets() {
        let mut world = world_with_square_courtyard(4);
        world.turrets.push(Turret {
            anchor: TileCoord::new(10, 10),
            orientation: Orientation::Horizontal,
            life: TURRET_LIFE,
            placed_wave: 1,
        });

        assert!(!world.resolve_turret_hover(TileCoord::new(11, 10)).valid);
        assert!(world.resolve_turret_hover(TileCoord::new(10, 12)).valid);
    }
}
