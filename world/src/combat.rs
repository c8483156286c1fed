//! Real-time combat step: boat motion and AI, projectile integration, and
//! collision resolution against walls and boats.

use std::collections::BTreeSet;
use std::time::Duration;

use bastion_defence_core::{
    boat_projectile_speed_for_wave, Event, Orientation, PixelPoint, ProjectileKind, TileCoord,
};
use glam::Vec2;

use crate::rng::SplitMix64;
use crate::{World, INTERNAL_HEIGHT, INTERNAL_WIDTH};

/// Boats reflect off the outer world edges inside this margin.
const WORLD_EDGE_MARGIN: f32 = 6.0;

/// Projectiles beyond this expanded bound are discarded.
const PROJECTILE_EXIT_MARGIN: f32 = 20.0;

/// Island collision ellipse scales; slightly larger than the visual island so
/// boats turn before their hulls touch the shore.
const ISLAND_BOUNCE_SCALE_X: f32 = 1.04;
const ISLAND_BOUNCE_SCALE_Y: f32 = 1.05;

/// Outward shove applied after an island bounce to avoid repeated overlap.
const ISLAND_PUSH_OUT: f32 = 8.0;

const BOAT_PROJECTILE_LIFE: Duration = Duration::from_millis(2500);

const TURRET_PROJECTILE_SPEED: f32 = 240.0;
const TURRET_PROJECTILE_LIFE: Duration = Duration::from_secs(2);

/// Distance from a boat's centre within which a turret shot connects.
const HIT_RADIUS: f32 = 10.0;

/// Enemy boat circling the island during combat.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Boat {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) heading: f32,
    pub(crate) bob_phase: f32,
    pub(crate) health: u32,
    pub(crate) shot_cooldown: Duration,
    pub(crate) shot_interval: Duration,
}

/// Projectile in flight, fired by either side.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Projectile {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) life: Duration,
    pub(crate) kind: ProjectileKind,
}

impl World {
    /// Advances boats and projectiles by one combat step.
    ///
    /// Ordering is fixed: boats move and shoot first, then projectiles
    /// integrate and resolve collisions. When boat fire removes the last
    /// wall tile the step emits [`Event::AllWallsDestroyed`] and abandons the
    /// remaining projectiles; the wave-clear report is suppressed for that
    /// step.
    pub(crate) fn step_combat(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let dt_secs = dt.as_secs_f32();
        let grid = self.grid;
        let island = self.island;
        let projectile_speed = boat_projectile_speed_for_wave(self.wave);

        for boat in self.boats.iter_mut() {
            boat.position += boat.velocity * dt_secs;

            if boat.position.x < WORLD_EDGE_MARGIN {
                boat.position.x = WORLD_EDGE_MARGIN;
                boat.velocity.x = -boat.velocity.x;
            }
            if boat.position.x > INTERNAL_WIDTH - WORLD_EDGE_MARGIN {
                boat.position.x = INTERNAL_WIDTH - WORLD_EDGE_MARGIN;
                boat.velocity.x = -boat.velocity.x;
            }
            if boat.position.y < WORLD_EDGE_MARGIN {
                boat.position.y = WORLD_EDGE_MARGIN;
                boat.velocity.y = -boat.velocity.y;
            }
            if boat.position.y > INTERNAL_HEIGHT - WORLD_EDGE_MARGIN {
                boat.position.y = INTERNAL_HEIGHT - WORLD_EDGE_MARGIN;
                boat.velocity.y = -boat.velocity.y;
            }

            let point = PixelPoint::new(boat.position.x, boat.position.y);
            if island.contains_scaled(point, ISLAND_BOUNCE_SCALE_X, ISLAND_BOUNCE_SCALE_Y) {
                let center = Vec2::new(island.center().x(), island.center().y());
                let normal = (boat.position - center).normalize_or_zero();

                // Reflect about the outward radial normal, but only when the
                // boat is actually moving inward.
                let inward = boat.velocity.dot(normal);
                if inward < 0.0 {
                    boat.velocity -= 2.0 * inward * normal;
                }
                boat.position += normal * ISLAND_PUSH_OUT;
            }

            boat.heading = boat.velocity.y.atan2(boat.velocity.x);

            boat.shot_cooldown = boat.shot_cooldown.saturating_sub(dt);
            if boat.shot_cooldown.is_zero() {
                boat.shot_cooldown = boat.shot_interval;
                if let Some(target) = pick_wall_tile(&self.walls, &mut self.combat_rng) {
                    let center = grid.tile_center(target);
                    let to_target = Vec2::new(center.x(), center.y()) - boat.position;
                    self.projectiles.push(Projectile {
                        position: boat.position,
                        velocity: to_target.normalize_or_zero() * projectile_speed,
                        life: BOAT_PROJECTILE_LIFE,
                        kind: ProjectileKind::Boat,
                    });
                }
            }
        }

        let mut index = 0;
        while index < self.projectiles.len() {
            let mut projectile = self.projectiles[index];
            projectile.position += projectile.velocity * dt_secs;
            projectile.life = projectile.life.saturating_sub(dt);

            if projectile.life.is_zero() || outside_expanded_bounds(projectile.position) {
                let _ = self.projectiles.remove(index);
                continue;
            }
            self.projectiles[index] = projectile;

            match projectile.kind {
                ProjectileKind::Boat => {
                    let tile = grid.tile_containing(PixelPoint::new(
                        projectile.position.x,
                        projectile.position.y,
                    ));
                    if self.walls.remove(&tile) {
                        let _ = self.projectiles.remove(index);
                        self.recompute_courtyards();

                        if self.walls.is_empty() {
                            out_events.push(Event::AllWallsDestroyed);
                            return;
                        }
                        continue;
                    }
                    index += 1;
                }
                ProjectileKind::Turret => {
                    let mut hit = None;
                    for (boat_index, boat) in self.boats.iter_mut().enumerate().rev() {
                        let offset = boat.position - projectile.position;
                        if offset.length_squared() <= HIT_RADIUS * HIT_RADIUS {
                            boat.health = boat.health.saturating_sub(1);
                            hit = Some(boat_index);
                            break;
                        }
                    }

                    if let Some(boat_index) = hit {
                        if self.boats[boat_index].health == 0 {
                            let _ = self.boats.remove(boat_index);
                        }
                        let _ = self.projectiles.remove(index);
                        continue;
                    }
                    index += 1;
                }
            }
        }

        if self.boats.is_empty() {
            out_events.push(Event::WaveCleared { wave: self.wave });
        }
    }

    /// Fires one shot from every turret that still sits on courtyard ground.
    ///
    /// Eligibility is re-checked at fire time because enclosure may have
    /// changed since placement; ineligible turrets stay standing but silent.
    pub(crate) fn fire_turrets(&mut self, aim: PixelPoint) {
        let aim = Vec2::new(aim.x(), aim.y());
        let tile_length = self.grid.tile_length();

        for turret in &self.turrets {
            let footprint = turret.footprint();
            if !footprint
                .iter()
                .all(|cell| self.courtyard_tiles.contains(cell))
            {
                continue;
            }

            let (width, height) = match turret.orientation {
                Orientation::Horizontal => (2.0, 1.0),
                Orientation::Vertical => (1.0, 2.0),
            };
            let origin = Vec2::new(
                (turret.anchor.x() as f32 + width * 0.5) * tile_length,
                (turret.anchor.y() as f32 + height * 0.5) * tile_length,
            );

            self.projectiles.push(Projectile {
                position: origin,
                velocity: (aim - origin).normalize_or_zero() * TURRET_PROJECTILE_SPEED,
                life: TURRET_PROJECTILE_LIFE,
                kind: ProjectileKind::Turret,
            });
        }
    }
}

fn outside_expanded_bounds(position: Vec2) -> bool {
    position.x < -PROJECTILE_EXIT_MARGIN
        || position.y < -PROJECTILE_EXIT_MARGIN
        || position.x > INTERNAL_WIDTH + PROJECTILE_EXIT_MARGIN
        || position.y > INTERNAL_HEIGHT + PROJECTILE_EXIT_MARGIN
}

fn pick_wall_tile(walls: &BTreeSet<TileCoord>, rng: &mut SplitMix64) -> Option<TileCoord> {
    if walls.is_empty() {
        return None;
    }
    let index = rng.next_index(walls.len());
    walls.iter().nth(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_defence_core::{Orientation, Phase};
    use crate::turrets::Turret;

    fn combat_world() -> World {
        let mut world = World::new(99);
        world.phase = Phase::Combat;
        world
    }

    fn idle_boat(position: Vec2) -> Boat {
        Boat {
            position,
            velocity: Vec2::ZERO,
            heading: 0.0,
            bob_phase: 0.0,
            health: 1,
            shot_cooldown: Duration::from_secs(60),
            shot_interval: Duration::from_secs(60),
        }
    }

    #[test]
    fn boats_reflect_off_the_world_edge() {
        let mut world = combat_world();
        let mut boat = idle_boat(Vec2::new(8.0, 100.0));
        boat.velocity = Vec2::new(-40.0, 0.0);
        world.boats.push(boat);

        let mut events = Vec::new();
        world.step_combat(Duration::from_millis(100), &mut events);

        let boat = world.boats[0];
        assert!((boat.position.x - WORLD_EDGE_MARGIN).abs() < f32::EPSILON);
        assert!(boat.velocity.x > 0.0);
    }

    #[test]
    fn inward_boats_bounce_off_the_island_and_get_pushed_out() {
        let mut world = combat_world();
        let center = world.island.center();
        let mut boat = idle_boat(Vec2::new(center.x() + 20.0, center.y()));
        boat.velocity = Vec2::new(-30.0, 0.0);
        world.boats.push(boat);

        let mut events = Vec::new();
        world.step_combat(Duration::from_millis(16), &mut events);

        let boat = world.boats[0];
        assert!(boat.velocity.x > 0.0, "velocity must reflect outward");
        assert!(boat.position.x > center.x() + 20.0, "boat must be pushed out");
    }

    #[test]
    fn cooled_down_boats_fire_at_an_existing_wall() {
        let mut world = combat_world();
        let wall = TileCoord::new(24, 18);
        let _ = world.walls.insert(wall);
        let mut boat = idle_boat(Vec2::new(40.0, 40.0));
        boat.shot_cooldown = Duration::ZERO;
        world.boats.push(boat);

        let mut events = Vec::new();
        world.step_combat(Duration::from_millis(16), &mut events);

        assert_eq!(world.projectiles.len(), 1);
        let projectile = world.projectiles[0];
        assert_eq!(projectile.kind, ProjectileKind::Boat);
        // Aimed from the boat toward the wall centre: down and to the right.
        assert!(projectile.velocity.x > 0.0);
        assert!(projectile.velocity.y > 0.0);
        assert_eq!(world.boats[0].shot_cooldown, world.boats[0].shot_interval);
    }

    #[test]
    fn boats_hold_fire_with_no_walls_standing() {
        let mut world = combat_world();
        let mut boat = idle_boat(Vec2::new(40.0, 40.0));
        boat.shot_cooldown = Duration::ZERO;
        world.boats.push(boat);

        let mut events = Vec::new();
        world.step_combat(Duration::from_millis(16), &mut events);

        assert!(world.projectiles.is_empty());
    }

    #[test]
    fn destroying_the_last_wall_reports_defeat_not_wave_clear() {
        let mut world = combat_world();
        let wall = TileCoord::new(20, 15);
        let _ = world.walls.insert(wall);

        let impact = world.grid.tile_center(wall);
        world.projectiles.push(Projectile {
            position: Vec2::new(impact.x(), impact.y()),
            velocity: Vec2::ZERO,
            life: Duration::from_secs(1),
            kind: ProjectileKind::Boat,
        });

        let mut events = Vec::new();
        world.step_combat(Duration::from_millis(16), &mut events);

        assert!(world.walls.is_empty());
        assert!(world.projectiles.is_empty());
        assert!(events.contains(&Event::AllWallsDestroyed));
        assert!(
            !events.iter().any(|event| matches!(event, Event::WaveCleared { .. })),
            "defeat must suppress the wave-clear report",
        );
    }

    #[test]
    fn turret_shots_wound_and_sink_boats() {
        let mut world = combat_world();
        world.boats.push(idle_boat(Vec2::new(40.0, 40.0)));
        world.projectiles.push(Projectile {
            position: Vec2::new(44.0, 40.0),
            velocity: Vec2::ZERO,
            life: Duration::from_secs(1),
            kind: ProjectileKind::Turret,
        });

        let mut events = Vec::new();
        world.step_combat(Duration::from_millis(16), &mut events);

        assert!(world.boats.is_empty());
        assert!(world.projectiles.is_empty());
        assert!(events.contains(&Event::WaveCleared { wave: 1 }));
    }

    #[test]
    fn turrets_outside_the_courtyard_do_not_fire() {
        let mut world = combat_world();
        let anchor = TileCoord::new(22, 17);
        world.turrets.push(Turret {
            anchor,
            orientation: Orientation::Horizontal,
            life: 3,
            placed_wave: 1,
        });

        world.fire_turrets(PixelPoint::new(0.0, 0.0));
        assert!(world.projectiles.is_empty());
        assert_eq!(world.turrets.len(), 1, "silent turrets stay standing");

        for cell in Orientation::Horizontal.footprint(anchor) {
            let _ = world.courtyard_tiles.insert(cell);
        }
        world.fire_turrets(PixelPoint::new(0.0, 0.0));
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.projectiles[0].kind, ProjectileKind::Turret);
    }
}
