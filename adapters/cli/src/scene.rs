//! Condenses world snapshots into presentation scenes.

use bastion_defence_rendering::{
    Scene, SceneBanner, SceneBoat, SceneHover, SceneProjectile, SceneTurret,
};
use bastion_defence_world::{query, World};

pub(crate) fn build_scene(world: &World) -> Scene {
    Scene::new(
        query::tile_grid(world),
        query::island(world),
        query::phase(world),
        query::wave(world),
        query::time_left(world),
        query::wall_tiles(world).iter().copied().collect(),
        query::courtyard_tiles(world).iter().copied().collect(),
        query::turret_view(world)
            .iter()
            .map(|turret| SceneTurret {
                anchor: turret.anchor,
                orientation: turret.orientation,
                life: turret.life,
            })
            .collect(),
        query::boat_view(world)
            .iter()
            .map(|boat| SceneBoat {
                position: boat.position,
                heading: boat.heading,
                health: boat.health,
            })
            .collect(),
        query::projectile_view(world)
            .iter()
            .map(|projectile| SceneProjectile {
                position: projectile.position,
                kind: projectile.kind,
            })
            .collect(),
        query::hover(world).map(|ghost| SceneHover {
            cells: ghost.cells.clone(),
            valid: ghost.valid,
        }),
        query::banner(world).map(|banner| SceneBanner {
            text: banner.text.to_owned(),
            y: banner.y,
        }),
    )
}
