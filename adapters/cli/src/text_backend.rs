//! ASCII frame presenter for terminal runs.

use std::io::{self, Write};

use anyhow::{Context, Result};
use bastion_defence_core::{ProjectileKind, TileCoord};
use bastion_defence_rendering::{RenderingBackend, Scene};

/// Renders scenes as character grids on standard output.
///
/// Glyphs: `~` water, `.` island, `,` courtyard, `#` wall, `T` turret,
/// `B` boat, `*`/`o` boat/turret projectile, `+`/`x` valid/invalid hover.
#[derive(Debug, Default)]
pub(crate) struct AsciiBackend;

impl AsciiBackend {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl RenderingBackend for AsciiBackend {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        let columns = scene.tile_grid.columns() as usize;
        let rows = scene.tile_grid.rows() as usize;

        let mut glyphs: Vec<Vec<char>> = (0..rows)
            .map(|y| {
                (0..columns)
                    .map(|x| {
                        if scene.is_island_tile(TileCoord::new(x as i32, y as i32)) {
                            '.'
                        } else {
                            '~'
                        }
                    })
                    .collect()
            })
            .collect();

        for tile in &scene.courtyard_tiles {
            put(&mut glyphs, *tile, ',');
        }
        for tile in &scene.walls {
            put(&mut glyphs, *tile, '#');
        }
        for turret in &scene.turrets {
            for cell in turret.footprint() {
                put(&mut glyphs, cell, 'T');
            }
        }
        if let Some(hover) = &scene.hover {
            let glyph = if hover.valid { '+' } else { 'x' };
            for cell in &hover.cells {
                put(&mut glyphs, *cell, glyph);
            }
        }
        for projectile in &scene.projectiles {
            if let Some(tile) = scene.tile_under(projectile.position) {
                let glyph = match projectile.kind {
                    ProjectileKind::Boat => '*',
                    ProjectileKind::Turret => 'o',
                };
                put(&mut glyphs, tile, glyph);
            }
        }
        for boat in &scene.boats {
            if let Some(tile) = scene.tile_under(boat.position) {
                put(&mut glyphs, tile, 'B');
            }
        }

        let mut frame = format!(
            "-- {:?} | wave {} | {:>2}s --\n",
            scene.phase,
            scene.wave,
            scene.time_left.as_secs(),
        );
        if let Some(banner) = &scene.banner {
            frame.push_str(&format!(">> {} <<\n", banner.text));
        }
        for row in glyphs {
            frame.extend(row);
            frame.push('\n');
        }

        io::stdout()
            .lock()
            .write_all(frame.as_bytes())
            .context("failed to write ASCII frame")
    }
}

fn put(glyphs: &mut [Vec<char>], tile: TileCoord, glyph: char) {
    let Ok(y) = usize::try_from(tile.y()) else {
        return;
    };
    let Ok(x) = usize::try_from(tile.x()) else {
        return;
    };
    if let Some(row) = glyphs.get_mut(y) {
        if let Some(slot) = row.get_mut(x) {
            *slot = glyph;
        }
    }
}
