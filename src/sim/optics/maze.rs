//! Recursive-division maze
//!
//! The border band is solid absorber. The remaining play rectangle is split by
//! walls with one gap each until regions fall below `min_region` cells, then
//! the corners holding the source and the target are cleared.

use rand::Rng;
use rand_pcg::Pcg32;

use super::grid::{GridPos, Material, WallGrid};
use crate::settings::OpticsConfig;

/// Offset of source/target from the play-area corners (cells)
const ENDPOINT_INSET: i32 = 10;
/// Cleared square around each endpoint
const CLEAR_INSET: i32 = 2;
const CLEAR_SIZE: i32 = 40;
/// Walls stay this far from the region edges along the split axis
const SPLIT_PAD: i32 = 20;
/// Smallest region that can still take a wall; anything below is a leaf
pub const MIN_SPLIT_REGION: usize = 2 * SPLIT_PAD as usize;

/// Where the level's endpoints ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MazeLayout {
    pub source: GridPos,
    pub target: GridPos,
    /// Play rectangle `(x, y, w, h)` in cells
    pub play: (i32, i32, i32, i32),
}

impl MazeLayout {
    /// Squares around source and target that are always air
    pub fn cleared_regions(&self) -> [(i32, i32, i32, i32); 2] {
        let (x, y, w, h) = self.play;
        [
            (x + CLEAR_INSET, y + CLEAR_INSET, CLEAR_SIZE, CLEAR_SIZE),
            (
                x + w - CLEAR_INSET - CLEAR_SIZE,
                y + h - CLEAR_INSET - CLEAR_SIZE,
                CLEAR_SIZE,
                CLEAR_SIZE,
            ),
        ]
    }
}

/// Regenerate `grid` in place
pub fn generate(grid: &mut WallGrid, config: &OpticsConfig, rng: &mut Pcg32) -> MazeLayout {
    let cols = grid.cols() as i32;
    let rows = grid.rows() as i32;
    grid.fill(Material::Air);

    let margin_x = (cols as f32 * config.margin_fraction).floor() as i32;
    let margin_y = (rows as f32 * config.margin_fraction).floor() as i32;
    let play_w = cols - 2 * margin_x;
    let play_h = rows - 2 * margin_y;

    grid.fill_rect(0, 0, cols, margin_y, Material::Absorber);
    grid.fill_rect(0, rows - margin_y, cols, margin_y, Material::Absorber);
    grid.fill_rect(0, margin_y, margin_x, play_h, Material::Absorber);
    grid.fill_rect(cols - margin_x, margin_y, margin_x, play_h, Material::Absorber);

    divide(grid, config, rng, margin_x, margin_y, play_w, play_h);

    let layout = MazeLayout {
        source: (margin_x + ENDPOINT_INSET, margin_y + ENDPOINT_INSET),
        target: (cols - margin_x - ENDPOINT_INSET, rows - margin_y - ENDPOINT_INSET),
        play: (margin_x, margin_y, play_w, play_h),
    };
    for (x, y, w, h) in layout.cleared_regions() {
        grid.fill_rect(x, y, w, h, Material::Air);
    }
    layout
}

fn divide(grid: &mut WallGrid, config: &OpticsConfig, rng: &mut Pcg32, x: i32, y: i32, w: i32, h: i32) {
    let min = config.min_region.max(MIN_SPLIT_REGION) as i32;
    if w < min || h < min {
        return;
    }

    // Favor cutting across the longer side
    let horizontal = if w as f32 > h as f32 * 1.5 {
        false
    } else if h as f32 > w as f32 * 1.5 {
        true
    } else {
        rng.random_bool(0.5)
    };

    // Both halves shrink by at least SPLIT_PAD, so the recursion bottoms out
    let thickness = (config.wall_thickness as i32).clamp(1, SPLIT_PAD);
    let gap = config.gap_size as i32;

    if horizontal {
        let wall_y = (y as f32 + SPLIT_PAD as f32 + rng.random::<f32>() * (h - 2 * SPLIT_PAD) as f32).floor() as i32;
        grid.fill_rect(x, wall_y, w, thickness, Material::Absorber);
        let gap = gap.min(w);
        let gap_x = (x as f32 + rng.random::<f32>() * (w - gap) as f32).floor() as i32;
        grid.fill_rect(gap_x, wall_y, gap, thickness, Material::Air);

        divide(grid, config, rng, x, y, w, wall_y - y);
        divide(grid, config, rng, x, wall_y + thickness, w, y + h - wall_y - thickness);
    } else {
        let wall_x = (x as f32 + SPLIT_PAD as f32 + rng.random::<f32>() * (w - 2 * SPLIT_PAD) as f32).floor() as i32;
        grid.fill_rect(wall_x, y, thickness, h, Material::Absorber);
        let gap = gap.min(h);
        let gap_y = (y as f32 + rng.random::<f32>() * (h - gap) as f32).floor() as i32;
        grid.fill_rect(wall_x, gap_y, thickness, gap, Material::Air);

        divide(grid, config, rng, x, y, wall_x - x, h);
        divide(grid, config, rng, wall_x + thickness, y, x + w - wall_x - thickness, h);
    }
}
