//! Full-field TE stencil on a staggered (Yee) grid
//!
//! `Ez` lives at cell centers, `Hx` on horizontal edges and `Hy` on vertical
//! edges. Each sub-step updates H from the curl of Ez, then Ez from the curl
//! of H (leapfrog). Reflector cells clamp Ez to zero; absorber cells damp it.

use super::grid::{GridPos, METAL, Material, WALL, WallGrid};
use crate::renderer::{Color, Image};

/// Courant factor (c·dt/dx); below 1/√2 for stability in 2D
const COURANT: f32 = 0.5;
/// Ez kept per sub-step inside absorber cells
const ABSORBER_DAMPING: f32 = 0.9;
/// |Ez| at the target needed to count as illuminated
const SIGNAL_THRESHOLD: f32 = 0.05;
const SIGNAL_RISE: f32 = 0.5;
const SIGNAL_FALL: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct StencilField {
    cols: usize,
    rows: usize,
    ez: Vec<f32>,
    hx: Vec<f32>,
    hy: Vec<f32>,
    /// Source phase (radians)
    phase: f32,
    /// Smoothed signal 0-100
    signal: f32,
}

impl StencilField {
    pub fn new(cols: usize, rows: usize) -> Self {
        let n = cols * rows;
        Self {
            cols,
            rows,
            ez: vec![0.0; n],
            hx: vec![0.0; n],
            hy: vec![0.0; n],
            phase: 0.0,
            signal: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.ez.fill(0.0);
        self.hx.fill(0.0);
        self.hy.fill(0.0);
        self.phase = 0.0;
        self.signal = 0.0;
    }

    pub fn signal(&self) -> f32 {
        self.signal
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        x + y * self.cols
    }

    /// Ez at a cell (zero outside)
    pub fn ez_at(&self, cell: GridPos) -> f32 {
        let (x, y) = cell;
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return 0.0;
        }
        self.ez[self.idx(x as usize, y as usize)]
    }

    /// Sum of Ez² over the grid
    pub fn energy(&self) -> f32 {
        self.ez.iter().map(|e| e * e).sum()
    }

    /// One leapfrog sub-step with a sinusoidal source at `source`
    pub fn step(&mut self, grid: &WallGrid, source: GridPos, frequency: f32) {
        let (cols, rows) = (self.cols, self.rows);
        if cols < 2 || rows < 2 {
            return;
        }

        // H from the curl of Ez
        for y in 0..rows - 1 {
            for x in 0..cols - 1 {
                let i = self.idx(x, y);
                let ez = self.ez[i];
                self.hx[i] -= COURANT * (self.ez[i + cols] - ez);
                self.hy[i] += COURANT * (self.ez[i + 1] - ez);
            }
        }

        // Ez from the curl of H, interior only so the rim stays zero
        for y in 1..rows - 1 {
            for x in 1..cols - 1 {
                let i = self.idx(x, y);
                let curl = (self.hy[i] - self.hy[i - 1]) - (self.hx[i] - self.hx[i - cols]);
                self.ez[i] += COURANT * curl;
                match grid.get(x as i32, y as i32) {
                    Material::Air => {}
                    Material::Reflector => self.ez[i] = 0.0,
                    Material::Absorber => self.ez[i] *= ABSORBER_DAMPING,
                }
            }
        }

        self.phase += frequency;
        let (sx, sy) = source;
        if sx > 0 && sy > 0 && (sx as usize) < cols - 1 && (sy as usize) < rows - 1 {
            let i = self.idx(sx as usize, sy as usize);
            self.ez[i] = self.phase.sin();
        }
    }

    /// Ramp the signal up or down by whether the target is lit
    pub fn sample_signal(&mut self, target: GridPos) -> f32 {
        if self.ez_at(target).abs() > SIGNAL_THRESHOLD {
            self.signal += SIGNAL_RISE;
        } else {
            self.signal -= SIGNAL_FALL;
        }
        self.signal = self.signal.clamp(0.0, 100.0);
        self.signal
    }

    /// Rasterize Ez (red positive, blue negative) over the walls, one pixel per cell
    pub fn render_into(&self, grid: &WallGrid, image: &mut Image) {
        if image.width != self.cols as u32 || image.height != self.rows as u32 {
            image.resize(self.cols as u32, self.rows as u32);
        }
        for y in 0..self.rows {
            for x in 0..self.cols {
                let color = match grid.get(x as i32, y as i32) {
                    Material::Absorber => WALL,
                    Material::Reflector => METAL,
                    Material::Air => {
                        let v = (self.ez[self.idx(x, y)] * 255.0).clamp(-255.0, 255.0);
                        if v >= 0.0 {
                            Color::rgb(v as u8, 0, 0)
                        } else {
                            Color::rgb(0, 0, (-v) as u8)
                        }
                    }
                };
                image.put(x as u32, y as u32, color);
            }
        }
        image.touch();
    }
}
