//! Material grid for the optics maze
//!
//! Cells are addressed as `x + y * cols`. Anything outside the grid reads as
//! absorber so rays and brushes fail closed.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SandboxError;
use crate::renderer::{Color, Image};
use crate::sim::Vector2;

/// Integer grid coordinate
pub type GridPos = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Air,
    /// Perfect conductor
    Reflector,
    /// Wall
    Absorber,
}

impl Material {
    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Air => "air",
            Material::Reflector => "reflector",
            Material::Absorber => "absorber",
        }
    }
}

impl FromStr for Material {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "air" | "0" => Ok(Material::Air),
            "reflector" | "metal" | "1" => Ok(Material::Reflector),
            "absorber" | "wall" | "2" => Ok(Material::Absorber),
            _ => Err(SandboxError::UnknownMaterial(s.to_string())),
        }
    }
}

const BACKGROUND: Color = Color::hex(0x111111);
pub(super) const WALL: Color = Color::hex(0x444444);
pub(super) const METAL: Color = Color::hex(0x8899aa);

#[derive(Debug, Clone, PartialEq)]
pub struct WallGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Material>,
}

impl WallGrid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Material::Air; cols * rows],
        }
    }

    /// Grid covering a `width` x `height` pixel canvas at `scale` pixels per cell
    pub fn for_canvas(width: f32, height: f32, scale: f32) -> Self {
        let cols = (width.max(0.0) / scale).ceil() as usize;
        let rows = (height.max(0.0) / scale).ceil() as usize;
        Self::new(cols, rows)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows
    }

    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| x as usize + y as usize * self.cols)
    }

    /// Material at a cell; out of bounds is absorber
    pub fn get(&self, x: i32, y: i32) -> Material {
        self.index(x, y)
            .map(|i| self.cells[i])
            .unwrap_or(Material::Absorber)
    }

    /// Out-of-bounds writes are dropped
    pub fn set(&mut self, x: i32, y: i32, material: Material) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = material;
        }
    }

    pub fn fill(&mut self, material: Material) {
        self.cells.fill(material);
    }

    /// Fill a cell rectangle, clipped to the grid
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, material: Material) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.cols as i32);
        let y1 = (y + h).min(self.rows as i32);
        for j in y0..y1 {
            for i in x0..x1 {
                self.cells[i as usize + j as usize * self.cols] = material;
            }
        }
    }

    /// Paint a filled disc of `radius` cells
    pub fn paint_disc(&mut self, cx: i32, cy: i32, radius: i32, material: Material) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.set(cx + dx, cy + dy, material);
                }
            }
        }
    }

    /// Cell containing a pixel position
    pub fn cell_at(pos: Vector2, scale: f32) -> GridPos {
        ((pos.x / scale).floor() as i32, (pos.y / scale).floor() as i32)
    }

    /// Pixel position of a cell origin (mirrors and endpoints anchor here)
    pub fn cell_origin(cell: GridPos, scale: f32) -> Vector2 {
        Vector2::new(cell.0 as f32 * scale, cell.1 as f32 * scale)
    }

    pub fn count(&self, material: Material) -> usize {
        self.cells.iter().filter(|&&m| m == material).count()
    }

    /// Rasterize one pixel per cell
    pub fn render_into(&self, image: &mut Image) {
        image.resize(self.cols as u32, self.rows as u32);
        image.fill(BACKGROUND);
        for y in 0..self.rows {
            for x in 0..self.cols {
                let color = match self.cells[x + y * self.cols] {
                    Material::Air => continue,
                    Material::Reflector => METAL,
                    Material::Absorber => WALL,
                };
                image.put(x as u32, y as u32, color);
            }
        }
        image.touch();
    }
}
