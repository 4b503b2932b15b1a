//! CPU-side RGBA raster used as an offscreen buffer

use std::sync::atomic::{AtomicU64, Ordering};

use super::color::Color;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Generations are unique across every image, so a surface can key its upload
/// cache on the generation alone
fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// RGBA8 image. `generation` changes on every write so surfaces can cache uploads.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub generation: u64,
}

impl Image {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            generation: next_generation(),
        }
    }

    /// Reallocate for a new size (contents are cleared)
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
        self.generation = next_generation();
    }

    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        self.generation = next_generation();
    }

    /// Write one pixel without bumping the generation; call `touch` after a batch
    #[inline]
    pub fn put(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&color.to_rgba8());
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Mark the contents as changed
    pub fn touch(&mut self) {
        self.generation = next_generation();
    }
}
