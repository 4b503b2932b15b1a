//! Recording surface
//!
//! Captures draw calls as data. Used by tests to assert on what a model drew
//! and by the native runner, which has no window.

use super::{Color, Glow, Image, Stroke, Surface, TextStyle};
use crate::sim::{Rect, Vector2};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    FillRect(Rect, Color),
    StrokeRect(Rect, Stroke),
    FillCircle {
        center: Vector2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vector2,
        radius: f32,
        stroke: Stroke,
    },
    Line {
        from: Vector2,
        to: Vector2,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Vector2>,
        stroke: Stroke,
    },
    Text {
        text: String,
        pos: Vector2,
        style: TextStyle,
    },
    Image {
        width: u32,
        height: u32,
        generation: u64,
        dest: Rect,
    },
    Glow(Option<Glow>),
    Alpha(f32),
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All text strings drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for DrawList {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeRect(rect, stroke));
    }

    fn fill_circle(&mut self, center: Vector2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vector2, radius: f32, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            stroke,
        });
    }

    fn line(&mut self, from: Vector2, to: Vector2, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn polyline(&mut self, points: &[Vector2], stroke: Stroke) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke,
        });
    }

    fn text(&mut self, text: &str, pos: Vector2, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            style,
        });
    }

    fn draw_image(&mut self, image: &Image, dest: Rect) {
        self.commands.push(DrawCommand::Image {
            width: image.width,
            height: image.height,
            generation: image.generation,
            dest,
        });
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        self.commands.push(DrawCommand::Glow(glow));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Alpha(alpha));
    }
}
