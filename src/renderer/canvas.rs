//! Canvas2D surface (browser only)

use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use super::{Color, Glow, Image, Stroke, Surface, TextAlign, TextStyle};
use crate::sim::{Rect, Vector2};

/// `Surface` over a `CanvasRenderingContext2d`.
///
/// Raster images are uploaded to an offscreen canvas and re-uploaded only when
/// the generation differs from the last upload. Generations are unique across
/// images, so alternating between two same-sized images always re-uploads.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
    offscreen: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
    /// Generation of the image currently in `offscreen`
    uploaded: Option<u64>,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = context_2d(canvas)?;
        Ok(Self {
            ctx,
            width: canvas.width() as f32,
            height: canvas.height() as f32,
            offscreen: None,
            uploaded: None,
        })
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn apply_stroke(&self, stroke: Stroke) {
        self.ctx.set_stroke_style_str(&stroke.color.css());
        self.ctx.set_line_width(stroke.width as f64);
        let dash = js_sys::Array::new();
        if let Some((on, off)) = stroke.dash {
            dash.push(&JsValue::from_f64(on as f64));
            dash.push(&JsValue::from_f64(off as f64));
        }
        let _ = self.ctx.set_line_dash(&dash);
    }

    fn upload(&mut self, image: &Image) -> Result<(), JsValue> {
        if self.uploaded == Some(image.generation) && self.offscreen.is_some() {
            return Ok(());
        }
        if self.offscreen.is_none() {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| JsValue::from_str("no document"))?;
            let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
            let ctx = context_2d(&canvas)?;
            self.offscreen = Some((canvas, ctx));
        }
        if let Some((canvas, ctx)) = &self.offscreen {
            if canvas.width() != image.width || canvas.height() != image.height {
                canvas.set_width(image.width);
                canvas.set_height(image.height);
            }
            let data = ImageData::new_with_u8_clamped_array_and_sh(
                Clamped(&image.pixels),
                image.width,
                image.height,
            )?;
            ctx.put_image_data(&data, 0.0, 0.0)?;
        }
        self.uploaded = Some(image.generation);
        Ok(())
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.apply_stroke(stroke);
        self.ctx
            .stroke_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
    }

    fn fill_circle(&mut self, center: Vector2, radius: f32, color: Color) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius.max(0.0) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Vector2, radius: f32, stroke: Stroke) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius.max(0.0) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.apply_stroke(stroke);
        self.ctx.stroke();
    }

    fn line(&mut self, from: Vector2, to: Vector2, stroke: Stroke) {
        self.polyline(&[from, to], stroke);
    }

    fn polyline(&mut self, points: &[Vector2], stroke: Stroke) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.apply_stroke(stroke);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.ctx.stroke();
    }

    fn text(&mut self, text: &str, pos: Vector2, style: TextStyle) {
        let family = if style.monospace { "monospace" } else { "sans-serif" };
        self.ctx.set_font(&format!("{}px {}", style.size, family));
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&style.color.css());
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }

    fn draw_image(&mut self, image: &Image, dest: Rect) {
        if let Err(e) = self.upload(image) {
            log::warn!("Image upload failed: {:?}", e);
            return;
        }
        if let Some((canvas, _)) = &self.offscreen {
            self.ctx.set_image_smoothing_enabled(false);
            let _ = self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
                canvas,
                dest.x as f64,
                dest.y as f64,
                dest.w as f64,
                dest.h as f64,
            );
        }
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        match glow {
            Some(g) => {
                self.ctx.set_shadow_blur(g.blur as f64);
                self.ctx.set_shadow_color(&g.color.css());
            }
            None => self.ctx.set_shadow_blur(0.0),
        }
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }
}
