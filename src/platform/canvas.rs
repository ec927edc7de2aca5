//! Canvas 2D drawing surface

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::confetti::{DrawSurface, SurfaceSource};

/// A `<canvas>` element that hands out 2D contexts
#[derive(Debug, Clone)]
pub struct CanvasSource {
    canvas: HtmlCanvasElement,
}

impl CanvasSource {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl SurfaceSource for CanvasSource {
    type Surface = CanvasSurface;

    fn acquire(&self) -> Option<CanvasSurface> {
        let ctx = self
            .canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(CanvasSurface {
            canvas: self.canvas.clone(),
            ctx,
        })
    }
}

/// Drawing through a canvas 2D context, in CSS pixels
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl DrawSurface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (
            self.canvas.client_width() as f64,
            self.canvas.client_height() as f64,
        )
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.clear_rect(x, y, w, h);
    }

    fn fill_rotated_rect(&mut self, center: Vec2, size: Vec2, radians: f32, color: &str) {
        let (w, h) = (size.x as f64, size.y as f64);
        self.ctx.save();
        let _ = self.ctx.translate(center.x as f64, center.y as f64);
        let _ = self.ctx.rotate(radians as f64);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(-w / 2.0, -h / 2.0, w, h);
        self.ctx.restore();
    }
}

/// Size the backing store to client size x device pixel ratio and scale the
/// context so drawing stays in CSS pixels
pub fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) {
    let dpr = window.device_pixel_ratio();
    let width = (canvas.client_width() as f64 * dpr).floor() as u32;
    let height = (canvas.client_height() as f64 * dpr).floor() as u32;
    canvas.set_width(width);
    canvas.set_height(height);

    if let Some(ctx) = CanvasSource::new(canvas.clone()).acquire() {
        let _ = ctx.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    }
    log::debug!("Canvas fitted to {}x{} (dpr {})", width, height, dpr);
}
