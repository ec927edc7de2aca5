//! Drawing surface abstraction
//!
//! The burst only needs three things from a 2D raster target: its extents,
//! clearing a rectangle, and painting a rotated filled rectangle whose
//! transform does not leak into later draws.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

/// A 2D target a burst paints onto
pub trait DrawSurface {
    /// Current drawable extents (width, height) in surface pixels
    fn size(&self) -> (f64, f64);

    /// Clear an axis-aligned rectangle
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    /// Fill a `size` rectangle centred on `center`, rotated by `radians`.
    /// The transform is scoped to this call.
    fn fill_rotated_rect(&mut self, center: Vec2, size: Vec2, radians: f32, color: &str);

    /// Clear everything inside the current extents
    fn clear_all(&mut self) {
        let (w, h) = self.size();
        self.clear_rect(0.0, 0.0, w, h);
    }
}

/// Something that can hand out a drawing surface (a canvas element, a test double)
pub trait SurfaceSource {
    type Surface: DrawSurface + 'static;

    /// `None` when no drawing context is available
    fn acquire(&self) -> Option<Self::Surface>;
}

/// Shared handle, so several bursts (and the test asserting on them) can use one surface
impl<S: DrawSurface> DrawSurface for Rc<RefCell<S>> {
    fn size(&self) -> (f64, f64) {
        self.borrow().size()
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.borrow_mut().clear_rect(x, y, w, h);
    }

    fn fill_rotated_rect(&mut self, center: Vec2, size: Vec2, radians: f32, color: &str) {
        self.borrow_mut().fill_rotated_rect(center, size, radians, color);
    }
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear { x: f64, y: f64, w: f64, h: f64 },
    Fill { center: Vec2, size: Vec2, radians: f32, color: String },
}

/// Headless surface that records every call.
///
/// Used by the native demo and by tests. Tracks which fills are still
/// visible, i.e. not covered by a later clear.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
    visible: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            visible: Vec::new(),
        }
    }

    /// Wrap in a shared handle
    pub fn shared(width: f64, height: f64) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(width, height)))
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Every call so far, in order
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Fills not yet wiped by a clear
    pub fn visible(&self) -> &[DrawOp] {
        &self.visible
    }

    pub fn clear_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Clear { .. }))
            .count()
    }

    pub fn fill_count(&self) -> usize {
        self.ops.len() - self.clear_count()
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.visible
            .retain(|op| !fill_touches(op, x, y, x + w, y + h));
        self.ops.push(DrawOp::Clear { x, y, w, h });
    }

    fn fill_rotated_rect(&mut self, center: Vec2, size: Vec2, radians: f32, color: &str) {
        let op = DrawOp::Fill {
            center,
            size,
            radians,
            color: color.to_string(),
        };
        // Pixels outside the surface are never stored
        if fill_touches(&op, 0.0, 0.0, self.width, self.height) {
            self.visible.push(op.clone());
        }
        self.ops.push(op);
    }
}

/// Whether a fill's bounding circle overlaps the box `[x0, x1] x [y0, y1]`
fn fill_touches(op: &DrawOp, x0: f64, y0: f64, x1: f64, y1: f64) -> bool {
    let DrawOp::Fill { center, size, .. } = op else {
        return false;
    };
    let reach = (size.length() / 2.0) as f64;
    let (cx, cy) = (center.x as f64, center.y as f64);
    cx + reach >= x0 && cx - reach <= x1 && cy + reach >= y0 && cy - reach <= y1
}

/// Source over a shared recording surface; `available = false` simulates
/// a canvas that refuses to give out a context.
#[derive(Debug, Clone)]
pub struct RecordingSource {
    pub surface: Rc<RefCell<RecordingSurface>>,
    pub available: bool,
}

impl RecordingSource {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            surface: RecordingSurface::shared(width, height),
            available: true,
        }
    }

    pub fn unavailable(width: f64, height: f64) -> Self {
        Self {
            available: false,
            ..Self::new(width, height)
        }
    }
}

impl SurfaceSource for RecordingSource {
    type Surface = Rc<RefCell<RecordingSurface>>;

    fn acquire(&self) -> Option<Self::Surface> {
        self.available.then(|| self.surface.clone())
    }
}
