//! Browser platform layer
//!
//! Implements the collaborator traits on top of web-sys:
//! - `canvas`: Canvas 2D drawing surface and DPR fitting
//! - `frames`: `requestAnimationFrame` / `setTimeout` scheduler
//! - `page`: DOM-backed `PageHost` and theme application

pub mod canvas;
pub mod frames;
pub mod page;

pub use canvas::{CanvasSource, CanvasSurface, fit_canvas};
pub use frames::RafScheduler;
pub use page::{DomPage, apply_theme};
