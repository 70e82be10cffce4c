//! The drawing capability the particle pipeline consumes.
//!
//! A [`Surface`] is the caller-owned target (sized, with a pixel ratio); the
//! [`RenderContext`] it hands out does all the drawing and pixel readback.

use image::Rgba;

use crate::types::{ContextOptions, TextStyle};

pub trait Surface {
    type Context: RenderContext + 'static;

    /// Resize the drawing target. Resizing resets it to transparent.
    fn set_size(&mut self, width: u32, height: u32);

    /// Device pixels per logical pixel.
    fn pixel_ratio(&self) -> f64;

    /// `None` when no 2D context can be provided.
    fn context_2d(&mut self, options: ContextOptions) -> Option<Self::Context>;
}

pub trait RenderContext {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Reset a rectangle to transparent black.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);

    /// Colour and alpha at `(x, y)`. Out of range reads are transparent.
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8>;

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba<u8>);
}

/// Ratios that are zero, negative or not finite fall back to 1.
pub fn usable_pixel_ratio(ratio: f64) -> f64 {
    if ratio > 0.0 && ratio.is_finite() { ratio } else { 1.0 }
}
