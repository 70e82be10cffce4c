// Software drawing surface: an RGBA pixel buffer with just enough 2D context
// to render particle text (clear, bitmap text, readback, filled circles).
// Visual: nothing is on screen until the host composites it into a FrameBuffer.

use std::cell::RefCell;
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use crate::font::{lit_cells, text_width_cells, GLYPH_HEIGHT};
use crate::surface::{RenderContext, Surface};
use crate::types::{ContextOptions, FrameBuffer, TextAlign, TextBaseline, TextStyle};

// Size of a freshly created surface before the caller applies its own.
const DEFAULT_WIDTH: u32 = 300;
const DEFAULT_HEIGHT: u32 = 150;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Caller-owned surface. Clones share the same pixels.
#[derive(Clone)]
pub struct Canvas {
    pixels: Rc<RefCell<RgbaImage>>,
    pixel_ratio: f64,
}

impl Canvas {
    pub fn new(pixel_ratio: f64) -> Self {
        Self {
            pixels: Rc::new(RefCell::new(RgbaImage::new(DEFAULT_WIDTH, DEFAULT_HEIGHT))),
            pixel_ratio,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.borrow().width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.borrow().height()
    }

    /// Flatten the RGBA pixels over an opaque `background` (0x00RRGGBB) into `fb`.
    /// Visual: what the window shows; transparent areas show the background.
    pub fn composite_into(&self, fb: &mut FrameBuffer, background: u32) {
        let img = self.pixels.borrow();
        let (w, h) = (img.width() as usize, img.height() as usize);
        if fb.width != w || fb.height != h {
            fb.width = w;
            fb.height = h;
            fb.pixels.resize(w * h, 0);
        }

        let bg = [(background >> 16) & 0xFF, (background >> 8) & 0xFF, background & 0xFF];
        for (out, px) in fb.pixels.iter_mut().zip(img.pixels()) {
            let a = px[3] as u32;
            let mix = |c: u8, b: u32| (c as u32 * a + b * (255 - a) + 127) / 255;
            *out = (mix(px[0], bg[0]) << 16) | (mix(px[1], bg[1]) << 8) | mix(px[2], bg[2]);
        }
    }
}

impl Surface for Canvas {
    type Context = CanvasContext;

    fn set_size(&mut self, width: u32, height: u32) {
        *self.pixels.borrow_mut() = RgbaImage::new(width, height);
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn context_2d(&mut self, _options: ContextOptions) -> Option<CanvasContext> {
        // Pixels already live on the CPU, so the readback hint changes nothing here.
        Some(CanvasContext { pixels: Rc::clone(&self.pixels) })
    }
}

pub struct CanvasContext {
    pixels: Rc<RefCell<RgbaImage>>,
}

impl CanvasContext {
    /// Overwrite one pixel, no blending. Out of bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        let mut img = self.pixels.borrow_mut();
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, color);
        }
    }
}

impl RenderContext for CanvasContext {
    fn width(&self) -> u32 {
        self.pixels.borrow().width()
    }

    fn height(&self) -> u32 {
        self.pixels.borrow().height()
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut img = self.pixels.borrow_mut();
        let Some((x0, y0, x1, y1)) = clip(&img, x, y, x + width, y + height) else { return };
        for py in y0..y1 {
            for px in x0..x1 {
                img.put_pixel(px, py, TRANSPARENT);
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        // One font cell is a square block; 7 cells make up the font size.
        let cell = style.font_size / GLYPH_HEIGHT as f64;
        if !(cell > 0.0) {
            return;
        }
        let text_w = text_width_cells(text) as f64 * cell;
        let text_h = GLYPH_HEIGHT as f64 * cell;
        let left = match style.align {
            TextAlign::Start => x,
            TextAlign::Center => x - text_w / 2.0,
            TextAlign::End => x - text_w,
        };
        let top = match style.baseline {
            TextBaseline::Top => y,
            TextBaseline::Middle => y - text_h / 2.0,
            TextBaseline::Bottom => y - text_h,
        };

        let mut img = self.pixels.borrow_mut();
        let Some((bx0, by0, bx1, by1)) = clip(&img, left, top, left + text_w, top + text_h) else { return };
        let span = (bx1 - bx0) as usize;

        // Cells never overlap, so summed per-pixel coverage stays within 0..=1
        // and shared cell edges come out solid.
        let mut coverage = vec![0.0f64; span * (by1 - by0) as usize];
        for (cx, cy) in lit_cells(text) {
            let (x0, x1) = (left + cx as f64 * cell, left + (cx + 1) as f64 * cell);
            let (y0, y1) = (top + cy as f64 * cell, top + (cy + 1) as f64 * cell);
            let Some((px0, py0, px1, py1)) = clip(&img, x0, y0, x1, y1) else { continue };
            for py in py0..py1 {
                let cov_y = overlap(py, y0, y1);
                for px in px0..px1 {
                    let i = (py - by0) as usize * span + (px - bx0) as usize;
                    coverage[i] += overlap(px, x0, x1) * cov_y;
                }
            }
        }

        for (i, cov) in coverage.into_iter().enumerate() {
            let alpha = (style.fill[3] as f64 * cov.min(1.0)).round() as u8;
            if alpha == 0 {
                continue;
            }
            let (px, py) = (bx0 + (i % span) as u32, by0 + (i / span) as u32);
            let mut src = style.fill;
            src[3] = alpha;
            blend_over(img.get_pixel_mut(px, py), src);
        }
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        let img = self.pixels.borrow();
        if x < img.width() && y < img.height() { *img.get_pixel(x, y) } else { TRANSPARENT }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
        if !(radius > 0.0) {
            return;
        }
        let mut img = self.pixels.borrow_mut();
        let Some((x0, y0, x1, y1)) = clip(&img, cx - radius, cy - radius, cx + radius + 1.0, cy + radius + 1.0)
        else {
            return;
        };
        let r2 = radius * radius;
        // Scan just the bounding box; a pixel is inside when its centre is.
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    blend_over(img.get_pixel_mut(px, py), color);
                }
            }
        }
    }
}

/// Clamp a float rectangle to whole pixels inside the image. `None` when empty.
fn clip(img: &RgbaImage, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<(u32, u32, u32, u32)> {
    let x0 = x0.floor().max(0.0);
    let y0 = y0.floor().max(0.0);
    let x1 = x1.ceil().min(img.width() as f64);
    let y1 = y1.ceil().min(img.height() as f64);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// Length of `[lo, hi)` that falls inside pixel `p`, in `0..=1`.
#[inline]
fn overlap(p: u32, lo: f64, hi: f64) -> f64 {
    let p = p as f64;
    ((p + 1.0).min(hi) - p.max(lo)).clamp(0.0, 1.0)
}

/// Source-over blend of a straight-alpha colour onto a straight-alpha pixel.
#[inline]
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    if src[3] == 255 {
        *dst = src;
        return;
    }
    let sa = src[3] as f64 / 255.0;
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = TRANSPARENT;
        return;
    }
    for c in 0..3 {
        let v = (src[c] as f64 * sa + dst[c] as f64 * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}
