// Turns rendered glyph pixels into target points.

use image::Rgba;

use crate::surface::RenderContext;
use crate::types::Point;

/// Distance between sampled pixels on both axes.
pub const SAMPLE_GAP: usize = 6;

/// A pixel belongs to the text when it is black with any coverage at all.
/// Anti-aliased edges of other colours and the cleared background are rejected.
#[inline]
pub fn is_glyph_pixel(px: Rgba<u8>) -> bool {
    let [r, g, b, a] = px.0;
    r == 0 && g == 0 && b == 0 && a > 0
}

/// Scan the surface on a `gap`-pixel grid, column by column (x outer, y inner).
/// The order matters: particle `i` is sent to point `i`.
pub fn sample_points(ctx: &impl RenderContext, gap: usize) -> Vec<Point> {
    let (w, h) = (ctx.width(), ctx.height());
    let mut points = Vec::new();
    for x in (0..w).step_by(gap.max(1)) {
        for y in (0..h).step_by(gap.max(1)) {
            if is_glyph_pixel(ctx.pixel(x, y)) {
                points.push(Point::new(x, y));
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, CanvasContext};
    use crate::surface::Surface;
    use crate::types::ContextOptions;
    use proptest::prelude::*;

    fn blank(width: u32, height: u32) -> (Canvas, CanvasContext) {
        let mut canvas = Canvas::new(1.0);
        canvas.set_size(width, height);
        let ctx = canvas.context_2d(ContextOptions::default()).unwrap();
        (canvas, ctx)
    }

    #[test]
    fn blank_surface_has_no_points() {
        let (_canvas, ctx) = blank(60, 60);
        assert!(sample_points(&ctx, SAMPLE_GAP).is_empty());
    }

    #[test]
    fn only_grid_pixels_are_read_in_column_order() {
        let (_canvas, mut ctx) = blank(30, 30);
        let black = Rgba([0, 0, 0, 255]);
        for (x, y) in [(12, 6), (6, 18), (6, 0), (7, 7), (13, 12)] {
            ctx.put_pixel(x, y, black);
        }
        let points = sample_points(&ctx, SAMPLE_GAP);
        assert_eq!(points, vec![Point::new(6, 0), Point::new(6, 18), Point::new(12, 6)]);
    }

    #[test]
    fn sampling_is_deterministic() {
        let (_canvas, mut ctx) = blank(50, 40);
        for i in 0..40 {
            ctx.put_pixel((i * 7) % 50, (i * 11) % 40, Rgba([0, 0, 0, 1 + i as u8]));
        }
        assert_eq!(sample_points(&ctx, SAMPLE_GAP), sample_points(&ctx, SAMPLE_GAP));
    }

    proptest! {
        #[test]
        fn colour_gate(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), a in any::<u8>()) {
            let (_canvas, mut ctx) = blank(12, 12);
            ctx.put_pixel(6, 6, Rgba([r, g, b, a]));
            let accepted = sample_points(&ctx, SAMPLE_GAP).contains(&Point::new(6, 6));
            prop_assert_eq!(accepted, r == 0 && g == 0 && b == 0 && a > 0);
        }
    }
}
