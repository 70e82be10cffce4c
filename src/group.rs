//! The particle swarm bound to one surface.
//!
//! Every frame the group polls its text source. When the string changes it
//! renders the new text off-screen (draw, sample, clear), then reconciles the
//! particles by index: index `i` is sent to point `i`, missing indices are
//! spawned and surplus ones are dropped from the tail. Existing particles are
//! retargeted in place, which is what makes one string morph into the next.

use std::rc::Rc;

use image::Rgba;
use rand::rngs::StdRng;

use crate::particle::Particle;
use crate::sampler::{SAMPLE_GAP, sample_points};
use crate::scheduler::FrameScheduler;
use crate::surface::{RenderContext, usable_pixel_ratio};
use crate::types::{Point, TextAlign, TextBaseline, TextStyle};

/// Polled once per frame for the string to show.
pub type TextSource = Box<dyn FnMut() -> String>;

const TEXT_FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub struct ParticleGroup<C: RenderContext> {
    ctx: C,
    scheduler: Rc<FrameScheduler>,
    source: TextSource,
    text: String,
    font_size: f64,
    pixel_ratio: f64,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl<C: RenderContext> ParticleGroup<C> {
    /// `font_size` is in device pixels, already scaled by `pixel_ratio`.
    pub fn new(
        ctx: C,
        scheduler: Rc<FrameScheduler>,
        source: TextSource,
        font_size: f64,
        pixel_ratio: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            ctx,
            scheduler,
            source,
            text: String::new(),
            font_size,
            pixel_ratio: usable_pixel_ratio(pixel_ratio),
            particles: Vec::new(),
            rng,
        }
    }

    /// Wipe the whole surface to transparent.
    pub fn clear(&mut self) {
        let (w, h) = (self.ctx.width() as f64, self.ctx.height() as f64);
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    /// Reconcile particles with the current text. Returns `true` when the text
    /// changed; an unchanged string leaves the surface and particles alone.
    pub fn update(&mut self, now: f64) -> bool {
        let text = (self.source)();
        if text == self.text {
            return false;
        }

        self.clear();
        self.text = text;
        let (w, h) = (self.ctx.width(), self.ctx.height());
        let style = TextStyle {
            font_size: self.font_size,
            fill: TEXT_FILL,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        };
        self.ctx.fill_text(&self.text, w as f64 / 2.0, h as f64 / 2.0, &style);

        // The glyphs were only drawn to be measured.
        let points = self.points();
        self.clear();

        let before = self.particles.len();
        for (i, point) in points.iter().enumerate() {
            if i == self.particles.len() {
                self.particles.push(Particle::spawn(w, h, self.pixel_ratio, &mut self.rng));
            }
            self.particles[i].move_to(point.x as f64, point.y as f64, now, &self.scheduler);
        }
        self.particles.truncate(points.len());

        tracing::debug!(
            target: "particle_text",
            text = %self.text,
            points = points.len(),
            spawned = points.len().saturating_sub(before),
            trimmed = before.saturating_sub(points.len()),
            "text changed"
        );
        true
    }

    /// Sample whatever is on the surface right now.
    pub fn points(&self) -> Vec<Point> {
        sample_points(&self.ctx, SAMPLE_GAP)
    }

    /// One frame: clear, reconcile, paint every particle where it is.
    pub fn draw(&mut self, now: f64) {
        self.clear();
        self.update(now);
        for p in &self.particles {
            p.draw(&mut self.ctx);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The last string the group rendered.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }
}
