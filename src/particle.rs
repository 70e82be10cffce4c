// One dot of the swarm.
// Visual: a small translucent dark circle that glides to wherever the text needs it.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use image::Rgba;
use rand::Rng;

use crate::scheduler::{FrameScheduler, Tick};
use crate::surface::{RenderContext, usable_pixel_ratio};

/// How long every move takes, in milliseconds.
pub const MOVE_DURATION_MS: f64 = 500.0;
/// Radius range before scaling by the pixel ratio.
pub const MIN_RADIUS: f64 = 1.3;
pub const MAX_RADIUS: f64 = 4.0;
/// #544544f0
pub const PARTICLE_COLOR: Rgba<u8> = Rgba([0x54, 0x45, 0x44, 0xF0]);

/// A move in flight: straight line, constant speed, fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Motion {
    start: (f64, f64),
    target: (f64, f64),
    speed: (f64, f64), // px per ms on each axis
    started_at: f64,
}

#[derive(Debug)]
struct Body {
    x: f64,
    y: f64,
    motion: Option<Motion>,
    // Bumped on every move_to so superseded step tasks can tell they are stale.
    generation: u64,
}

impl Body {
    fn step(&mut self, now: f64, generation: u64) -> Tick {
        if generation != self.generation {
            return Tick::Done;
        }
        let Some(m) = self.motion else { return Tick::Done };

        let t = (now - m.started_at).max(0.0);
        if t >= MOVE_DURATION_MS {
            // Land exactly; start + speed * t drifts by rounding.
            (self.x, self.y) = m.target;
            self.motion = None;
            return Tick::Done;
        }
        self.x = m.start.0 + m.speed.0 * t;
        self.y = m.start.1 + m.speed.1 * t;
        Tick::Continue
    }
}

/// Handle to a particle. Its motion task shares the body, so a particle dropped
/// mid-move finishes moving unseen.
#[derive(Debug)]
pub struct Particle {
    radius: f64,
    body: Rc<RefCell<Body>>,
}

impl Particle {
    /// A resting particle at `(x, y)`.
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            radius,
            body: Rc::new(RefCell::new(Body { x, y, motion: None, generation: 0 })),
        }
    }

    /// Spawn on the circle inscribed in a `width` x `height` surface at a random
    /// angle, with a random radius scaled by `pixel_ratio`.
    pub fn spawn(width: u32, height: u32, pixel_ratio: f64, rng: &mut impl Rng) -> Self {
        let pixel_ratio = usable_pixel_ratio(pixel_ratio);
        let radius = rng.gen_range(MIN_RADIUS * pixel_ratio..MAX_RADIUS * pixel_ratio);
        let angle = rng.gen_range(0.0..TAU);
        let (w, h) = (width as f64, height as f64);
        let r = w.min(h) / 2.0;
        Self::new(w / 2.0 + r * angle.cos(), h / 2.0 + r * angle.sin(), radius)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn position(&self) -> (f64, f64) {
        let body = self.body.borrow();
        (body.x, body.y)
    }

    /// Where the particle is heading, if it is moving.
    pub fn target(&self) -> Option<(f64, f64)> {
        self.body.borrow().motion.map(|m| m.target)
    }

    pub fn is_animating(&self) -> bool {
        self.body.borrow().motion.is_some()
    }

    /// Start moving from the current position to `(tx, ty)`, replacing any move
    /// in flight. The first step runs now; later steps run on scheduler ticks.
    pub fn move_to(&self, tx: f64, ty: f64, now: f64, scheduler: &FrameScheduler) {
        let generation = {
            let mut body = self.body.borrow_mut();
            let start = (body.x, body.y);
            body.motion = Some(Motion {
                start,
                target: (tx, ty),
                speed: ((tx - start.0) / MOVE_DURATION_MS, (ty - start.1) / MOVE_DURATION_MS),
                started_at: now,
            });
            body.generation += 1;
            body.generation
        };

        if self.body.borrow_mut().step(now, generation) == Tick::Done {
            return;
        }
        let body = Rc::clone(&self.body);
        scheduler.register(move |now| body.borrow_mut().step(now, generation));
    }

    /// Paint the particle where it currently is. Does not advance the motion.
    pub fn draw(&self, ctx: &mut impl RenderContext) {
        let (x, y) = self.position();
        ctx.fill_circle(x, y, self.radius, PARTICLE_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::surface::Surface;
    use crate::types::ContextOptions;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn first_step_keeps_the_start_position() {
        let scheduler = FrameScheduler::new();
        let p = Particle::new(10.0, 20.0, 2.0);
        p.move_to(110.0, 220.0, 1000.0, &scheduler);
        assert_eq!(p.position(), (10.0, 20.0));
        assert!(p.is_animating());
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn moves_linearly_then_snaps_to_target() {
        let scheduler = FrameScheduler::new();
        let p = Particle::new(0.0, 0.0, 2.0);
        p.move_to(100.3, -50.7, 0.0, &scheduler);

        scheduler.tick(250.0);
        let (x, y) = p.position();
        assert!((x - 50.15).abs() < 1e-9);
        assert!((y + 25.35).abs() < 1e-9);

        // Overshooting the duration still lands exactly on the target.
        scheduler.tick(517.0);
        assert_eq!(p.position(), (100.3, -50.7));
        assert!(!p.is_animating());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn retarget_abandons_the_first_move() {
        let scheduler = FrameScheduler::new();
        let p = Particle::new(0.0, 0.0, 2.0);
        p.move_to(100.0, 0.0, 0.0, &scheduler);
        scheduler.tick(200.0);
        let mid = p.position();
        assert!((mid.0 - 40.0).abs() < 1e-9);

        p.move_to(0.0, 80.0, 200.0, &scheduler);
        assert_eq!(p.position(), mid);
        assert_eq!(p.target(), Some((0.0, 80.0)));

        scheduler.tick(300.0); // stale task retires here
        assert_eq!(scheduler.len(), 1);
        scheduler.tick(700.0);
        assert_eq!(p.position(), (0.0, 80.0));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn moving_to_the_current_spot_still_takes_the_full_duration() {
        let scheduler = FrameScheduler::new();
        let p = Particle::new(5.0, 5.0, 1.0);
        p.move_to(5.0, 5.0, 0.0, &scheduler);
        assert!(p.is_animating());
        scheduler.tick(MOVE_DURATION_MS);
        assert!(!p.is_animating());
        assert_eq!(p.position(), (5.0, 5.0));
    }

    #[test]
    fn spawn_lands_on_the_inscribed_circle() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            let p = Particle::spawn(800, 600, 2.0, &mut rng);
            let (x, y) = p.position();
            let d = ((x - 400.0).powi(2) + (y - 300.0).powi(2)).sqrt();
            assert!((d - 300.0).abs() < 1e-9);
            assert!(p.radius() >= 2.6 && p.radius() < 8.0);
        }
    }

    #[test]
    fn spawn_with_a_broken_ratio_uses_unscaled_radii() {
        let mut rng = StdRng::seed_from_u64(11);
        for ratio in [0.0, -2.0, f64::NAN] {
            let p = Particle::spawn(100, 100, ratio, &mut rng);
            assert!(p.radius() >= MIN_RADIUS && p.radius() < MAX_RADIUS);
        }
    }

    #[test]
    fn draw_paints_at_current_position_without_moving() {
        let mut canvas = Canvas::new(1.0);
        canvas.set_size(40, 40);
        let mut ctx = canvas.context_2d(ContextOptions::default()).unwrap();
        let p = Particle::new(20.0, 20.0, 3.0);
        p.draw(&mut ctx);
        assert_eq!(ctx.pixel(20, 20), PARTICLE_COLOR);
        assert_eq!(p.position(), (20.0, 20.0));
    }
}
