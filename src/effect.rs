//! Entry point: bind a particle group to a surface and hand back its draw trigger.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::Error;
use crate::group::{ParticleGroup, TextSource};
use crate::scheduler::{FrameScheduler, Tick};
use crate::surface::{RenderContext, Surface, usable_pixel_ratio};
use crate::types::ContextOptions;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
/// Font size before scaling by the pixel ratio.
pub const DEFAULT_FONT_SIZE: f64 = 70.0;

/// Builds the text source. Called exactly once, during setup.
pub type TextGenerator = Box<dyn FnOnce() -> TextSource>;

/// Sizing and text configuration. Zero sizes count as unset.
pub struct ParticleTextOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font_size: Option<f64>,
    /// Fixes spawn angles and radii; entropy-seeded when `None`.
    pub seed: Option<u64>,
    pub text_generator: TextGenerator,
}

impl ParticleTextOptions {
    pub fn new(text_generator: impl FnOnce() -> TextSource + 'static) -> Self {
        Self {
            width: None,
            height: None,
            font_size: None,
            seed: None,
            text_generator: Box::new(text_generator),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl fmt::Debug for ParticleTextOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleTextOptions")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("font_size", &self.font_size)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// The running effect. Only `draw` starts anything.
pub struct ParticleText<C: RenderContext> {
    group: Rc<RefCell<ParticleGroup<C>>>,
    scheduler: Rc<FrameScheduler>,
}

impl<C: RenderContext + 'static> ParticleText<C> {
    /// Start the frame loop: every scheduler tick clears the surface, reconciles
    /// the particles with the text and paints them. There is no stop; calling
    /// this twice runs two loops over the same group.
    pub fn draw(&self) {
        schedule_frame(Rc::clone(&self.group), Rc::clone(&self.scheduler));
    }

    pub fn group(&self) -> Ref<'_, ParticleGroup<C>> {
        self.group.borrow()
    }
}

/// Queue one group frame that queues the next one when it runs. Re-registering
/// puts the frame behind every motion step queued before it, so particles are
/// painted where they are at this tick's time.
fn schedule_frame<C: RenderContext + 'static>(group: Rc<RefCell<ParticleGroup<C>>>, scheduler: Rc<FrameScheduler>) {
    let next = Rc::clone(&scheduler);
    scheduler.register(move |now| {
        group.borrow_mut().draw(now);
        schedule_frame(Rc::clone(&group), Rc::clone(&next));
        Tick::Done
    });
}

/// Validate `surface`, size it, and build the particle group that will animate
/// the strings produced by `options.text_generator`.
pub fn render_particle_text<S: Surface>(
    surface: Option<&mut S>,
    options: ParticleTextOptions,
    scheduler: Rc<FrameScheduler>,
) -> Result<ParticleText<S::Context>, Error> {
    let surface = surface.ok_or(Error::SurfaceMissing)?;
    let ctx = surface
        .context_2d(ContextOptions { will_read_frequently: true })
        .ok_or(Error::ContextUnavailable)?;

    let ParticleTextOptions { width, height, font_size, seed, text_generator } = options;
    let width = width.filter(|&w| w > 0).unwrap_or(DEFAULT_WIDTH);
    let height = height.filter(|&h| h > 0).unwrap_or(DEFAULT_HEIGHT);
    surface.set_size(width, height);

    let ratio = usable_pixel_ratio(surface.pixel_ratio());
    let font_size = font_size.filter(|&f| f > 0.0 && f.is_finite()).unwrap_or(DEFAULT_FONT_SIZE) * ratio;

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    tracing::info!(target: "particle_text", width, height, font_size, ratio, "particle text ready");

    let group = ParticleGroup::new(ctx, Rc::clone(&scheduler), text_generator(), font_size, ratio, rng);
    Ok(ParticleText { group: Rc::new(RefCell::new(group)), scheduler })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, CanvasContext};

    struct Headless;

    impl Surface for Headless {
        type Context = CanvasContext;
        fn set_size(&mut self, _width: u32, _height: u32) {}
        fn pixel_ratio(&self) -> f64 {
            1.0
        }
        fn context_2d(&mut self, _options: ContextOptions) -> Option<CanvasContext> {
            None
        }
    }

    fn hello() -> TextSource {
        Box::new(|| "HELLO".to_string())
    }

    #[test]
    fn missing_surface_is_rejected() {
        let result = render_particle_text::<Canvas>(None, ParticleTextOptions::new(hello), FrameScheduler::new());
        assert!(matches!(result, Err(Error::SurfaceMissing)));
    }

    #[test]
    fn missing_context_is_rejected_and_nothing_is_scheduled() {
        let scheduler = FrameScheduler::new();
        let result = render_particle_text(Some(&mut Headless), ParticleTextOptions::new(hello), Rc::clone(&scheduler));
        assert!(matches!(result, Err(Error::ContextUnavailable)));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn defaults_apply_size_and_scaled_font() {
        let mut canvas = Canvas::new(2.0);
        let effect = render_particle_text(Some(&mut canvas), ParticleTextOptions::new(hello), FrameScheduler::new())
            .unwrap();
        assert_eq!((canvas.width(), canvas.height()), (800, 600));
        assert_eq!(effect.group().font_size(), 140.0);
        assert_eq!(effect.group().pixel_ratio(), 2.0);
    }

    #[test]
    fn explicit_font_size_is_scaled_and_zero_size_falls_back() {
        let mut canvas = Canvas::new(1.5);
        let options = ParticleTextOptions::new(hello).with_size(0, 200).with_font_size(40.0);
        let effect = render_particle_text(Some(&mut canvas), options, FrameScheduler::new()).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (800, 200));
        assert_eq!(effect.group().font_size(), 60.0);
    }

    #[test]
    fn generator_runs_once_and_draw_starts_the_loop() {
        let scheduler = FrameScheduler::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let options = ParticleTextOptions::new(move || {
            *counter.borrow_mut() += 1;
            hello()
        })
        .with_size(200, 80)
        .with_font_size(28.0)
        .with_seed(3);

        let mut canvas = Canvas::new(1.0);
        let effect = render_particle_text(Some(&mut canvas), options, Rc::clone(&scheduler)).unwrap();
        assert_eq!(*calls.borrow(), 1);
        assert!(scheduler.is_empty());

        effect.draw();
        scheduler.tick(0.0);
        assert_eq!(effect.group().text(), "HELLO");
        assert!(!effect.group().particles().is_empty());

        scheduler.tick(16.0);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn frames_paint_particles_at_this_ticks_positions() {
        let scheduler = FrameScheduler::new();
        let options = ParticleTextOptions::new(|| -> TextSource { Box::new(|| "I".to_string()) })
            .with_size(60, 40)
            .with_font_size(14.0)
            .with_seed(9);
        let mut canvas = Canvas::new(1.0);
        let effect = render_particle_text(Some(&mut canvas), options, Rc::clone(&scheduler)).unwrap();
        effect.draw();
        scheduler.tick(0.0);

        for now in [250.0, 600.0] {
            scheduler.tick(now);
            let group = effect.group();
            assert!(!group.particles().is_empty());
            for p in group.particles() {
                let (x, y) = p.position();
                // a painted disc always covers the pixel holding its centre
                assert!(group.context().pixel(x.floor() as u32, y.floor() as u32)[3] > 0, "at {now}: ({x}, {y})");
            }
        }
        assert!(effect.group().particles().iter().all(|p| !p.is_animating()));
    }

    #[test]
    fn the_draw_loop_runs_after_pending_motion_steps() {
        let scheduler = FrameScheduler::new();
        let options = ParticleTextOptions::new(hello).with_size(200, 80).with_font_size(28.0).with_seed(4);
        let mut canvas = Canvas::new(1.0);
        let effect = render_particle_text(Some(&mut canvas), options, Rc::clone(&scheduler)).unwrap();
        effect.draw();
        scheduler.tick(0.0);

        // every particle's step plus the one draw frame, queued last
        let particles = effect.group().particles().len();
        assert_eq!(scheduler.len(), particles + 1);
        assert_eq!(scheduler.tick(16.0), particles + 1);
    }
}
