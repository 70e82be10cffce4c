//! Render a string as a swarm of particles that morph whenever the string changes.
//!
//! The text is drawn off-screen, sampled on a coarse grid into target points,
//! and each particle index glides to the point with the same index. Drawing
//! goes through the [`Surface`] / [`RenderContext`] traits; [`Canvas`] is a
//! software implementation. Frames are driven by a [`FrameScheduler`] that the
//! host ticks with a timestamp from any [`Clock`].

pub mod canvas;
pub mod clock;
pub mod effect;
pub mod error;
pub mod font;
pub mod group;
pub mod particle;
pub mod sampler;
pub mod scheduler;
pub mod surface;
pub mod types;

pub use canvas::{Canvas, CanvasContext};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use effect::{ParticleText, ParticleTextOptions, TextGenerator, render_particle_text};
pub use error::Error;
pub use group::{ParticleGroup, TextSource};
pub use particle::Particle;
pub use scheduler::{FrameScheduler, Tick};
pub use surface::{RenderContext, Surface};
pub use types::{ContextOptions, FrameBuffer, Point, TextAlign, TextBaseline, TextStyle};
