// What you SEE:
// • A window with a swarm of small dark dots spelling out a piece of text.
// • Whenever the text changes (clock tick, new word), the dots glide to the new shape.
// • Close the window or press ESC to quit.

mod draw;
mod source;

use std::rc::Rc;

use clap::{Parser, ValueEnum};
use draw::Drawer;
use particle_text::{
    Canvas, Clock, Error, FrameBuffer, FrameScheduler, MonotonicClock, ParticleTextOptions, TextSource,
    render_particle_text,
};

const BACKGROUND: u32 = 0x00_FF_FF_FF; // visual: white page behind the particles
const TARGET_FPS: usize = 60;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceKind {
    /// UTC wall clock
    Clock,
    /// Time since start
    Stopwatch,
    /// Cycle through --words
    Words,
}

#[derive(Parser, Debug)]
#[command(name = "particle-text")]
#[command(about = "Render text as a swarm of morphing particles")]
struct Cli {
    /// Canvas width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Font size before pixel-ratio scaling (defaults to 70)
    #[arg(long)]
    font_size: Option<f64>,

    /// Device pixels per logical pixel
    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f64,

    /// Where the text comes from
    #[arg(long, value_enum, default_value_t = SourceKind::Clock)]
    source: SourceKind,

    /// Words for `--source words`
    #[arg(long, value_delimiter = ',', default_value = "HELLO,PARTICLES,RUST")]
    words: Vec<String>,

    /// Seconds each word stays up
    #[arg(long, default_value_t = 2.0)]
    interval: f64,

    /// Fix particle spawn randomness
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    /* --- Surface + effect setup ---
       Visual: nothing yet; the canvas is sized and the particle group is built. */
    let mut canvas = Canvas::new(cli.pixel_ratio);
    let scheduler = FrameScheduler::new();
    let Cli { source: kind, words, interval, .. } = cli;
    let mut options = ParticleTextOptions::new(move || -> TextSource {
        match kind {
            SourceKind::Clock => source::clock(),
            SourceKind::Stopwatch => source::stopwatch(),
            SourceKind::Words => source::words(words, interval),
        }
    })
    .with_size(cli.width, cli.height);
    options.font_size = cli.font_size;
    options.seed = cli.seed;

    let effect = render_particle_text(Some(&mut canvas), options, Rc::clone(&scheduler))?;
    effect.draw(); // visual: from the next frame on, particles fly in from the rim

    /* --- Window ---
       Visual: a window the size of the canvas opens. */
    let mut drawer = Drawer::new("Particle Text", canvas.width() as usize, canvas.height() as usize, TARGET_FPS)?;
    let mut screen = FrameBuffer::new(canvas.width() as usize, canvas.height() as usize);
    let clock = MonotonicClock::new();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        // 1) Run every frame task: pending particle moves, then the group's draw.
        scheduler.tick(clock.now_ms());

        // 2) Flatten the canvas over the page colour and show it.
        canvas.composite_into(&mut screen, BACKGROUND);
        drawer.present(&screen)?;
    }

    tracing::info!(target: "particle_text", frames = scheduler.frame(), "window closed");
    Ok(())
}
