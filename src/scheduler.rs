//! Per-frame task registry.
//!
//! Stands in for the host's "run this before the next repaint" primitive. Tasks
//! are registered once and then called on every [`FrameScheduler::tick`] until
//! they answer [`Tick::Done`]. A particle's motion task finishes when it reaches
//! its target or is superseded. The group's draw loop re-registers itself every
//! frame instead, so it always runs after the motion steps queued before it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// What a task wants after running for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Done,
}

type Task = Box<dyn FnMut(f64) -> Tick>;

#[derive(Default)]
pub struct FrameScheduler {
    active: RefCell<Vec<Task>>,
    // Registered since the last tick started; promoted at the next one.
    incoming: RefCell<Vec<Task>>,
    frame: Cell<u64>,
}

impl FrameScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Queue `task` for every upcoming frame. It first runs on the next tick,
    /// after all tasks registered before it.
    pub fn register(&self, task: impl FnMut(f64) -> Tick + 'static) {
        self.incoming.borrow_mut().push(Box::new(task));
    }

    /// Run one frame at time `now` (milliseconds). Returns how many tasks ran.
    pub fn tick(&self, now: f64) -> usize {
        let mut running = std::mem::take(&mut *self.active.borrow_mut());
        running.append(&mut self.incoming.borrow_mut());

        let ran = running.len();
        // No borrow is held while tasks run, so they may register freely.
        running.retain_mut(|task| task(now) == Tick::Continue);

        let alive = running.len();
        *self.active.borrow_mut() = running;

        let frame = self.frame.get() + 1;
        self.frame.set(frame);
        tracing::trace!(target: "particle_text", frame, ran, alive, "frame ticked");
        ran
    }

    /// Tasks that will run on the next tick.
    pub fn len(&self) -> usize {
        self.active.borrow().len() + self.incoming.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of ticks run so far.
    pub fn frame(&self) -> u64 {
        self.frame.get()
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("pending", &self.len())
            .field("frame", &self.frame.get())
            .finish()
    }
}
