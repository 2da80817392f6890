pub mod canvas;
pub mod scene;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub use scene::{SceneStyle, draw_scene};

/// Platform frame callback source (e.g. `requestAnimationFrame`).
pub trait FrameScheduler: 'static {
    type Request;

    fn request(&self, tick: Rc<dyn Fn()>) -> Self::Request;
    fn cancel(&self, request: Self::Request);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Scheduled,
    Drawing,
    Cancelled,
}

struct LoopInner<S: FrameScheduler> {
    scheduler: S,
    state: Cell<LoopState>,
    pending: RefCell<Option<S::Request>>,
    draw: RefCell<Box<dyn FnMut()>>,
}

// Each tick requests the next one before drawing. The loop only stops when
// cancelled or dropped.
pub struct RenderLoop<S: FrameScheduler> {
    inner: Rc<LoopInner<S>>,
}

impl<S: FrameScheduler> RenderLoop<S> {
    pub fn new(scheduler: S, draw: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(LoopInner {
                scheduler,
                state: Cell::new(LoopState::Idle),
                pending: RefCell::new(None),
                draw: RefCell::new(Box::new(draw)),
            }),
        }
    }

    pub fn start(&self) {
        if self.inner.state.get() == LoopState::Idle {
            schedule(&self.inner);
        }
    }

    #[cfg(test)]
    pub fn cancel(&self) {
        cancel(&self.inner);
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState {
        self.inner.state.get()
    }
}

impl<S: FrameScheduler> Drop for RenderLoop<S> {
    fn drop(&mut self) {
        cancel(&self.inner);
    }
}

fn schedule<S: FrameScheduler>(inner: &Rc<LoopInner<S>>) {
    let weak = Rc::downgrade(inner);
    let tick: Rc<dyn Fn()> = Rc::new(move || {
        if let Some(inner) = weak.upgrade() {
            run_tick(&inner);
        }
    });
    let request = inner.scheduler.request(tick);
    *inner.pending.borrow_mut() = Some(request);
    inner.state.set(LoopState::Scheduled);
}

fn run_tick<S: FrameScheduler>(inner: &Rc<LoopInner<S>>) {
    if inner.state.get() == LoopState::Cancelled {
        return;
    }
    // The request that fired is spent.
    inner.pending.borrow_mut().take();
    schedule(inner);
    inner.state.set(LoopState::Drawing);
    {
        let mut draw = inner.draw.borrow_mut();
        (*draw)();
    }
    if inner.state.get() == LoopState::Drawing {
        inner.state.set(LoopState::Scheduled);
    }
}

fn cancel<S: FrameScheduler>(inner: &LoopInner<S>) {
    inner.state.set(LoopState::Cancelled);
    let pending = inner.pending.borrow_mut().take();
    if let Some(request) = pending {
        inner.scheduler.cancel(request);
    }
}
