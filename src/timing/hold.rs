use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{TimerHandle, Timers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    Continue,
    Stop,
}

struct Chain<H> {
    // Bumped by every enable/disable; callbacks from an older chain bail out.
    generation: u64,
    delay: Option<H>,
    repeat: Option<H>,
    running: bool,
}

/// Runs the handler once after `delay`, then every `interval` until it answers
/// [`Repeat::Stop`] or `disable` is called. At most one chain runs at a time.
pub struct HoldRepeater<T, S: Timers> {
    timers: S,
    delay: u32,
    interval: u32,
    handler: Rc<dyn Fn(&T) -> Repeat>,
    chain: Rc<RefCell<Chain<S::Handle>>>,
}

impl<T: 'static, S: Timers> HoldRepeater<T, S> {
    pub fn new(
        timers: S,
        delay: u32,
        interval: u32,
        handler: impl Fn(&T) -> Repeat + 'static,
    ) -> Self {
        Self {
            timers,
            delay,
            interval,
            handler: Rc::new(handler),
            chain: Rc::new(RefCell::new(Chain {
                generation: 0,
                delay: None,
                repeat: None,
                running: false,
            })),
        }
    }

    pub fn enable(&self, event: T) {
        self.disable();
        let generation = {
            let mut chain = self.chain.borrow_mut();
            chain.running = true;
            chain.generation
        };
        let event = Rc::new(event);
        let weak = Rc::downgrade(&self.chain);
        let timers = self.timers.clone();
        let handler = self.handler.clone();
        let interval = self.interval;
        let delayed = self.timers.timeout(
            self.delay,
            Box::new(move || {
                if !dispatch(&weak, generation, &handler, &event) {
                    return;
                }
                let repeat_weak = weak.clone();
                let repeat = timers.interval(
                    interval,
                    Box::new(move || {
                        dispatch(&repeat_weak, generation, &handler, &event);
                    }),
                );
                if let Some(chain) = weak.upgrade() {
                    chain.borrow_mut().repeat = Some(repeat);
                }
            }),
        );
        self.chain.borrow_mut().delay = Some(delayed);
    }

    /// Cancels the pending or running chain, if any.
    pub fn disable(&self) {
        let (delay, repeat) = {
            let mut chain = self.chain.borrow_mut();
            chain.generation += 1;
            chain.running = false;
            (chain.delay.take(), chain.repeat.take())
        };
        // Dropped outside the borrow; a handle may be released from inside
        // its own callback when the handler disables the repeater.
        drop(delay);
        drop(repeat);
    }

    pub fn is_active(&self) -> bool {
        self.chain.borrow().running
    }
}

impl<T, S: Timers> Drop for HoldRepeater<T, S> {
    fn drop(&mut self) {
        let mut chain = self.chain.borrow_mut();
        chain.generation += 1;
        chain.running = false;
        chain.delay.take();
        chain.repeat.take();
    }
}

// Runs the handler for a live chain. Returns whether the chain continues.
fn dispatch<T, H: TimerHandle>(
    chain: &Weak<RefCell<Chain<H>>>,
    generation: u64,
    handler: &Rc<dyn Fn(&T) -> Repeat>,
    event: &Rc<T>,
) -> bool {
    let Some(chain) = chain.upgrade() else {
        return false;
    };
    if chain.borrow().generation != generation {
        return false;
    }
    let outcome = handler(event.as_ref());
    let mut state = chain.borrow_mut();
    if state.generation != generation {
        return false;
    }
    match outcome {
        Repeat::Continue => true,
        Repeat::Stop => {
            state.running = false;
            if let Some(repeat) = state.repeat.as_ref() {
                repeat.cancel();
            }
            false
        }
    }
}
