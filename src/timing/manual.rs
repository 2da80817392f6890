use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{TimerHandle, Timers};

enum Callback {
    Once(Box<dyn FnOnce()>),
    Repeat(Box<dyn FnMut()>),
}

struct Entry {
    id: u64,
    due: u64,
    every: Option<u64>,
    callback: Option<Callback>,
    cancelled: Rc<Cell<bool>>,
}

#[derive(Default)]
struct Clock {
    now: u64,
    next_id: u64,
    entries: Vec<Entry>,
}

/// Virtual clock for tests; timers only fire inside `advance`.
#[derive(Clone, Default)]
pub struct ManualTimers {
    clock: Rc<RefCell<Clock>>,
}

pub struct ManualTimer {
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle for ManualTimer {
    fn cancel(&self) {
        self.cancelled.set(true);
    }
}

impl Drop for ManualTimer {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.clock.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.clock
            .borrow()
            .entries
            .iter()
            .filter(|e| !e.cancelled.get())
            .count()
    }

    /// Moves time forward by `millis`, firing everything due up to and
    /// including the new time in due order.
    pub fn advance(&self, millis: u64) {
        let target = self.clock.borrow().now + millis;
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                clock.entries.retain(|e| !e.cancelled.get());
                let idx = clock
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.due <= target)
                    .min_by_key(|(_, e)| (e.due, e.id))
                    .map(|(i, _)| i);
                idx.map(|i| {
                    let due = clock.entries[i].due;
                    clock.now = due;
                    let entry = &mut clock.entries[i];
                    (entry.id, entry.callback.take(), entry.every, entry.cancelled.clone())
                })
            };
            let Some((id, callback, every, cancelled)) = next else {
                break;
            };
            match callback {
                Some(Callback::Once(cb)) => {
                    cb();
                    cancelled.set(true);
                }
                Some(Callback::Repeat(mut cb)) => {
                    cb();
                    let mut clock = self.clock.borrow_mut();
                    if let Some(entry) = clock.entries.iter_mut().find(|e| e.id == id) {
                        entry.due += every.unwrap_or(1);
                        entry.callback = Some(Callback::Repeat(cb));
                    }
                }
                None => cancelled.set(true),
            }
        }
        self.clock.borrow_mut().now = target;
    }

    fn schedule(&self, millis: u32, every: Option<u64>, callback: Callback) -> ManualTimer {
        let cancelled = Rc::new(Cell::new(false));
        let mut clock = self.clock.borrow_mut();
        let id = clock.next_id;
        clock.next_id += 1;
        let due = clock.now + millis as u64;
        clock.entries.push(Entry {
            id,
            due,
            every,
            callback: Some(callback),
            cancelled: cancelled.clone(),
        });
        ManualTimer { cancelled }
    }
}

impl Timers for ManualTimers {
    type Handle = ManualTimer;

    fn timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) -> ManualTimer {
        self.schedule(millis, None, Callback::Once(callback))
    }

    fn interval(&self, millis: u32, callback: Box<dyn FnMut()>) -> ManualTimer {
        let every = (millis as u64).max(1);
        self.schedule(millis.max(1), Some(every), Callback::Repeat(callback))
    }
}
