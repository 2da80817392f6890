pub mod browser;
pub mod hold;
#[cfg(test)]
pub mod manual;

pub use browser::BrowserTimers;
pub use hold::{HoldRepeater, Repeat};

// `cancel` only stops future firings. The callback is released when the
// handle drops, so cancelling from inside the callback is safe.
pub trait TimerHandle {
    fn cancel(&self);
}

pub trait Timers: Clone + 'static {
    type Handle: TimerHandle + 'static;

    fn timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;
    fn interval(&self, millis: u32, callback: Box<dyn FnMut()>) -> Self::Handle;
}
