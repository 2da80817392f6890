use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use super::{TimerHandle, Timers};

/// `setTimeout` / `setInterval` on the global window.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimers;

pub struct BrowserTimer {
    id: Option<i32>,
    repeating: bool,
    _callback: Closure<dyn FnMut()>,
}

impl Timers for BrowserTimers {
    type Handle = BrowserTimer;

    fn timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) -> BrowserTimer {
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(cb) = callback.take() {
                cb();
            }
        }) as Box<dyn FnMut()>);
        let id = web_sys::window().and_then(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis as i32,
            )
            .ok()
        });
        if id.is_none() {
            log::warn!("setTimeout({millis}) unavailable");
        }
        BrowserTimer {
            id,
            repeating: false,
            _callback: closure,
        }
    }

    fn interval(&self, millis: u32, callback: Box<dyn FnMut()>) -> BrowserTimer {
        let closure = Closure::wrap(callback);
        let id = web_sys::window().and_then(|w| {
            w.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis as i32,
            )
            .ok()
        });
        if id.is_none() {
            log::warn!("setInterval({millis}) unavailable");
        }
        BrowserTimer {
            id,
            repeating: true,
            _callback: closure,
        }
    }
}

impl TimerHandle for BrowserTimer {
    fn cancel(&self) {
        let (Some(id), Some(window)) = (self.id, web_sys::window()) else {
            return;
        };
        if self.repeating {
            window.clear_interval_with_handle(id);
        } else {
            window.clear_timeout_with_handle(id);
        }
    }
}

impl Drop for BrowserTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
