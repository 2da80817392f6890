// `disabled` is consulted on every tick, so a button that becomes disabled
// mid-hold stops dispatching without a fresh press.

use std::rc::Rc;

use crate::config::EditorConfig;
use crate::timing::{HoldRepeater, Repeat, Timers};

pub const PRIMARY_BUTTON: i16 = 0;

/// The part of a mouse press the binding cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerPress {
    pub button: i16,
}

pub struct HoldBinding<S: Timers> {
    repeater: HoldRepeater<PointerPress, S>,
}

impl<S: Timers> HoldBinding<S> {
    pub fn new(
        timers: S,
        config: &EditorConfig,
        disabled: impl Fn() -> bool + 'static,
        on_trigger: impl Fn() + 'static,
    ) -> Self {
        let disabled: Rc<dyn Fn() -> bool> = Rc::new(disabled);
        let repeater = HoldRepeater::new(
            timers,
            config.hold_delay_ms,
            config.hold_interval_ms,
            move |press: &PointerPress| {
                if press.button != PRIMARY_BUTTON || disabled() {
                    return Repeat::Stop;
                }
                on_trigger();
                Repeat::Continue
            },
        );
        Self { repeater }
    }

    pub fn press(&self, press: PointerPress) {
        self.repeater.enable(press);
    }

    pub fn release(&self) {
        self.repeater.disable();
    }

    pub fn is_repeating(&self) -> bool {
        self.repeater.is_active()
    }
}
