/// Scroll-driven zoom accumulator. The level is unbounded in both directions;
/// the displayed multiplier is `exp(level)` so it never reaches zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevel {
    level: f64,
    scroll_divisor: f64,
}

impl ZoomLevel {
    pub fn new(scroll_divisor: f64) -> Self {
        Self {
            level: 0.0,
            scroll_divisor,
        }
    }

    /// Scrolling down (positive delta) zooms out.
    pub fn apply_scroll(&mut self, delta_y: f64) {
        self.level += -delta_y / self.scroll_divisor;
    }

    pub fn level(&self) -> f64 {
        self.level
    }
}
