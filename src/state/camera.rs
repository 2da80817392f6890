// World <-> screen transform for the track view.
use crate::model::{Entity, Vec2, points};

/// Pan position plus the raw (logarithmic) zoom level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom_level: f64,
}

impl Camera {
    /// Centers on the first entity's seat point, or the origin when there is none.
    pub fn focused_on(entities: &[Entity], zoom_level: f64) -> Self {
        let focus = entities
            .first()
            .and_then(|e| e.point(points::BOSH_BUTT))
            .map(|p| p.location)
            .unwrap_or(Vec2::ZERO);
        Self {
            x: focus.x(),
            y: focus.y(),
            zoom_level,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2(self.x, self.y)
    }

    /// Displayed zoom multiplier; always positive.
    pub fn zoom(&self) -> f64 {
        self.zoom_level.exp()
    }
}

pub fn world_to_screen(point: Vec2, camera: &Camera, zoom: f64, viewport: Vec2) -> Vec2 {
    (point - camera.position()) * zoom + viewport * 0.5
}
