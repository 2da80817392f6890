use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use futures::channel::oneshot;

use super::{Engine, EngineError};
use crate::model::{Entity, EntityStart, Frame, Line, Point, Track, Vec2, points};

// In-memory engine with deterministic geometry. Positions move with the
// start velocity per frame; there is no physics.
#[derive(Default)]
pub(crate) struct FakeEngine {
    lines: RefCell<Vec<Line>>,
    starts: RefCell<Vec<EntityStart>>,
    tracks: RefCell<HashMap<String, Track>>,
    gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
    calls: RefCell<Vec<String>>,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_track(self, path: &str, track: Track) -> Self {
        self.tracks.borrow_mut().insert(path.to_string(), track);
        self
    }

    /// Holds the next `entity_positions_at` response until the sender fires.
    pub(crate) fn gate_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn positions_at(&self, frame: Frame) -> Vec<Entity> {
        self.starts
            .borrow()
            .iter()
            .map(|start| match start {
                EntityStart::BoshSled { position, velocity } => {
                    let drift = velocity.unwrap_or(Vec2::ZERO) * frame as f64;
                    bosh_sled(*position + drift, velocity.unwrap_or(Vec2::ZERO))
                }
                EntityStart::Custom(entity) => entity.clone(),
            })
            .collect()
    }
}

pub(crate) fn point_at(location: Vec2) -> Point {
    Point {
        location,
        previous_location: location,
        momentum: Vec2::ZERO,
        friction: 0.0,
    }
}

pub(crate) fn bosh_sled(seat: Vec2, momentum: Vec2) -> Entity {
    let offsets = [
        (points::BOSH_BUTT, Vec2(0.0, 0.0)),
        (points::BOSH_SHOULDER, Vec2(0.0, -5.0)),
        (points::BOSH_LEFT_HAND, Vec2(1.5, -0.5)),
        (points::BOSH_RIGHT_HAND, Vec2(1.5, -0.6)),
        (points::BOSH_LEFT_FOOT, Vec2(5.5, -0.5)),
        (points::BOSH_RIGHT_FOOT, Vec2(5.5, -0.6)),
        (points::SLED_PEG, Vec2(0.0, 0.0)),
        ("SledTail", Vec2(0.0, 5.0)),
        ("SledNose", Vec2(15.0, 5.0)),
        (points::SLED_ROPE, Vec2(17.5, 0.0)),
    ];
    let mut entity = Entity::default();
    for (name, offset) in offsets {
        let mut point = point_at(seat + offset);
        point.momentum = momentum;
        point.previous_location = point.location - momentum;
        entity.points.insert(name.to_string(), point);
    }
    entity
}

impl Engine for FakeEngine {
    async fn entity_positions_at(&self, frame: Frame) -> Result<Vec<Entity>, EngineError> {
        self.record(format!("entity_positions_at({frame})"));
        let entities = self.positions_at(frame);
        let gate = self.gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(entities)
    }

    async fn add_entity(&self, entity: &EntityStart) -> Result<(), EngineError> {
        self.record("add_entity");
        self.starts.borrow_mut().push(entity.clone());
        Ok(())
    }

    async fn remove_entity(&self, entity: &EntityStart) -> Result<(), EngineError> {
        self.record("remove_entity");
        let mut starts = self.starts.borrow_mut();
        if let Some(i) = starts.iter().position(|s| s == entity) {
            starts.remove(i);
        }
        Ok(())
    }

    async fn add_line(&self, line: &Line) -> Result<Vec<Line>, EngineError> {
        self.record("add_line");
        let mut lines = self.lines.borrow_mut();
        lines.push(*line);
        Ok(lines.clone())
    }

    async fn remove_line(&self, line: &Line) -> Result<Vec<Line>, EngineError> {
        self.record("remove_line");
        let mut lines = self.lines.borrow_mut();
        if let Some(i) = lines.iter().position(|l| l == line) {
            lines.remove(i);
        }
        Ok(lines.clone())
    }

    async fn load_track(&self, path: &str) -> Result<Track, EngineError> {
        self.record(format!("load_track({path})"));
        let track = self
            .tracks
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| EngineError::Io(format!("{path}: not found")))?;
        *self.lines.borrow_mut() = track.lines.clone();
        *self.starts.borrow_mut() = track.entities.clone();
        Ok(track)
    }

    async fn clear(&self) -> Result<(), EngineError> {
        self.record("clear");
        self.lines.borrow_mut().clear();
        self.starts.borrow_mut().clear();
        Ok(())
    }
}
