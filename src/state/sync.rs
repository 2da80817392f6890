use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::engine::{Engine, EngineError};
use crate::model::{Entity, EntityStart, Frame, Line, Track};

/// One consistent view of the cache. Cloning is cheap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub frame: Frame,
    pub lines: Rc<[Line]>,
    pub entities: Rc<[Entity]>,
}

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct Listeners {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener)>>,
}

impl Listeners {
    fn notify(&self) {
        // Listeners may subscribe or unsubscribe while being notified.
        let current: Vec<Listener> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in current {
            listener();
        }
    }
}

/// Keeps a listener registered until dropped.
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.entries.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Local mirror of the engine's track state. The cache only ever holds what the
/// engine answered; overlapping calls are not sequenced, so the last response
/// to land stays committed.
pub struct StateSync<E> {
    engine: Rc<E>,
    current: Rc<RefCell<Snapshot>>,
    listeners: Rc<Listeners>,
}

impl<E> Clone for StateSync<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            current: self.current.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<E> PartialEq for StateSync<E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.current, &other.current)
    }
}

impl<E: Engine> StateSync<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine: Rc::new(engine),
            current: Rc::new(RefCell::new(Snapshot::default())),
            listeners: Rc::new(Listeners::default()),
        }
    }

    pub fn frame(&self) -> Frame {
        self.current.borrow().frame
    }

    pub fn lines(&self) -> Rc<[Line]> {
        self.current.borrow().lines.clone()
    }

    pub fn entities(&self) -> Rc<[Entity]> {
        self.current.borrow().entities.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.current.borrow().clone()
    }

    /// Registers `listener` to run after every commit.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let id = self.listeners.next_id.get();
        self.listeners.next_id.set(id + 1);
        self.listeners
            .entries
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub async fn load_track(&self, path: &str) -> Result<Track, EngineError> {
        log::debug!("load_track {path}");
        let track = self.engine.load_track(path).await.inspect_err(|e| {
            log::warn!("load_track {path} failed: {e}");
        })?;
        self.commit(|s| s.lines = track.lines.clone().into());
        log::info!(
            "loaded track {path}: {} lines, {} entities",
            track.lines.len(),
            track.entities.len()
        );
        self.refetch(self.frame()).await?;
        Ok(track)
    }

    pub async fn set_frame(&self, frame: Frame) -> Result<(), EngineError> {
        self.refetch(frame).await
    }

    pub async fn add_line(&self, line: Line) -> Result<(), EngineError> {
        let lines = self.engine.add_line(&line).await?;
        self.commit(|s| s.lines = lines.into());
        Ok(())
    }

    pub async fn remove_line(&self, line: Line) -> Result<(), EngineError> {
        let lines = self.engine.remove_line(&line).await?;
        self.commit(|s| s.lines = lines.into());
        Ok(())
    }

    pub async fn add_entity(&self, start: EntityStart) -> Result<(), EngineError> {
        self.engine.add_entity(&start).await?;
        self.refetch(self.frame()).await
    }

    pub async fn remove_entity(&self, start: EntityStart) -> Result<(), EngineError> {
        self.engine.remove_entity(&start).await?;
        self.refetch(self.frame()).await
    }

    /// Resets the engine's working track and empties the cached lines.
    pub async fn clear(&self) -> Result<(), EngineError> {
        self.engine.clear().await?;
        self.commit(|s| s.lines = Rc::from(Vec::new()));
        self.refetch(self.frame()).await
    }

    // Entities and the frame they belong to are written in one commit.
    async fn refetch(&self, frame: Frame) -> Result<(), EngineError> {
        log::debug!("entity_positions_at {frame}");
        let entities = self.engine.entity_positions_at(frame).await?;
        self.commit(|s| {
            s.entities = entities.into();
            s.frame = frame;
        });
        Ok(())
    }

    fn commit(&self, apply: impl FnOnce(&mut Snapshot)) {
        apply(&mut *self.current.borrow_mut());
        self.listeners.notify();
    }

    #[cfg(test)]
    pub(crate) fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::FakeEngine;
    use crate::model::{Vec2, points};
    use futures::executor::{LocalPool, block_on};
    use futures::task::LocalSpawnExt;

    fn seat(sync: &StateSync<FakeEngine>) -> Option<Vec2> {
        sync.entities()
            .first()
            .and_then(|e| e.point(points::BOSH_BUTT))
            .map(|p| p.location)
    }

    #[test]
    fn empty_session_has_nothing_cached() {
        let sync = StateSync::new(FakeEngine::new());
        let snap = sync.snapshot();
        assert_eq!(snap.frame, 0);
        assert!(snap.lines.is_empty());
        assert!(snap.entities.is_empty());
    }

    #[test]
    fn add_entity_populates_initial_geometry() {
        let sync = StateSync::new(FakeEngine::new());
        block_on(sync.add_entity(EntityStart::bosh_sled_at(Vec2(0.0, 0.0)))).unwrap();
        assert_eq!(sync.entities().len(), 1);
        assert_eq!(seat(&sync), Some(Vec2(0.0, 0.0)));
        assert_eq!(
            sync.engine.calls(),
            vec!["add_entity".to_string(), "entity_positions_at(0)".to_string()]
        );
    }

    #[test]
    fn set_frame_commits_engine_response_for_that_frame() {
        let sync = StateSync::new(FakeEngine::new());
        block_on(async {
            sync.add_entity(EntityStart::BoshSled {
                position: Vec2(0.0, 0.0),
                velocity: Some(Vec2(2.0, 1.0)),
            })
            .await
            .unwrap();
            sync.set_frame(3).await.unwrap();
        });
        assert_eq!(sync.frame(), 3);
        let expected = block_on(sync.engine.entity_positions_at(3)).unwrap();
        assert_eq!(&*sync.entities(), expected.as_slice());
        assert_eq!(seat(&sync), Some(Vec2(6.0, 3.0)));
    }

    #[test]
    fn frame_only_advances_once_fetch_resolves() {
        let sync = StateSync::new(FakeEngine::new());
        block_on(sync.add_entity(EntityStart::bosh_sled_at(Vec2(1.0, 1.0)))).unwrap();
        let before = sync.snapshot();
        let release = sync.engine.gate_next_fetch();

        let mut pool = LocalPool::new();
        let task = sync.clone();
        pool.spawner()
            .spawn_local(async move {
                task.set_frame(5).await.unwrap();
            })
            .unwrap();
        pool.run_until_stalled();
        assert_eq!(sync.snapshot(), before);

        release.send(()).unwrap();
        pool.run_until_stalled();
        assert_eq!(sync.frame(), 5);
    }

    #[test]
    fn add_then_remove_line_restores_list() {
        let sync = StateSync::new(FakeEngine::new());
        let base = Line::normal(Vec2(-50.0, 0.0), Vec2(50.0, 30.0));
        let extra = Line::normal(Vec2(0.0, 10.0), Vec2(20.0, 10.0));
        block_on(async {
            sync.add_line(base).await.unwrap();
            let before = sync.lines();
            sync.add_line(extra).await.unwrap();
            assert_eq!(sync.lines().len(), 2);
            sync.remove_line(extra).await.unwrap();
            assert_eq!(sync.lines(), before);
        });
    }

    #[test]
    fn load_track_replaces_lines_and_refetches_entities() {
        let track = Track {
            meta: None,
            lines: vec![
                Line::normal(Vec2(0.0, 0.0), Vec2(10.0, 0.0)),
                Line::normal(Vec2(10.0, 0.0), Vec2(20.0, 5.0)),
            ],
            entities: vec![EntityStart::bosh_sled_at(Vec2(4.0, -2.0))],
        };
        let sync = StateSync::new(FakeEngine::new().with_track("a.trk", track.clone()));
        block_on(sync.add_line(Line::normal(Vec2(9.0, 9.0), Vec2(8.0, 8.0)))).unwrap();

        let loaded = block_on(sync.load_track("a.trk")).unwrap();
        assert_eq!(loaded, track);
        assert_eq!(&*sync.lines(), track.lines.as_slice());
        assert_eq!(seat(&sync), Some(Vec2(4.0, -2.0)));
    }

    #[test]
    fn failed_load_leaves_cache_untouched() {
        let sync = StateSync::new(FakeEngine::new());
        block_on(sync.add_line(Line::normal(Vec2(0.0, 0.0), Vec2(1.0, 1.0)))).unwrap();
        let before = sync.snapshot();
        let err = block_on(sync.load_track("missing.trk")).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
        assert_eq!(sync.snapshot(), before);
    }

    #[test]
    fn remove_entity_refetches_remaining() {
        let sync = StateSync::new(FakeEngine::new());
        let a = EntityStart::bosh_sled_at(Vec2(0.0, 0.0));
        let b = EntityStart::bosh_sled_at(Vec2(30.0, 0.0));
        block_on(async {
            sync.add_entity(a.clone()).await.unwrap();
            sync.add_entity(b).await.unwrap();
            sync.remove_entity(a).await.unwrap();
        });
        assert_eq!(sync.entities().len(), 1);
        assert_eq!(seat(&sync), Some(Vec2(30.0, 0.0)));
    }

    #[test]
    fn clear_empties_lines_and_entities() {
        let sync = StateSync::new(FakeEngine::new());
        block_on(async {
            sync.add_entity(EntityStart::bosh_sled_at(Vec2(0.0, 0.0)))
                .await
                .unwrap();
            sync.add_line(Line::normal(Vec2(0.0, 0.0), Vec2(1.0, 0.0)))
                .await
                .unwrap();
            sync.clear().await.unwrap();
        });
        assert!(sync.lines().is_empty());
        assert!(sync.entities().is_empty());
    }

    #[test]
    fn subscribers_hear_commits_until_dropped() {
        let sync = StateSync::new(FakeEngine::new());
        let hits = Rc::new(Cell::new(0));
        let sub = {
            let hits = hits.clone();
            sync.subscribe(move || hits.set(hits.get() + 1))
        };
        block_on(sync.set_frame(1)).unwrap();
        assert_eq!(hits.get(), 1);
        drop(sub);
        block_on(sync.set_frame(2)).unwrap();
        assert_eq!(hits.get(), 1);
    }

    // A track load racing an in-flight frame change: each response commits its
    // frame and entities together, and the later arrival wins outright.
    #[test]
    fn overlapping_calls_commit_whole_responses() {
        let track = Track {
            meta: None,
            lines: vec![Line::normal(Vec2(0.0, 0.0), Vec2(5.0, 0.0))],
            entities: vec![EntityStart::BoshSled {
                position: Vec2(0.0, 0.0),
                velocity: Some(Vec2(1.0, 0.0)),
            }],
        };
        let engine = FakeEngine::new().with_track("race.trk", track);
        let sync = StateSync::new(engine);
        block_on(sync.load_track("race.trk")).unwrap();

        let frame_gate = sync.engine.gate_next_fetch();
        let load_gate = sync.engine.gate_next_fetch();
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        {
            let sync = sync.clone();
            spawner
                .spawn_local(async move { sync.set_frame(5).await.unwrap() })
                .unwrap();
        }
        pool.run_until_stalled();
        {
            let sync = sync.clone();
            spawner
                .spawn_local(async move {
                    sync.load_track("race.trk").await.unwrap();
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(sync.frame(), 0);

        // The frame change resolves last, so its pair is what remains.
        load_gate.send(()).unwrap();
        pool.run_until_stalled();
        assert_eq!(sync.frame(), 0);
        assert_eq!(seat(&sync), Some(Vec2(0.0, 0.0)));

        frame_gate.send(()).unwrap();
        pool.run_until_stalled();
        assert_eq!(sync.frame(), 5);
        assert_eq!(seat(&sync), Some(Vec2(5.0, 0.0)));
    }
}
