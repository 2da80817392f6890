pub mod tauri;
#[cfg(test)]
pub mod test_support;

use crate::model::{Entity, EntityStart, Frame, Line, Track};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine could not read track: {0}")]
    Io(String),
    #[error("engine could not parse track: {0}")]
    Parse(String),
    #[error("engine rejected `{command}`: {message}")]
    Rejected {
        command: &'static str,
        message: String,
    },
    #[error("engine transport unavailable: {0}")]
    Transport(String),
    #[error("malformed engine payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The engine calls the editor relies on. Implementations are single-threaded;
/// futures are polled on the UI thread.
#[allow(async_fn_in_trait)]
pub trait Engine {
    async fn entity_positions_at(&self, frame: Frame) -> Result<Vec<Entity>, EngineError>;
    async fn add_entity(&self, entity: &EntityStart) -> Result<(), EngineError>;
    async fn remove_entity(&self, entity: &EntityStart) -> Result<(), EngineError>;
    /// Returns the full line list after the add.
    async fn add_line(&self, line: &Line) -> Result<Vec<Line>, EngineError>;
    /// Removes the line equal by value; returns the full list afterwards.
    async fn remove_line(&self, line: &Line) -> Result<Vec<Line>, EngineError>;
    async fn load_track(&self, path: &str) -> Result<Track, EngineError>;
    async fn clear(&self) -> Result<(), EngineError>;
}
