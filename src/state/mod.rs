pub mod camera;
pub mod sync;
pub mod zoom;

pub use camera::Camera;
pub use sync::{Snapshot, StateSync};
pub use zoom::ZoomLevel;
