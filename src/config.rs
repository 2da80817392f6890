use serde::Deserialize;

pub const STORAGE_KEY: &str = "sl_editor_config";

// Every field has a default so partial or stale stored entries still load.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Press-and-hold delay before the first repeat.
    pub hold_delay_ms: u32,
    /// Repeat period while held (40 per second).
    pub hold_interval_ms: u32,
    /// Scroll delta that changes the zoom level by one.
    pub scroll_divisor: f64,
    /// Line stroke width at zoom 1.
    pub line_width: f64,
    pub point_radius: f64,
    pub momentum_scale: f64,
    /// Skeleton images are authored at twice world scale.
    pub image_scale: f64,
    pub asset_base: String,
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hold_delay_ms: 200,
            hold_interval_ms: 25,
            scroll_divisor: 500.0,
            line_width: 2.0,
            point_radius: 2.0,
            momentum_scale: 3.0,
            image_scale: 0.5,
            asset_base: "assets".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Reads the stored config, falling back to defaults when absent or invalid.
    pub fn load() -> Self {
        let raw = web_sys::window()
            .and_then(|win| win.local_storage().ok().flatten())
            .and_then(|store| store.get_item(STORAGE_KEY).ok().flatten());
        match raw {
            Some(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("ignoring stored {STORAGE_KEY}: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
