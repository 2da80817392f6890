use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;
static INIT: Once = Once::new();

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record);
        if cfg!(target_arch = "wasm32") {
            let msg = JsValue::from_str(&line);
            match record.level() {
                Level::Error => web_sys::console::error_1(&msg),
                Level::Warn => web_sys::console::warn_1(&msg),
                Level::Info => web_sys::console::info_1(&msg),
                Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
            }
        } else {
            eprintln!("{line}");
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!("[{} {}] {}", record.level(), record.target(), record.args())
}

/// Installs the console logger once; later calls only adjust the level.
pub fn init_logging(level: LevelFilter) {
    log::set_max_level(level);
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::debug!("logging initialized");
        }
    });
}
