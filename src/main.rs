use std::rc::Rc;

mod components;
mod config;
mod dialog;
mod engine;
mod input;
mod logging;
mod model;
mod render;
mod state;
mod timing;

use components::app::{App, AppProps};
use config::EditorConfig;

fn main() {
    console_error_panic_hook::set_once();
    let config = EditorConfig::load();
    logging::init_logging(config.level_filter());
    log::info!("starting editor (assets from {})", config.asset_base);
    yew::Renderer::<App>::with_props(AppProps {
        config: Rc::new(config),
    })
    .render();
}
