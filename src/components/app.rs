use std::cell::RefCell;
use std::fmt::Display;
use std::future::Future;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::WheelEvent;
use yew::prelude::*;

use super::{button_bar::ButtonBar, game_area::GameArea};
use crate::config::EditorConfig;
use crate::engine::EngineError;
use crate::engine::tauri::TauriEngine;
use crate::model::{EntityStart, Line, Vec2};
use crate::state::{StateSync, ZoomLevel};

pub type EditorSync = StateSync<TauriEngine>;

// Shared with every view below the App so nothing has to be prop drilled.
#[derive(Clone, PartialEq)]
pub struct EditorContext {
    pub sync: EditorSync,
    pub config: Rc<EditorConfig>,
    pub zoom: Rc<RefCell<ZoomLevel>>,
    pub report: Callback<String>,
}

impl EditorContext {
    /// Runs `task` on the local executor. A failure replaces the whole view.
    pub fn spawn<F, E>(&self, what: &'static str, task: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Display,
    {
        spawn_reported(self.report.clone(), what, task);
    }
}

fn spawn_reported<F, E>(report: Callback<String>, what: &'static str, task: F)
where
    F: Future<Output = Result<(), E>> + 'static,
    E: Display,
{
    spawn_local(async move {
        if let Err(e) = task.await {
            log::error!("{what} failed: {e}");
            report.emit(format!("{what} failed: {e}"));
        }
    });
}

/// A fresh session: one rider at the origin above a single sloped line.
async fn seed_session(sync: &EditorSync) -> Result<(), EngineError> {
    sync.clear().await?;
    sync.add_entity(EntityStart::bosh_sled_at(Vec2(0.0, 0.0)))
        .await?;
    sync.add_line(Line::normal(Vec2(-50.0, 0.0), Vec2(50.0, 30.0)))
        .await
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: Rc<EditorConfig>,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let failure = use_state(|| None::<String>);
    let sync = use_memo((), |_| match TauriEngine::connect() {
        Ok(engine) => Ok(StateSync::new(engine)),
        Err(e) => {
            log::error!("{e}");
            Err(e.to_string())
        }
    });
    let scroll_divisor = props.config.scroll_divisor;
    let zoom = use_mut_ref(move || ZoomLevel::new(scroll_divisor));
    let report = {
        let failure = failure.setter();
        use_callback((), move |message: String, _| failure.set(Some(message)))
    };
    let update = use_force_update();
    let live = (*sync).as_ref().ok().cloned();

    // Re-render after every commit; ButtonBar picks the frame up as a prop
    {
        let update = update.clone();
        use_effect_with(live.clone(), move |sync| {
            let subscription = sync
                .as_ref()
                .map(|sync| sync.subscribe(move || update.force_update()));
            move || drop(subscription)
        });
    }

    {
        let report = report.clone();
        use_effect_with(live.clone(), move |sync| {
            if let Some(sync) = sync.clone() {
                spawn_reported(report, "session setup", async move {
                    seed_session(&sync).await
                });
            }
            || ()
        });
    }

    // Scroll anywhere in the window to zoom
    {
        let zoom = zoom.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window();
            let wheel_cb = Closure::wrap(Box::new(move |e: WheelEvent| {
                let mut zoom = zoom.borrow_mut();
                zoom.apply_scroll(e.delta_y());
                log::debug!("zoom level {:.3}", zoom.level());
            }) as Box<dyn FnMut(_)>);
            if let Some(window) = &window {
                if window
                    .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
                    .is_err()
                {
                    log::warn!("could not listen for wheel events");
                }
            }
            move || {
                if let Some(window) = window {
                    let _ = window.remove_event_listener_with_callback(
                        "wheel",
                        wheel_cb.as_ref().unchecked_ref(),
                    );
                }
                drop(wheel_cb);
            }
        });
    }

    let problem = (*failure).clone().or_else(|| (*sync).as_ref().err().cloned());
    if let Some(problem) = problem {
        return html! {
            <div id="root" class="failure">
                <h2>{"Something went wrong"}</h2>
                <pre>{problem}</pre>
            </div>
        };
    }
    let Some(sync) = live else {
        return html! {};
    };
    let frame = sync.frame();

    let context = EditorContext {
        sync,
        config: props.config.clone(),
        zoom,
        report,
    };

    html! {
        <ContextProvider<EditorContext> {context}>
            <div id="root">
                <ButtonBar {frame} />
                <GameArea />
            </div>
        </ContextProvider<EditorContext>>
    }
}
