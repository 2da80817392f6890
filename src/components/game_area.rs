use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlCanvasElement, Window};
use yew::prelude::*;

use super::app::EditorContext;
use crate::render::canvas::{AnimationFrames, CanvasSurface, load_skeleton_images};
use crate::render::{RenderLoop, SceneStyle, draw_scene};
use crate::state::Camera;

/// Full-window canvas redrawn every animation frame from the latest snapshot.
#[function_component(GameArea)]
pub fn game_area() -> Html {
    let ctx = use_context::<EditorContext>();
    let canvas_ref = use_node_ref();

    {
        let canvas_ref = canvas_ref.clone();
        use_effect_with(ctx, move |ctx| {
            let mounted = ctx.as_ref().and_then(|ctx| mount(&canvas_ref, ctx));
            move || drop(mounted)
        });
    }

    html! { <canvas ref={canvas_ref} style="display:block;" /> }
}

// Owns everything that has to stop when the canvas goes away.
struct Mounted {
    _render: RenderLoop<AnimationFrames>,
    window: Window,
    resize_cb: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.resize_cb.as_ref().unchecked_ref());
    }
}

fn fit_to_window(window: &Window, canvas: &HtmlCanvasElement) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(600.0);
    canvas.set_width(width.max(0.0) as u32);
    canvas.set_height(height.max(0.0) as u32);
}

fn mount(canvas_ref: &NodeRef, ctx: &EditorContext) -> Option<Mounted> {
    let window = web_sys::window()?;
    let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() else {
        log::error!("game area canvas is not attached");
        return None;
    };
    fit_to_window(&window, &canvas);

    let Some(mut surface) = CanvasSurface::new(canvas.clone()) else {
        log::error!("2d canvas context unavailable");
        return None;
    };
    let frames = AnimationFrames::new()?;
    let images = load_skeleton_images(&ctx.config.asset_base);
    let style = SceneStyle::from(&*ctx.config);
    let sync = ctx.sync.clone();
    let zoom = ctx.zoom.clone();

    let render = RenderLoop::new(frames, move || {
        let snapshot = sync.snapshot();
        let camera = Camera::focused_on(&snapshot.entities, zoom.borrow().level());
        let viewport = surface.viewport();
        draw_scene(&mut surface, &snapshot, &camera, viewport, &style, &images);
    });
    render.start();

    let resize_cb = {
        let window = window.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            fit_to_window(&window, &canvas);
        }) as Box<dyn FnMut(_)>)
    };
    if window
        .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
        .is_err()
    {
        log::warn!("could not listen for resize events");
    }

    Some(Mounted {
        _render: render,
        window,
        resize_cb,
    })
}
