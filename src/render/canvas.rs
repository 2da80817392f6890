use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, Window};

use super::FrameScheduler;
use super::scene::{ImagePlacement, SegmentImage, SkeletonImages, Surface};
use crate::model::Vec2;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2(self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn place_image(
        &self,
        image: &HtmlImageElement,
        placement: &ImagePlacement,
    ) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.translate(placement.origin.x(), placement.origin.y())?;
        ctx.rotate(placement.angle)?;
        ctx.scale(placement.scale, placement.scale)?;
        ctx.translate(-placement.anchor.x(), -placement.anchor.y())?;
        ctx.draw_image_with_html_image_element(image, 0.0, 0.0)
    }
}

impl Surface for CanvasSurface {
    type Image = HtmlImageElement;

    fn clear(&mut self) {
        let Vec2(w, h) = self.viewport();
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: &str) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x(), center.y(), radius.max(0.0), 0.0, TAU)
            .is_ok()
        {
            self.ctx.set_fill_style_str(color);
            self.ctx.fill();
        }
    }

    fn stroke_segment(&mut self, from: Vec2, to: Vec2, width: f64, color: &str) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x(), from.y());
        self.ctx.line_to(to.x(), to.y());
        self.ctx.set_line_width(width);
        self.ctx.set_stroke_style_str(color);
        self.ctx.stroke();
    }

    fn draw_image(&mut self, image: &HtmlImageElement, placement: &ImagePlacement) {
        // Still loading, or failed to load.
        if !image.complete() || image.natural_width() == 0 {
            return;
        }
        self.ctx.save();
        if let Err(e) = self.place_image(image, placement) {
            log::debug!("draw_image failed: {e:?}");
        }
        self.ctx.restore();
    }
}

/// `FrameScheduler` over `window.requestAnimationFrame`. A single callback
/// lives as long as the scheduler and runs whichever tick was last requested.
pub struct AnimationFrames {
    window: Window,
    next_tick: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
    callback: Closure<dyn FnMut()>,
}

impl AnimationFrames {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let next_tick: Rc<RefCell<Option<Rc<dyn Fn()>>>> = Rc::new(RefCell::new(None));
        let callback = {
            let next_tick = next_tick.clone();
            Closure::wrap(Box::new(move || {
                let tick = next_tick.borrow_mut().take();
                if let Some(tick) = tick {
                    tick();
                }
            }) as Box<dyn FnMut()>)
        };
        Some(Self {
            window,
            next_tick,
            callback,
        })
    }
}

impl FrameScheduler for AnimationFrames {
    type Request = Option<i32>;

    fn request(&self, tick: Rc<dyn Fn()>) -> Option<i32> {
        *self.next_tick.borrow_mut() = Some(tick);
        match self
            .window
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
        {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {e:?}");
                None
            }
        }
    }

    fn cancel(&self, request: Option<i32>) {
        self.next_tick.borrow_mut().take();
        if let Some(id) = request {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

/// Starts loading `{base}/{stem}.svg` for every segment image. Images that
/// fail to load stay in the set and are skipped at draw time.
pub fn load_skeleton_images(base: &str) -> SkeletonImages<HtmlImageElement> {
    let mut images = SkeletonImages::default();
    for kind in SegmentImage::ALL {
        let src = format!("{}/{}.svg", base.trim_end_matches('/'), kind.file_stem());
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(e) => {
                log::error!("cannot create image for {src}: {e:?}");
                continue;
            }
        };
        let onerror = {
            let src = src.clone();
            Closure::once_into_js(move || log::warn!("failed to load {src}"))
        };
        image.set_onerror(Some(onerror.unchecked_ref()));
        image.set_src(&src);
        images.insert(kind, image);
    }
    images
}
