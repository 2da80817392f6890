use crate::config::EditorConfig;
use crate::model::{Entity, Line, Vec2, points};
use crate::state::Snapshot;
use crate::state::camera::{Camera, world_to_screen};

const LINE_COLOR: &str = "black";
const POINT_COLOR: &str = "red";
const PREVIOUS_POINT_COLOR: &str = "pink";
const MOMENTUM_COLOR: &str = "blue";
const MOMENTUM_WIDTH: f64 = 1.0;

/// Where and how to place a segment image, in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePlacement {
    pub origin: Vec2,
    pub angle: f64,
    pub scale: f64,
    pub anchor: Vec2,
}

/// Drawing target. Colors are CSS color strings.
pub trait Surface {
    type Image;

    fn clear(&mut self);
    fn fill_circle(&mut self, center: Vec2, radius: f64, color: &str);
    fn stroke_segment(&mut self, from: Vec2, to: Vec2, width: f64, color: &str);
    fn draw_image(&mut self, image: &Self::Image, placement: &ImagePlacement);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneStyle {
    pub line_width: f64,
    pub point_radius: f64,
    pub momentum_scale: f64,
    pub image_scale: f64,
}

impl From<&EditorConfig> for SceneStyle {
    fn from(cfg: &EditorConfig) -> Self {
        Self {
            line_width: cfg.line_width,
            point_radius: cfg.point_radius,
            momentum_scale: cfg.momentum_scale,
            image_scale: cfg.image_scale,
        }
    }
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

// Rider skeleton segments and the images drawn along them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentImage {
    Bosh,
    Arm,
    Leg,
    Sled,
}

impl SegmentImage {
    pub const ALL: [SegmentImage; 4] = [
        SegmentImage::Bosh,
        SegmentImage::Arm,
        SegmentImage::Leg,
        SegmentImage::Sled,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            SegmentImage::Bosh => "bosh",
            SegmentImage::Arm => "arm",
            SegmentImage::Leg => "leg",
            SegmentImage::Sled => "sled",
        }
    }

    /// Pivot in image pixels, placed on the segment's first point.
    pub fn anchor(self) -> Vec2 {
        match self {
            SegmentImage::Bosh => Vec2(0.0, 7.0),
            SegmentImage::Arm => Vec2(1.0, 1.5),
            SegmentImage::Leg => Vec2(1.0, 3.5),
            SegmentImage::Sled => Vec2(1.0, 4.5),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub image: SegmentImage,
    pub from: &'static str,
    pub to: &'static str,
}

/// Draw order: torso, arms, legs, sled.
pub const SEGMENTS: [Segment; 6] = [
    Segment {
        image: SegmentImage::Bosh,
        from: points::BOSH_BUTT,
        to: points::BOSH_SHOULDER,
    },
    Segment {
        image: SegmentImage::Arm,
        from: points::BOSH_SHOULDER,
        to: points::BOSH_RIGHT_HAND,
    },
    Segment {
        image: SegmentImage::Arm,
        from: points::BOSH_SHOULDER,
        to: points::BOSH_LEFT_HAND,
    },
    Segment {
        image: SegmentImage::Leg,
        from: points::BOSH_BUTT,
        to: points::BOSH_RIGHT_FOOT,
    },
    Segment {
        image: SegmentImage::Leg,
        from: points::BOSH_BUTT,
        to: points::BOSH_LEFT_FOOT,
    },
    Segment {
        image: SegmentImage::Sled,
        from: points::SLED_PEG,
        to: points::SLED_ROPE,
    },
];

#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonImage<I> {
    pub source: I,
    pub anchor: Vec2,
}

/// Loaded segment images; a missing entry means that segment is not drawn.
#[derive(Clone, Debug)]
pub struct SkeletonImages<I> {
    slots: [Option<SkeletonImage<I>>; 4],
}

impl<I> Default for SkeletonImages<I> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None],
        }
    }
}

impl<I> SkeletonImages<I> {
    pub fn insert(&mut self, kind: SegmentImage, source: I) {
        self.slots[kind.index()] = Some(SkeletonImage {
            source,
            anchor: kind.anchor(),
        });
    }

    pub fn get(&self, kind: SegmentImage) -> Option<&SkeletonImage<I>> {
        self.slots[kind.index()].as_ref()
    }
}

struct View {
    camera: Camera,
    zoom: f64,
    viewport: Vec2,
}

impl View {
    fn to_screen(&self, p: Vec2) -> Vec2 {
        world_to_screen(p, &self.camera, self.zoom, self.viewport)
    }
}

pub fn draw_scene<S: Surface>(
    surface: &mut S,
    snapshot: &Snapshot,
    camera: &Camera,
    viewport: Vec2,
    style: &SceneStyle,
    images: &SkeletonImages<S::Image>,
) {
    let view = View {
        camera: *camera,
        zoom: camera.zoom(),
        viewport,
    };
    surface.clear();
    for line in snapshot.lines.iter() {
        draw_line(surface, &view, style, line);
    }
    for entity in snapshot.entities.iter() {
        for segment in &SEGMENTS {
            draw_segment(surface, &view, style, images, entity, segment);
        }
        draw_debug_points(surface, &view, style, entity);
    }
}

fn draw_line<S: Surface>(surface: &mut S, view: &View, style: &SceneStyle, line: &Line) {
    let start = view.to_screen(line.ends[0].location);
    let end = view.to_screen(line.ends[1].location);
    let width = style.line_width * view.zoom;
    surface.fill_circle(start, width / 2.0, LINE_COLOR);
    surface.stroke_segment(start, end, width, LINE_COLOR);
    surface.fill_circle(end, width / 2.0, LINE_COLOR);
}

// Segments whose points are missing, or whose image never loaded, are skipped.
fn draw_segment<S: Surface>(
    surface: &mut S,
    view: &View,
    style: &SceneStyle,
    images: &SkeletonImages<S::Image>,
    entity: &Entity,
    segment: &Segment,
) {
    let (Some(from), Some(to)) = (entity.point(segment.from), entity.point(segment.to)) else {
        return;
    };
    let Some(image) = images.get(segment.image) else {
        return;
    };
    let placement = ImagePlacement {
        origin: view.to_screen(from.location),
        angle: from.location.angle_to(to.location),
        scale: view.zoom * style.image_scale,
        anchor: image.anchor,
    };
    surface.draw_image(&image.source, &placement);
}

fn draw_debug_points<S: Surface>(
    surface: &mut S,
    view: &View,
    style: &SceneStyle,
    entity: &Entity,
) {
    for point in entity.points.values() {
        let at = view.to_screen(point.location);
        surface.fill_circle(at, style.point_radius, POINT_COLOR);
        surface.fill_circle(
            view.to_screen(point.previous_location),
            style.point_radius,
            PREVIOUS_POINT_COLOR,
        );
        let tip = point.location + point.momentum * style.momentum_scale;
        surface.stroke_segment(at, view.to_screen(tip), MOMENTUM_WIDTH, MOMENTUM_COLOR);
    }
}
