// Field names and enum shapes follow the engine's JSON wire format.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Sub};

/// Simulation time index.
pub type Frame = u64;

/// A 2D vector, serialized as `[x, y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2(pub f64, pub f64);

impl Vec2 {
    pub const ZERO: Vec2 = Vec2(0.0, 0.0);

    pub fn x(self) -> f64 {
        self.0
    }

    pub fn y(self) -> f64 {
        self.1
    }

    /// Angle in radians of the direction from `self` towards `other`.
    pub fn angle_to(self, other: Vec2) -> f64 {
        (other.1 - self.1).atan2(other.0 - self.0)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2(self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2(self.0 * rhs, self.1 * rhs)
    }
}

/// Rider and sled point names the editor refers to directly.
pub mod points {
    pub const BOSH_BUTT: &str = "BoshButt";
    pub const BOSH_SHOULDER: &str = "BoshShoulder";
    pub const BOSH_LEFT_HAND: &str = "BoshLeftHand";
    pub const BOSH_RIGHT_HAND: &str = "BoshRightHand";
    pub const BOSH_LEFT_FOOT: &str = "BoshLeftFoot";
    pub const BOSH_RIGHT_FOOT: &str = "BoshRightFoot";
    pub const SLED_PEG: &str = "SledPeg";
    pub const SLED_ROPE: &str = "SledRope";
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub location: Vec2,
    pub previous_location: Vec2,
    pub momentum: Vec2,
    pub friction: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoneType {
    Normal,
    Mount { endurance: f64 },
    Repel {
        #[serde(rename = "lengthFactor")]
        length_factor: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub p1: String,
    pub p2: String,
    pub resting_length: f64,
    pub bone_type: BoneType,
}

/// Links two bones, each given as a pair of point names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joint {
    pub pair1: (String, String),
    pub pair2: (String, String),
}

/// One skeletal body at a given frame, as computed by the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub points: BTreeMap<String, Point>,
    #[serde(default)]
    pub bones: Vec<Bone>,
    #[serde(default)]
    pub joints: Vec<Joint>,
}

impl Entity {
    pub fn point(&self, name: &str) -> Option<&Point> {
        self.points.get(name)
    }
}

/// How an entity enters the track: a preset rider+sled or a fully custom skeleton.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityStart {
    BoshSled {
        position: Vec2,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        velocity: Option<Vec2>,
    },
    Custom(Entity),
}

impl EntityStart {
    pub fn bosh_sled_at(position: Vec2) -> Self {
        EntityStart::BoshSled {
            position,
            velocity: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub location: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<bool>,
}

impl LinePoint {
    pub fn at(location: Vec2) -> Self {
        Self {
            location,
            extended: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LineType {
    Normal,
    Accelerate { accel: f64 },
    Scenery,
}

/// A track boundary segment. Lines have no id; they are matched by value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub flipped: bool,
    pub line_type: LineType,
    pub ends: [LinePoint; 2],
}

impl Line {
    pub fn normal(from: Vec2, to: Vec2) -> Self {
        Self {
            flipped: false,
            line_type: LineType::Normal,
            ends: [LinePoint::at(from), LinePoint::at(to)],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque metadata; the editor passes it through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, serde_json::Value>>,
    pub lines: Vec<Line>,
    #[serde(default)]
    pub entities: Vec<EntityStart>,
}
