use serde::{Deserialize, Serialize};

/// How pointer input is classified into a response value. Exactly one kind
/// is active per scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    None,
    LeftRight,
    TopBottom,
    Touch,
    Path,
    TouchObject,
    MoveObject,
    Keyboard,
    Keys,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    Cartesian,
    Polar,
}

/// When a move-object response is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCondition {
    /// On lifting the finger.
    Lift,
    /// When the moved object is dropped onto (or off) another object.
    TouchObject,
}

/// A hardware key bound to a response value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: String,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseConfig {
    pub kind: ResponseKind,
    /// Frame from which input is accepted; earlier samples are ignored.
    pub start_frame: i64,
    /// Origin of the response coordinate system, in centered screen pixels.
    pub origin: (f32, f32),
    pub coordinates: CoordinateSystem,
    /// Pixel-per-unit factors for the two reported components.
    pub unit_factors: (f32, f32),
    /// Left/top response value.
    pub first_value: f32,
    /// Right/bottom response value.
    pub second_value: f32,
    /// Per-object response value; `None` marks a non-interactive object.
    pub object_values: Vec<Option<f32>>,
    pub background_value: Option<f32>,
    pub end_condition: EndCondition,
    pub keys: Vec<KeyBinding>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        ResponseConfig {
            kind: ResponseKind::None,
            start_frame: 0,
            origin: (0.0, 0.0),
            coordinates: CoordinateSystem::Cartesian,
            unit_factors: (1.0, 1.0),
            first_value: 0.0,
            second_value: 1.0,
            object_values: Vec::new(),
            background_value: None,
            end_condition: EndCondition::Lift,
            keys: Vec::new(),
        }
    }
}

impl ResponseConfig {
    pub fn of_kind(kind: ResponseKind) -> ResponseConfig {
        ResponseConfig {
            kind,
            ..ResponseConfig::default()
        }
    }
}

/// Everything recorded about the user's response in one trial.
///
/// Created empty at trial start, appended to while input arrives, frozen the
/// moment a response is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub integer: Option<i64>,
    pub float: Option<f32>,
    pub string: Option<String>,

    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub radius: Vec<f32>,
    pub angle: Vec<f32>,
    /// Seconds since trial start, one entry per recorded sample.
    pub clocks: Vec<f64>,

    pub lift_clock: Option<f64>,
}

impl ResponseRecord {
    pub fn is_empty(&self) -> bool {
        self.integer.is_none()
            && self.float.is_none()
            && self.string.is_none()
            && self.clocks.is_empty()
            && self.lift_clock.is_none()
    }

    /// Clock of the sample that settled the response, if any.
    pub fn last_clock(&self) -> Option<f64> {
        self.lift_clock.or_else(|| self.clocks.last().copied())
    }
}
