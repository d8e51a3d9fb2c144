use serde::{Deserialize, Serialize};

use crate::units::UnitSpec;

/// Adaptive adjustment rule for a variable, applied once per trial from the
/// previous trial's binary outcome (0 = step up, 1 = step down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Not adaptive; the index comes from `Selection`.
    None,
    /// Binary flag: outcome 0 selects index 1, outcome 1 selects index 0.
    Zero,
    /// Move one step per outcome.
    One,
    /// Step down only after two consecutive down outcomes.
    Two,
    /// Step down only after three consecutive down outcomes.
    Three,
}

impl Method {
    pub fn is_adaptive(self) -> bool {
        !matches!(self, Method::None)
    }
}

/// Index ordering for non-adaptive variables. A `Sequence` is precomputed by
/// the ordering collaborator (shuffled, blocked, ...); `InOrder` walks the
/// list cyclically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    InOrder,
    Sequence(Vec<usize>),
}

/// Media kinds that own a start/end checkpoint pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Audio,
    Video,
    Text,
    Tone,
}

/// Timing fields of a media slot a variable can rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowField {
    Activated,
    Start,
    Duration,
}

/// Style fields of a text slot. `Color` takes its component count from the
/// source list: one component paints gray, three paint rgb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextField {
    FontSize,
    PositionX,
    PositionY,
    Color,
    Green,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToneField {
    Amplitude,
    Frequency,
}

/// Marks an object-channel write as one half of a polar pair. The resolver
/// converts each touched pair to Cartesian after the whole trial resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolarComponent {
    Radius,
    Angle,
}

/// Where a resolved value lands. One variant per destination; the resolver
/// dispatches over this exactly once per variable per trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    /// Object on/off flag.
    Activation { object: usize },
    /// Stimulus start, in seconds before unit conversion.
    StartTime { object: usize },
    /// Stimulus duration; the end frame is recomputed from start + duration.
    Duration { object: usize },
    /// Scene-wide channel write.
    Background {
        offset: usize,
        components: usize,
        repetitions: usize,
    },
    /// Per-object channel write of 1-3 contiguous scalars.
    ObjectChannel {
        object: usize,
        offset: usize,
        components: usize,
        repetitions: usize,
        polar: Option<PolarComponent>,
    },
    /// Symbolic 1-based index into the image list, resolved to an asset
    /// handle.
    ImageReference { object: usize },
    /// Symbolic 1-based index into the matching media list: audio/video
    /// resolve to an asset handle, text resolves to its content.
    MediaReference { object: usize, kind: MediaKind },
    /// Activation/start/duration of a media slot; rebuilds that slot's
    /// checkpoints.
    MediaWindow {
        object: usize,
        kind: MediaKind,
        field: WindowField,
    },
    TextStyle { object: usize, field: TextField },
    ToneParameter { object: usize, field: ToneField },
    /// Parameter slot read by time-dependent property evaluators.
    TimeDependent { slot: usize },
}

impl Target {
    /// Object index this target touches, if any.
    pub fn object(&self) -> Option<usize> {
        match *self {
            Target::Activation { object }
            | Target::StartTime { object }
            | Target::Duration { object }
            | Target::ObjectChannel { object, .. }
            | Target::ImageReference { object }
            | Target::MediaReference { object, .. }
            | Target::MediaWindow { object, .. }
            | Target::TextStyle { object, .. }
            | Target::ToneParameter { object, .. } => Some(object),
            Target::Background { .. } | Target::TimeDependent { .. } => None,
        }
    }

    pub fn components(&self) -> usize {
        match *self {
            Target::Background { components, .. }
            | Target::ObjectChannel { components, .. } => components,
            _ => 1,
        }
    }
}

/// A declared experiment variable. Definitions are immutable; all per-run
/// state (the resolved index, staircase counters) lives in the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub list_id: Option<String>,
    pub method: Method,
    /// Index forced at trial 0 for adaptive variables.
    pub initial_index: usize,
    pub selection: Selection,
    pub unit: UnitSpec,
    pub target: Target,
}

impl Variable {
    pub fn new(id: impl Into<String>, name: impl Into<String>, target: Target) -> Variable {
        Variable {
            id: id.into(),
            name: name.into(),
            list_id: None,
            method: Method::None,
            initial_index: 0,
            selection: Selection::InOrder,
            unit: UnitSpec::NONE,
            target,
        }
    }

    pub fn with_list(mut self, list_id: impl Into<String>) -> Variable {
        self.list_id = Some(list_id.into());
        self
    }

    pub fn with_method(mut self, method: Method, initial_index: usize) -> Variable {
        self.method = method;
        self.initial_index = initial_index;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Variable {
        self.selection = selection;
        self
    }

    pub fn with_unit(mut self, unit: UnitSpec) -> Variable {
        self.unit = unit;
        self
    }
}
