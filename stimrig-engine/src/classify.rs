use stimrig_core::{
    EndCondition, ResponseConfig, ResponseKind, ResponseRecord,
    units::cartesian_to_polar,
};
use tracing::debug;

use crate::session::MediaSink;
use crate::table::TrialParameterTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// One coalesced pointer sample in screen pixels (origin top-left, display
/// scale already applied by the capture layer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    /// Seconds since trial start.
    pub clock: f64,
}

/// A pointer position in every form a response may need: raw screen, centered
/// screen, and origin/unit-relative Cartesian and polar.
#[derive(Debug, Clone, Copy)]
struct TouchPoint {
    screen_x: f32,
    screen_y: f32,
    real_x: f32,
    real_y: f32,
    x: f32,
    y: f32,
    radius: f32,
    angle: f32,
    clock: f64,
}

/// Turns raw pointer samples into a single typed response per trial.
///
/// A small state machine per response kind: it owns the ResponseRecord, the
/// explicit grab of the currently moved object, and the overlap baseline for
/// drop detection. Once a response is accepted every later sample is
/// ignored; the record is frozen.
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    config: ResponseConfig,
    screen: (f32, f32),
    touching: bool,
    accepted: bool,
    /// Explicitly acquired at pointer-down over an interactive object,
    /// released at pointer-up.
    moving: Option<usize>,
    grabbed_value: Option<f32>,
    overlap_baseline: Option<usize>,
    record: ResponseRecord,
}

impl ResponseClassifier {
    pub fn new(config: ResponseConfig, screen: (f32, f32)) -> ResponseClassifier {
        ResponseClassifier {
            config,
            screen,
            touching: false,
            accepted: false,
            moving: None,
            grabbed_value: None,
            overlap_baseline: None,
            record: ResponseRecord::default(),
        }
    }

    pub fn begin_trial(&mut self) {
        self.touching = false;
        self.accepted = false;
        self.moving = None;
        self.grabbed_value = None;
        self.overlap_baseline = None;
        self.record = ResponseRecord::default();
    }

    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn record(&self) -> &ResponseRecord {
        &self.record
    }

    pub fn take_record(&mut self) -> ResponseRecord {
        std::mem::take(&mut self.record)
    }

    pub fn moving_object(&self) -> Option<usize> {
        self.moving
    }

    /// Feeds one pointer sample through the active response kind. Returns
    /// true when this sample accepted the response and ended the trial.
    pub fn handle_sample(
        &mut self,
        sample: PointerSample,
        frame: i64,
        trial: usize,
        table: &mut TrialParameterTable,
        sink: &mut dyn MediaSink,
    ) -> bool {
        if self.accepted {
            return false;
        }
        match sample.phase {
            PointerPhase::Down => {
                if frame < self.config.start_frame {
                    return false;
                }
                self.touching = true;
                self.on_down(sample, trial, table, sink)
            }
            PointerPhase::Move => {
                if !self.touching {
                    return false;
                }
                self.on_move(sample, trial, table, sink)
            }
            PointerPhase::Up => {
                if !self.touching {
                    return false;
                }
                self.touching = false;
                self.moving = None;
                self.on_up(sample, sink)
            }
        }
    }

    /// A hardware key bound to a value accepts at any time.
    pub fn handle_key(&mut self, key: &str, clock: f64, sink: &mut dyn MediaSink) -> bool {
        if self.accepted || self.config.kind != ResponseKind::Keys {
            return false;
        }
        let Some(binding) = self.config.keys.iter().find(|b| b.key == key) else {
            return false;
        };
        self.record.float = Some(binding.value);
        self.record.string = Some(binding.value.to_string());
        self.record.clocks.push(clock);
        self.accept(sink);
        true
    }

    /// Terminal text typed on the on-screen keyboard once the scene ends.
    pub fn set_keyboard_text(&mut self, text: impl Into<String>) {
        if self.config.kind == ResponseKind::Keyboard && !self.accepted {
            self.record.string = Some(text.into());
            self.accepted = true;
        }
    }

    fn on_down(
        &mut self,
        sample: PointerSample,
        trial: usize,
        table: &mut TrialParameterTable,
        sink: &mut dyn MediaSink,
    ) -> bool {
        let point = self.touch_point(sample);
        match self.config.kind {
            ResponseKind::LeftRight => {
                let w = self.screen.0;
                if point.screen_x < w / 3.0 {
                    self.accept_integer(self.config.first_value, point.clock, sink)
                } else if point.screen_x > 2.0 * w / 3.0 {
                    self.accept_integer(self.config.second_value, point.clock, sink)
                } else {
                    false
                }
            }
            ResponseKind::TopBottom => {
                let h = self.screen.1;
                if point.screen_y < h / 3.0 {
                    self.accept_integer(self.config.first_value, point.clock, sink)
                } else if point.screen_y > 2.0 * h / 3.0 {
                    self.accept_integer(self.config.second_value, point.clock, sink)
                } else {
                    false
                }
            }
            ResponseKind::Touch => {
                self.push_point(&point);
                self.accept(sink);
                true
            }
            ResponseKind::Path => {
                self.push_point(&point);
                false
            }
            ResponseKind::TouchObject => self.classify_touch_object(&point, trial, table, sink),
            ResponseKind::MoveObject => {
                self.push_point(&point);
                self.drive_move_object(&point, trial, table, sink)
            }
            ResponseKind::None | ResponseKind::Keyboard | ResponseKind::Keys => false,
        }
    }

    fn on_move(
        &mut self,
        sample: PointerSample,
        trial: usize,
        table: &mut TrialParameterTable,
        sink: &mut dyn MediaSink,
    ) -> bool {
        let point = self.touch_point(sample);
        match self.config.kind {
            ResponseKind::Path => {
                self.push_point(&point);
                false
            }
            ResponseKind::MoveObject => {
                self.push_point(&point);
                self.drive_move_object(&point, trial, table, sink)
            }
            _ => false,
        }
    }

    fn on_up(&mut self, sample: PointerSample, sink: &mut dyn MediaSink) -> bool {
        match self.config.kind {
            ResponseKind::Path => {
                self.record.lift_clock = Some(sample.clock);
                self.accept(sink);
                true
            }
            ResponseKind::MoveObject => {
                if self.config.end_condition == EndCondition::Lift {
                    if let Some(value) = self.grabbed_value {
                        self.record.float = Some(value);
                        self.record.string = Some(value.to_string());
                        self.record.lift_clock = Some(sample.clock);
                        self.accept(sink);
                        return true;
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn classify_touch_object(
        &mut self,
        point: &TouchPoint,
        trial: usize,
        table: &TrialParameterTable,
        sink: &mut dyn MediaSink,
    ) -> bool {
        // back-to-front: the last drawn object wins
        for object in (0..table.objects()).rev() {
            let Some(value) = self.object_value(object) else {
                continue;
            };
            if self.hits(point, trial, object, table) {
                return self.accept_float(value, point.clock, sink);
            }
        }
        if let Some(value) = self.config.background_value {
            return self.accept_float(value, point.clock, sink);
        }
        false
    }

    /// Pick up, drag, and possibly drop the moved object for one sample.
    fn drive_move_object(
        &mut self,
        point: &TouchPoint,
        trial: usize,
        table: &mut TrialParameterTable,
        sink: &mut dyn MediaSink,
    ) -> bool {
        match self.moving {
            None => {
                for object in (0..table.objects()).rev() {
                    let Some(value) = self.object_value(object) else {
                        continue;
                    };
                    if self.hits(point, trial, object, table) {
                        debug!(object, "object grabbed");
                        table.set_center(trial, object, point.real_x, point.real_y);
                        self.moving = Some(object);
                        self.grabbed_value = Some(value);
                        self.overlap_baseline = None;
                        if self.config.end_condition == EndCondition::TouchObject {
                            return self.check_overlap(point, trial, table, sink);
                        }
                        return false;
                    }
                }
                false
            }
            Some(object) => {
                // the only table fields the input side may write
                table.set_center(trial, object, point.real_x, point.real_y);
                if self.config.end_condition == EndCondition::TouchObject {
                    return self.check_overlap(point, trial, table, sink);
                }
                false
            }
        }
    }

    /// Drop detection: the response ends when the number of other objects
    /// under the pointer changes against the baseline taken at the first
    /// sample after pick-up.
    fn check_overlap(
        &mut self,
        point: &TouchPoint,
        trial: usize,
        table: &TrialParameterTable,
        sink: &mut dyn MediaSink,
    ) -> bool {
        let mut overlap = 0;
        for object in 0..table.objects() {
            if self.moving == Some(object) {
                continue;
            }
            if self.hits(point, trial, object, table) {
                overlap += 1;
            }
        }
        match self.overlap_baseline {
            None => {
                self.overlap_baseline = Some(overlap);
                false
            }
            Some(baseline) if baseline != overlap => {
                if let Some(value) = self.grabbed_value {
                    self.record.float = Some(value);
                    self.record.string = Some(value.to_string());
                }
                self.record.clocks.push(point.clock);
                self.accept(sink);
                true
            }
            Some(_) => false,
        }
    }

    fn hits(&self, point: &TouchPoint, trial: usize, object: usize, table: &TrialParameterTable) -> bool {
        if !table.activated(trial, object) {
            return false;
        }
        let (cx, cy) = table.center(trial, object);
        let (w, h) = table.size(trial, object);
        table.shape(trial, object).contains(
            point.real_x - cx,
            point.real_y - cy,
            w,
            h,
            table.rotation(trial, object),
        )
    }

    fn object_value(&self, object: usize) -> Option<f32> {
        self.config.object_values.get(object).copied().flatten()
    }

    fn touch_point(&self, sample: PointerSample) -> TouchPoint {
        let real_x = sample.x - self.screen.0 / 2.0;
        let real_y = self.screen.1 / 2.0 - sample.y;
        let (ox, oy) = self.config.origin;
        let dx = real_x - ox;
        let dy = real_y - oy;
        let (fx, fy) = self.config.unit_factors;
        let (radius, angle) = cartesian_to_polar(dx, dy);
        TouchPoint {
            screen_x: sample.x,
            screen_y: sample.y,
            real_x,
            real_y,
            x: dx / fx,
            y: dy / fy,
            radius: radius / fx,
            angle: angle / fy,
            clock: sample.clock,
        }
    }

    fn push_point(&mut self, point: &TouchPoint) {
        self.record.x.push(point.x);
        self.record.y.push(point.y);
        self.record.radius.push(point.radius);
        self.record.angle.push(point.angle);
        self.record.clocks.push(point.clock);
    }

    fn accept_integer(&mut self, value: f32, clock: f64, sink: &mut dyn MediaSink) -> bool {
        self.record.integer = Some(value as i64);
        self.record.string = Some((value as i64).to_string());
        self.record.clocks.push(clock);
        self.accept(sink);
        true
    }

    fn accept_float(&mut self, value: f32, clock: f64, sink: &mut dyn MediaSink) -> bool {
        self.record.float = Some(value);
        self.record.string = Some(value.to_string());
        self.record.clocks.push(clock);
        self.accept(sink);
        true
    }

    fn accept(&mut self, sink: &mut dyn MediaSink) {
        self.accepted = true;
        sink.stop_tone();
        sink.fade_media();
    }
}
