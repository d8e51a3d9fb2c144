use stimrig_core::{Experiment, MediaKind, Shape};

/// Named offsets into each object's channel array. The renderer and the hit
/// test read geometry through the same offsets the resolver writes.
pub mod channel {
    pub const X_CENTER: usize = 0;
    pub const Y_CENTER: usize = 1;
    pub const X_SIZE: usize = 2;
    pub const Y_SIZE: usize = 3;
    pub const ROTATION: usize = 4;
    pub const SHAPE: usize = 5;
    pub const RED: usize = 6;
    pub const GREEN: usize = 7;
    pub const BLUE: usize = 8;
    /// Stimulus-specific parameters start here.
    pub const FREE: usize = 9;
    pub const COUNT: usize = 16;
}

/// Named offsets into the per-trial background channel array.
pub mod background {
    pub const TIME_IN_FRAMES: usize = 0;
    pub const STATUS: usize = 1;
    pub const RANDOM_SEED: usize = 2;
    pub const RANDOM_SEED_INITIAL: usize = 3;
    pub const RED: usize = 4;
    pub const GREEN: usize = 5;
    pub const BLUE: usize = 6;
    pub const COUNT: usize = 8;
}

/// Timed window of a playable asset. `end` always tracks `start`: shifting
/// the start keeps the resolved duration, setting the duration recomputes
/// the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSlot {
    pub activated: bool,
    pub start: i64,
    pub end: i64,
    /// Handle into the loaded-asset table; `None` until a payload resolves.
    pub asset: Option<usize>,
}

impl MediaSlot {
    pub fn shift_start(&mut self, new_start: i64) {
        let delta = new_start - self.start;
        self.start = new_start;
        self.end += delta;
    }

    pub fn set_duration(&mut self, frames: i64) {
        self.end = self.start + frames;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSlot {
    pub activated: bool,
    pub start: i64,
    pub end: i64,
    pub content: String,
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
    pub color: [f32; 3],
}

impl Default for TextSlot {
    fn default() -> Self {
        TextSlot {
            activated: false,
            start: 0,
            end: 0,
            content: String::new(),
            font_size: 24.0,
            x: 0.0,
            y: 0.0,
            color: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToneSlot {
    pub activated: bool,
    pub start: i64,
    pub end: i64,
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for ToneSlot {
    fn default() -> Self {
        ToneSlot {
            activated: false,
            start: 0,
            end: 0,
            amplitude: 1.0,
            frequency: 440.0,
        }
    }
}

/// Dense per-trial, per-object parameter storage read by the renderer each
/// frame.
///
/// The frame clock is the sole writer, with one exception: the input handler
/// may write the two center channels of the object it is currently moving.
#[derive(Debug, Clone)]
pub struct TrialParameterTable {
    trials: usize,
    objects: usize,
    pub activation: Vec<Vec<bool>>,
    pub start_frames: Vec<Vec<i64>>,
    pub duration_frames: Vec<Vec<i64>>,
    pub end_frames: Vec<Vec<i64>>,
    /// `[trial][offset]`, see [`background`].
    pub background: Vec<Vec<f32>>,
    /// `[trial][object][offset]`, see [`channel`].
    pub channels: Vec<Vec<Vec<f32>>>,
    /// Image handle per object, `[trial][object]`.
    pub images: Vec<Vec<Option<usize>>>,
    pub audio: Vec<Vec<MediaSlot>>,
    pub video: Vec<Vec<MediaSlot>>,
    pub text: Vec<Vec<TextSlot>>,
    pub tone: Vec<Vec<ToneSlot>>,
    /// Parameter slots for time-dependent property evaluators,
    /// `[trial][slot]`.
    pub time_dependent: Vec<Vec<f32>>,
}

impl TrialParameterTable {
    pub const TIME_DEPENDENT_SLOTS: usize = 16;

    pub fn new(trials: usize, objects: usize) -> TrialParameterTable {
        TrialParameterTable {
            trials,
            objects,
            activation: vec![vec![false; objects]; trials],
            start_frames: vec![vec![0; objects]; trials],
            duration_frames: vec![vec![0; objects]; trials],
            end_frames: vec![vec![0; objects]; trials],
            background: vec![vec![0.0; background::COUNT]; trials],
            channels: vec![vec![vec![0.0; channel::COUNT]; objects]; trials],
            images: vec![vec![None; objects]; trials],
            audio: vec![vec![MediaSlot::default(); objects]; trials],
            video: vec![vec![MediaSlot::default(); objects]; trials],
            text: vec![vec![TextSlot::default(); objects]; trials],
            tone: vec![vec![ToneSlot::default(); objects]; trials],
            time_dependent: vec![vec![0.0; Self::TIME_DEPENDENT_SLOTS]; trials],
        }
    }

    /// Seeds every trial row from the declared object state.
    pub fn from_experiment(exp: &Experiment) -> TrialParameterTable {
        let mut table = TrialParameterTable::new(exp.trials, exp.objects.len());
        let rate = exp.frame_rate;
        for trial in 0..exp.trials {
            for (object, spec) in exp.objects.iter().enumerate() {
                table.activation[trial][object] = spec.activated;
                table.start_frames[trial][object] = to_frames(spec.start_secs, rate);
                table.duration_frames[trial][object] = to_frames(spec.duration_secs, rate);
                table.end_frames[trial][object] =
                    table.start_frames[trial][object] + table.duration_frames[trial][object];

                let row = &mut table.channels[trial][object];
                row[channel::X_CENTER] = spec.center.0;
                row[channel::Y_CENTER] = spec.center.1;
                row[channel::X_SIZE] = spec.size.0;
                row[channel::Y_SIZE] = spec.size.1;
                row[channel::ROTATION] = spec.rotation;
                row[channel::SHAPE] = spec.shape.code();
                row[channel::RED] = spec.color[0];
                row[channel::GREEN] = spec.color[1];
                row[channel::BLUE] = spec.color[2];
            }
        }
        table
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn objects(&self) -> usize {
        self.objects
    }

    pub fn activated(&self, trial: usize, object: usize) -> bool {
        self.activation[trial][object]
    }

    pub fn center(&self, trial: usize, object: usize) -> (f32, f32) {
        let row = &self.channels[trial][object];
        (row[channel::X_CENTER], row[channel::Y_CENTER])
    }

    pub fn set_center(&mut self, trial: usize, object: usize, x: f32, y: f32) {
        let row = &mut self.channels[trial][object];
        row[channel::X_CENTER] = x;
        row[channel::Y_CENTER] = y;
    }

    pub fn size(&self, trial: usize, object: usize) -> (f32, f32) {
        let row = &self.channels[trial][object];
        (row[channel::X_SIZE], row[channel::Y_SIZE])
    }

    pub fn rotation(&self, trial: usize, object: usize) -> f32 {
        self.channels[trial][object][channel::ROTATION]
    }

    pub fn shape(&self, trial: usize, object: usize) -> Shape {
        Shape::from_code(self.channels[trial][object][channel::SHAPE])
    }

    /// Recomputes an object's end frame after a start or duration write.
    pub fn refresh_end(&mut self, trial: usize, object: usize) {
        self.end_frames[trial][object] =
            self.start_frames[trial][object] + self.duration_frames[trial][object];
    }

    /// `(activated, start, end)` of a media slot.
    pub fn media_window(&self, trial: usize, object: usize, kind: MediaKind) -> (bool, i64, i64) {
        match kind {
            MediaKind::Audio => {
                let s = &self.audio[trial][object];
                (s.activated, s.start, s.end)
            }
            MediaKind::Video => {
                let s = &self.video[trial][object];
                (s.activated, s.start, s.end)
            }
            MediaKind::Text => {
                let s = &self.text[trial][object];
                (s.activated, s.start, s.end)
            }
            MediaKind::Tone => {
                let s = &self.tone[trial][object];
                (s.activated, s.start, s.end)
            }
        }
    }

    /// Mutable view of a media slot's timing fields, kind-agnostic so the
    /// window edit path is written once.
    pub fn media_window_mut(
        &mut self,
        trial: usize,
        object: usize,
        kind: MediaKind,
    ) -> (&mut bool, &mut i64, &mut i64) {
        match kind {
            MediaKind::Audio => {
                let s = &mut self.audio[trial][object];
                (&mut s.activated, &mut s.start, &mut s.end)
            }
            MediaKind::Video => {
                let s = &mut self.video[trial][object];
                (&mut s.activated, &mut s.start, &mut s.end)
            }
            MediaKind::Text => {
                let s = &mut self.text[trial][object];
                (&mut s.activated, &mut s.start, &mut s.end)
            }
            MediaKind::Tone => {
                let s = &mut self.tone[trial][object];
                (&mut s.activated, &mut s.start, &mut s.end)
            }
        }
    }

    /// Per-frame background bookkeeping: the frame counter and the derived
    /// per-frame random seed the renderer folds into its noise.
    pub fn set_frame(&mut self, trial: usize, frame: i64) {
        let row = &mut self.background[trial];
        row[background::TIME_IN_FRAMES] = frame as f32;
        row[background::RANDOM_SEED] =
            row[background::RANDOM_SEED_INITIAL] * (frame as f32 + 1.0);
    }

    pub fn set_status(&mut self, trial: usize, status: f32) {
        self.background[trial][background::STATUS] = status;
    }
}

pub(crate) fn to_frames(secs: f32, frame_rate: f32) -> i64 {
    (secs * frame_rate).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifting_start_preserves_duration() {
        let mut slot = MediaSlot {
            activated: true,
            start: 10,
            end: 40,
            asset: None,
        };
        slot.shift_start(25);
        assert_eq!(slot.start, 25);
        assert_eq!(slot.end, 55);
    }

    #[test]
    fn setting_duration_leaves_start_alone() {
        let mut slot = MediaSlot {
            activated: true,
            start: 10,
            end: 40,
            asset: None,
        };
        slot.set_duration(5);
        assert_eq!(slot.start, 10);
        assert_eq!(slot.end, 15);
    }

    #[test]
    fn frame_counter_updates_derived_seed() {
        let mut table = TrialParameterTable::new(1, 1);
        table.background[0][background::RANDOM_SEED_INITIAL] = 3.0;
        table.set_frame(0, 4);
        assert_eq!(table.background[0][background::TIME_IN_FRAMES], 4.0);
        assert_eq!(table.background[0][background::RANDOM_SEED], 15.0);
    }
}
