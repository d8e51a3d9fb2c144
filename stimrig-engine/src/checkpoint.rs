use stimrig_core::{Experiment, MediaKind, SceneDuration};
use tracing::debug;

use crate::table::{TrialParameterTable, to_frames};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointAction {
    StartAudio,
    EndAudio,
    StartVideo,
    EndVideo,
    StartText,
    EndText,
    StartTone,
    EndTone,
    /// Synthetic trial-end marker, recomputed after every rebuild.
    Final,
}

impl CheckpointAction {
    pub fn start_of(kind: MediaKind) -> CheckpointAction {
        match kind {
            MediaKind::Audio => CheckpointAction::StartAudio,
            MediaKind::Video => CheckpointAction::StartVideo,
            MediaKind::Text => CheckpointAction::StartText,
            MediaKind::Tone => CheckpointAction::StartTone,
        }
    }

    pub fn end_of(kind: MediaKind) -> CheckpointAction {
        match kind {
            MediaKind::Audio => CheckpointAction::EndAudio,
            MediaKind::Video => CheckpointAction::EndVideo,
            MediaKind::Text => CheckpointAction::EndText,
            MediaKind::Tone => CheckpointAction::EndTone,
        }
    }
}

/// A discrete, frame-indexed media event derived from the continuous trial
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pub frame: i64,
    pub action: CheckpointAction,
    pub object: usize,
    pub kind: Option<MediaKind>,
}

/// Frame-ordered multiset of one trial's checkpoints.
///
/// Entries are replaced atomically per `(object, kind)` pair; ties on the
/// same frame keep insertion order, which is stable because effects on
/// distinct objects and kinds commute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointList {
    entries: Vec<Checkpoint>,
}

impl CheckpointList {
    /// Drops every entry for `(object, kind)` and inserts the start/end pair
    /// for the given window, if any.
    pub fn replace(&mut self, object: usize, kind: MediaKind, window: Option<(i64, i64)>) {
        self.entries
            .retain(|c| c.object != object || c.kind != Some(kind));
        if let Some((start, end)) = window {
            self.entries.push(Checkpoint {
                frame: start,
                action: CheckpointAction::start_of(kind),
                object,
                kind: Some(kind),
            });
            self.entries.push(Checkpoint {
                frame: end,
                action: CheckpointAction::end_of(kind),
                object,
                kind: Some(kind),
            });
        }
    }

    pub fn set_final(&mut self, frame: i64) {
        self.entries
            .retain(|c| c.action != CheckpointAction::Final);
        self.entries.push(Checkpoint {
            frame,
            action: CheckpointAction::Final,
            object: 0,
            kind: None,
        });
    }

    pub fn final_frame(&self) -> Option<i64> {
        self.entries
            .iter()
            .find(|c| c.action == CheckpointAction::Final)
            .map(|c| c.frame)
    }

    /// Entries due at exactly this frame, in insertion order.
    pub fn due(&self, frame: i64) -> impl Iterator<Item = &Checkpoint> {
        self.entries.iter().filter(move |c| c.frame == frame)
    }

    /// All entries sorted by frame; ties keep insertion order.
    pub fn ordered(&self) -> Vec<Checkpoint> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|c| c.frame);
        sorted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owns the per-trial checkpoint lists and keeps them consistent with the
/// parameter table as variables rewrite media windows.
#[derive(Debug, Clone)]
pub struct CheckpointScheduler {
    pub trials: Vec<CheckpointList>,
    /// Lower bound on the final checkpoint when the scene has a fixed
    /// duration.
    base_frames: i64,
}

impl CheckpointScheduler {
    pub fn new(trials: usize, base_frames: i64) -> CheckpointScheduler {
        CheckpointScheduler {
            trials: vec![CheckpointList::default(); trials],
            base_frames,
        }
    }

    /// Builds the full schedule for every trial of an experiment from the
    /// freshly seeded table.
    pub fn from_table(exp: &Experiment, table: &TrialParameterTable) -> CheckpointScheduler {
        let base = match exp.duration {
            SceneDuration::Constant(secs) => to_frames(secs, exp.frame_rate),
            SceneDuration::StimuliEnd => 0,
        };
        let mut scheduler = CheckpointScheduler::new(exp.trials, base);
        for trial in 0..exp.trials {
            for object in 0..table.objects() {
                for kind in [
                    MediaKind::Audio,
                    MediaKind::Video,
                    MediaKind::Text,
                    MediaKind::Tone,
                ] {
                    scheduler.rebuild(table, trial, object, kind);
                }
            }
        }
        scheduler
    }

    /// Re-derives the `(object, kind)` checkpoint pair from the table and
    /// refreshes the trial's final checkpoint. Idempotent for an unchanged
    /// slot.
    pub fn rebuild(
        &mut self,
        table: &TrialParameterTable,
        trial: usize,
        object: usize,
        kind: MediaKind,
    ) {
        let (activated, start, end) = table.media_window(trial, object, kind);
        let window = activated.then_some((start, end));
        debug!(trial, object, ?kind, ?window, "checkpoint rebuild");
        self.trials[trial].replace(object, kind, window);
        self.refresh_final(table, trial);
    }

    /// Final checkpoint = the latest end frame of any activated stimulus or
    /// media window, floored at the fixed scene duration. This bounds trial
    /// length when duration is data-driven.
    pub fn refresh_final(&mut self, table: &TrialParameterTable, trial: usize) {
        let mut last = self.base_frames;
        for object in 0..table.objects() {
            if table.activated(trial, object) {
                last = last.max(table.end_frames[trial][object]);
            }
            for kind in [
                MediaKind::Audio,
                MediaKind::Video,
                MediaKind::Text,
                MediaKind::Tone,
            ] {
                let (activated, _, end) = table.media_window(trial, object, kind);
                if activated {
                    last = last.max(end);
                }
            }
        }
        self.trials[trial].set_final(last);
    }

    pub fn trial(&self, trial: usize) -> &CheckpointList {
        &self.trials[trial]
    }
}
