use rand::Rng;
use serde::{Deserialize, Serialize};
use stimrig_core::{
    AssetTable, ConfigError, Experiment, ResponseRecord,
};
use stimrig_timing::FrameClock;
use tracing::{debug, info, warn};

use crate::checkpoint::{CheckpointAction, CheckpointScheduler};
use crate::classify::{PointerSample, ResponseClassifier};
use crate::resolver::VariableResolver;
use crate::seed::Seed;
use crate::table::{TrialParameterTable, background};

/// Collaborator callbacks fired from checkpoints and response acceptance.
/// Implementations must not block; media work is queued, never awaited.
pub trait MediaSink {
    fn start_audio(&mut self, _object: usize) {}
    fn end_audio(&mut self, _object: usize) {}
    fn start_video(&mut self, _object: usize) {}
    fn end_video(&mut self, _object: usize) {}
    fn start_text(&mut self, _object: usize) {}
    fn end_text(&mut self, _object: usize) {}
    fn start_tone(&mut self, _object: usize) {}
    fn end_tone(&mut self, _object: usize) {}
    fn stop_tone(&mut self) {}
    fn fade_media(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialStatus {
    Running,
    Finished,
}

/// One completed trial, as handed to the result-writer collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial: usize,
    /// Resolved list index per variable, in declaration order.
    pub indices: Vec<usize>,
    pub response: ResponseRecord,
    pub reaction_clock: Option<f64>,
}

mod status {
    pub const RUNNING: f32 = 1.0;
    pub const DONE: f32 = 0.0;
}

/// One run of an experiment: the explicit context object every component
/// reads, constructed once and passed by reference instead of living in a
/// process-wide singleton.
///
/// The frame clock side calls `begin_trial`/`tick`; the input side calls
/// `handle_pointer`/`handle_key`. See the table and classifier docs for the
/// single-writer discipline between the two.
#[derive(Debug)]
pub struct Session {
    pub experiment: Experiment,
    pub assets: AssetTable,
    pub table: TrialParameterTable,
    pub checkpoints: CheckpointScheduler,
    pub classifier: ResponseClassifier,
    pub clock: FrameClock,
    pub seeds: Vec<Seed>,
    resolver: VariableResolver,
    records: Vec<TrialRecord>,
    current_trial: usize,
}

impl Session {
    /// Validates the definition and compiles the initial per-trial state.
    /// A configuration problem stops the run before it starts.
    pub fn new(experiment: Experiment, assets: AssetTable) -> Result<Session, ConfigError> {
        experiment.validate()?;

        let table = TrialParameterTable::from_experiment(&experiment);
        let checkpoints = CheckpointScheduler::from_table(&experiment, &table);
        let classifier =
            ResponseClassifier::new(experiment.response.clone(), experiment.screen);
        let clock = FrameClock::new(experiment.frame_rate as f64);
        let resolver = VariableResolver::new(experiment.variables.len());

        info!(
            name = %experiment.name,
            trials = experiment.trials,
            objects = experiment.objects.len(),
            "session compiled"
        );

        Ok(Session {
            experiment,
            assets,
            table,
            checkpoints,
            classifier,
            clock,
            seeds: Vec::new(),
            resolver,
            records: Vec::new(),
            current_trial: 0,
        })
    }

    /// Draws one seed per declared randomization scope. Call before the
    /// first trial when the run needs reproducible randomness.
    pub fn generate_seeds<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.seeds = self
            .experiment
            .randomness_scopes
            .iter()
            .map(|scope| Seed::generate(scope.clone(), rng))
            .collect();
    }

    pub fn current_trial(&self) -> usize {
        self.current_trial
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    /// Resolves all variables for the trial and arms its checkpoints.
    /// `last_outcome` is the previous trial's binary outcome; pass `None`
    /// at trial 0.
    pub fn begin_trial(&mut self, trial: usize, last_outcome: Option<u8>) {
        self.current_trial = trial;
        if let Some(seed) = self.seeds.first() {
            self.table.background[trial][background::RANDOM_SEED_INITIAL] = seed.value as f32;
        }
        self.resolver.resolve_trial(
            &self.experiment,
            &self.assets,
            &mut self.table,
            &mut self.checkpoints,
            trial,
            last_outcome,
        );
        self.table.set_status(trial, status::RUNNING);
        self.classifier.begin_trial();
        debug!(trial, "trial armed");
    }

    /// Advances the trial to `frame`: updates the background bookkeeping,
    /// fires every checkpoint due this frame, and reports whether the trial
    /// is over (final checkpoint reached or a response already accepted).
    pub fn tick(&mut self, frame: i64, sink: &mut dyn MediaSink) -> TrialStatus {
        let trial = self.current_trial;
        self.table.set_frame(trial, frame);

        // an accepted response already terminated the trial; nothing fires
        // after termination, media is stopped through explicit stop calls
        if self.classifier.accepted() {
            self.table.set_status(trial, status::DONE);
            return TrialStatus::Finished;
        }

        let mut finished = false;
        let due: Vec<_> = self
            .checkpoints
            .trial(trial)
            .due(frame)
            .copied()
            .collect();
        for checkpoint in due {
            match checkpoint.action {
                CheckpointAction::StartAudio => sink.start_audio(checkpoint.object),
                CheckpointAction::EndAudio => sink.end_audio(checkpoint.object),
                CheckpointAction::StartVideo => sink.start_video(checkpoint.object),
                CheckpointAction::EndVideo => sink.end_video(checkpoint.object),
                CheckpointAction::StartText => sink.start_text(checkpoint.object),
                CheckpointAction::EndText => sink.end_text(checkpoint.object),
                CheckpointAction::StartTone => sink.start_tone(checkpoint.object),
                CheckpointAction::EndTone => sink.end_tone(checkpoint.object),
                CheckpointAction::Final => finished = true,
            }
        }

        if finished {
            self.table.set_status(trial, status::DONE);
            TrialStatus::Finished
        } else {
            TrialStatus::Running
        }
    }

    /// Routes one pointer sample into the classifier. Safe to call from the
    /// input side; it only writes the response record and, while an object
    /// is being moved, that object's center.
    pub fn handle_pointer(&mut self, sample: PointerSample, frame: i64, sink: &mut dyn MediaSink) -> bool {
        self.classifier.handle_sample(
            sample,
            frame,
            self.current_trial,
            &mut self.table,
            sink,
        )
    }

    pub fn handle_key(&mut self, key: &str, clock: f64, sink: &mut dyn MediaSink) -> bool {
        self.classifier.handle_key(key, clock, sink)
    }

    /// Terminal text from the on-screen keyboard, collected once the scene
    /// ends.
    pub fn submit_keyboard_text(&mut self, text: impl Into<String>) {
        self.classifier.set_keyboard_text(text);
    }

    /// Freezes the trial's response into a record. The reaction clock is the
    /// clock of the sample that settled the response.
    pub fn finish_trial(&mut self) -> &TrialRecord {
        let trial = self.current_trial;
        let response = self.classifier.take_record();
        let reaction_clock = response.last_clock();
        let indices = (0..self.experiment.variables.len())
            .map(|v| self.resolver.index(v))
            .collect();
        self.records.push(TrialRecord {
            trial,
            indices,
            response,
            reaction_clock,
        });
        debug!(trial, "trial recorded");
        self.records.last().expect("record just pushed")
    }

    /// Bookkeeping for one presented frame; frames that blow their budget
    /// end up in the long-frame report.
    pub fn note_frame(&mut self, frame: i64, took: std::time::Duration) {
        if self.clock.record_frame(self.current_trial, frame, took) {
            warn!(trial = self.current_trial, frame, ?took, "long frame");
        }
    }

    /// Serialized records for the result-writer collaborator.
    pub fn records_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.records)
    }
}
