use std::collections::HashSet;

use stimrig_core::{
    AssetKind, AssetTable, Experiment, ListOfValues, ListValue, MediaKind, PolarComponent,
    Selection, Target, TextField, ToneField, Variable, WindowField,
    units::polar_to_cartesian,
};
use tracing::warn;

use crate::adaptive::AdaptiveState;
use crate::checkpoint::CheckpointScheduler;
use crate::table::{TrialParameterTable, channel};

/// Resolves every variable of a scene for one trial and writes the results
/// into the parameter table, keeping the checkpoint schedule consistent.
///
/// Definitions stay immutable; this holds the per-run state (one staircase
/// per adaptive variable).
#[derive(Debug, Clone)]
pub struct VariableResolver {
    states: Vec<AdaptiveState>,
    resolved: Vec<usize>,
}

impl VariableResolver {
    pub fn new(variables: usize) -> VariableResolver {
        VariableResolver {
            states: vec![AdaptiveState::new(); variables],
            resolved: vec![0; variables],
        }
    }

    /// Resolved index of a variable after the last `resolve_trial` call.
    pub fn index(&self, variable: usize) -> usize {
        self.resolved[variable]
    }

    /// Runs the per-trial resolution pass. `last_outcome` is the previous
    /// trial's binary outcome; it is ignored at trial 0, where adaptive
    /// indices are forced to their configured initial value.
    #[tracing::instrument(skip_all, fields(trial = trial))]
    pub fn resolve_trial(
        &mut self,
        exp: &Experiment,
        assets: &AssetTable,
        table: &mut TrialParameterTable,
        checkpoints: &mut CheckpointScheduler,
        trial: usize,
        last_outcome: Option<u8>,
    ) {
        let mut polar_pairs: HashSet<(usize, usize)> = HashSet::new();

        for (slot, variable) in exp.variables.iter().enumerate() {
            let Some(list) = variable.list_id.as_deref().and_then(|id| exp.list(id)) else {
                continue;
            };
            if list.is_empty() {
                continue;
            }

            let index = if variable.method.is_adaptive() {
                let state = &mut self.states[slot];
                if trial == 0 {
                    state.reset(variable.initial_index, list.len());
                } else if let Some(outcome) = last_outcome {
                    state.step(variable.method, outcome, list.len());
                }
                state.index
            } else {
                match &variable.selection {
                    Selection::InOrder => trial % list.len(),
                    Selection::Sequence(seq) => {
                        seq.get(trial).copied().unwrap_or(trial % list.len())
                    }
                }
            };
            let index = index.min(list.len() - 1);
            self.resolved[slot] = index;
            let value = &list.values[index];

            write_value(
                exp,
                assets,
                table,
                checkpoints,
                trial,
                variable,
                list,
                value,
                &mut polar_pairs,
            );
        }

        // Convert every touched polar pair in place. Doing this once after
        // all writes makes the write order among variables sharing a pair
        // irrelevant.
        for (object, base) in polar_pairs {
            if base + 1 >= channel::COUNT {
                continue;
            }
            let row = &mut table.channels[trial][object];
            let (x, y) = polar_to_cartesian(row[base], row[base + 1]);
            row[base] = x;
            row[base + 1] = y;
        }
    }
}

/// Single dispatch over the target union; one arm per destination.
fn write_value(
    exp: &Experiment,
    assets: &AssetTable,
    table: &mut TrialParameterTable,
    checkpoints: &mut CheckpointScheduler,
    trial: usize,
    variable: &Variable,
    list: &ListOfValues,
    value: &ListValue,
    polar_pairs: &mut HashSet<(usize, usize)>,
) {
    let rate = exp.frame_rate;
    let scaled = variable.unit.apply(value.scalars[0], rate);

    match &variable.target {
        Target::Activation { object } => {
            table.activation[trial][*object] = scaled > 0.5;
            checkpoints.refresh_final(table, trial);
        }
        Target::StartTime { object } => {
            table.start_frames[trial][*object] = scaled.round() as i64;
            table.refresh_end(trial, *object);
            checkpoints.refresh_final(table, trial);
        }
        Target::Duration { object } => {
            table.duration_frames[trial][*object] = scaled.round() as i64;
            table.refresh_end(trial, *object);
            checkpoints.refresh_final(table, trial);
        }
        Target::Background {
            offset,
            components,
            repetitions,
        } => {
            write_channels(
                &mut table.background[trial],
                *offset,
                *components,
                *repetitions,
                value,
                variable,
                rate,
            );
        }
        Target::ObjectChannel {
            object,
            offset,
            components,
            repetitions,
            polar,
        } => {
            write_channels(
                &mut table.channels[trial][*object],
                *offset,
                *components,
                *repetitions,
                value,
                variable,
                rate,
            );
            match polar {
                Some(PolarComponent::Radius) => {
                    polar_pairs.insert((*object, *offset));
                }
                Some(PolarComponent::Angle) => {
                    polar_pairs.insert((*object, offset.saturating_sub(1)));
                }
                None => {}
            }
        }
        Target::ImageReference { object } => {
            let Some(images) = exp.image_list() else {
                return;
            };
            if let Some(name) = payload_name(images, scaled) {
                match assets.index_of(AssetKind::Image, name) {
                    Some(handle) => table.images[trial][*object] = Some(handle),
                    None => warn!(name, "image asset not loaded, reference skipped"),
                }
            }
        }
        Target::MediaReference { object, kind } => {
            resolve_media_payload(exp, assets, table, trial, *object, *kind, scaled);
        }
        Target::MediaWindow {
            object,
            kind,
            field,
        } => {
            let (activated, start, end) = table.media_window_mut(trial, *object, *kind);
            match field {
                WindowField::Activated => *activated = scaled > 0.5,
                WindowField::Start => {
                    // shift: the previously resolved duration is preserved
                    let new_start = scaled.round() as i64;
                    *end += new_start - *start;
                    *start = new_start;
                }
                WindowField::Duration => *end = *start + scaled.round() as i64,
            }
            checkpoints.rebuild(table, trial, *object, *kind);
        }
        Target::TextStyle { object, field } => {
            let slot = &mut table.text[trial][*object];
            match field {
                TextField::FontSize => slot.font_size = scaled,
                TextField::PositionX => slot.x = scaled,
                TextField::PositionY => slot.y = scaled,
                TextField::Color => {
                    if list.dimensions >= 3 {
                        slot.color = value.scalars;
                    } else {
                        slot.color = [scaled, scaled, scaled];
                    }
                }
                TextField::Green => slot.color[1] = scaled,
                TextField::Blue => slot.color[2] = scaled,
            }
        }
        Target::ToneParameter { object, field } => {
            let slot = &mut table.tone[trial][*object];
            match field {
                ToneField::Amplitude => slot.amplitude = scaled,
                ToneField::Frequency => slot.frequency = scaled,
            }
        }
        Target::TimeDependent { slot } => {
            if let Some(cell) = table.time_dependent[trial].get_mut(*slot) {
                *cell = scaled;
            }
        }
    }
}

/// Contiguous 1-3 component write; a single component repeats across the
/// declared repetition width.
fn write_channels(
    row: &mut [f32],
    offset: usize,
    components: usize,
    repetitions: usize,
    value: &ListValue,
    variable: &Variable,
    rate: f32,
) {
    match components {
        1 => {
            let v = variable.unit.apply(value.scalars[0], rate);
            for cell in row.iter_mut().skip(offset).take(repetitions.max(1)) {
                *cell = v;
            }
        }
        n => {
            for (i, cell) in row.iter_mut().skip(offset).take(n.min(3)).enumerate() {
                *cell = variable.unit.apply(value.scalars[i], rate);
            }
        }
    }
}

/// Resolves a symbolic 1-based index into the media list. Out-of-range
/// indices clamp (floored at the first entry) so a session stays playable.
fn payload_name(list: &ListOfValues, raw: f32) -> Option<&str> {
    let count = list.len() as i64;
    let index = ((raw as i64).min(count) - 1).max(0) as usize;
    list.values[index].asset.as_deref()
}

fn resolve_media_payload(
    exp: &Experiment,
    assets: &AssetTable,
    table: &mut TrialParameterTable,
    trial: usize,
    object: usize,
    kind: MediaKind,
    raw: f32,
) {
    let Some(list) = exp.media_list(kind) else {
        return;
    };
    let count = list.len() as i64;
    if count == 0 {
        return;
    }
    let index = ((raw as i64).min(count) - 1).max(0) as usize;

    match kind {
        MediaKind::Audio | MediaKind::Video => {
            let Some(name) = list.values[index].asset.as_deref() else {
                return;
            };
            let asset_kind = if kind == MediaKind::Audio {
                AssetKind::Audio
            } else {
                AssetKind::Video
            };
            match assets.index_of(asset_kind, name) {
                Some(handle) => {
                    let slot = if kind == MediaKind::Audio {
                        &mut table.audio[trial][object]
                    } else {
                        &mut table.video[trial][object]
                    };
                    slot.asset = Some(handle);
                }
                None => warn!(name, ?kind, "media asset not loaded, reference skipped"),
            }
        }
        MediaKind::Text => {
            if let Some(text) = list.values[index].text.as_deref() {
                table.text[trial][object].content = text.to_owned();
            }
        }
        // a tone has no payload to reference, only parameters
        MediaKind::Tone => {}
    }
}
