use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::list::{ListKind, ListOfValues};
use crate::response::ResponseConfig;
use crate::shape::Shape;
use crate::variable::{MediaKind, Target, Variable};

/// How long a trial lasts when no data-driven end applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SceneDuration {
    /// Fixed length in seconds.
    Constant(f32),
    /// The trial ends when the last stimulus or media window ends.
    StimuliEnd,
}

/// Declared state of one scene object before any variable rewrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    pub shape: Shape,
    /// Centered screen pixels, x right, y up.
    pub center: (f32, f32),
    pub size: (f32, f32),
    /// Radians.
    pub rotation: f32,
    pub color: [f32; 3],
    pub activated: bool,
    pub start_secs: f32,
    pub duration_secs: f32,
}

impl Default for ObjectSpec {
    fn default() -> Self {
        ObjectSpec {
            name: String::new(),
            shape: Shape::Rectangle,
            center: (0.0, 0.0),
            size: (100.0, 100.0),
            rotation: 0.0,
            color: [1.0, 1.0, 1.0],
            activated: true,
            start_secs: 0.0,
            duration_secs: 1.0,
        }
    }
}

/// The immutable experiment definition handed to the engine: the compiled
/// output of the authoring collaborator, already validated list-by-list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub name: String,
    pub frame_rate: f32,
    pub trials: usize,
    pub duration: SceneDuration,
    /// Screen size in physical pixels (scale already applied).
    pub screen: (f32, f32),
    pub objects: Vec<ObjectSpec>,
    pub variables: Vec<Variable>,
    pub lists: Vec<ListOfValues>,
    pub response: ResponseConfig,
    /// List/section ids that get a reproducibility seed for this run.
    pub randomness_scopes: Vec<String>,
}

impl Experiment {
    pub fn list(&self, id: &str) -> Option<&ListOfValues> {
        self.lists.iter().find(|l| l.id == id)
    }

    /// The list holding the named payloads for a media kind, as the
    /// authoring side declares one list per media kind.
    pub fn media_list(&self, kind: MediaKind) -> Option<&ListOfValues> {
        let wanted = match kind {
            MediaKind::Audio => ListKind::Audios,
            MediaKind::Video => ListKind::Videos,
            MediaKind::Text => ListKind::Texts,
            MediaKind::Tone => return None,
        };
        self.lists.iter().find(|l| l.kind == wanted)
    }

    pub fn image_list(&self) -> Option<&ListOfValues> {
        self.lists.iter().find(|l| l.kind == ListKind::Images)
    }

    /// Pre-run validation. Returns the first problem found; the run must not
    /// start on error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        if !(self.frame_rate > 0.0) {
            return Err(ConfigError::BadFrameRate(self.frame_rate));
        }

        for variable in &self.variables {
            let list_id = variable
                .list_id
                .as_deref()
                .ok_or_else(|| ConfigError::MissingList {
                    variable: variable.name.clone(),
                })?;
            let list = self.list(list_id).ok_or_else(|| ConfigError::UnknownList {
                variable: variable.name.clone(),
                list: list_id.to_owned(),
            })?;
            if list.is_empty() {
                return Err(ConfigError::EmptyList {
                    variable: variable.name.clone(),
                    list: list.name.clone(),
                });
            }
            if variable.method.is_adaptive() {
                if list.len() < 2 {
                    return Err(ConfigError::TooFewValues {
                        variable: variable.name.clone(),
                        list: list.name.clone(),
                        count: list.len(),
                    });
                }
                if variable.initial_index >= list.len() {
                    return Err(ConfigError::InitialIndexOutOfRange {
                        variable: variable.name.clone(),
                        list: list.name.clone(),
                        index: variable.initial_index,
                        count: list.len(),
                    });
                }
            }
            let components = variable.target.components();
            if matches!(
                variable.target,
                Target::Background { .. } | Target::ObjectChannel { .. }
            ) && components != list.dimensions
            {
                return Err(ConfigError::ComponentMismatch {
                    variable: variable.name.clone(),
                    list: list.name.clone(),
                    declared: components,
                    provided: list.dimensions,
                });
            }
            if let Some(object) = variable.target.object() {
                if object >= self.objects.len() {
                    return Err(ConfigError::ObjectOutOfRange {
                        variable: variable.name.clone(),
                        object,
                        count: self.objects.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::Method;

    fn minimal() -> Experiment {
        Experiment {
            name: "test".into(),
            frame_rate: 60.0,
            trials: 2,
            duration: SceneDuration::StimuliEnd,
            screen: (800.0, 600.0),
            objects: vec![ObjectSpec::default()],
            variables: Vec::new(),
            lists: Vec::new(),
            response: ResponseConfig::default(),
            randomness_scopes: Vec::new(),
        }
    }

    #[test]
    fn missing_list_is_reported() {
        let mut exp = minimal();
        exp.variables
            .push(Variable::new("v1", "contrast", Target::Activation { object: 0 }));
        let err = exp.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingList {
                variable: "contrast".into()
            }
        );
    }

    #[test]
    fn adaptive_needs_two_values() {
        let mut exp = minimal();
        exp.lists
            .push(ListOfValues::numbers("l1", "levels", &[0.5]));
        exp.variables.push(
            Variable::new("v1", "contrast", Target::Activation { object: 0 })
                .with_list("l1")
                .with_method(Method::One, 0),
        );
        assert!(matches!(
            exp.validate().unwrap_err(),
            ConfigError::TooFewValues { count: 1, .. }
        ));
    }

    #[test]
    fn valid_definition_passes() {
        let mut exp = minimal();
        exp.lists
            .push(ListOfValues::numbers("l1", "levels", &[0.1, 0.2, 0.4]));
        exp.variables.push(
            Variable::new("v1", "contrast", Target::Activation { object: 0 })
                .with_list("l1")
                .with_method(Method::Two, 1),
        );
        assert!(exp.validate().is_ok());
    }
}
