pub mod assets;
pub mod error;
pub mod experiment;
pub mod list;
pub mod response;
pub mod shape;
pub mod units;
pub mod variable;

pub use assets::{AssetKind, AssetTable};
pub use error::ConfigError;
pub use experiment::{Experiment, ObjectSpec, SceneDuration};
pub use list::{ListKind, ListOfValues, ListValue};
pub use response::{
    CoordinateSystem, EndCondition, KeyBinding, ResponseConfig, ResponseKind, ResponseRecord,
};
pub use shape::Shape;
pub use units::UnitSpec;
pub use variable::{
    Method, MediaKind, PolarComponent, Selection, Target, TextField, ToneField, Variable,
    WindowField,
};
