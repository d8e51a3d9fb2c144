pub mod adaptive;
pub mod checkpoint;
pub mod classify;
pub mod resolver;
pub mod seed;
pub mod session;
pub mod table;

pub use adaptive::AdaptiveState;
pub use checkpoint::{Checkpoint, CheckpointAction, CheckpointList, CheckpointScheduler};
pub use classify::{PointerPhase, PointerSample, ResponseClassifier};
pub use resolver::VariableResolver;
pub use seed::{Seed, shuffled_sequence};
pub use session::{MediaSink, Session, TrialRecord, TrialStatus};
pub use table::{MediaSlot, TextSlot, ToneSlot, TrialParameterTable};
