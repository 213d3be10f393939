pub mod applier;
pub mod evaluator;
pub mod processor;
pub mod registry;
pub mod remap;
pub mod session;
pub mod types;
pub mod watchdog;

pub use applier::ActuationApplier;
pub use evaluator::{decide, DEFAULT_THRESHOLD, TIE_BREAK};
pub use processor::ReportProcessor;
pub use registry::KnownKeysRegistry;
pub use remap::{KeyRemapper, RemapTable};
pub use session::{LivenessState, SessionState};
pub use types::{Decision, LogicalKeyId, PhysicalKeyId, ProgressEcho, Report, TargetType, VoteRecord};
pub use watchdog::{WatchdogOutcome, WatchdogTimer};
