pub mod engine;
pub mod metrics;
pub mod robot_session;

pub use engine::{SessionEvent, TactileEngine};
pub use metrics::SessionMetrics;
pub use robot_session::RobotSession;
