mod checks;
mod client;
mod lifecycle;
mod state;

pub use checks::{Detection, StartCheck, UNKNOWN_START_DETAILS, UNKNOWN_START_ERROR};
pub use client::WatchdogClient;
pub use lifecycle::{LifecycleController, PollStep, UpPoll};
pub use state::WatchdogState;
