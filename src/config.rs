mod loader;
mod paths;
mod store;
mod types;

pub use store::{JsonSettingsStore, SettingsStore};
pub use types::{Config, StartPolicy};
