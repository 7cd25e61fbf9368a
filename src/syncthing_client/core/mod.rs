mod aggregator;
pub mod classify;
pub mod completion;
mod http;
pub mod rates;

pub use aggregator::{join_devices, join_folders, DataAggregator};
pub use http::HttpClient;
