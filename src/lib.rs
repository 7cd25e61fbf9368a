pub mod config;
pub mod syncthing_client;
pub mod types;
pub mod watchdog;
