mod builder;
mod defaults;
mod file;
pub mod models;

pub use builder::{build_config, split_command};
pub use models::AppConfig;
