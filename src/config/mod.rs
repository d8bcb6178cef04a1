pub mod app_config;
pub mod cli;
pub mod model;

pub use app_config::{AppConfig, ConfigError, Mode, load_config};
pub use cli::Cli;
pub use model::{FileConfig, ProbeMethod};
