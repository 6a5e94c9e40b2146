pub mod app_config;
pub mod canyon;
pub mod config;
pub mod dataset;

use thiserror::Error;

pub use app_config::AppConfig;
pub use canyon::{CanonicalCanyon, Coordinates, Location, RawRecord, WikilocLinks, NO_DATA};
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{load_dataset, save_dataset, DatasetError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
