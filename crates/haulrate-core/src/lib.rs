pub mod app_config;
pub mod config;
pub mod pricing;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use pricing::{
    load_pricing, PricingConfig, SurgeZone, TimeSurge, VolumeDiscountTier,
};
pub use types::{Address, CartItem, ItemCategory, Schedule, TimeSlot};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read pricing file {path}: {source}")]
    PricingFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pricing file: {0}")]
    PricingFileParse(#[from] serde_yaml::Error),

    #[error("invalid pricing configuration: {0}")]
    Validation(String),
}
