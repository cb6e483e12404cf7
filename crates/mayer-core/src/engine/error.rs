use super::config::ConfigError;
use super::trial::TrialError;
use crate::core::geometry::GeometryError;
use crate::core::params::ParamLoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid point geometry: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to load potential parameters: {source}")]
    Params {
        #[from]
        source: ParamLoadError,
    },

    #[error("Trial protocol violated: {source}")]
    Trial {
        #[from]
        source: TrialError,
    },
}
