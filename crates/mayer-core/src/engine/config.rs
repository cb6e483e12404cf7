use super::diagram::DiagramClass;
use crate::core::geometry::MAX_POINTS;
use thiserror::Error;

pub const DEFAULT_STEP_SIZE: f64 = 0.5;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Temperature must be finite and positive, got {0}")]
    InvalidTemperature(f64),

    #[error("Step size must be finite and positive, got {0}")]
    InvalidStepSize(f64),

    #[error("Point count must be between 2 and {max}, got {count}")]
    InvalidPointCount { count: usize, max: usize },

    #[error("Point count mismatch: expected {expected}, found {found}")]
    PointCountMismatch { expected: usize, found: usize },

    #[error("Got {weights} weights for {clusters} clusters")]
    WeightCountMismatch { clusters: usize, weights: usize },

    #[error("A combined cluster needs at least one diagram class")]
    EmptyCombination,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    pub n_points: usize,
    pub temperature: f64,
    pub diagram_class: DiagramClass,
    pub step_size: f64,
}

impl ClusterConfig {
    pub fn beta(&self) -> f64 {
        1.0 / self.temperature
    }
}

#[derive(Default)]
pub struct ClusterConfigBuilder {
    n_points: Option<usize>,
    temperature: Option<f64>,
    diagram_class: Option<DiagramClass>,
    step_size: Option<f64>,
}

impl ClusterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_points(mut self, n: usize) -> Self {
        self.n_points = Some(n);
        self
    }
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
    pub fn diagram_class(mut self, class: DiagramClass) -> Self {
        self.diagram_class = Some(class);
        self
    }
    pub fn step_size(mut self, step: f64) -> Self {
        self.step_size = Some(step);
        self
    }

    pub fn build(self) -> Result<ClusterConfig, ConfigError> {
        let n_points = self
            .n_points
            .ok_or(ConfigError::MissingParameter("n_points"))?;
        if !(2..=MAX_POINTS).contains(&n_points) {
            return Err(ConfigError::InvalidPointCount {
                count: n_points,
                max: MAX_POINTS,
            });
        }

        let temperature = self
            .temperature
            .ok_or(ConfigError::MissingParameter("temperature"))?;
        validate_temperature(temperature)?;

        let step_size = self.step_size.unwrap_or(DEFAULT_STEP_SIZE);
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(ConfigError::InvalidStepSize(step_size));
        }

        Ok(ClusterConfig {
            n_points,
            temperature,
            diagram_class: self
                .diagram_class
                .ok_or(ConfigError::MissingParameter("diagram_class"))?,
            step_size,
        })
    }
}

pub(crate) fn validate_temperature(temperature: f64) -> Result<(), ConfigError> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTemperature(temperature))
    }
}
