use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CentralityError, CentralityResult};

pub const DEFAULT_DISTANCE_MATRIX_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Google caps a single Distance Matrix call at 100 elements.
pub const DEFAULT_MAX_ELEMENTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    #[default]
    StraightLine,
    Roads,
}

impl FromStr for DistanceMode {
    type Err = CentralityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "STRAIGHT_LINE" => Ok(Self::StraightLine),
            "ROADS" => Ok(Self::Roads),
            other => Err(CentralityError::config(format!(
                "invalid distance mode '{}', expected STRAIGHT_LINE or ROADS",
                other
            ))),
        }
    }
}

/// Which value of a Distance Matrix element is summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoadMetric {
    /// Meters.
    #[default]
    Distance,
    /// Seconds.
    Duration,
}

impl FromStr for RoadMetric {
    type Err = CentralityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DISTANCE" => Ok(Self::Distance),
            "DURATION" => Ok(Self::Duration),
            other => Err(CentralityError::config(format!(
                "invalid road metric '{}', expected DISTANCE or DURATION",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub distance_mode: DistanceMode,
    pub road_metric: RoadMetric,
    pub google_maps_api_key: Option<String>,
    pub distance_matrix_url: String,
    pub request_timeout: Duration,
    pub max_elements_per_request: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            distance_mode: DistanceMode::default(),
            road_metric: RoadMetric::default(),
            google_maps_api_key: None,
            distance_matrix_url: DEFAULT_DISTANCE_MATRIX_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            max_elements_per_request: DEFAULT_MAX_ELEMENTS,
        }
    }
}

impl EngineConfig {
    /// Reads the process environment after loading `.env` from the parent
    /// directory or, failing that, the current one.
    pub fn from_env() -> CentralityResult<Self> {
        dotenvy::from_filename("../.env")
            .or_else(|_| dotenvy::dotenv())
            .ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> CentralityResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = EngineConfig::default();

        if let Some(mode) = lookup("CENTRALITY_DISTANCE_MODE") {
            config.distance_mode = mode.parse()?;
        }
        if let Some(metric) = lookup("CENTRALITY_ROAD_METRIC") {
            config.road_metric = metric.parse()?;
        }
        config.google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY").filter(|k| !k.trim().is_empty());
        if let Some(url) = lookup("DISTANCE_MATRIX_URL") {
            config.distance_matrix_url = url;
        }
        if let Some(secs) = lookup("DISTANCE_MATRIX_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CentralityError::config(format!("DISTANCE_MATRIX_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = lookup("DISTANCE_MATRIX_MAX_ELEMENTS") {
            let max: usize = max.trim().parse().map_err(|_| {
                CentralityError::config(format!("DISTANCE_MATRIX_MAX_ELEMENTS is not a number: {}", max))
            })?;
            if max == 0 {
                return Err(CentralityError::config(
                    "DISTANCE_MATRIX_MAX_ELEMENTS must be at least 1",
                ));
            }
            config.max_elements_per_request = max;
        }

        Ok(config)
    }

    pub fn api_key(&self) -> CentralityResult<&str> {
        self.google_maps_api_key
            .as_deref()
            .ok_or(CentralityError::MissingApiKey)
    }
}
