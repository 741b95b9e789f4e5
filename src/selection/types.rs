use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::{Validate, ValidationError};

/// How vertices are reduced to the requested count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SelectionStrategy {
    /// The `vertex_count` vertices closest to the reference position
    #[default]
    Closest,
    /// Vertices inside an n-sphere around the reference position
    Sphere,
    /// Vertices inside a hypercube around the reference position, grown
    /// until enough are found
    ControlZone,
}

/// Treatment of a hub whose coordinate is missing from a vertex when
/// measuring distances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MissingHubPolicy {
    #[default]
    Fail,
    /// Log and leave the hub out of the distance
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_control_zone_radius"))]
pub struct SelectionConfig {
    pub strategy: SelectionStrategy,

    /// Number of vertices to keep
    #[validate(range(min = 1))]
    pub vertex_count: usize,

    /// Sphere radius or control-zone step, in MW
    #[validate(range(min = 0.0))]
    pub radius: f64,

    /// Sphere selection only: complete or trim the result with the closest
    /// vertices when it does not hold exactly `vertex_count`
    pub fallback_to_closest: bool,

    pub missing_hub_policy: MissingHubPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::Closest,
            vertex_count: 10,
            radius: 500.0,
            fallback_to_closest: true,
            missing_hub_policy: MissingHubPolicy::Fail,
        }
    }
}

/// The control zone grows by steps of `radius`, which must be positive
fn validate_control_zone_radius(cfg: &SelectionConfig) -> Result<(), ValidationError> {
    if cfg.strategy == SelectionStrategy::ControlZone && !(cfg.radius.is_finite() && cfg.radius > 0.0) {
        let mut err = ValidationError::new("control_zone_radius");
        err.message = Some("control zone radius must be positive and finite".into());
        return Err(err);
    }
    Ok(())
}
