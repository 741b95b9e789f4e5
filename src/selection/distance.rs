use tracing::warn;

use super::MissingHubPolicy;
use crate::domain::{Hub, HubRegistry, ReferencePositions, Vertex};
use crate::error::{Result, VertexError};

/// Distances between vertices and the reference market position
#[derive(Debug, Clone, Copy)]
pub struct DistanceMetric<'a> {
    registry: &'a HubRegistry,
    policy: MissingHubPolicy,
}

impl<'a> DistanceMetric<'a> {
    pub fn new(registry: &'a HubRegistry) -> Self {
        Self {
            registry,
            policy: MissingHubPolicy::Fail,
        }
    }

    pub fn with_policy(mut self, policy: MissingHubPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Weighted euclidean distance:
    /// `distance² = Σ_hubs weight * (reference - position)²`
    pub fn distance<R>(&self, vertex: &Vertex, reference: &R) -> Result<f64>
    where
        R: ReferencePositions + ?Sized,
    {
        let mut sum_of_weighted_squares = 0.0_f64;
        for hub in self.registry {
            let Some((market, position)) = self.positions(hub, vertex, reference)? else {
                continue;
            };
            let diff = market - position;
            sum_of_weighted_squares += hub.weight * diff * diff;
        }
        Ok(sum_of_weighted_squares.sqrt())
    }

    /// Largest unweighted deviation over all hubs (distance of the
    /// hypercube / control zone test)
    pub fn max_deviation<R>(&self, vertex: &Vertex, reference: &R) -> Result<f64>
    where
        R: ReferencePositions + ?Sized,
    {
        let mut max = 0.0_f64;
        for hub in self.registry {
            if let Some((market, position)) = self.positions(hub, vertex, reference)? {
                max = max.max((market - position).abs());
            }
        }
        Ok(max)
    }

    /// Reference and vertex positions of one hub, `None` when the hub is
    /// skipped under [`MissingHubPolicy::Skip`]
    fn positions<R>(&self, hub: &Hub, vertex: &Vertex, reference: &R) -> Result<Option<(f64, f64)>>
    where
        R: ReferencePositions + ?Sized,
    {
        let market = reference
            .global_net_position(&hub.forecast_area_code)
            .ok_or_else(|| VertexError::MissingReferencePosition {
                vertex_id: vertex.id(),
                area_code: hub.forecast_area_code.clone(),
            })?;

        match (vertex.coordinate(&hub.coordinate_key), self.policy) {
            (Some(position), _) => Ok(Some((market, position as f64))),
            (None, MissingHubPolicy::Skip) => {
                warn!(
                    vertex_id = vertex.id(),
                    area = %hub.forecast_area_code,
                    hub = %hub.coordinate_key,
                    "cannot find hub in vertex, skipped from distance"
                );
                Ok(None)
            }
            (None, MissingHubPolicy::Fail) => Err(VertexError::MissingCoordinate {
                vertex_id: vertex.id(),
                coordinate_key: hub.coordinate_key.clone(),
            }),
        }
    }
}
