use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use crate::domain::{BranchConstraint, HubRegistry, ReferencePositions, Vertex};
use crate::error::Result;
use crate::projection::project;
use crate::selection::{
    select_closest, select_in_control_zone, select_within_sphere, DistanceMetric,
    SelectionConfig, SelectionStrategy,
};

/// Projection and selection of vertices for one capacity calculation request.
///
/// Holds only read-only state: one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct VertexService {
    registry: Arc<HubRegistry>,
    selection: SelectionConfig,
}

impl VertexService {
    pub fn new(registry: Arc<HubRegistry>, selection: SelectionConfig) -> Result<Self> {
        selection.validate()?;
        Ok(Self {
            registry,
            selection,
        })
    }

    pub fn registry(&self) -> &HubRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionConfig {
        &self.selection
    }

    fn metric(&self) -> DistanceMetric<'_> {
        DistanceMetric::new(&self.registry).with_policy(self.selection.missing_hub_policy)
    }

    /// Run the configured strategy with the configured count and radius
    pub fn select<R>(
        &self,
        base_vertices: &[Vertex],
        constraints: &[BranchConstraint],
        reference: &R,
    ) -> Result<Vec<Vertex>>
    where
        R: ReferencePositions + ?Sized,
    {
        let SelectionConfig {
            strategy,
            vertex_count,
            radius,
            fallback_to_closest,
            ..
        } = self.selection;

        match strategy {
            SelectionStrategy::Closest => {
                self.select_by_distance(base_vertices, constraints, reference, vertex_count)
            }
            SelectionStrategy::Sphere => self.select_within_sphere(
                base_vertices,
                constraints,
                reference,
                radius,
                vertex_count,
                fallback_to_closest,
            ),
            SelectionStrategy::ControlZone => self.select_with_control_zone(
                base_vertices,
                constraints,
                reference,
                radius,
                vertex_count,
            ),
        }
    }

    /// Project on the domain, then keep the `count` closest vertices
    #[instrument(skip_all, fields(base = base_vertices.len(), count = count))]
    pub fn select_by_distance<R>(
        &self,
        base_vertices: &[Vertex],
        constraints: &[BranchConstraint],
        reference: &R,
        count: usize,
    ) -> Result<Vec<Vertex>>
    where
        R: ReferencePositions + ?Sized,
    {
        if base_vertices.len() < count {
            return Ok(base_vertices.to_vec());
        }

        let projected = project(base_vertices, constraints, &self.registry)?;
        let selected = select_closest(&projected, reference, count, &self.metric())?;
        info!(selected = selected.len(), "vertices selected by distance");
        Ok(selected)
    }

    /// Project on the domain, then keep the vertices within `radius` of the
    /// reference position, falling back on closest selection if asked to
    #[instrument(
        skip_all,
        fields(base = base_vertices.len(), radius = radius, count = count, fallback = fallback_to_closest)
    )]
    pub fn select_within_sphere<R>(
        &self,
        base_vertices: &[Vertex],
        constraints: &[BranchConstraint],
        reference: &R,
        radius: f64,
        count: usize,
        fallback_to_closest: bool,
    ) -> Result<Vec<Vertex>>
    where
        R: ReferencePositions + ?Sized,
    {
        if base_vertices.len() < count {
            return Ok(base_vertices.to_vec());
        }

        let projected = project(base_vertices, constraints, &self.registry)?;
        let selected = select_within_sphere(
            &projected,
            reference,
            radius,
            count,
            fallback_to_closest,
            &self.metric(),
        )?;
        info!(selected = selected.len(), "vertices selected within sphere");
        Ok(selected)
    }

    /// Project on the domain, then keep the vertices of the smallest control
    /// zone (multiple of `radius`) holding at least `count` of them
    #[instrument(skip_all, fields(base = base_vertices.len(), radius = radius, count = count))]
    pub fn select_with_control_zone<R>(
        &self,
        base_vertices: &[Vertex],
        constraints: &[BranchConstraint],
        reference: &R,
        radius: f64,
        count: usize,
    ) -> Result<Vec<Vertex>>
    where
        R: ReferencePositions + ?Sized,
    {
        if base_vertices.len() < count {
            return Ok(base_vertices.to_vec());
        }

        let projected = project(base_vertices, constraints, &self.registry)?;
        let selected =
            select_in_control_zone(&projected, reference, radius, count, &self.metric())?;
        info!(selected = selected.len(), "vertices selected in control zone");
        Ok(selected)
    }
}
