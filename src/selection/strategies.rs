use itertools::Itertools;
use ordered_float::OrderedFloat;
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::DistanceMetric;
use crate::domain::{ReferencePositions, Vertex};
use crate::error::{Result, VertexError};

/// Pair every vertex with a measure, keeping input order
fn measure_all<'v, R, F>(vertices: &'v [Vertex], reference: &R, measure: F) -> Result<Vec<(&'v Vertex, f64)>>
where
    R: ReferencePositions + ?Sized,
    F: Fn(&Vertex, &R) -> Result<f64> + Sync,
{
    #[cfg(feature = "parallel")]
    let iter = vertices.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = vertices.iter();

    iter.map(|vertex| measure(vertex, reference).map(|d| (vertex, d)))
        .collect()
}

/// The `count` vertices closest to the reference position.
///
/// Fewer than `count` vertices are returned as they are. Ties keep their
/// input order.
pub fn select_closest<R>(
    vertices: &[Vertex],
    reference: &R,
    count: usize,
    metric: &DistanceMetric<'_>,
) -> Result<Vec<Vertex>>
where
    R: ReferencePositions + ?Sized,
{
    if vertices.len() < count {
        return Ok(vertices.to_vec());
    }

    let mut ranked = measure_all(vertices, reference, |v, r| metric.distance(v, r))?;
    ranked.sort_by_key(|&(_, distance)| OrderedFloat(distance));

    Ok(ranked
        .into_iter()
        .take(count)
        .map(|(vertex, _)| vertex.clone())
        .collect())
}

/// Vertices within `radius` of the reference position (n-sphere).
///
/// With `fallback_to_closest`, a result that does not hold exactly `count`
/// vertices is replaced by the closest `count` of the whole input (too few
/// inside) or of the sphere (too many inside).
pub fn select_within_sphere<R>(
    vertices: &[Vertex],
    reference: &R,
    radius: f64,
    count: usize,
    fallback_to_closest: bool,
    metric: &DistanceMetric<'_>,
) -> Result<Vec<Vertex>>
where
    R: ReferencePositions + ?Sized,
{
    if vertices.len() < count {
        return Ok(vertices.to_vec());
    }

    let within: Vec<Vertex> = measure_all(vertices, reference, |v, r| metric.distance(v, r))?
        .into_iter()
        .filter(|&(_, distance)| distance <= radius)
        .map(|(vertex, _)| vertex.clone())
        .collect();

    debug!(radius, inside = within.len(), wanted = count, "sphere filter applied");

    if !fallback_to_closest || within.len() == count {
        return Ok(within);
    }

    if within.len() < count {
        warn!(inside = within.len(), wanted = count, "too few vertices in sphere, selecting closest");
        select_closest(vertices, reference, count, metric)
    } else {
        warn!(inside = within.len(), wanted = count, "too many vertices in sphere, selecting closest");
        select_closest(&within, reference, count, metric)
    }
}

/// Vertices whose every hub position lies within `r` of the reference
/// position (hypercube), `r` being the smallest multiple of `radius` that
/// holds at least `count` vertices.
pub fn select_in_control_zone<R>(
    vertices: &[Vertex],
    reference: &R,
    radius: f64,
    count: usize,
    metric: &DistanceMetric<'_>,
) -> Result<Vec<Vertex>>
where
    R: ReferencePositions + ?Sized,
{
    if vertices.len() < count {
        return Ok(vertices.to_vec());
    }

    if !(radius.is_finite() && radius > 0.0) {
        return Err(VertexError::InvalidSelection(format!(
            "control zone radius must be positive, got {radius}"
        )));
    }

    let deviations = measure_all(vertices, reference, |v, r| metric.max_deviation(v, r))?;
    if let Some((vertex, _)) = deviations.iter().find(|(_, d)| !d.is_finite()) {
        return Err(VertexError::InvalidSelection(format!(
            "vertex {} has a non-finite deviation from the reference position",
            vertex.id()
        )));
    }

    let r = zone_radius(&deviations, radius, count);
    let selected: Vec<Vertex> = deviations
        .iter()
        .filter(|&&(_, deviation)| deviation <= r)
        .map(|&(vertex, _)| vertex.clone())
        .collect();

    debug!(radius = r, selected = selected.len(), "control zone selection done");
    Ok(selected)
}

/// Smallest `k * step` (k >= 1) reaching the `count`-th smallest deviation.
/// `count <= deviations.len()`.
fn zone_radius(deviations: &[(&Vertex, f64)], step: f64, count: usize) -> f64 {
    let needed = deviations
        .iter()
        .map(|&(_, deviation)| OrderedFloat(deviation))
        .k_smallest(count)
        .last()
        .map_or(0.0, OrderedFloat::into_inner);

    let steps = (needed / step).ceil().max(1.0);
    // rounding of the product may land just below the deviation
    (steps * step).max(needed)
}
