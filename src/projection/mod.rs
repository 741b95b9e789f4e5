/// Flow-based domain projection
///
/// Net positions of a vertex form a ray from the origin. The flow on a
/// monitored branch is linear along that ray, so the point where the ray
/// leaves a branch's security domain is found by solving
/// `f0 * delta = AMR + RAM0`. A vertex is scaled by the smallest such factor
/// below one; vertices inside every limit are kept as they are.

pub mod delta;
pub mod projector;

pub use delta::{delta, reference_flow, scale_position, DELTA_SCALE};
pub use projector::{project, project_vertex};
