pub mod distance;
pub mod strategies;
pub mod types;

pub use distance::DistanceMetric;
pub use strategies::{select_closest, select_in_control_zone, select_within_sphere};
pub use types::{MissingHubPolicy, SelectionConfig, SelectionStrategy};
