//! Flow-based domain projection and representative vertex selection for
//! Core capacity calculation.
//!
//! Vertices (extreme points of the net-position space) are scaled into the
//! security domain described by branch constraints, then reduced to a
//! handful close to the reference market position.

pub mod config;
pub mod domain;
pub mod error;
pub mod projection;
pub mod selection;
pub mod service;
pub mod telemetry;

pub use domain::{BranchConstraint, Hub, HubRegistry, MarketPositions, ReferencePositions, Vertex};
pub use error::{ErrorKind, Result, VertexError};
pub use service::VertexService;
