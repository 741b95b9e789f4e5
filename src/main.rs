use std::{fs, sync::Arc};

use anyhow::{Context, Result};
use core_vertex_selection::{
    config::Config, telemetry::init_tracing, BranchConstraint, MarketPositions, Vertex,
    VertexService,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct SelectionRequest {
    vertices: Vec<Vertex>,
    constraints: Vec<BranchConstraint>,
    reference_positions: MarketPositions,
}

fn main() -> Result<()> {
    init_tracing();

    let request_path = std::env::args()
        .nth(1)
        .context("usage: core-vertex-selection <request.json>")?;

    let cfg = Config::load()?;
    let service = VertexService::new(Arc::new(cfg.registry()?), cfg.selection)?;

    let raw = fs::read_to_string(&request_path)
        .with_context(|| format!("reading request {request_path}"))?;
    let request: SelectionRequest =
        serde_json::from_str(&raw).with_context(|| format!("parsing request {request_path}"))?;

    for vertex in &request.vertices {
        vertex.validate_against(service.registry())?;
    }

    info!(
        strategy = %service.selection().strategy,
        hubs = service.registry().len(),
        vertices = request.vertices.len(),
        branches = request.constraints.len(),
        "running vertex selection"
    );

    let selected = service.select(
        &request.vertices,
        &request.constraints,
        &request.reference_positions,
    )?;

    println!("{}", serde_json::to_string_pretty(&selected)?);
    Ok(())
}
