use rust_decimal::prelude::*;

use crate::domain::{BranchConstraint, HubRegistry, Vertex};
use crate::error::{Result, VertexError};

/// Fractional digits kept on a scaling factor
pub const DELTA_SCALE: u32 = 15;

/// Flow induced on `branch` by the net positions of `vertex`:
/// `f0 = Σ PTDF(hub) * NP(hub)`
pub fn reference_flow(
    vertex: &Vertex,
    branch: &BranchConstraint,
    registry: &HubRegistry,
) -> Result<Decimal> {
    branch
        .sensitivities
        .iter()
        .try_fold(Decimal::ZERO, |acc, (code, ptdf)| {
            let key = registry
                .coordinate_key_for(code)
                .ok_or_else(|| VertexError::UnknownFlowBasedCode {
                    branch_id: branch.id.clone(),
                    flow_based_code: code.clone(),
                })?;
            let net_position =
                vertex
                    .coordinate(key)
                    .ok_or_else(|| VertexError::MissingBranchCoordinate {
                        vertex_id: vertex.id(),
                        branch_id: branch.id.clone(),
                        coordinate_key: key.to_string(),
                    })?;

            ptdf.checked_mul(Decimal::from(net_position))
                .and_then(|flow| acc.checked_add(flow))
                .ok_or_else(|| overflow(vertex, branch))
        })
}

/// Scaling factor at which the ray through `vertex` reaches the limit of
/// `branch`.
///
/// `None` when the vertex induces no flow on the branch (`f0 == 0`). A
/// negative `f0` gives a negative factor.
pub fn delta(
    vertex: &Vertex,
    branch: &BranchConstraint,
    registry: &HubRegistry,
) -> Result<Option<Decimal>> {
    let f0 = reference_flow(vertex, branch, registry)?;
    if f0.is_zero() {
        return Ok(None);
    }

    let margin = branch.margin();
    let quotient = margin
        .checked_div(f0)
        .ok_or_else(|| overflow(vertex, branch))?;

    Ok(Some(floor_quotient(quotient, margin, f0)))
}

/// Round `margin / f0` toward negative infinity at [`DELTA_SCALE`] digits.
///
/// `quotient` is the 28-digit result of the decimal division, which may have
/// been rounded up past the exact value; step back one unit when it was.
/// `f0` is non-zero.
fn floor_quotient(quotient: Decimal, margin: Decimal, f0: Decimal) -> Decimal {
    let floored = quotient.round_dp_with_strategy(DELTA_SCALE, RoundingStrategy::ToNegativeInfinity);

    // floored > margin / f0, compared without dividing
    let overshoots = floored.checked_mul(f0).is_some_and(|back| {
        if f0.is_sign_positive() {
            back > margin
        } else {
            back < margin
        }
    });

    if overshoots {
        floored - Decimal::new(1, DELTA_SCALE)
    } else {
        floored
    }
}

/// `trunc(net_position * delta)`, truncating toward zero
pub fn scale_position(net_position: i64, delta: Decimal) -> Option<i64> {
    Decimal::from(net_position)
        .checked_mul(delta)?
        .trunc()
        .to_i64()
}

fn overflow(vertex: &Vertex, branch: &BranchConstraint) -> VertexError {
    VertexError::Overflow {
        vertex_id: vertex.id(),
        branch_id: branch.id.clone(),
    }
}
