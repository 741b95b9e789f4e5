use rust_decimal::Decimal;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::delta::{delta, scale_position};
use crate::domain::{BranchConstraint, HubRegistry, Vertex};
use crate::error::{Result, VertexError};

/// Project every vertex on the flow-based domain.
///
/// Output order follows input order. Vertices already inside the domain are
/// returned unchanged.
#[instrument(skip_all, fields(vertices = vertices.len(), branches = constraints.len()))]
pub fn project(
    vertices: &[Vertex],
    constraints: &[BranchConstraint],
    registry: &HubRegistry,
) -> Result<Vec<Vertex>> {
    #[cfg(feature = "parallel")]
    let projected = vertices
        .par_iter()
        .map(|vertex| project_vertex(vertex, constraints, registry))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let projected = vertices
        .iter()
        .map(|vertex| project_vertex(vertex, constraints, registry))
        .collect::<Result<Vec<_>>>()?;

    let moved = projected
        .iter()
        .zip(vertices)
        .filter(|(after, before)| after != before)
        .count();
    debug!(moved, "projected vertices on flow-based domain");

    Ok(projected)
}

/// Scale one vertex by the smallest factor below one over all branches.
///
/// A negative factor (flow decreasing along the ray, or a negative margin)
/// mirrors the vertex through the origin.
pub fn project_vertex(
    vertex: &Vertex,
    constraints: &[BranchConstraint],
    registry: &HubRegistry,
) -> Result<Vertex> {
    let mut binding: Option<(Decimal, &BranchConstraint)> = None;

    for branch in constraints {
        let Some(delta) = delta(vertex, branch, registry)? else {
            continue;
        };
        if delta >= Decimal::ONE {
            continue;
        }
        if binding.map_or(true, |(min, _)| delta < min) {
            binding = Some((delta, branch));
        }
    }

    let Some((delta_min, branch)) = binding else {
        return Ok(vertex.clone());
    };

    debug!(vertex_id = vertex.id(), branch = %branch.id, delta = %delta_min, "vertex scaled by binding branch");

    vertex.map_coordinates(|position| {
        scale_position(position, delta_min).ok_or_else(|| VertexError::Overflow {
            vertex_id: vertex.id(),
            branch_id: branch.id.clone(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Hub;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn registry() -> HubRegistry {
        HubRegistry::new(vec![
            Hub::new("Test1", "ram1", "fb1", "fc1", "AA", false, 1.0),
            Hub::new("Test2", "ram2", "fb2", "fc2", "BB", false, 1.0),
            Hub::new("Test3", "ram3", "fb3", "fc3", "CC", false, 1.0),
            Hub::new("Test4", "ram4", "fb4", "fc4", "D_D", true, 1.0),
        ])
        .unwrap()
    }

    fn ptdfs(values: [Decimal; 3]) -> BTreeMap<String, Decimal> {
        ["fb1", "fb2", "fb3"]
            .into_iter()
            .map(String::from)
            .zip(values)
            .collect()
    }

    fn test_branches() -> Vec<BranchConstraint> {
        let ptdfs = ptdfs([dec!(0.1), dec!(0.2), dec!(0.3)]);
        vec![
            BranchConstraint::new("BR1", 100, 50, ptdfs.clone()),
            BranchConstraint::new("BR2", 100, 0, ptdfs),
        ]
    }

    fn test_branches_with_zeros() -> Vec<BranchConstraint> {
        let ptdfs = ptdfs([Decimal::ZERO; 3]);
        vec![
            BranchConstraint::new("BR1", 100, 50, ptdfs.clone()),
            BranchConstraint::new("BR2", 100, 0, ptdfs),
        ]
    }

    fn test_vertex_1() -> Vertex {
        Vertex::from_pairs(1, [("AA", 2000), ("BB", -1000), ("CC", 500), ("D_D", 0)])
    }

    fn test_vertex_2() -> Vertex {
        Vertex::from_pairs(2, [("AA", 1000), ("BB", -1000), ("CC", 500), ("D_D", 0)])
    }

    #[test]
    fn test_binding_branch_scales_vertex() {
        // f0 = 150 on both branches: delta 1 (not binding) and 2/3
        let projected = project(&[test_vertex_1()], &test_branches(), &registry()).unwrap();
        assert_eq!(
            projected,
            vec![Vertex::from_pairs(
                1,
                [("AA", 1333), ("BB", -666), ("CC", 333), ("D_D", 0)]
            )]
        );
    }

    #[test]
    fn test_non_binding_leaves_vertex_unchanged() {
        // f0 = 50: deltas 3 and 2
        let projected = project(&[test_vertex_2()], &test_branches(), &registry()).unwrap();
        assert_eq!(projected, vec![test_vertex_2()]);
    }

    #[test]
    fn test_zero_flow_leaves_vertex_unchanged() {
        let projected =
            project(&[test_vertex_1(), test_vertex_2()], &test_branches_with_zeros(), &registry())
                .unwrap();
        assert_eq!(projected, vec![test_vertex_1(), test_vertex_2()]);
    }

    #[test]
    fn test_tightest_branch_wins() {
        let ptdfs = ptdfs([dec!(0.1), dec!(0.2), dec!(0.3)]);
        let branches = vec![
            BranchConstraint::new("LOOSE", 120, 0, ptdfs.clone()),
            BranchConstraint::new("TIGHT", 75, 0, ptdfs.clone()),
            BranchConstraint::new("MID", 90, 0, ptdfs),
        ];
        // delta = 75 / 150 = 0.5
        let projected = project_vertex(&test_vertex_1(), &branches, &registry()).unwrap();
        assert_eq!(
            projected,
            Vertex::from_pairs(1, [("AA", 1000), ("BB", -500), ("CC", 250), ("D_D", 0)])
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let vertices = vec![test_vertex_2(), test_vertex_1(), test_vertex_2()];
        let projected = project(&vertices, &test_branches(), &registry()).unwrap();
        let ids: Vec<_> = projected.iter().map(Vertex::id).collect();
        assert_eq!(ids, vec![2, 1, 2]);
        assert_eq!(projected[0], test_vertex_2());
        assert_ne!(projected[1], test_vertex_1());
    }

    #[test]
    fn test_projection_of_fixed_point_is_identity() {
        let once = project(&[test_vertex_1()], &test_branches(), &registry()).unwrap();
        let twice = project(&once, &test_branches(), &registry()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_code_fails_whole_batch() {
        let mut branches = test_branches();
        branches[1].sensitivities.insert("PTDF_XX".to_string(), dec!(0.01));
        let err = project(&[test_vertex_2(), test_vertex_1()], &branches, &registry()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(project(&[], &test_branches(), &registry()).unwrap().is_empty());
        let projected = project(&[test_vertex_1()], &[], &registry()).unwrap();
        assert_eq!(projected, vec![test_vertex_1()]);
    }

    #[test]
    fn test_opposite_flow_is_mirrored() {
        // f0 = -150, delta = 100 / -150
        let opposite = Vertex::from_pairs(3, [("AA", -2000), ("BB", 1000), ("CC", -500), ("D_D", 0)]);
        let branches = vec![BranchConstraint::new(
            "BR2",
            100,
            0,
            ptdfs([dec!(0.1), dec!(0.2), dec!(0.3)]),
        )];
        let projected = project_vertex(&opposite, &branches, &registry()).unwrap();
        assert_eq!(
            projected,
            Vertex::from_pairs(3, [("AA", 1333), ("BB", -666), ("CC", 333), ("D_D", 0)])
        );
    }

    #[test]
    fn test_negative_margin_mirrors_vertex() {
        // f0 = 150, delta = -100 / 150
        let branches = vec![BranchConstraint::new(
            "NEG",
            -100,
            0,
            ptdfs([dec!(0.1), dec!(0.2), dec!(0.3)]),
        )];
        let projected = project_vertex(&test_vertex_1(), &branches, &registry()).unwrap();
        assert_eq!(
            projected,
            Vertex::from_pairs(1, [("AA", -1333), ("BB", 666), ("CC", -333), ("D_D", 0)])
        );
    }

    #[test]
    fn test_most_negative_delta_wins() {
        let ptdfs = ptdfs([dec!(0.1), dec!(0.2), dec!(0.3)]);
        // deltas 2/3 and -1
        let branches = vec![
            BranchConstraint::new("BR2", 100, 0, ptdfs.clone()),
            BranchConstraint::new("NEG", -150, 0, ptdfs),
        ];
        let projected = project_vertex(&test_vertex_1(), &branches, &registry()).unwrap();
        assert_eq!(
            projected,
            Vertex::from_pairs(1, [("AA", -2000), ("BB", 1000), ("CC", -500), ("D_D", 0)])
        );
    }

    fn arb_vertex() -> impl Strategy<Value = Vertex> {
        (0i64..10_000, 0i64..10_000, 0i64..10_000).prop_map(|(a, b, c)| {
            Vertex::from_pairs(1, [("AA", a), ("BB", b), ("CC", c), ("D_D", 0)])
        })
    }

    fn arb_branch() -> impl Strategy<Value = BranchConstraint> {
        (0i64..5_000, 0i64..500, 0i64..1_000, 0i64..1_000, 0i64..1_000).prop_map(
            |(ram, amr, p1, p2, p3)| {
                BranchConstraint::new(
                    "ARB",
                    ram,
                    amr,
                    ptdfs([Decimal::new(p1, 3), Decimal::new(p2, 3), Decimal::new(p3, 3)]),
                )
            },
        )
    }

    fn arb_signed_vertex() -> impl Strategy<Value = Vertex> {
        (-10_000i64..10_000, -10_000i64..10_000, -10_000i64..10_000).prop_map(|(a, b, c)| {
            Vertex::from_pairs(1, [("AA", a), ("BB", b), ("CC", c), ("D_D", 0)])
        })
    }

    fn arb_signed_branch() -> impl Strategy<Value = BranchConstraint> {
        (-5_000i64..5_000, -500i64..500, -1_000i64..1_000, -1_000i64..1_000, -1_000i64..1_000)
            .prop_map(|(ram, amr, p1, p2, p3)| {
                BranchConstraint::new(
                    "ARB",
                    ram,
                    amr,
                    ptdfs([Decimal::new(p1, 3), Decimal::new(p2, 3), Decimal::new(p3, 3)]),
                )
            })
    }

    proptest! {
        #[test]
        fn prop_projection_only_shrinks(
            vertex in arb_vertex(),
            branches in prop::collection::vec(arb_branch(), 0..6),
        ) {
            let projected = project_vertex(&vertex, &branches, &registry()).unwrap();
            prop_assert_eq!(projected.id(), vertex.id());
            for (key, &before) in vertex.coordinates() {
                let after = projected.coordinate(key).unwrap();
                prop_assert!(0 <= after && after <= before);
            }
        }

        #[test]
        fn prop_projection_is_idempotent(
            vertex in arb_vertex(),
            branches in prop::collection::vec(arb_branch(), 0..6),
        ) {
            let once = project_vertex(&vertex, &branches, &registry()).unwrap();
            let twice = project_vertex(&once, &branches, &registry()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_unbound_vertex_is_unchanged(
            vertex in arb_signed_vertex(),
            branches in prop::collection::vec(arb_signed_branch(), 0..6),
        ) {
            let registry = registry();
            let projected = project_vertex(&vertex, &branches, &registry).unwrap();
            prop_assert_eq!(projected.id(), vertex.id());
            prop_assert!(projected.coordinates().keys().eq(vertex.coordinates().keys()));

            let mut bound = false;
            for branch in &branches {
                if let Some(d) = delta(&vertex, branch, &registry).unwrap() {
                    bound |= d < Decimal::ONE;
                }
            }
            if !bound {
                prop_assert_eq!(projected, vertex);
            }
        }
    }
}
