use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Security limit of one monitored network element of the flow-based domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchConstraint {
    /// Identifier of the monitored element (CNEC)
    pub id: String,

    /// Remaining available margin at zero net positions (RAM0)
    pub ram_limit: i64,

    /// Adjustment for minimum RAM
    pub available_margin: i64,

    /// PTDF sensitivities keyed by hub flow-based code
    pub sensitivities: BTreeMap<String, Decimal>,
}

impl BranchConstraint {
    pub fn new(
        id: impl Into<String>,
        ram_limit: i64,
        available_margin: i64,
        sensitivities: BTreeMap<String, Decimal>,
    ) -> Self {
        Self {
            id: id.into(),
            ram_limit,
            available_margin,
            sensitivities,
        }
    }

    /// Total margin the flow induced by a vertex may consume
    pub fn margin(&self) -> Decimal {
        Decimal::from(self.available_margin) + Decimal::from(self.ram_limit)
    }
}
