use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Source of the reference (market) net positions, keyed by forecast area code
#[cfg_attr(test, mockall::automock)]
pub trait ReferencePositions: Send + Sync {
    fn global_net_position(&self, area_code: &str) -> Option<f64>;
}

/// Reference programme net positions held in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketPositions(HashMap<String, f64>);

impl<K: Into<String>> FromIterator<(K, f64)> for MarketPositions {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl ReferencePositions for MarketPositions {
    fn global_net_position(&self, area_code: &str) -> Option<f64> {
        self.0.get(area_code).copied()
    }
}

impl ReferencePositions for HashMap<String, f64> {
    fn global_net_position(&self, area_code: &str) -> Option<f64> {
        self.get(area_code).copied()
    }
}
