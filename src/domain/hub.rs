use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VertexError};

fn default_weight() -> f64 {
    1.0
}

/// A market hub taking part in the net-position space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    /// Human readable name ("France", "Hub Allemagne AleGro")
    pub name: String,

    /// Code used by the commercial exchange programmes
    pub exchange_code: String,

    /// Code keying the PTDF sensitivities of flow-based branches
    pub flow_based_code: String,

    /// Area code of the reference programme net positions
    pub forecast_area_code: String,

    /// Column / coordinate key of the vertex files. Unique per registry.
    pub coordinate_key: String,

    /// Virtual hub of an HVDC link (may be absent from vertex files)
    #[serde(default)]
    pub is_hvdc_link: bool,

    /// Weight of this hub in the distance to the reference position
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Hub {
    pub fn new(
        name: impl Into<String>,
        exchange_code: impl Into<String>,
        flow_based_code: impl Into<String>,
        forecast_area_code: impl Into<String>,
        coordinate_key: impl Into<String>,
        is_hvdc_link: bool,
        weight: f64,
    ) -> Self {
        Self {
            name: name.into(),
            exchange_code: exchange_code.into(),
            flow_based_code: flow_based_code.into(),
            forecast_area_code: forecast_area_code.into(),
            coordinate_key: coordinate_key.into(),
            is_hvdc_link,
            weight,
        }
    }
}

/// Ordered, immutable catalogue of hubs.
///
/// Built once at configuration time and shared by reference afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HubRegistry {
    hubs: Vec<Hub>,
    by_coordinate_key: HashMap<String, usize>,
    by_flow_based_code: HashMap<String, usize>,
}

impl HubRegistry {
    /// Validate and index the given hubs
    pub fn new(hubs: Vec<Hub>) -> Result<Self> {
        if hubs.is_empty() {
            return Err(VertexError::InvalidRegistry(
                "registry must declare at least one hub".to_string(),
            ));
        }

        if let Some(key) = hubs.iter().map(|h| &h.coordinate_key).duplicates().next() {
            return Err(VertexError::InvalidRegistry(format!(
                "duplicate coordinate key '{key}'"
            )));
        }

        if let Some(code) = hubs.iter().map(|h| &h.flow_based_code).duplicates().next() {
            return Err(VertexError::InvalidRegistry(format!(
                "duplicate flow-based code '{code}'"
            )));
        }

        if let Some(hub) = hubs.iter().find(|h| !h.weight.is_finite() || h.weight < 0.0) {
            return Err(VertexError::InvalidRegistry(format!(
                "hub '{}' has invalid weight {}",
                hub.coordinate_key, hub.weight
            )));
        }

        let by_coordinate_key = hubs
            .iter()
            .enumerate()
            .map(|(i, h)| (h.coordinate_key.clone(), i))
            .collect();
        let by_flow_based_code = hubs
            .iter()
            .enumerate()
            .map(|(i, h)| (h.flow_based_code.clone(), i))
            .collect();

        Ok(Self {
            hubs,
            by_coordinate_key,
            by_flow_based_code,
        })
    }

    /// The 14 hubs of the Core capacity calculation region: twelve bidding
    /// zones plus the two virtual hubs of the ALEGrO HVDC link.
    pub fn core() -> Result<Self> {
        const ZONES: [(&str, &str); 12] = [
            ("Autriche", "AT"),
            ("Belgique", "BE"),
            ("République tchèque", "CZ"),
            ("Allemagne", "DE"),
            ("France", "FR"),
            ("Croatie", "HR"),
            ("Hongrie", "HU"),
            ("Pays-Bas", "NL"),
            ("Pologne", "PL"),
            ("Roumanie", "RO"),
            ("Slovénie", "SI"),
            ("Slovaquie", "SK"),
        ];

        let mut hubs: Vec<Hub> = ZONES
            .iter()
            .map(|(name, code)| {
                Hub::new(
                    *name,
                    *code,
                    format!("PTDF_{code}"),
                    format!("{code}-CORE"),
                    *code,
                    false,
                    1.0,
                )
            })
            .collect();
        hubs.push(Hub::new(
            "Hub Belgique AleGro",
            "BE_ALEGrO",
            "PTDF_BE_AL",
            "ALBE-CORE",
            "BE_AL",
            true,
            1.0,
        ));
        hubs.push(Hub::new(
            "Hub Allemagne AleGro",
            "DE_ALEGrO",
            "PTDF_DE_AL",
            "ALDE-CORE",
            "DE_AL",
            true,
            1.0,
        ));

        Self::new(hubs)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hub> {
        self.hubs.iter()
    }

    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }

    pub fn by_coordinate_key(&self, key: &str) -> Option<&Hub> {
        self.by_coordinate_key.get(key).map(|&i| &self.hubs[i])
    }

    pub fn by_flow_based_code(&self, code: &str) -> Option<&Hub> {
        self.by_flow_based_code.get(code).map(|&i| &self.hubs[i])
    }

    /// Vertex coordinate key for a flow-based (PTDF) code
    pub fn coordinate_key_for(&self, flow_based_code: &str) -> Option<&str> {
        self.by_flow_based_code(flow_based_code)
            .map(|h| h.coordinate_key.as_str())
    }
}

impl<'a> IntoIterator for &'a HubRegistry {
    type Item = &'a Hub;
    type IntoIter = std::slice::Iter<'a, Hub>;

    fn into_iter(self) -> Self::IntoIter {
        self.hubs.iter()
    }
}
