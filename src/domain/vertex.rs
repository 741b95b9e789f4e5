use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::HubRegistry;
use crate::error::{Result, VertexError};

/// An extreme point of the net-position space.
///
/// Coordinates are keyed by hub coordinate key. A vertex is never mutated:
/// projection produces a new one with the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    id: u32,
    coordinates: BTreeMap<String, i64>,
}

impl Vertex {
    /// Build a vertex from `(key, position)` pairs
    pub fn from_pairs<K, I>(id: u32, pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, i64)>,
    {
        Self {
            id,
            coordinates: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Build a vertex from the raw text fields of one tabular record.
    ///
    /// `field` returns the raw value of a column. A blank or absent value is
    /// read as 0 for HVDC hubs only; for any other hub it is a data error.
    pub fn from_raw_fields<'a, F>(id: u32, registry: &HubRegistry, field: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let coordinates = registry
            .iter()
            .map(|hub| {
                let raw = field(hub.coordinate_key.as_str())
                    .map(str::trim)
                    .unwrap_or_default();
                let position = if raw.is_empty() {
                    if hub.is_hvdc_link {
                        0
                    } else {
                        return Err(VertexError::MissingCoordinate {
                            vertex_id: id,
                            coordinate_key: hub.coordinate_key.clone(),
                        });
                    }
                } else {
                    raw.parse::<i64>()
                        .map_err(|_| VertexError::UnparsableCoordinate {
                            vertex_id: id,
                            coordinate_key: hub.coordinate_key.clone(),
                            raw: raw.to_string(),
                        })?
                };
                Ok((hub.coordinate_key.clone(), position))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self { id, coordinates })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn coordinates(&self) -> &BTreeMap<String, i64> {
        &self.coordinates
    }

    pub fn coordinate(&self, key: &str) -> Option<i64> {
        self.coordinates.get(key).copied()
    }

    /// Same id, every coordinate passed through `f`
    pub fn map_coordinates<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(i64) -> Result<i64>,
    {
        let coordinates = self
            .coordinates
            .iter()
            .map(|(k, &v)| Ok((k.clone(), f(v)?)))
            .collect::<Result<_>>()?;
        Ok(Self {
            id: self.id,
            coordinates,
        })
    }

    /// Check that the coordinate keys are exactly the registry's keys
    pub fn validate_against(&self, registry: &HubRegistry) -> Result<()> {
        if let Some(hub) = registry
            .iter()
            .find(|h| !self.coordinates.contains_key(&h.coordinate_key))
        {
            return Err(VertexError::MissingCoordinate {
                vertex_id: self.id,
                coordinate_key: hub.coordinate_key.clone(),
            });
        }

        if let Some(key) = self
            .coordinates
            .keys()
            .find(|k| registry.by_coordinate_key(k).is_none())
        {
            return Err(VertexError::UnexpectedCoordinate {
                vertex_id: self.id,
                coordinate_key: key.clone(),
            });
        }

        Ok(())
    }
}
