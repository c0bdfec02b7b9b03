// ═══════════════════════════════════════════════════════════════════════
// Zone graph — named regions and their weighted forward links
// The leaf data everything else consumes. Loaded from JSON config;
// validated once at construction, read-only afterwards.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{Result, RoundError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    MainBase,
    Objective,
    Other,
}

/// A weighted, directed edge to a legal next zone away from a base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamLink {
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    /// Usable as a path endpoint or node.
    #[serde(default = "default_primary")]
    pub is_primary: bool,
    pub zone_type: ZoneType,
    /// Only meaningful for main bases.
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub upstream: Vec<UpstreamLink>,
}

fn default_primary() -> bool {
    true
}

impl Zone {
    /// Main base for a faction, with weighted forward links.
    pub fn main_base(
        name: impl Into<String>,
        faction: impl Into<String>,
        upstream: &[(&str, f64)],
    ) -> Self {
        Zone {
            name: name.into(),
            is_primary: true,
            zone_type: ZoneType::MainBase,
            faction: Some(faction.into()),
            upstream: links(upstream),
        }
    }

    /// Ordinary objective zone.
    pub fn objective(name: impl Into<String>, upstream: &[(&str, f64)]) -> Self {
        Zone {
            name: name.into(),
            is_primary: true,
            zone_type: ZoneType::Objective,
            faction: None,
            upstream: links(upstream),
        }
    }
}

fn links(pairs: &[(&str, f64)]) -> Vec<UpstreamLink> {
    pairs
        .iter()
        .map(|(target, weight)| UpstreamLink { target: (*target).to_string(), weight: *weight })
        .collect()
}

// ── Zone store ─────────────────────────────────────────────────────────

/// The zone store consumed by path generation. Construction validates
/// the invariants the generators rely on: unique names, non-negative
/// link weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneGraph {
    zones: Vec<Zone>,
}

impl ZoneGraph {
    pub fn new(zones: Vec<Zone>) -> Result<Self> {
        let mut seen = HashSet::new();
        for zone in &zones {
            if !seen.insert(zone.name.as_str()) {
                return Err(RoundError::config(
                    "zone graph",
                    format!("duplicate zone name '{}'", zone.name),
                ));
            }
            for link in &zone.upstream {
                if link.weight < 0.0 || !link.weight.is_finite() {
                    return Err(RoundError::config(
                        "zone graph",
                        format!(
                            "zone '{}' has invalid weight {} on link to '{}'",
                            zone.name, link.weight, link.target
                        ),
                    ));
                }
            }
        }
        Ok(ZoneGraph { zones })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let zones: Vec<Zone> = serde_json::from_str(json)
            .map_err(|e| RoundError::config("zone graph", e.to_string()))?;
        ZoneGraph::new(zones)
    }

    /// All zones usable as path nodes.
    pub fn primary_zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(|z| z.is_primary)
    }

    /// Exact, case-sensitive name lookup.
    pub fn find_by_name(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
