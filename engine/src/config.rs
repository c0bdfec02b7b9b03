// ═══════════════════════════════════════════════════════════════════════
// Round configuration — already-parsed data handed in by the host game
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{Result, RoundError};
use crate::types::TeamRole;
use serde::{Deserialize, Serialize};

/// Per-team descriptor loaded from external configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Faction / team descriptor (resolved during role resolution).
    pub team: String,
    pub role: TeamRole,
    #[serde(default)]
    pub grounded: bool,
    /// Displayable name lines shown by the UI collaborator.
    #[serde(default)]
    pub name: Vec<String>,
}

impl TeamConfig {
    pub fn new(team: impl Into<String>, role: TeamRole) -> Self {
        TeamConfig {
            team: team.into(),
            role,
            grounded: false,
            name: Vec::new(),
        }
    }
}

/// Which path generator the round uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PathStrategy {
    /// Randomized weighted walk over the zone graph.
    GraphWalk,
    /// Fixed ordered list of zone names, validated against the graph.
    Explicit { zones: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub teams: [TeamConfig; 2],
    pub path: PathStrategy,
    /// Staging phase countdown. None = staging waits for a manual advance.
    #[serde(default)]
    pub staging_seconds: Option<u64>,
    #[serde(default = "default_starting_tickets")]
    pub starting_tickets: u32,
}

fn default_starting_tickets() -> u32 {
    300
}

impl RoundConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RoundError::config("round config", e.to_string()))
    }
}
