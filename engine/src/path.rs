// ═══════════════════════════════════════════════════════════════════════
// Objective path generation — base to base through the zone graph
//
// Two interchangeable strategies produce the same ZonePath shape:
//   graph walk — randomized weighted traversal with bounded retries
//   explicit   — fixed, configured zone list validated against the graph
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{Result, RoundError};
use crate::types::CancelToken;
use crate::zones::{Zone, ZoneGraph, ZoneType};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Attempts before graph-walk generation gives up.
pub const MAX_TRIES: u32 = 10;
/// Intermediate zones allowed between the two bases.
pub const MAX_INTERMEDIATE_ZONES: usize = 10;
/// Two bases plus at least one true objective.
pub const MIN_PATH_LEN: usize = 3;

const COMPONENT: &str = "path generator";

/// Ordered zone sequence for one round. First and last are distinct
/// main bases; no zone appears twice; length is in [3, 12].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePath {
    zones: Vec<Zone>,
}

impl ZonePath {
    fn new(zones: Vec<Zone>) -> Self {
        ZonePath { zones }
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

    pub fn first(&self) -> &Zone {
        &self.zones[0]
    }

    pub fn last(&self) -> &Zone {
        &self.zones[self.zones.len() - 1]
    }

    /// The contested zones between the two bases.
    pub fn objectives(&self) -> &[Zone] {
        &self.zones[1..self.zones.len() - 1]
    }

    pub fn names(&self) -> Vec<&str> {
        self.zones.iter().map(|z| z.name.as_str()).collect()
    }
}

impl std::fmt::Display for ZonePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.names().join(" -> "))
    }
}

// ── Graph-walk strategy ────────────────────────────────────────────────

/// Generate a path by weighted-random traversal from the unique seed
/// base until the opposing base is reached.
///
/// Cycles and length violations are retried up to `MAX_TRIES`; a missing
/// link target, a dead-end zone, or a walk that arrives back at its own
/// base abort generation outright.
pub fn generate_walk(
    graph: &ZoneGraph,
    rng: &mut impl Rng,
    cancel: &CancelToken,
) -> Result<ZonePath> {
    let seed = find_seed(graph)?;

    for attempt in 1..=MAX_TRIES {
        if cancel.is_cancelled() {
            return Err(RoundError::Cancelled);
        }
        match walk_once(graph, seed, rng)? {
            WalkOutcome::Accepted(path) => {
                log::info!("objective path generated on attempt {attempt}: {path}");
                return Ok(path);
            }
            WalkOutcome::Rejected(reason) => {
                log::debug!("path attempt {attempt}/{MAX_TRIES} rejected: {reason}");
            }
        }
    }

    Err(RoundError::config(
        COMPONENT,
        format!("no valid path from '{}' after {MAX_TRIES} attempts", seed.name),
    ))
}

enum WalkOutcome {
    Accepted(ZonePath),
    /// Transient condition; retried, never surfaced to the caller.
    Rejected(&'static str),
}

/// The seed is the unique primary main base that has a faction and
/// outbound links. Zero or several candidates is a configuration error.
fn find_seed(graph: &ZoneGraph) -> Result<&Zone> {
    let mut candidates = graph.primary_zones().filter(|z| {
        z.zone_type == ZoneType::MainBase && z.faction.is_some() && !z.upstream.is_empty()
    });
    let seed = candidates.next().ok_or_else(|| {
        RoundError::config(COMPONENT, "no main base with upstream zones to seed the path")
    })?;
    if let Some(extra) = candidates.next() {
        return Err(RoundError::config(
            COMPONENT,
            format!("ambiguous path seed: both '{}' and '{}' qualify", seed.name, extra.name),
        ));
    }
    Ok(seed)
}

fn walk_once(graph: &ZoneGraph, seed: &Zone, rng: &mut impl Rng) -> Result<WalkOutcome> {
    let mut path: Vec<Zone> = vec![seed.clone()];
    let mut current = seed;

    loop {
        let link = current
            .upstream
            .choose_weighted(rng, |l| l.weight)
            .map_err(|e| {
                RoundError::config(
                    COMPONENT,
                    format!("unusable upstream weights on '{}': {e}", current.name),
                )
            })?;
        let next = graph.find_by_name(&link.target).ok_or_else(|| {
            RoundError::config(
                COMPONENT,
                format!("upstream target '{}' of '{}' is not in the graph", link.target, current.name),
            )
        })?;

        if next.zone_type == ZoneType::MainBase {
            // A walk that comes home is a broken graph, not bad luck.
            if next.name == seed.name {
                return Err(RoundError::config(
                    COMPONENT,
                    format!("path from '{}' loops back to its own base", seed.name),
                ));
            }
            path.push(next.clone());
            if path.len() < MIN_PATH_LEN {
                return Ok(WalkOutcome::Rejected("no intermediate objective"));
            }
            if path.len() > MAX_INTERMEDIATE_ZONES + 2 {
                return Ok(WalkOutcome::Rejected("too many intermediate zones"));
            }
            return Ok(WalkOutcome::Accepted(ZonePath::new(path)));
        }

        if path.iter().any(|z| z.name == next.name) {
            return Ok(WalkOutcome::Rejected("cycle detected"));
        }
        if next.upstream.is_empty() {
            return Err(RoundError::config(
                COMPONENT,
                format!("dead end at '{}': no upstream zones", next.name),
            ));
        }

        path.push(next.clone());
        current = next;
    }
}

// ── Explicit strategy ──────────────────────────────────────────────────

/// Resolve a configured, ordered zone name list into a path.
/// Deterministic; every failure is a configuration error.
pub fn generate_explicit(names: &[String], graph: &ZoneGraph) -> Result<ZonePath> {
    if names.is_empty() {
        return Err(RoundError::config(COMPONENT, "explicit zone list is empty"));
    }

    let mut zones: Vec<Zone> = Vec::with_capacity(names.len());
    for name in names {
        let zone = graph
            .find_by_name(name)
            .filter(|z| z.is_primary)
            .ok_or_else(|| {
                RoundError::config(COMPONENT, format!("'{name}' is not a known primary zone"))
            })?;
        if zones.iter().any(|z| z.name == zone.name) {
            return Err(RoundError::config(
                COMPONENT,
                format!("zone '{name}' appears twice in the explicit list"),
            ));
        }
        zones.push(zone.clone());
    }

    if zones.len() < MIN_PATH_LEN {
        return Err(RoundError::config(
            COMPONENT,
            format!("explicit path has {} zones, need at least {MIN_PATH_LEN}", zones.len()),
        ));
    }
    for endpoint in [&zones[0], &zones[zones.len() - 1]] {
        if endpoint.zone_type != ZoneType::MainBase {
            return Err(RoundError::config(
                COMPONENT,
                format!("explicit path endpoint '{}' is not a main base", endpoint.name),
            ));
        }
    }

    Ok(ZonePath::new(zones))
}
