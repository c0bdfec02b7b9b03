// ═══════════════════════════════════════════════════════════════════════
// Round orchestrator — wires roles, path, phases, and tickets together
//
// Setup order is fixed: resolve roles → generate the objective path →
// build and initialize phases → seed the tracker. Any failure aborts
// the whole setup; nothing partially-built is ever returned.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::{PathStrategy, RoundConfig};
use crate::error::Result;
use crate::path::{self, ZonePath};
use crate::phase::{Phase, PhaseSequence, PhaseTeamSettings, TickOutcome, UiBroadcaster};
use crate::roles::{resolve_roles, RoleResolution};
use crate::tickets::{TicketTracker, TrackerId};
use crate::types::{CancelToken, Team, TeamId, TicketBleedSeverity};
use crate::zones::ZoneGraph;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Live state of one round. Owned and driven by the host's round loop.
#[derive(Debug)]
pub struct RoundState {
    roles: RoleResolution,
    path: ZonePath,
    phases: PhaseSequence,
    tracker: TicketTracker,
    objectives_held: HashMap<TeamId, usize>,
}

/// Build a fully-initialized round. Seed controls both the coin flip
/// for random roles and the weighted graph walk, so a given
/// (config, graph, seed) triple always produces the same round.
pub fn setup_round(
    config: &RoundConfig,
    graph: &ZoneGraph,
    seed: u64,
    cancel: &CancelToken,
) -> Result<RoundState> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let roles = resolve_roles(&config.teams, &mut rng, cancel)?;
    let path = match &config.path {
        PathStrategy::GraphWalk => path::generate_walk(graph, &mut rng, cancel)?,
        PathStrategy::Explicit { zones } => path::generate_explicit(zones, graph)?,
    };

    let settings = || -> Vec<PhaseTeamSettings> {
        config.teams.iter().map(PhaseTeamSettings::from_config).collect()
    };
    let mut phases = PhaseSequence::new(vec![
        Phase::staging(config.staging_seconds, settings()),
        Phase::action(settings()),
    ]);
    phases.initialize_all(&roles)?;

    let mut tracker = TicketTracker::new(TrackerId(1));
    for team in roles.teams() {
        tracker.set_tickets(team, config.starting_tickets as i32)?;
    }

    Ok(RoundState {
        roles,
        path,
        phases,
        tracker,
        objectives_held: HashMap::new(),
    })
}

impl RoundState {
    pub fn roles(&self) -> &RoleResolution {
        &self.roles
    }

    pub fn path(&self) -> &ZonePath {
        &self.path
    }

    pub fn tracker(&self) -> &TicketTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut TicketTracker {
        &mut self.tracker
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.current()
    }

    /// Begin the first phase (staging).
    pub fn begin(&mut self, ui: &mut dyn UiBroadcaster) -> Result<()> {
        self.phases.begin_first(ui)
    }

    /// Drive the active phase forward. When the staging countdown
    /// elapses the sequence advances into action automatically.
    pub fn tick(&mut self, dt_secs: f64, ui: &mut dyn UiBroadcaster) -> Result<()> {
        if let TickOutcome::AdvanceRequested = self.phases.tick(dt_secs, ui)? {
            self.phases.advance(ui)?;
        }
        Ok(())
    }

    /// External advance, for phases without a duration.
    pub fn advance_phase(&mut self, ui: &mut dyn UiBroadcaster) -> Result<bool> {
        self.phases.advance(ui)
    }

    /// Record that `team` took one objective along the path, optionally
    /// awarding tickets.
    pub fn objective_captured(&mut self, team: &Team, ticket_bonus: i32) -> Result<()> {
        if !team.is_valid() {
            return Ok(());
        }
        *self.objectives_held.entry(team.id).or_insert(0) += 1;
        if ticket_bonus != 0 {
            self.tracker.increment_tickets(team, ticket_bonus)?;
        }
        log::info!("{team} captured an objective ({} held)", self.objectives_held[&team.id]);
        Ok(())
    }

    pub fn objectives_held(&self, team: &Team) -> usize {
        self.objectives_held.get(&team.id).copied().unwrap_or(0)
    }

    /// The winner once either side's tickets are exhausted.
    pub fn round_over(&self) -> Option<&Team> {
        let [a, b] = self.roles.teams();
        if self.tracker.tickets(a) == 0 {
            Some(b)
        } else if self.tracker.tickets(b) == 0 {
            Some(a)
        } else {
            None
        }
    }

    pub fn bleed_severity(&self, team: &Team, model: &dyn BleedModel) -> TicketBleedSeverity {
        model.severity(team, self)
    }
}

// ── Bleed classification ───────────────────────────────────────────────

/// Maps domain state to a bleed tier. Implementations must be pure
/// queries: no events, no mutation.
pub trait BleedModel {
    fn severity(&self, team: &Team, round: &RoundState) -> TicketBleedSeverity;
}

/// Round-mode bleed: the further behind on objectives a team is, the
/// harder it bleeds.
pub struct ObjectiveDeficitBleed;

impl BleedModel for ObjectiveDeficitBleed {
    fn severity(&self, team: &Team, round: &RoundState) -> TicketBleedSeverity {
        let held = round.objectives_held(team);
        let best_rival = round
            .roles
            .teams()
            .iter()
            .filter(|t| t.id != team.id)
            .map(|t| round.objectives_held(t))
            .max()
            .unwrap_or(0);
        match best_rival.saturating_sub(held) {
            0 => TicketBleedSeverity::None,
            1 => TicketBleedSeverity::Minor,
            2 => TicketBleedSeverity::Major,
            3 => TicketBleedSeverity::Drastic,
            _ => TicketBleedSeverity::Catastrophic,
        }
    }
}
