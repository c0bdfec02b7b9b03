// ═══════════════════════════════════════════════════════════════════════
// Team role resolution — decides who attacks and who defends
//
// Runs once at round setup, before path generation. Produces the two
// Team records every other component consumes. Nothing here mutates
// shared state, so cancellation just returns early.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::TeamConfig;
use crate::error::{Result, RoundError};
use crate::types::{CancelToken, Team, TeamId, TeamRole};
use rand::Rng;

/// Finalized roles for the round.
#[derive(Debug, Clone)]
pub struct RoleResolution {
    teams: [Team; 2],
    roles: [TeamRole; 2],
    has_attack_defense: bool,
}

/// Resolve the two configured roles into final assignments.
///
/// Rules, in order:
/// 1. Exactly one `None` is inconsistent — one team can't attack while
///    the other has no role.
/// 2. Both `None`: no attack/defense this round.
/// 3. Both `Random`: fair coin flip.
/// 4. One `Random`: takes the complement of the concrete role.
/// 5. Otherwise both must be concrete and mutually exclusive.
pub fn resolve_roles(
    configs: &[TeamConfig; 2],
    rng: &mut impl Rng,
    cancel: &CancelToken,
) -> Result<RoleResolution> {
    if cancel.is_cancelled() {
        return Err(RoundError::Cancelled);
    }

    let (first, second) = (configs[0].role, configs[1].role);
    let (role_a, role_b, has_attack_defense) = match (first, second) {
        (TeamRole::None, TeamRole::None) => (TeamRole::None, TeamRole::None, false),
        (TeamRole::None, other) | (other, TeamRole::None) => {
            return Err(RoundError::config(
                "role resolver",
                format!("one team is '{other}' while the other has no role"),
            ));
        }
        (TeamRole::Random, TeamRole::Random) => {
            if rng.gen_bool(0.5) {
                (TeamRole::Attacker, TeamRole::Defender, true)
            } else {
                (TeamRole::Defender, TeamRole::Attacker, true)
            }
        }
        (TeamRole::Random, concrete) => (complement(concrete)?, concrete, true),
        (concrete, TeamRole::Random) => (concrete, complement(concrete)?, true),
        (TeamRole::Attacker, TeamRole::Defender) => (TeamRole::Attacker, TeamRole::Defender, true),
        (TeamRole::Defender, TeamRole::Attacker) => (TeamRole::Defender, TeamRole::Attacker, true),
        (a, b) => {
            return Err(RoundError::config(
                "role resolver",
                format!("roles '{a}' and '{b}' are not mutually exclusive"),
            ));
        }
    };

    let teams = [make_team(TeamId(1), &configs[0]), make_team(TeamId(2), &configs[1])];
    log::info!(
        "roles resolved: {} = {}, {} = {}",
        teams[0], role_a, teams[1], role_b
    );

    Ok(RoleResolution {
        teams,
        roles: [role_a, role_b],
        has_attack_defense,
    })
}

fn complement(role: TeamRole) -> Result<TeamRole> {
    match role {
        TeamRole::Attacker => Ok(TeamRole::Defender),
        TeamRole::Defender => Ok(TeamRole::Attacker),
        other => Err(RoundError::config(
            "role resolver",
            format!("role '{other}' has no complement"),
        )),
    }
}

fn make_team(id: TeamId, config: &TeamConfig) -> Team {
    let group = config
        .name
        .first()
        .cloned()
        .unwrap_or_else(|| config.team.clone());
    Team::new(id, config.team.clone(), group)
}

impl RoleResolution {
    pub fn teams(&self) -> &[Team; 2] {
        &self.teams
    }

    pub fn has_attack_defense(&self) -> bool {
        self.has_attack_defense
    }

    pub fn role_of(&self, id: TeamId) -> TeamRole {
        if self.teams[0].id == id {
            self.roles[0]
        } else if self.teams[1].id == id {
            self.roles[1]
        } else {
            TeamRole::None
        }
    }

    /// The attacking team. Fails loudly when no attack/defense is
    /// configured rather than silently returning a wrong team.
    pub fn attacker(&self) -> Result<&Team> {
        self.side(TeamRole::Attacker)
    }

    pub fn defender(&self) -> Result<&Team> {
        self.side(TeamRole::Defender)
    }

    fn side(&self, wanted: TeamRole) -> Result<&Team> {
        if !self.has_attack_defense {
            return Err(RoundError::invalid_state(format!(
                "{wanted} queried but this round has no attack/defense roles"
            )));
        }
        self.roles
            .iter()
            .position(|&r| r == wanted)
            .map(|i| &self.teams[i])
            .ok_or_else(|| RoundError::invalid_state(format!("no team holds the {wanted} role")))
    }

    /// Resolve a phase team descriptor against the live team list.
    /// Accepts a team number ("1"/"2"), a faction name, or the role
    /// keywords "attacker"/"defender".
    pub fn resolve_descriptor(&self, descriptor: &str) -> Result<Team> {
        match descriptor {
            "attacker" => return self.attacker().cloned(),
            "defender" => return self.defender().cloned(),
            _ => {}
        }
        if let Ok(number) = descriptor.parse::<u8>() {
            if let Some(team) = self.teams.iter().find(|t| t.id.0 == number) {
                return Ok(team.clone());
            }
        }
        self.teams
            .iter()
            .find(|t| t.faction == descriptor)
            .cloned()
            .ok_or_else(|| {
                RoundError::config(
                    "team resolver",
                    format!("team descriptor '{descriptor}' matches no live team"),
                )
            })
    }
}
