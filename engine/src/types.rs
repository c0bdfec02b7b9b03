// ═══════════════════════════════════════════════════════════════════════
// Core types — teams, roles, bleed severity
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ── Team ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u8);

/// One side of the round. Created once during role resolution and
/// immutable for the round's duration.
///
/// "No team" is a distinguished but ordinary value: `Team::none()`
/// answers false to `is_valid()`. Callers must check the flag rather
/// than compare ids against a magic number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    /// Faction this team plays as.
    pub faction: String,
    /// In-game group identifier (squad/party handle on the game side).
    pub group: String,
    valid: bool,
}

impl Team {
    pub fn new(id: TeamId, faction: impl Into<String>, group: impl Into<String>) -> Self {
        Team {
            id,
            faction: faction.into(),
            group: group.into(),
            valid: true,
        }
    }

    /// The neutral "no team" sentinel.
    pub fn none() -> Self {
        Team {
            id: TeamId(0),
            faction: String::new(),
            group: String::new(),
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.valid {
            write!(f, "team {} ({})", self.id.0, self.faction)
        } else {
            write!(f, "no team")
        }
    }
}

// ── Roles ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    None,
    Random,
    Attacker,
    Defender,
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamRole::None => write!(f, "none"),
            TeamRole::Random => write!(f, "random"),
            TeamRole::Attacker => write!(f, "attacker"),
            TeamRole::Defender => write!(f, "defender"),
        }
    }
}

// ── Bleed severity ─────────────────────────────────────────────────────

/// How fast a team's tickets drain passively. Recomputed on demand,
/// never stored as authoritative state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TicketBleedSeverity {
    None,
    Minor,
    Major,
    Drastic,
    Catastrophic,
}

impl TicketBleedSeverity {
    pub const ALL: [TicketBleedSeverity; 5] = [
        TicketBleedSeverity::None,
        TicketBleedSeverity::Minor,
        TicketBleedSeverity::Major,
        TicketBleedSeverity::Drastic,
        TicketBleedSeverity::Catastrophic,
    ];
}

// ── Cancellation ───────────────────────────────────────────────────────

/// Cooperative cancellation for setup-time operations (role resolution,
/// path generation). Mutators of committed round state do not accept it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
