// ═══════════════════════════════════════════════════════════════════════
// Ticket tracker — the depleting per-team resource that ends the round
//
// Mutations happen on the round loop thread only; the guard is a
// thread-id check, not a lock, because single-threaded access is
// guaranteed by construction. Events go into an outbox the host drains
// in a separate, deliberate dispatch step, so mutators never block and
// listener ordering stays testable.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{Result, RoundError};
use crate::types::{Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::thread::{self, ThreadId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackerId(pub u32);

/// Emitted on every successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketsChanged {
    pub new_number: u32,
    /// For `increment_tickets` this is the true signed delta. For
    /// `set_tickets` it mirrors the raw value passed in — listeners
    /// depend on that asymmetry, so it stays.
    pub change: i32,
    pub team: Team,
    /// Which tracker emitted this, for multi-tracker setups.
    pub source: TrackerId,
}

#[derive(Debug)]
pub struct TicketTracker {
    id: TrackerId,
    counts: HashMap<TeamId, u32>,
    outbox: VecDeque<TicketsChanged>,
    round_loop: ThreadId,
}

impl TicketTracker {
    /// Binds the tracker to the calling thread; every mutation must
    /// come from that thread.
    pub fn new(id: TrackerId) -> Self {
        TicketTracker {
            id,
            counts: HashMap::new(),
            outbox: VecDeque::new(),
            round_loop: thread::current().id(),
        }
    }

    pub fn id(&self) -> TrackerId {
        self.id
    }

    /// Absence means zero, never an error.
    pub fn tickets(&self, team: &Team) -> u32 {
        self.counts.get(&team.id).copied().unwrap_or(0)
    }

    /// Overwrite a team's count. Rejects negative values.
    pub fn set_tickets(&mut self, team: &Team, value: i32) -> Result<()> {
        self.assert_round_loop()?;
        if value < 0 {
            return Err(RoundError::invalid_state(format!(
                "set_tickets({team}) with negative value {value}"
            )));
        }
        self.counts.insert(team.id, value as u32);
        self.outbox.push_back(TicketsChanged {
            new_number: value as u32,
            change: value,
            team: team.clone(),
            source: self.id,
        });
        Ok(())
    }

    /// Apply a signed delta, clamped at zero. A no-op for the neutral
    /// team.
    pub fn increment_tickets(&mut self, team: &Team, delta: i32) -> Result<()> {
        self.assert_round_loop()?;
        if !team.is_valid() {
            return Ok(());
        }
        let current = i64::from(self.tickets(team));
        let next = (current + i64::from(delta)).max(0) as u32;
        self.counts.insert(team.id, next);
        self.outbox.push_back(TicketsChanged {
            new_number: next,
            change: delta,
            team: team.clone(),
            source: self.id,
        });
        Ok(())
    }

    /// Take every pending event, oldest first. The dispatch step the
    /// mutators deliberately do not perform.
    pub fn drain_events(&mut self) -> Vec<TicketsChanged> {
        self.outbox.drain(..).collect()
    }

    pub fn pending_events(&self) -> usize {
        self.outbox.len()
    }

    fn assert_round_loop(&self) -> Result<()> {
        if thread::current().id() != self.round_loop {
            return Err(RoundError::invalid_state(
                "ticket mutation attempted off the round loop thread",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: u8) -> Team {
        Team::new(TeamId(id), format!("faction{id}"), format!("group{id}"))
    }

    #[test]
    fn unknown_team_reads_zero() {
        let tracker = TicketTracker::new(TrackerId(1));
        assert_eq!(tracker.tickets(&team(9)), 0);
    }

    #[test]
    fn increment_clamps_at_zero() {
        let mut tracker = TicketTracker::new(TrackerId(1));
        let t = team(1);
        tracker.set_tickets(&t, 10).unwrap();
        tracker.increment_tickets(&t, -5000).unwrap();
        assert_eq!(tracker.tickets(&t), 0);
        let events = tracker.drain_events();
        assert_eq!(events.last().unwrap().new_number, 0);
        assert_eq!(events.last().unwrap().change, -5000);
    }

    #[test]
    fn neutral_team_increment_is_silent() {
        let mut tracker = TicketTracker::new(TrackerId(1));
        tracker.increment_tickets(&Team::none(), 50).unwrap();
        assert_eq!(tracker.pending_events(), 0);
        assert_eq!(tracker.tickets(&Team::none()), 0);
    }

    #[test]
    fn set_rejects_negative_value() {
        let mut tracker = TicketTracker::new(TrackerId(1));
        assert!(tracker.set_tickets(&team(1), -1).is_err());
        assert_eq!(tracker.pending_events(), 0);
    }

    // Known quirk, kept on purpose: set_tickets reports the new value
    // in `change`, not a delta. increment_tickets reports a real delta.
    #[test]
    fn set_tickets_change_mirrors_new_value_quirk() {
        let mut tracker = TicketTracker::new(TrackerId(7));
        let t = team(1);
        tracker.set_tickets(&t, 100).unwrap();
        tracker.set_tickets(&t, 40).unwrap();
        let events = tracker.drain_events();
        assert_eq!(events[0].change, 100);
        assert_eq!(events[1].change, 40);
        assert_eq!(events[1].new_number, 40);
        assert_eq!(events[1].source, TrackerId(7));
    }

    #[test]
    fn mutation_off_round_loop_fails() {
        let mut tracker = TicketTracker::new(TrackerId(1));
        let t = team(1);
        std::thread::scope(|s| {
            s.spawn(|| {
                assert!(tracker.set_tickets(&t, 5).is_err());
                assert!(tracker.increment_tickets(&t, 5).is_err());
            });
        });
        assert_eq!(tracker.tickets(&t), 0);
    }
}
