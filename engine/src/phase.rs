// ═══════════════════════════════════════════════════════════════════════
// Phase state machine — drives the round from staging into action
//
// Architecture:
//   Phases are pure state. The engine never touches wall-clock time;
//   the host loop calls `tick(dt)` and the phase answers whether the
//   orchestrator should advance. UI output goes through the injected
//   UiBroadcaster, never to the screen directly.
//
// Lifecycle: Uninitialized → Initialized → Active → Ended (terminal).
// A phase is one-shot; once ended it is never reused.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::TeamConfig;
use crate::error::{Result, RoundError};
use crate::roles::RoleResolution;
use crate::types::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseLifecycle {
    Uninitialized,
    Initialized,
    Active,
    Ended,
}

/// Per-team settings carried by every phase. The `team` slot is empty
/// until `initialize` resolves the descriptor, and is resolved exactly
/// once.
#[derive(Debug, Clone)]
pub struct PhaseTeamSettings {
    pub descriptor: String,
    pub grounded: bool,
    pub display: Vec<String>,
    pub team: Option<Team>,
}

impl PhaseTeamSettings {
    pub fn from_config(config: &TeamConfig) -> Self {
        PhaseTeamSettings {
            descriptor: config.team.clone(),
            grounded: config.grounded,
            display: config.name.clone(),
            team: None,
        }
    }
}

// ── UI collaborator ────────────────────────────────────────────────────

/// Outbound surface to the host game's UI. The engine pushes countdown
/// and message updates here and clears them on phase end; it never
/// renders anything itself.
pub trait UiBroadcaster {
    fn show_countdown(&mut self, team: &Team, message: &str, remaining_secs: u64);
    fn show_message(&mut self, team: &Team, message: &str);
    fn clear_ui(&mut self, team: &Team);
}

/// Discards everything. Used by tests and headless setups.
pub struct NullUi;

impl UiBroadcaster for NullUi {
    fn show_countdown(&mut self, _team: &Team, _message: &str, _remaining_secs: u64) {}
    fn show_message(&mut self, _team: &Team, _message: &str) {}
    fn clear_ui(&mut self, _team: &Team) {}
}

// ── Phase ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do (phase has no timer, or is not active).
    Idle,
    /// Timer running, duration not yet reached.
    Running,
    /// Elapsed time reached the duration; the orchestrator should
    /// advance to the next phase.
    AdvanceRequested,
}

/// Countdown bookkeeping for the staging phase. Dropped on `end`;
/// dropping twice is harmless.
#[derive(Debug, Clone)]
struct StagingTimer {
    interval_secs: f64,
    elapsed_secs: f64,
    /// Absolute phase time of the next countdown push.
    next_update_at: f64,
}

pub const DEFAULT_TICK_INTERVAL_SECS: f64 = 1.0;

#[derive(Debug, Clone)]
enum PhaseKind {
    Staging {
        timer: Option<StagingTimer>,
        /// Set once the no-duration informational message went out.
        notified: bool,
    },
    Action,
}

#[derive(Debug, Clone)]
pub struct Phase {
    pub display_name: Option<String>,
    pub duration_secs: Option<u64>,
    pub team_settings: Vec<PhaseTeamSettings>,
    lifecycle: PhaseLifecycle,
    kind: PhaseKind,
    tick_interval_secs: f64,
}

impl Phase {
    /// Preparation/staging phase. With a duration it counts down and
    /// requests an advance; without one it announces itself once and
    /// waits to be advanced externally.
    pub fn staging(duration_secs: Option<u64>, team_settings: Vec<PhaseTeamSettings>) -> Self {
        Phase {
            display_name: Some("Staging".to_string()),
            duration_secs,
            team_settings,
            lifecycle: PhaseLifecycle::Uninitialized,
            kind: PhaseKind::Staging { timer: None, notified: false },
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
        }
    }

    /// Override the countdown update interval (staging only).
    /// Non-positive or non-finite values are ignored; a zero interval
    /// would never let the update loop terminate.
    pub fn with_tick_interval(mut self, secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            self.tick_interval_secs = secs;
        }
        self
    }

    /// Active play. No timer; ends when the round ends.
    pub fn action(team_settings: Vec<PhaseTeamSettings>) -> Self {
        Phase {
            display_name: Some("Action".to_string()),
            duration_secs: None,
            team_settings,
            lifecycle: PhaseLifecycle::Uninitialized,
            kind: PhaseKind::Action,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
        }
    }

    pub fn lifecycle(&self) -> PhaseLifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == PhaseLifecycle::Active
    }

    /// Resolve every team descriptor against the live team list.
    /// Idempotent: settings that already hold a team are left alone.
    /// Runs before any phase begins; failure here is fatal for the
    /// whole round setup.
    pub fn initialize(&mut self, roles: &RoleResolution) -> Result<()> {
        match self.lifecycle {
            PhaseLifecycle::Uninitialized | PhaseLifecycle::Initialized => {}
            other => {
                return Err(RoundError::invalid_state(format!(
                    "initialize called on a phase in state {other:?}"
                )));
            }
        }
        for settings in &mut self.team_settings {
            if settings.team.is_none() {
                settings.team = Some(roles.resolve_descriptor(&settings.descriptor)?);
            }
        }
        self.lifecycle = PhaseLifecycle::Initialized;
        Ok(())
    }

    pub fn begin(&mut self, ui: &mut dyn UiBroadcaster) -> Result<()> {
        match self.lifecycle {
            PhaseLifecycle::Initialized => {}
            PhaseLifecycle::Active => {
                return Err(RoundError::invalid_state("begin called on an active phase"));
            }
            PhaseLifecycle::Ended => {
                return Err(RoundError::invalid_state("begin called on an ended phase"));
            }
            PhaseLifecycle::Uninitialized => {
                return Err(RoundError::invalid_state("begin called before initialize"));
            }
        }
        self.lifecycle = PhaseLifecycle::Active;
        log::info!("phase began: {}", self.display_name.as_deref().unwrap_or("unnamed"));

        let interval_secs = self.tick_interval_secs;
        if let PhaseKind::Staging { timer, notified } = &mut self.kind {
            match self.duration_secs {
                Some(_) => {
                    *timer = Some(StagingTimer {
                        interval_secs,
                        elapsed_secs: 0.0,
                        next_update_at: interval_secs,
                    });
                }
                None => {
                    for settings in &self.team_settings {
                        if let Some(team) = &settings.team {
                            ui.show_message(team, "Staging — waiting for round start");
                        }
                    }
                    *notified = true;
                }
            }
        }
        Ok(())
    }

    /// Advance the phase timer by `dt_secs`. On every full interval the
    /// countdown is recomputed and pushed to the UI; reaching the
    /// duration asks the orchestrator to move on.
    pub fn tick(&mut self, dt_secs: f64, ui: &mut dyn UiBroadcaster) -> Result<TickOutcome> {
        if self.lifecycle != PhaseLifecycle::Active {
            return Ok(TickOutcome::Idle);
        }
        let duration = match self.duration_secs {
            Some(d) => d,
            None => return Ok(TickOutcome::Idle),
        };
        let PhaseKind::Staging { timer: Some(timer), .. } = &mut self.kind else {
            return Ok(TickOutcome::Idle);
        };

        timer.elapsed_secs += dt_secs;
        let duration_f = duration as f64;

        // Walk every interval boundary the tick crossed, so a large
        // catch-up tick still emits a decreasing countdown sequence.
        while timer.next_update_at <= timer.elapsed_secs && timer.next_update_at <= duration_f {
            let remaining = (duration_f - timer.next_update_at).max(0.0).ceil() as u64;
            for settings in &self.team_settings {
                if let Some(team) = &settings.team {
                    ui.show_countdown(team, "Round starts in", remaining);
                }
            }
            timer.next_update_at += timer.interval_secs;
        }

        if timer.elapsed_secs >= duration_f {
            // Stop the timer; the orchestrator ends us via `end`.
            if let PhaseKind::Staging { timer, .. } = &mut self.kind {
                *timer = None;
            }
            return Ok(TickOutcome::AdvanceRequested);
        }
        Ok(TickOutcome::Running)
    }

    pub fn end(&mut self, ui: &mut dyn UiBroadcaster) -> Result<()> {
        match self.lifecycle {
            PhaseLifecycle::Active => {}
            PhaseLifecycle::Ended => {
                return Err(RoundError::invalid_state("end called on an ended phase"));
            }
            _ => return Err(RoundError::invalid_state("end called before begin")),
        }
        if let PhaseKind::Staging { timer, .. } = &mut self.kind {
            // Safe even when the phase never started a timer.
            *timer = None;
            for settings in &self.team_settings {
                if let Some(team) = &settings.team {
                    ui.clear_ui(team);
                }
            }
        }
        self.lifecycle = PhaseLifecycle::Ended;
        log::info!("phase ended: {}", self.display_name.as_deref().unwrap_or("unnamed"));
        Ok(())
    }
}

// ── Phase sequence ─────────────────────────────────────────────────────

/// Strictly serial phase progression: at most one phase is ever active,
/// and every phase is initialized before the first one begins.
#[derive(Debug, Clone)]
pub struct PhaseSequence {
    phases: Vec<Phase>,
    current: usize,
    started: bool,
}

impl PhaseSequence {
    pub fn new(phases: Vec<Phase>) -> Self {
        PhaseSequence { phases, current: 0, started: false }
    }

    /// Fail-fast descriptor resolution for every phase, before any of
    /// them activates.
    pub fn initialize_all(&mut self, roles: &RoleResolution) -> Result<()> {
        for phase in &mut self.phases {
            phase.initialize(roles)?;
        }
        Ok(())
    }

    pub fn begin_first(&mut self, ui: &mut dyn UiBroadcaster) -> Result<()> {
        if self.started {
            return Err(RoundError::invalid_state("phase sequence already started"));
        }
        let first = self
            .phases
            .first_mut()
            .ok_or_else(|| RoundError::config("phase sequence", "no phases configured"))?;
        first.begin(ui)?;
        self.started = true;
        Ok(())
    }

    pub fn current(&self) -> Option<&Phase> {
        self.phases.get(self.current)
    }

    pub fn tick(&mut self, dt_secs: f64, ui: &mut dyn UiBroadcaster) -> Result<TickOutcome> {
        match self.phases.get_mut(self.current) {
            Some(phase) => phase.tick(dt_secs, ui),
            None => Ok(TickOutcome::Idle),
        }
    }

    /// End the current phase and begin the next. Returns false when the
    /// sequence is exhausted.
    pub fn advance(&mut self, ui: &mut dyn UiBroadcaster) -> Result<bool> {
        if !self.started {
            return Err(RoundError::invalid_state("advance called before begin_first"));
        }
        let phase = self
            .phases
            .get_mut(self.current)
            .ok_or_else(|| RoundError::invalid_state("advance called after the last phase"))?;
        phase.end(ui)?;
        self.current += 1;
        match self.phases.get_mut(self.current) {
            Some(next) => {
                next.begin(ui)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn finished(&self) -> bool {
        self.started && self.current >= self.phases.len()
    }
}
