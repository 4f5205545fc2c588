//! Gesture lifecycle state machine.
//!
//! `SessionController` is the only writer of the session slot. States:
//!
//! - `Idle`: no session.
//! - `Active`: gesture held; the engine ticks.
//! - `Releasing`: gesture ended; the engine winds down until the cooldown
//!   timer returns the controller to `Idle`.
//!
//! Every delayed callback carries the [`SessionId`] it was scheduled for and
//! is dropped if that session is no longer current, so a quick
//! start/end/start never lets an old timer touch the new session.

use crate::config::InstrumentConfig;
use crate::engine::{Effects, GenerativeEngine};
use crate::error::Rejected;
use crate::patterns::PatternIndex;
use crate::scheduler::Task;
use crate::state::{ParticleBatch, Position};

/// Generation counter identifying one session. Never reused within a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
    Releasing,
}

/// Delayed callbacks owned by a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTask {
    Tick(SessionId),
    StopArpeggio(SessionId),
    Cooldown(SessionId),
}

impl SessionTask {
    pub fn session(self) -> SessionId {
        match self {
            SessionTask::Tick(id) | SessionTask::StopArpeggio(id) | SessionTask::Cooldown(id) => id,
        }
    }
}

struct Session {
    phase: Phase,
    engine: GenerativeEngine,
}

pub struct SessionController {
    config: InstrumentConfig,
    slot: Option<Session>,
    next_id: u64,
}

impl SessionController {
    pub fn new(config: InstrumentConfig) -> Self {
        Self {
            config,
            slot: None,
            next_id: 1,
        }
    }

    /// Start a new session at `position`. Only legal from `Idle`.
    pub fn on_gesture_start(
        &mut self,
        position: Position,
        fx: &mut Effects<'_>,
    ) -> Result<SessionId, Rejected> {
        if let Some(s) = &self.slot {
            return Err(Rejected::SessionBusy(s.phase));
        }
        let id = SessionId(self.next_id);
        self.next_id += 1;
        let engine = GenerativeEngine::start(
            id,
            position,
            &self.config.engine,
            &self.config.voice,
            self.config.seed,
            fx,
        );
        self.slot = Some(Session {
            phase: Phase::Active,
            engine,
        });
        log::info!(
            "[session] {} active at ({:.0}, {:.0})",
            id.0,
            position.left,
            position.top
        );
        Ok(id)
    }

    /// Follow the pointer while `Active`; ignored otherwise.
    pub fn on_position_update(
        &mut self,
        position: Position,
        fx: &mut Effects<'_>,
    ) -> Result<(), Rejected> {
        match &mut self.slot {
            Some(s) if s.phase == Phase::Active => {
                s.engine.update_position(position, fx);
                Ok(())
            }
            other => Err(Rejected::NotActive(phase_of(other.as_ref()))),
        }
    }

    /// End the gesture. `Active` -> `Releasing`; repeated calls are no-ops.
    pub fn on_gesture_end(&mut self, fx: &mut Effects<'_>) -> Result<(), Rejected> {
        let s = match &mut self.slot {
            Some(s) if s.phase == Phase::Active => s,
            other => return Err(Rejected::NotReleasable(phase_of(other.as_ref()))),
        };
        s.phase = Phase::Releasing;
        s.engine.release(fx);
        let id = s.engine.session();
        fx.scheduler
            .schedule_after(self.config.engine.cooldown, Task::Session(SessionTask::Cooldown(id)));
        log::info!(
            "[session] {} releasing after {} batches (entropy {:.2})",
            id.0,
            s.engine.batches().len(),
            s.engine.entropy()
        );
        Ok(())
    }

    /// Run a delayed callback if its session is still current.
    pub fn handle(&mut self, task: SessionTask, fx: &mut Effects<'_>) {
        let Some(s) = self.slot.as_mut().filter(|s| s.engine.session() == task.session()) else {
            log::trace!("[session] dropping stale {:?}", task);
            return;
        };
        match task {
            SessionTask::Tick(_) => {
                if s.phase == Phase::Active {
                    s.engine.tick(fx);
                }
            }
            SessionTask::StopArpeggio(_) => s.engine.stop_arpeggio(fx),
            SessionTask::Cooldown(id) => {
                if s.phase == Phase::Releasing {
                    s.engine.shutdown(fx);
                    self.slot = None;
                    log::info!("[session] {} idle", id.0);
                }
            }
        }
    }

    pub fn phase(&self) -> Phase {
        phase_of(self.slot.as_ref())
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.slot.as_ref().map(|s| s.engine.session())
    }

    /// Entropy of the current session; zero when idle.
    pub fn entropy(&self) -> f32 {
        self.slot.as_ref().map_or(0.0, |s| s.engine.entropy())
    }

    pub fn pattern(&self) -> Option<PatternIndex> {
        self.slot.as_ref().map(|s| s.engine.pattern())
    }

    pub fn position(&self) -> Option<Position> {
        self.slot.as_ref().map(|s| s.engine.position())
    }

    /// Batches emitted by the current session, oldest first.
    pub fn particles(&self) -> &[ParticleBatch] {
        self.slot.as_ref().map(|s| s.engine.batches()).unwrap_or(&[])
    }

    pub fn engine(&self) -> Option<&GenerativeEngine> {
        self.slot.as_ref().map(|s| &s.engine)
    }
}

fn phase_of(slot: Option<&Session>) -> Phase {
    slot.map_or(Phase::Idle, |s| s.phase)
}
