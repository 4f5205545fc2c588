//! Single-threaded runtime tying input, onboarding replay and sessions together.
//!
//! Frontends own one `Instrument`, forward pointer events to it and call
//! [`Instrument::frame`] once per animation frame with a monotonic timestamp.
//! All timers fire from inside `advance`/`frame`; nothing runs concurrently.

use crate::backend::{AudioBackend, ParticleAnimator, ViewportSource};
use crate::config::InstrumentConfig;
use crate::constants::MAX_FRAME_CATCH_UP;
use crate::engine::Effects;
use crate::error::{ConfigError, Rejected};
use crate::replay::{GestureReplayer, ReplayEvent};
use crate::scheduler::{Scheduler, Task};
use crate::script::{GestureScript, INTRO_SWIPE};
use crate::session::{Phase, SessionController, SessionId};
use crate::state::{ParticleBatch, Position};
use std::time::Duration;

pub struct Instrument<A, P, V> {
    scheduler: Scheduler,
    sessions: SessionController,
    replayer: GestureReplayer,
    replay_session: Option<SessionId>,
    instructions_visible: bool,
    audio: A,
    animator: P,
    viewport: V,
}

impl<A, P, V> Instrument<A, P, V>
where
    A: AudioBackend,
    P: ParticleAnimator,
    V: ViewportSource,
{
    pub fn new(config: InstrumentConfig, audio: A, animator: P, viewport: V) -> Result<Self, ConfigError> {
        Self::with_script(config, &INTRO_SWIPE, audio, animator, viewport)
    }

    /// Like [`Instrument::new`] but onboarding plays `script`.
    pub fn with_script(
        config: InstrumentConfig,
        script: &'static GestureScript,
        audio: A,
        animator: P,
        viewport: V,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scheduler: Scheduler::new(),
            replayer: GestureReplayer::new(script, config.replay.clone()),
            sessions: SessionController::new(config),
            replay_session: None,
            instructions_visible: true,
            audio,
            animator,
            viewport,
        })
    }

    fn parts(&mut self) -> (&mut SessionController, Effects<'_>) {
        let viewport = self.viewport.viewport();
        (
            &mut self.sessions,
            Effects {
                scheduler: &mut self.scheduler,
                audio: &mut self.audio,
                animator: &mut self.animator,
                viewport,
            },
        )
    }

    /// Play the onboarding gesture. Skipped unless the instrument is idle.
    pub fn start_onboarding(&mut self) -> bool {
        if self.sessions.phase() != Phase::Idle {
            log::debug!("[instrument] onboarding skipped: session {:?}", self.sessions.phase());
            return false;
        }
        let viewport = self.viewport.viewport();
        match self.replayer.start(viewport, &mut self.scheduler) {
            Some(event) => {
                self.apply_replay(event);
                true
            }
            None => false,
        }
    }

    /// Real pointer press. Interrupts onboarding playback if it is still running.
    pub fn pointer_down(&mut self, position: Position) {
        if let Some(event) = self.replayer.cancel() {
            self.apply_replay(event);
        }
        let (sessions, mut fx) = self.parts();
        let result = sessions.on_gesture_start(position, &mut fx);
        absorb(result.map(|_| ()));
    }

    /// Real pointer motion. Ignored while onboarding plays.
    pub fn pointer_move(&mut self, position: Position) {
        if self.replayer.is_running() {
            return;
        }
        let (sessions, mut fx) = self.parts();
        let accepted = sessions.on_position_update(position, &mut fx).is_ok();
        if accepted && self.instructions_visible {
            self.instructions_visible = false;
            log::debug!("[instrument] instructions hidden");
        }
    }

    /// Real pointer release. Ignored while onboarding plays.
    pub fn pointer_up(&mut self) {
        if self.replayer.is_running() {
            return;
        }
        let (sessions, mut fx) = self.parts();
        absorb(sessions.on_gesture_end(&mut fx));
    }

    fn apply_replay(&mut self, event: ReplayEvent) {
        let current = self.sessions.session_id();
        let ours = current.is_some() && current == self.replay_session;
        let (sessions, mut fx) = self.parts();
        match event {
            ReplayEvent::Start(position) => {
                let started = sessions.on_gesture_start(position, &mut fx);
                self.replay_session = started.ok();
                absorb(started.map(|_| ()));
            }
            ReplayEvent::Move(position) => {
                if ours {
                    absorb(sessions.on_position_update(position, &mut fx));
                }
            }
            ReplayEvent::End => {
                if ours {
                    absorb(sessions.on_gesture_end(&mut fx));
                }
                self.replay_session = None;
            }
        }
    }

    fn dispatch(&mut self, task: Task) {
        match task {
            Task::Session(t) => {
                let (sessions, mut fx) = self.parts();
                sessions.handle(t, &mut fx);
            }
            Task::Replay(t) => {
                let viewport = self.viewport.viewport();
                if let Some(event) = self.replayer.handle(t, viewport, &mut self.scheduler) {
                    self.apply_replay(event);
                }
            }
        }
    }

    /// Fire every timer due at or before `now`, in order.
    pub fn advance(&mut self, now: Duration) {
        while let Some(task) = self.scheduler.pop_due(now) {
            self.dispatch(task);
        }
        self.scheduler.set_now(now);
    }

    /// One animation frame: fire due timers, then the tasks waiting for this frame.
    ///
    /// After a stall longer than [`MAX_FRAME_CATCH_UP`] (a hidden tab, a
    /// suspended laptop) the excess is skipped rather than replayed, so a held
    /// gesture does not dump hundreds of overdue ticks into one frame.
    pub fn frame(&mut self, now: Duration) {
        let behind = now.saturating_sub(self.scheduler.now());
        if behind > MAX_FRAME_CATCH_UP {
            let skipped = behind - MAX_FRAME_CATCH_UP;
            log::debug!("[instrument] skipping {:?} of stalled time", skipped);
            self.scheduler.postpone(skipped);
        }
        self.advance(now);
        for task in self.scheduler.take_frame_tasks() {
            self.dispatch(task);
        }
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn phase(&self) -> Phase {
        self.sessions.phase()
    }

    pub fn entropy(&self) -> f32 {
        self.sessions.entropy()
    }

    pub fn particles(&self) -> &[ParticleBatch] {
        self.sessions.particles()
    }

    pub fn sessions(&self) -> &SessionController {
        &self.sessions
    }

    pub fn replayer(&self) -> &GestureReplayer {
        &self.replayer
    }

    pub fn onboarding_running(&self) -> bool {
        self.replayer.is_running()
    }

    /// Whether the "drag to make some noise" hint should still show.
    pub fn instructions_visible(&self) -> bool {
        self.instructions_visible
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn animator(&self) -> &P {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut P {
        &mut self.animator
    }
}

fn absorb(result: Result<(), Rejected>) {
    if let Err(e) = result {
        log::debug!("[instrument] {}", e);
    }
}
