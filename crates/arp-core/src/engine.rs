//! Runtime behaviour of one session: entropy growth, particle emission and
//! the audio parameters derived from them.
//!
//! The engine never owns the session slot. [`SessionController`] creates it on
//! gesture start, forwards position updates and release, and routes timer
//! callbacks to it only while the session they were scheduled for is current.
//!
//! Shutdown is two-phase: releasing stops ticks and emission at once and fades
//! the delay mix, while the arpeggio keeps stepping until a later timer stops
//! it, so the sound trails off after the gesture ends.
//!
//! [`SessionController`]: crate::SessionController

use crate::backend::{AudioBackend, AudioParam, ParticleAnimator};
use crate::config::{EngineConfig, VoiceSettings};
use crate::mapper::map_range;
use crate::motion::{roll_pieces, session_rng};
use crate::patterns::{select_pattern, PatternIndex};
use crate::scheduler::{Scheduler, Task, TimerId};
use crate::script::Viewport;
use crate::session::{SessionId, SessionTask};
use crate::state::{ParticleBatch, Position};
use rand::rngs::StdRng;

/// Mutable handles to everything a transition may touch besides session state.
pub struct Effects<'a> {
    pub scheduler: &'a mut Scheduler,
    pub audio: &'a mut dyn AudioBackend,
    pub animator: &'a mut dyn ParticleAnimator,
    /// Viewport measured when the triggering event was handled.
    pub viewport: Viewport,
}

pub struct GenerativeEngine {
    session: SessionId,
    config: EngineConfig,
    entropy: f32,
    position: Position,
    pattern: PatternIndex,
    batches: Vec<ParticleBatch>,
    rng: StdRng,
    tick_timer: Option<TimerId>,
    emitting: bool,
    arpeggio_running: bool,
    voice_live: bool,
}

impl GenerativeEngine {
    /// Build the voice, start the arpeggio and schedule the first tick.
    pub fn start(
        session: SessionId,
        position: Position,
        config: &EngineConfig,
        voice: &VoiceSettings,
        seed: u64,
        fx: &mut Effects<'_>,
    ) -> Self {
        let pattern = select_pattern(position.top, fx.viewport.height);
        let modulation = modulation_index(config, position.left, fx.viewport.width);
        fx.audio.create_voice(voice, modulation, pattern.pattern());
        fx.audio.set_param(AudioParam::DelayWet, 0.0);
        fx.audio.set_param(AudioParam::ChorusWet, 0.0);
        fx.audio.set_param(AudioParam::Portamento, 0.0);
        fx.audio.start_pattern();

        let mut engine = Self {
            session,
            config: config.clone(),
            entropy: 0.0,
            position,
            pattern,
            batches: Vec::new(),
            rng: session_rng(seed, session.0),
            tick_timer: None,
            emitting: true,
            arpeggio_running: true,
            voice_live: true,
        };
        engine.schedule_tick(fx.scheduler);
        log::debug!(
            "[engine] session {} started on pattern {} (modulation {:.2})",
            session.0,
            pattern.pattern().name,
            modulation
        );
        engine
    }

    fn schedule_tick(&mut self, scheduler: &mut Scheduler) {
        let task = Task::Session(SessionTask::Tick(self.session));
        self.tick_timer = Some(scheduler.schedule_after(self.config.tick_period, task));
    }

    /// One generation step: emit a batch, grow entropy, push derived audio parameters.
    ///
    /// Returns `false` (and does nothing) once emission has stopped.
    pub fn tick(&mut self, fx: &mut Effects<'_>) -> bool {
        self.tick_timer = None;
        if !self.emitting {
            return false;
        }

        // The batch is tagged with the entropy it was emitted at; its pieces
        // already move with this tick's step included.
        let emitted_at = self.entropy;
        self.entropy += self.config.entropy_step;
        let mut batch = ParticleBatch {
            session: self.session,
            sequence: self.batches.len() as u32,
            position: self.position,
            entropy: emitted_at,
            pieces: roll_pieces(&mut self.rng, self.entropy),
            animated: false,
        };
        fx.animator.animate(&batch);
        batch.animated = true;
        self.batches.push(batch);

        let wet = self.entropy.min(self.config.wet_ceiling);
        fx.audio.set_param(AudioParam::DelayWet, wet);
        fx.audio.set_param(AudioParam::ChorusWet, wet);
        fx.audio.set_param(
            AudioParam::Portamento,
            self.entropy / self.config.portamento_divisor,
        );
        log::trace!(
            "[engine] session {} tick {} entropy {:.2}",
            self.session.0,
            self.batches.len(),
            self.entropy
        );

        self.schedule_tick(fx.scheduler);
        true
    }

    /// Follow the pointer. Returns `true` when the pattern changed.
    pub fn update_position(&mut self, position: Position, fx: &mut Effects<'_>) -> bool {
        self.position = position;

        let modulation = modulation_index(&self.config, position.left, fx.viewport.width);
        fx.audio.set_param(AudioParam::ModulationIndex, modulation);

        let pattern = select_pattern(position.top, fx.viewport.height);
        if pattern == self.pattern {
            return false;
        }
        self.pattern = pattern;
        fx.audio.set_pattern(pattern.pattern());
        log::debug!("[engine] session {} pattern -> {}", self.session.0, pattern.pattern().name);
        true
    }

    /// Stop emission now, fade the delay out, and schedule the arpeggio stop.
    pub fn release(&mut self, fx: &mut Effects<'_>) {
        if !self.emitting {
            return;
        }
        self.emitting = false;
        if let Some(id) = self.tick_timer.take() {
            fx.scheduler.cancel(id);
        }
        fx.audio.ramp_param(AudioParam::DelayWet, 0.0, self.config.release_ramp);
        fx.scheduler.schedule_after(
            self.config.arpeggio_stop_delay,
            Task::Session(SessionTask::StopArpeggio(self.session)),
        );
    }

    /// Stop arpeggio stepping. Safe to call repeatedly.
    pub fn stop_arpeggio(&mut self, fx: &mut Effects<'_>) {
        if self.arpeggio_running {
            self.arpeggio_running = false;
            fx.audio.stop_pattern();
        }
    }

    /// Final teardown when the session is discarded.
    pub fn shutdown(&mut self, fx: &mut Effects<'_>) {
        self.release(fx);
        self.stop_arpeggio(fx);
        if self.voice_live {
            self.voice_live = false;
            fx.audio.dispose_voice();
        }
        self.batches.clear();
        fx.animator.clear();
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn entropy(&self) -> f32 {
        self.entropy
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn pattern(&self) -> PatternIndex {
        self.pattern
    }

    pub fn batches(&self) -> &[ParticleBatch] {
        &self.batches
    }

    pub fn is_emitting(&self) -> bool {
        self.emitting
    }

    pub fn arpeggio_running(&self) -> bool {
        self.arpeggio_running
    }
}

/// Modulation index for a horizontal position across the viewport width.
#[inline]
pub fn modulation_index(config: &EngineConfig, left: f32, viewport_width: f32) -> f32 {
    let (lo, hi) = config.modulation_range;
    map_range(left, 0.0, viewport_width, lo, hi)
}
