//! Collaborator interfaces the core drives.
//!
//! The core never synthesizes sound or touches the DOM itself; frontends
//! implement these traits over WebAudio/DOM (web) or cpal/logging (native).

use crate::config::VoiceSettings;
use crate::patterns::Pattern;
use crate::script::Viewport;
use crate::state::ParticleBatch;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Runtime-adjustable parameters of the synthesis voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioParam {
    /// FM modulation index, driven by horizontal position.
    ModulationIndex,
    /// Wet level of the feedback delay, 0..1.
    DelayWet,
    /// Wet level of the chorus, 0..1.
    ChorusWet,
    /// Pitch glide time in seconds.
    Portamento,
}

pub trait AudioBackend {
    /// Build the voice for a new session. Stepping does not begin until `start_pattern`.
    fn create_voice(&mut self, settings: &VoiceSettings, modulation_index: f32, pattern: &'static Pattern);
    fn set_param(&mut self, param: AudioParam, value: f32);
    /// Linearly ramp `param` to `target` over `over`.
    fn ramp_param(&mut self, param: AudioParam, target: f32, over: Duration);
    /// Swap the note sequence without resetting the step clock.
    fn set_pattern(&mut self, pattern: &'static Pattern);
    fn start_pattern(&mut self);
    fn stop_pattern(&mut self);
    /// Tear the voice down. Called once per session, after `stop_pattern`.
    fn dispose_voice(&mut self);
}

pub trait ParticleAnimator {
    /// Materialize and animate a freshly emitted batch.
    fn animate(&mut self, batch: &ParticleBatch);
    /// Remove every materialized piece (session returned to idle).
    fn clear(&mut self);
}

pub trait ViewportSource {
    /// Current viewport size, measured on every call.
    fn viewport(&self) -> Viewport;
}

impl ViewportSource for Viewport {
    fn viewport(&self) -> Viewport {
        *self
    }
}

/// Shared, resizable viewport for single-threaded hosts.
impl ViewportSource for Rc<Cell<Viewport>> {
    fn viewport(&self) -> Viewport {
        self.get()
    }
}

/// Audio backend that ignores everything; used when sound is disabled.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioBackend for SilentAudio {
    fn create_voice(&mut self, _: &VoiceSettings, _: f32, _: &'static Pattern) {}
    fn set_param(&mut self, _: AudioParam, _: f32) {}
    fn ramp_param(&mut self, _: AudioParam, _: f32, _: Duration) {}
    fn set_pattern(&mut self, _: &'static Pattern) {}
    fn start_pattern(&mut self) {}
    fn stop_pattern(&mut self) {}
    fn dispose_voice(&mut self) {}
}
