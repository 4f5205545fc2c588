//! Tunable parameters for the instrument.
//!
//! Defaults come from [`crate::constants`]; frontends override single
//! fields through the `with_*` helpers and call [`InstrumentConfig::validate`]
//! before building an [`Instrument`](crate::Instrument).

use crate::constants::*;
use crate::error::ConfigError;
use std::time::Duration;

/// Timing and mapping of the entropy-driven generation.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub tick_period: Duration,
    pub entropy_step: f32,
    pub wet_ceiling: f32,
    pub portamento_divisor: f32,
    /// Output range for the modulation index mapped from horizontal position.
    pub modulation_range: (f32, f32),
    pub release_ramp: Duration,
    pub arpeggio_stop_delay: Duration,
    /// Releasing -> Idle delay; matches the visual fade-out.
    pub cooldown: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_period: TICK_PERIOD,
            entropy_step: ENTROPY_STEP,
            wet_ceiling: WET_CEILING,
            portamento_divisor: PORTAMENTO_DIVISOR,
            modulation_range: (MODULATION_INDEX_MIN, MODULATION_INDEX_MAX),
            release_ramp: RELEASE_RAMP,
            arpeggio_stop_delay: ARPEGGIO_STOP_DELAY,
            cooldown: RELEASE_COOLDOWN,
        }
    }
}

/// Cadence of the onboarding gesture replay.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayConfig {
    pub initial_delay: Duration,
    pub step_delay: Duration,
    pub hold: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            initial_delay: REPLAY_INITIAL_DELAY,
            step_delay: REPLAY_STEP_DELAY,
            hold: REPLAY_HOLD,
        }
    }
}

/// Static description of the synthesis voice handed to the audio backend.
///
/// - `bpm` and `step_subdivision` fix the arpeggio step interval
/// - `delay_subdivision`/`delay_feedback` shape the feedback delay
/// - `chorus_*` shape the chorus (frequency Hz, delay ms, depth 0..1)
/// - the envelope fields are in seconds
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceSettings {
    pub bpm: f32,
    pub step_subdivision: u32,
    pub delay_subdivision: u32,
    pub delay_feedback: f32,
    pub chorus_frequency_hz: f32,
    pub chorus_delay_ms: f32,
    pub chorus_depth: f32,
    pub harmonicity: f32,
    pub note_length: Duration,
    pub attack: f32,
    pub decay: f32,
    pub modulation_attack: f32,
    pub modulation_decay: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            step_subdivision: STEP_SUBDIVISION,
            delay_subdivision: DELAY_SUBDIVISION,
            delay_feedback: DELAY_FEEDBACK,
            chorus_frequency_hz: CHORUS_FREQUENCY_HZ,
            chorus_delay_ms: CHORUS_DELAY_MS,
            chorus_depth: CHORUS_DEPTH,
            harmonicity: FM_HARMONICITY,
            note_length: NOTE_LENGTH,
            attack: 0.01,
            decay: 0.2,
            modulation_attack: 0.2,
            modulation_decay: 0.01,
        }
    }
}

impl VoiceSettings {
    /// Length of one note-value subdivision of a whole note (`4` = quarter, `24` = 24th).
    pub fn subdivision(&self, per_whole_note: u32) -> Duration {
        let beat = 60.0 / self.bpm as f64;
        Duration::from_secs_f64(beat * 4.0 / per_whole_note.max(1) as f64)
    }

    pub fn step_interval(&self) -> Duration {
        self.subdivision(self.step_subdivision)
    }

    pub fn delay_time(&self) -> Duration {
        self.subdivision(self.delay_subdivision)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstrumentConfig {
    pub engine: EngineConfig,
    pub replay: ReplayConfig,
    pub voice: VoiceSettings,
    /// Base seed for per-session particle randomness.
    pub seed: u64,
}

impl InstrumentConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_bpm(mut self, bpm: f32) -> Self {
        self.voice.bpm = bpm;
        self
    }

    pub fn with_replay_hold(mut self, hold: Duration) -> Self {
        self.replay.hold = hold;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.engine;
        if e.tick_period.is_zero() {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if e.entropy_step.is_nan() || e.entropy_step <= 0.0 {
            return Err(ConfigError::NonPositiveEntropyStep(e.entropy_step));
        }
        for (what, delay) in [
            ("arpeggio stop delay", e.arpeggio_stop_delay),
            ("release cooldown", e.cooldown),
        ] {
            if delay < e.release_ramp {
                return Err(ConfigError::ShorterThanRamp {
                    what,
                    delay,
                    ramp: e.release_ramp,
                });
            }
        }
        let (lo, hi) = e.modulation_range;
        if lo.partial_cmp(&hi) != Some(std::cmp::Ordering::Less) {
            return Err(ConfigError::EmptyModulationRange(lo, hi));
        }
        if self.voice.bpm.is_nan() || self.voice.bpm <= 0.0 {
            return Err(ConfigError::NonPositiveTempo(self.voice.bpm));
        }
        Ok(())
    }
}
