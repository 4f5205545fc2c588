//! Native FM voice rendered on the cpal audio thread.
//!
//! The instrument talks to [`CpalAudio`] from the main thread; the callback
//! renders from the same [`SynthState`] behind a mutex. Arpeggio stepping is
//! counted in samples inside the callback so note timing does not depend on
//! how often the main loop runs.

use arp_core::{note_to_hz, AudioBackend, AudioParam, Pattern, VoiceSettings};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::f32::consts::TAU;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const NOTE_PEAK: f32 = 0.5;
const MAX_DELAY_SECS: f32 = 2.0;
// set_target-style exponential segments settle after about three time constants
const TIME_CONSTANTS: f32 = 3.0;

/// Linear parameter ramp advanced once per sample.
#[derive(Clone, Copy, Debug, Default)]
struct Ramp {
    value: f32,
    target: f32,
    step: f32,
    remaining: u32,
}

impl Ramp {
    fn set(&mut self, v: f32) {
        self.value = v;
        self.target = v;
        self.remaining = 0;
    }

    fn ramp_to(&mut self, target: f32, samples: u32) {
        if samples == 0 {
            self.set(target);
            return;
        }
        self.target = target;
        self.step = (target - self.value) / samples as f32;
        self.remaining = samples;
    }

    #[inline]
    fn next(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.value = if self.remaining == 0 {
                self.target
            } else {
                self.value + self.step
            };
        }
        self.value
    }
}

struct FmVoice {
    settings: VoiceSettings,
    pattern: &'static Pattern,
    modulation_index: f32,
    portamento: f32,
    delay_wet: Ramp,
    chorus_wet: Ramp,

    playing: bool,
    step: usize,
    step_samples: u32,
    until_next: u32,
    note_pos: u32,
    freq: f32,
    target_freq: f32,
    carrier_phase: f32,
    modulator_phase: f32,

    delay_line: Vec<f32>,
    delay_len: usize,
    delay_pos: usize,
    chorus_line: Vec<f32>,
    chorus_pos: usize,
    lfo_phase: f32,
}

impl FmVoice {
    fn new(settings: &VoiceSettings, modulation_index: f32, pattern: &'static Pattern, sr: f32) -> Self {
        let delay_len = ((settings.delay_time().as_secs_f32() * sr) as usize)
            .clamp(1, (MAX_DELAY_SECS * sr) as usize);
        let chorus_centre = settings.chorus_delay_ms / 1000.0 * sr;
        let chorus_len = (chorus_centre * (1.0 + settings.chorus_depth)) as usize + 4;
        Self {
            settings: settings.clone(),
            pattern,
            modulation_index,
            portamento: 0.0,
            delay_wet: Ramp::default(),
            chorus_wet: Ramp::default(),
            playing: false,
            step: 0,
            step_samples: ((settings.step_interval().as_secs_f32() * sr) as u32).max(1),
            until_next: 0,
            note_pos: u32::MAX,
            freq: 0.0,
            target_freq: 0.0,
            carrier_phase: 0.0,
            modulator_phase: 0.0,
            delay_line: vec![0.0; delay_len],
            delay_len,
            delay_pos: 0,
            chorus_line: vec![0.0; chorus_len],
            chorus_pos: 0,
            lfo_phase: 0.0,
        }
    }

    fn trigger(&mut self) {
        let notes = &self.pattern.notes;
        if let Some(hz) = note_to_hz(notes[self.step % notes.len()]) {
            self.target_freq = hz;
            if self.freq <= 0.0 || self.portamento <= 0.0 {
                self.freq = hz;
            }
        }
        self.step += 1;
        self.note_pos = 0;
    }

    /// Amplitude and modulation envelopes at the current note position.
    fn envelopes(&self, sr: f32) -> (f32, f32) {
        if self.note_pos == u32::MAX {
            return (0.0, 0.0);
        }
        let s = &self.settings;
        let t = self.note_pos as f32 / sr;
        let held = s.note_length.as_secs_f32();
        let shape = |attack: f32, decay: f32| {
            let rise = if attack > 0.0 { (t / attack).min(1.0) } else { 1.0 };
            if t <= held {
                rise
            } else {
                let tc = (decay / TIME_CONSTANTS).max(1e-4);
                rise * (-(t - held) / tc).exp()
            }
        };
        (
            NOTE_PEAK * shape(s.attack, s.decay),
            shape(s.modulation_attack, s.modulation_decay),
        )
    }

    fn render(&mut self, sr: f32) -> f32 {
        if self.playing {
            if self.until_next == 0 {
                self.trigger();
                self.until_next = self.step_samples;
            }
            self.until_next -= 1;
        }

        if self.portamento > 0.0 {
            let coeff = 1.0 - (-TIME_CONSTANTS / (self.portamento * sr)).exp();
            self.freq += (self.target_freq - self.freq) * coeff;
        } else {
            self.freq = self.target_freq;
        }

        let (amp, mod_env) = self.envelopes(sr);
        if self.note_pos != u32::MAX {
            self.note_pos = self.note_pos.saturating_add(1);
        }

        let modulator = if self.modulator_phase < 0.5 { 1.0 } else { -1.0 };
        self.modulator_phase = (self.modulator_phase + self.freq * self.settings.harmonicity / sr).fract();
        let inst_freq = self.freq + modulator * self.modulation_index * self.freq * mod_env;
        self.carrier_phase = (self.carrier_phase + inst_freq / sr).rem_euclid(1.0);
        let dry = (self.carrier_phase * TAU).sin() * amp;

        // feedback delay
        let delayed = self.delay_line[self.delay_pos];
        self.delay_line[self.delay_pos] = dry + delayed * self.settings.delay_feedback;
        self.delay_pos = (self.delay_pos + 1) % self.delay_len;
        let wet = self.delay_wet.next();
        let after_delay = dry * (1.0 - wet) + delayed * wet;

        // chorus: LFO-swept fractional read behind the write head
        let len = self.chorus_line.len();
        self.chorus_line[self.chorus_pos] = after_delay;
        let centre = self.settings.chorus_delay_ms / 1000.0 * sr;
        let sweep = centre * (1.0 + self.settings.chorus_depth * (self.lfo_phase * TAU).sin());
        self.lfo_phase = (self.lfo_phase + self.settings.chorus_frequency_hz / sr).fract();
        let read = (self.chorus_pos as f32 - sweep).rem_euclid(len as f32);
        let i0 = read as usize % len;
        let i1 = (i0 + 1) % len;
        let frac = read.fract();
        let chorused = self.chorus_line[i0] * (1.0 - frac) + self.chorus_line[i1] * frac;
        self.chorus_pos = (self.chorus_pos + 1) % len;
        let cw = self.chorus_wet.next();

        after_delay * (1.0 - cw) + chorused * cw
    }
}

/// State shared between the instrument (main thread) and the audio callback.
pub struct SynthState {
    sample_rate: f32,
    voice: Option<FmVoice>,
}

impl SynthState {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            voice: None,
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let sr = self.sample_rate;
        self.voice.as_mut().map_or(0.0, |v| v.render(sr).tanh())
    }

    fn samples(&self, d: Duration) -> u32 {
        (d.as_secs_f32() * self.sample_rate) as u32
    }
}

/// cpal-backed [`AudioBackend`].
pub struct CpalAudio {
    state: Arc<Mutex<SynthState>>,
    _stream: cpal::Stream,
}

impl CpalAudio {
    pub fn open() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("no output device"))?;
        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        log::info!(
            "[audio] {} @ {} Hz, {} ch, {:?}",
            device.name().unwrap_or_else(|_| "output".into()),
            sample_rate,
            channels,
            config.sample_format()
        );

        let state = Arc::new(Mutex::new(SynthState::new(sample_rate)));
        let stream_config: cpal::StreamConfig = config.clone().into();
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, channels, state.clone())?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, channels, state.clone())?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, channels, state.clone())?,
            other => anyhow::bail!("unsupported sample format {:?}", other),
        };
        stream.play()?;
        Ok(Self {
            state,
            _stream: stream,
        })
    }

    fn lock(&self) -> MutexGuard<'_, SynthState> {
        lock(&self.state)
    }
}

// A panic on the audio thread must not silence the main thread for good.
fn lock(state: &Mutex<SynthState>) -> MutexGuard<'_, SynthState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<SynthState>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let err_fn = |err| log::error!("[audio] stream error: {err}");
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let mut synth = lock(&state);
            for frame in data.chunks_mut(channels.max(1)) {
                let v = T::from_sample(synth.next_sample());
                frame.iter_mut().for_each(|s| *s = v);
            }
        },
        err_fn,
        None,
    )
}

impl AudioBackend for CpalAudio {
    fn create_voice(&mut self, settings: &VoiceSettings, modulation_index: f32, pattern: &'static Pattern) {
        let mut s = self.lock();
        let sr = s.sample_rate;
        s.voice = Some(FmVoice::new(settings, modulation_index, pattern, sr));
    }

    fn set_param(&mut self, param: AudioParam, value: f32) {
        let mut s = self.lock();
        let Some(v) = s.voice.as_mut() else { return };
        match param {
            AudioParam::ModulationIndex => v.modulation_index = value,
            AudioParam::Portamento => v.portamento = value.max(0.0),
            AudioParam::DelayWet => v.delay_wet.set(value.clamp(0.0, 1.0)),
            AudioParam::ChorusWet => v.chorus_wet.set(value.clamp(0.0, 1.0)),
        }
    }

    fn ramp_param(&mut self, param: AudioParam, target: f32, over: Duration) {
        let mut s = self.lock();
        let samples = s.samples(over);
        let Some(v) = s.voice.as_mut() else { return };
        match param {
            AudioParam::DelayWet => v.delay_wet.ramp_to(target.clamp(0.0, 1.0), samples),
            AudioParam::ChorusWet => v.chorus_wet.ramp_to(target.clamp(0.0, 1.0), samples),
            AudioParam::ModulationIndex => v.modulation_index = target,
            AudioParam::Portamento => v.portamento = target.max(0.0),
        }
    }

    fn set_pattern(&mut self, pattern: &'static Pattern) {
        if let Some(v) = self.lock().voice.as_mut() {
            v.pattern = pattern;
        }
    }

    fn start_pattern(&mut self) {
        if let Some(v) = self.lock().voice.as_mut() {
            v.playing = true;
            v.step = 0;
            v.until_next = 0;
        }
    }

    fn stop_pattern(&mut self) {
        if let Some(v) = self.lock().voice.as_mut() {
            v.playing = false;
        }
    }

    fn dispose_voice(&mut self) {
        self.lock().voice = None;
    }
}
