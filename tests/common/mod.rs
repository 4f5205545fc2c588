// Recording collaborators shared by the host-side integration tests.

#![allow(dead_code)]

use arp_core::*;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCall {
    CreateVoice { modulation: f32, pattern: &'static str },
    Set(AudioParam, f32),
    Ramp(AudioParam, f32, Duration),
    SetPattern(&'static str),
    Start,
    Stop,
    Dispose,
}

#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub calls: Vec<AudioCall>,
}

impl RecordingAudio {
    pub fn count(&self, pred: impl Fn(&AudioCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Values pushed for `param` via `set_param`, in order.
    pub fn values(&self, param: AudioParam) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::Set(p, v) if *p == param => Some(*v),
                _ => None,
            })
            .collect()
    }
}

impl AudioBackend for RecordingAudio {
    fn create_voice(&mut self, _settings: &VoiceSettings, modulation_index: f32, pattern: &'static Pattern) {
        self.calls.push(AudioCall::CreateVoice {
            modulation: modulation_index,
            pattern: pattern.name,
        });
    }
    fn set_param(&mut self, param: AudioParam, value: f32) {
        self.calls.push(AudioCall::Set(param, value));
    }
    fn ramp_param(&mut self, param: AudioParam, target: f32, over: Duration) {
        self.calls.push(AudioCall::Ramp(param, target, over));
    }
    fn set_pattern(&mut self, pattern: &'static Pattern) {
        self.calls.push(AudioCall::SetPattern(pattern.name));
    }
    fn start_pattern(&mut self) {
        self.calls.push(AudioCall::Start);
    }
    fn stop_pattern(&mut self) {
        self.calls.push(AudioCall::Stop);
    }
    fn dispose_voice(&mut self) {
        self.calls.push(AudioCall::Dispose);
    }
}

#[derive(Debug, Default)]
pub struct RecordingAnimator {
    /// (session, sequence, entropy, already animated when received)
    pub animated: Vec<(SessionId, u32, f32, bool)>,
    pub clears: usize,
}

impl ParticleAnimator for RecordingAnimator {
    fn animate(&mut self, batch: &ParticleBatch) {
        self.animated
            .push((batch.session, batch.sequence, batch.entropy, batch.animated));
    }
    fn clear(&mut self) {
        self.clears += 1;
    }
}

pub type TestInstrument = Instrument<RecordingAudio, RecordingAnimator, Rc<Cell<Viewport>>>;

pub const VIEWPORT: Viewport = Viewport::new(1000.0, 800.0);
pub const FRAME: Duration = Duration::from_millis(16);

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn instrument() -> (TestInstrument, Rc<Cell<Viewport>>) {
    instrument_with(InstrumentConfig::default().with_seed(7))
}

pub fn instrument_with(config: InstrumentConfig) -> (TestInstrument, Rc<Cell<Viewport>>) {
    let viewport = Rc::new(Cell::new(VIEWPORT));
    let inst = Instrument::new(
        config,
        RecordingAudio::default(),
        RecordingAnimator::default(),
        viewport.clone(),
    )
    .expect("default config is valid");
    (inst, viewport)
}

/// Drive frames every `FRAME` from the current time up to and including `until`.
pub fn run_frames(inst: &mut TestInstrument, until: Duration) {
    let mut t = inst.now();
    while t < until {
        t = (t + FRAME).min(until);
        inst.frame(t);
    }
}

/// Standalone controller plus the collaborators its transitions need.
pub struct Harness {
    pub controller: SessionController,
    pub scheduler: Scheduler,
    pub audio: RecordingAudio,
    pub animator: RecordingAnimator,
    pub viewport: Viewport,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            controller: SessionController::new(InstrumentConfig::default()),
            scheduler: Scheduler::new(),
            audio: RecordingAudio::default(),
            animator: RecordingAnimator::default(),
            viewport: VIEWPORT,
        }
    }

    pub fn start(&mut self, position: Position) -> Result<SessionId, Rejected> {
        let mut fx = Effects {
            scheduler: &mut self.scheduler,
            audio: &mut self.audio,
            animator: &mut self.animator,
            viewport: self.viewport,
        };
        self.controller.on_gesture_start(position, &mut fx)
    }

    pub fn update(&mut self, position: Position) -> Result<(), Rejected> {
        let mut fx = Effects {
            scheduler: &mut self.scheduler,
            audio: &mut self.audio,
            animator: &mut self.animator,
            viewport: self.viewport,
        };
        self.controller.on_position_update(position, &mut fx)
    }

    pub fn end(&mut self) -> Result<(), Rejected> {
        let mut fx = Effects {
            scheduler: &mut self.scheduler,
            audio: &mut self.audio,
            animator: &mut self.animator,
            viewport: self.viewport,
        };
        self.controller.on_gesture_end(&mut fx)
    }

    /// Fire timers due up to `until`; returns how many ran.
    pub fn run_until(&mut self, until: Duration) -> usize {
        let mut fired = 0;
        while let Some(task) = self.scheduler.pop_due(until) {
            let mut fx = Effects {
                scheduler: &mut self.scheduler,
                audio: &mut self.audio,
                animator: &mut self.animator,
                viewport: self.viewport,
            };
            if let Task::Session(t) = task {
                self.controller.handle(t, &mut fx);
            }
            fired += 1;
        }
        self.scheduler.set_now(until);
        fired
    }
}
