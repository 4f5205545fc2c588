use crate::constants::*;
use anyhow::anyhow;
use arp_core::{note_to_hz, AudioBackend, AudioParam, Pattern, VoiceSettings};
use std::time::Duration;
use web_sys as web;

fn js_err(e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow!("{:?}", e)
}

fn create_gain(ctx: &web::AudioContext, value: f32) -> anyhow::Result<web::GainNode> {
    let g = web::GainNode::new(ctx).map_err(js_err)?;
    g.gain().set_value(value);
    Ok(g)
}

fn connect(from: &web::AudioNode, to: &web::AudioNode) -> anyhow::Result<()> {
    from.connect_with_audio_node(to).map_err(js_err)?;
    Ok(())
}

/// Equal-sum wet/dry blend around an effect: `input -> dry -> output` and
/// `effect -> wet -> output`.
struct Mix {
    input: web::GainNode,
    dry: web::GainNode,
    wet: web::GainNode,
    output: web::GainNode,
}

impl Mix {
    fn new(ctx: &web::AudioContext) -> anyhow::Result<Self> {
        let mix = Mix {
            input: create_gain(ctx, 1.0)?,
            dry: create_gain(ctx, 1.0)?,
            wet: create_gain(ctx, 0.0)?,
            output: create_gain(ctx, 1.0)?,
        };
        connect(&mix.input, &mix.dry)?;
        connect(&mix.dry, &mix.output)?;
        connect(&mix.wet, &mix.output)?;
        Ok(mix)
    }

    fn set_wet(&self, wet: f32, at: f64) {
        let wet = wet.clamp(0.0, 1.0);
        for (param, v) in [(self.wet.gain(), wet), (self.dry.gain(), 1.0 - wet)] {
            _ = param.cancel_scheduled_values(at);
            _ = param.set_value_at_time(v, at);
        }
    }

    fn ramp_wet(&self, target: f32, from: f64, to: f64) {
        let target = target.clamp(0.0, 1.0);
        for (param, v) in [(self.wet.gain(), target), (self.dry.gain(), 1.0 - target)] {
            let current = param.value();
            _ = param.cancel_scheduled_values(from);
            _ = param.set_value_at_time(current, from);
            _ = param.linear_ramp_to_value_at_time(v, to);
        }
    }

    fn disconnect(&self) {
        for g in [&self.input, &self.dry, &self.wet, &self.output] {
            _ = g.disconnect();
        }
    }
}

/// One FM voice with its feedback delay and chorus, alive for one session.
struct Voice {
    settings: VoiceSettings,
    carrier: web::OscillatorNode,
    modulator: web::OscillatorNode,
    modulation_depth: web::GainNode,
    envelope: web::GainNode,
    delay_mix: Mix,
    delay: web::DelayNode,
    delay_feedback: web::GainNode,
    chorus_mix: Mix,
    chorus_delay: web::DelayNode,
    chorus_lfo: web::OscillatorNode,
    chorus_depth: web::GainNode,

    pattern: &'static Pattern,
    modulation_index: f32,
    portamento: f32,
    playing: bool,
    step: usize,
    next_note: f64,
    last_hz: f32,
}

impl Voice {
    fn build(
        ctx: &web::AudioContext,
        out: &web::AudioNode,
        settings: &VoiceSettings,
        modulation_index: f32,
        pattern: &'static Pattern,
    ) -> anyhow::Result<Self> {
        // FM pair: square modulator -> depth -> carrier frequency
        let carrier = web::OscillatorNode::new(ctx).map_err(js_err)?;
        carrier.set_type(web::OscillatorType::Sine);
        let modulator = web::OscillatorNode::new(ctx).map_err(js_err)?;
        modulator.set_type(web::OscillatorType::Square);
        let modulation_depth = create_gain(ctx, 0.0)?;
        connect(&modulator, &modulation_depth)?;
        modulation_depth
            .connect_with_audio_param(&carrier.frequency())
            .map_err(js_err)?;
        let envelope = create_gain(ctx, 0.0)?;
        connect(&carrier, &envelope)?;

        // envelope -> feedback delay
        let delay_mix = Mix::new(ctx)?;
        let delay = ctx
            .create_delay_with_max_delay_time(MAX_DELAY_SECS)
            .map_err(js_err)?;
        delay
            .delay_time()
            .set_value(settings.delay_time().as_secs_f32());
        let delay_feedback = create_gain(ctx, settings.delay_feedback)?;
        connect(&envelope, &delay_mix.input)?;
        connect(&delay_mix.input, &delay)?;
        connect(&delay, &delay_feedback)?;
        connect(&delay_feedback, &delay)?;
        connect(&delay, &delay_mix.wet)?;

        // -> chorus: LFO sweeps a short delay line around its centre
        let chorus_mix = Mix::new(ctx)?;
        let centre = settings.chorus_delay_ms / 1000.0;
        let chorus_delay = ctx
            .create_delay_with_max_delay_time((centre * 2.0) as f64 + 0.01)
            .map_err(js_err)?;
        chorus_delay.delay_time().set_value(centre);
        let chorus_lfo = web::OscillatorNode::new(ctx).map_err(js_err)?;
        chorus_lfo.frequency().set_value(settings.chorus_frequency_hz);
        let chorus_depth = create_gain(ctx, centre * settings.chorus_depth)?;
        connect(&chorus_lfo, &chorus_depth)?;
        chorus_depth
            .connect_with_audio_param(&chorus_delay.delay_time())
            .map_err(js_err)?;
        connect(&delay_mix.output, &chorus_mix.input)?;
        connect(&chorus_mix.input, &chorus_delay)?;
        connect(&chorus_delay, &chorus_mix.wet)?;
        connect(&chorus_mix.output, out)?;

        for osc in [&carrier, &modulator, &chorus_lfo] {
            osc.start().map_err(js_err)?;
        }

        Ok(Voice {
            settings: settings.clone(),
            carrier,
            modulator,
            modulation_depth,
            envelope,
            delay_mix,
            delay,
            delay_feedback,
            chorus_mix,
            chorus_delay,
            chorus_lfo,
            chorus_depth,
            pattern,
            modulation_index,
            portamento: 0.0,
            playing: false,
            step: 0,
            next_note: 0.0,
            last_hz: 0.0,
        })
    }

    fn glide(&self, param: &web::AudioParam, hz: f32, at: f64) {
        if self.portamento > 0.0 {
            let tc = self.portamento as f64 / TIME_CONSTANTS_PER_GLIDE;
            _ = param.set_target_at_time(hz, at, tc);
        } else {
            _ = param.set_value_at_time(hz, at);
        }
    }

    fn play_note(&mut self, at: f64) {
        let notes = &self.pattern.notes;
        let symbol = notes[self.step % notes.len()];
        let hz = note_to_hz(symbol).unwrap_or(self.last_hz);
        self.last_hz = hz;

        let s = &self.settings;
        let carrier_hz = self.carrier.frequency();
        let modulator_hz = self.modulator.frequency();
        self.glide(&carrier_hz, hz, at);
        self.glide(&modulator_hz, hz * s.harmonicity, at);

        let release = at + s.note_length.as_secs_f64();
        let amp = self.envelope.gain();
        _ = amp.cancel_scheduled_values(at);
        _ = amp.set_value_at_time(0.0, at);
        _ = amp.linear_ramp_to_value_at_time(NOTE_PEAK, at + s.attack as f64);
        _ = amp.set_target_at_time(0.0, release, s.decay as f64 / TIME_CONSTANTS_PER_GLIDE);

        let depth = self.modulation_depth.gain();
        _ = depth.cancel_scheduled_values(at);
        _ = depth.set_value_at_time(0.0, at);
        _ = depth.linear_ramp_to_value_at_time(
            self.modulation_index * hz,
            at + s.modulation_attack as f64,
        );
        _ = depth.set_target_at_time(
            0.0,
            release.max(at + s.modulation_attack as f64),
            s.modulation_decay as f64 / TIME_CONSTANTS_PER_GLIDE,
        );
    }

    /// Schedule every step that falls inside the lookahead window.
    fn pump(&mut self, now: f64) {
        if !self.playing {
            return;
        }
        // Tab was hidden and the clock ran ahead: resume from now instead of bursting.
        if self.next_note < now {
            self.next_note = now + START_OFFSET_SECS;
        }
        let interval = self.settings.step_interval().as_secs_f64();
        while self.next_note < now + LOOKAHEAD_SECS {
            self.play_note(self.next_note);
            self.step += 1;
            self.next_note += interval;
        }
    }

    fn dispose(self) {
        for osc in [&self.carrier, &self.modulator, &self.chorus_lfo] {
            _ = osc.stop();
            _ = osc.disconnect();
        }
        for g in [
            &self.modulation_depth,
            &self.envelope,
            &self.delay_feedback,
            &self.chorus_depth,
        ] {
            _ = g.disconnect();
        }
        _ = self.delay.disconnect();
        _ = self.chorus_delay.disconnect();
        self.delay_mix.disconnect();
        self.chorus_mix.disconnect();
    }
}

/// WebAudio implementation of the instrument's voice.
pub struct WebAudio {
    ctx: web::AudioContext,
    master: web::GainNode,
    voice: Option<Voice>,
}

impl WebAudio {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(js_err)?;
        let master = create_gain(&ctx, MASTER_GAIN)?;
        connect(&master, &ctx.destination())?;
        Ok(Self {
            ctx,
            master,
            voice: None,
        })
    }

    /// Browsers keep the context suspended until a user gesture.
    pub fn resume(&self) {
        _ = self.ctx.resume();
    }

    /// Called once per animation frame to keep the arpeggio scheduled ahead.
    pub fn pump(&mut self) {
        let now = self.ctx.current_time();
        if let Some(v) = &mut self.voice {
            v.pump(now);
        }
    }
}

impl AudioBackend for WebAudio {
    fn create_voice(&mut self, settings: &VoiceSettings, modulation_index: f32, pattern: &'static Pattern) {
        if let Some(old) = self.voice.take() {
            old.dispose();
        }
        match Voice::build(&self.ctx, &self.master, settings, modulation_index, pattern) {
            Ok(v) => self.voice = Some(v),
            Err(e) => log::error!("[audio] voice setup failed: {:?}", e),
        }
    }

    fn set_param(&mut self, param: AudioParam, value: f32) {
        let now = self.ctx.current_time();
        let Some(v) = &mut self.voice else { return };
        match param {
            AudioParam::ModulationIndex => v.modulation_index = value,
            AudioParam::Portamento => v.portamento = value.max(0.0),
            AudioParam::DelayWet => v.delay_mix.set_wet(value, now),
            AudioParam::ChorusWet => v.chorus_mix.set_wet(value, now),
        }
    }

    fn ramp_param(&mut self, param: AudioParam, target: f32, over: Duration) {
        let now = self.ctx.current_time();
        let end = now + over.as_secs_f64();
        let Some(v) = &mut self.voice else { return };
        match param {
            AudioParam::DelayWet => v.delay_mix.ramp_wet(target, now, end),
            AudioParam::ChorusWet => v.chorus_mix.ramp_wet(target, now, end),
            // Applied per note; the next note picks up the target.
            AudioParam::ModulationIndex => v.modulation_index = target,
            AudioParam::Portamento => v.portamento = target.max(0.0),
        }
    }

    fn set_pattern(&mut self, pattern: &'static Pattern) {
        if let Some(v) = &mut self.voice {
            v.pattern = pattern;
        }
    }

    fn start_pattern(&mut self) {
        let now = self.ctx.current_time();
        if let Some(v) = &mut self.voice {
            v.playing = true;
            v.step = 0;
            v.next_note = now + START_OFFSET_SECS;
            v.pump(now);
        }
    }

    fn stop_pattern(&mut self) {
        if let Some(v) = &mut self.voice {
            v.playing = false;
        }
    }

    fn dispose_voice(&mut self) {
        if let Some(v) = self.voice.take() {
            v.dispose();
        }
    }
}
