use arp_core::{
    AudioBackend, Instrument, InstrumentConfig, ParticleAnimator, ParticleBatch, Phase, Position,
    SilentAudio, Viewport,
};
use clap::Parser;
use instant::Instant;
use std::thread;
use std::time::Duration;

mod synth;

const FRAME: Duration = Duration::from_millis(16);
// Pointer samples per second for the synthetic hold gesture.
const HOLD_MOVES_PER_SEC: u32 = 30;

/// Play the drag arpeggiator without a browser.
///
/// By default the onboarding swipe is replayed; `--hold-ms` instead holds a
/// synthetic gesture that sweeps the viewport diagonally.
#[derive(Parser, Debug)]
#[command(name = "arp-native", version, about)]
struct Args {
    /// Seed for particle randomness
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Virtual viewport width in pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    /// Virtual viewport height in pixels
    #[arg(long, default_value_t = 800.0)]
    height: f32,
    /// Hold a sweeping gesture for this long instead of replaying onboarding
    #[arg(long)]
    hold_ms: Option<u64>,
    /// Run without opening an audio device
    #[arg(long)]
    no_audio: bool,
    /// Arpeggio tempo
    #[arg(long, default_value_t = arp_core::DEFAULT_BPM)]
    bpm: f32,
}

/// Animator that reports batches to the log instead of drawing them.
#[derive(Default)]
struct LogParticles {
    batches: usize,
    pieces: usize,
}

impl ParticleAnimator for LogParticles {
    fn animate(&mut self, batch: &ParticleBatch) {
        self.batches += 1;
        self.pieces += batch.pieces.len();
        log::debug!(
            "[particles] session {} batch {} at ({:.0}, {:.0}) entropy {:.2}",
            batch.session.0,
            batch.sequence,
            batch.position.left,
            batch.position.top,
            batch.entropy
        );
    }

    fn clear(&mut self) {
        log::info!(
            "[particles] cleared {} batches ({} pieces)",
            self.batches,
            self.pieces
        );
        self.batches = 0;
        self.pieces = 0;
    }
}

/// Synthetic gesture: press left of centre, sweep to the opposite corner, release.
struct HoldGesture {
    hold: Duration,
    viewport: Viewport,
    pressed: bool,
    released: bool,
    next_move: Duration,
}

impl HoldGesture {
    fn new(hold: Duration, viewport: Viewport) -> Self {
        Self {
            hold,
            viewport,
            pressed: false,
            released: false,
            next_move: Duration::ZERO,
        }
    }

    fn at(&self, t: Duration) -> Position {
        let f = (t.as_secs_f32() / self.hold.as_secs_f32().max(1e-3)).clamp(0.0, 1.0);
        Position::new(
            self.viewport.width * (0.1 + 0.8 * f),
            self.viewport.height * (0.05 + 0.9 * f),
        )
    }

    fn drive<A, P>(&mut self, now: Duration, inst: &mut Instrument<A, P, Viewport>)
    where
        A: AudioBackend,
        P: ParticleAnimator,
    {
        if !self.pressed {
            self.pressed = true;
            inst.pointer_down(self.at(Duration::ZERO));
            return;
        }
        if self.released {
            return;
        }
        if now >= self.hold {
            self.released = true;
            inst.pointer_up();
        } else if now >= self.next_move {
            self.next_move = now + Duration::from_secs(1) / HOLD_MOVES_PER_SEC;
            inst.pointer_move(self.at(now));
        }
    }

    fn done(&self) -> bool {
        self.released
    }
}

fn run<A: AudioBackend>(args: &Args, audio: A) -> anyhow::Result<()> {
    let viewport = Viewport::new(args.width, args.height);
    let config = InstrumentConfig::default()
        .with_seed(args.seed)
        .with_bpm(args.bpm);
    let mut inst = Instrument::new(config, audio, LogParticles::default(), viewport)?;

    let mut gesture = args
        .hold_ms
        .map(|ms| HoldGesture::new(Duration::from_millis(ms), viewport));
    if gesture.is_none() && !inst.start_onboarding() {
        anyhow::bail!("onboarding could not start");
    }

    let started = Instant::now();
    loop {
        let now = started.elapsed();
        if let Some(g) = gesture.as_mut() {
            g.drive(now, &mut inst);
        }
        inst.frame(now);

        let input_done = gesture.as_ref().map_or(!inst.onboarding_running(), HoldGesture::done);
        if input_done && inst.phase() == Phase::Idle {
            break;
        }
        thread::sleep(FRAME);
    }
    log::info!("done after {:.2}s", started.elapsed().as_secs_f32());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    log::info!("arp-native starting: {:?}", args);

    if args.no_audio {
        return run(&args, SilentAudio);
    }
    match synth::CpalAudio::open() {
        Ok(audio) => run(&args, audio),
        Err(e) => {
            log::warn!("[audio] unavailable ({}), continuing silently", e);
            run(&args, SilentAudio)
        }
    }
}
