// Host-side tests for configuration defaults, validation and constant relationships.

use arp_core::*;
use std::time::Duration;

#[test]
fn default_config_is_valid() {
    assert_eq!(InstrumentConfig::default().validate(), Ok(()));
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn timing_constants_have_logical_relationships() {
    // the arpeggio keeps stepping at least as long as the delay fades
    assert!(ARPEGGIO_STOP_DELAY >= RELEASE_RAMP);
    assert!(RELEASE_COOLDOWN >= RELEASE_RAMP);

    // replay steps are much finer than generation ticks
    assert!(REPLAY_STEP_DELAY < TICK_PERIOD);
    assert!(REPLAY_HOLD > RELEASE_COOLDOWN);

    assert!(MODULATION_INDEX_MAX > MODULATION_INDEX_MIN);
    assert!(ENTROPY_STEP > 0.0 && ENTROPY_STEP < WET_CEILING);
    assert_eq!(PIECE_PALETTE.len(), PIECES_PER_BATCH);
}

#[test]
fn subdivisions_follow_tempo() {
    let voice = VoiceSettings::default();
    // 24th note at 120 bpm: half a second per beat, four beats per whole note
    let step = voice.step_interval().as_secs_f64();
    assert!((step - 2.0 / 24.0).abs() < 1e-9);
    let delay = voice.delay_time().as_secs_f64();
    assert!((delay - 2.0 / 12.0).abs() < 1e-9);

    let slow = InstrumentConfig::default().with_bpm(60.0);
    assert!((slow.voice.step_interval().as_secs_f64() - 4.0 / 24.0).abs() < 1e-9);
}

#[test]
fn zero_tick_period_is_rejected() {
    let mut c = InstrumentConfig::default();
    c.engine.tick_period = Duration::ZERO;
    assert_eq!(c.validate(), Err(ConfigError::ZeroTickPeriod));
}

#[test]
fn non_positive_entropy_step_is_rejected() {
    for step in [0.0, -0.01, f32::NAN] {
        let mut c = InstrumentConfig::default();
        c.engine.entropy_step = step;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonPositiveEntropyStep(_))
        ));
    }
}

#[test]
fn release_delays_shorter_than_ramp_are_rejected() {
    let mut c = InstrumentConfig::default();
    c.engine.cooldown = Duration::from_millis(400);
    let err = c.validate().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::ShorterThanRamp {
            what: "release cooldown",
            ..
        }
    ));
    assert!(err.to_string().contains("release cooldown"));

    let mut c = InstrumentConfig::default();
    c.engine.arpeggio_stop_delay = Duration::from_millis(999);
    assert!(matches!(
        c.validate(),
        Err(ConfigError::ShorterThanRamp {
            what: "arpeggio stop delay",
            ..
        })
    ));
}

#[test]
fn empty_modulation_range_and_bad_tempo_are_rejected() {
    let mut c = InstrumentConfig::default();
    c.engine.modulation_range = (30.0, 4.0);
    assert_eq!(c.validate(), Err(ConfigError::EmptyModulationRange(30.0, 4.0)));

    let c = InstrumentConfig::default().with_bpm(0.0);
    assert_eq!(c.validate(), Err(ConfigError::NonPositiveTempo(0.0)));
}

#[test]
fn invalid_config_refuses_to_build_an_instrument() {
    let mut c = InstrumentConfig::default();
    c.engine.tick_period = Duration::ZERO;
    let built = Instrument::new(c, SilentAudio, NoAnimation, Viewport::new(100.0, 100.0));
    assert!(built.is_err());
}

struct NoAnimation;

impl ParticleAnimator for NoAnimation {
    fn animate(&mut self, _: &ParticleBatch) {}
    fn clear(&mut self) {}
}

#[test]
fn builder_overrides_are_applied() {
    let c = InstrumentConfig::default()
        .with_seed(99)
        .with_replay_hold(Duration::from_secs(1));
    assert_eq!(c.seed, 99);
    assert_eq!(c.replay.hold, Duration::from_secs(1));
    assert_eq!(c.replay.initial_delay, REPLAY_INITIAL_DELAY);
}
