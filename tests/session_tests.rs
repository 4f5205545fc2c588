// Host-side tests for the gesture lifecycle and the generative engine.

mod common;

use arp_core::*;
use common::*;

fn centre() -> Position {
    Position::new(500.0, 400.0)
}

#[test]
fn position_update_while_idle_is_ignored() {
    let mut h = Harness::new();
    assert_eq!(h.update(centre()), Err(Rejected::NotActive(Phase::Idle)));
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(h.controller.session_id().is_none());
    assert!(h.audio.calls.is_empty());
    assert_eq!(h.scheduler.pending_timers(), 0);
}

#[test]
fn gesture_start_builds_voice_from_position() {
    let mut h = Harness::new();
    let id = h.start(Position::new(0.0, 800.0)).unwrap();
    assert_eq!(h.controller.phase(), Phase::Active);
    assert_eq!(h.controller.session_id(), Some(id));
    assert_eq!(h.controller.entropy(), 0.0);
    assert_eq!(h.controller.pattern(), Some(PatternIndex(3)));
    assert_eq!(
        h.audio.calls.first(),
        Some(&AudioCall::CreateVoice {
            modulation: 4.0,
            pattern: "C9"
        })
    );
    assert_eq!(h.audio.count(|c| *c == AudioCall::Start), 1);
}

#[test]
fn second_start_while_active_is_rejected() {
    let mut h = Harness::new();
    let id = h.start(centre()).unwrap();
    assert_eq!(h.start(centre()), Err(Rejected::SessionBusy(Phase::Active)));
    assert_eq!(h.controller.session_id(), Some(id));
    assert_eq!(h.audio.count(|c| matches!(c, AudioCall::CreateVoice { .. })), 1);
}

#[test]
fn ticks_grow_entropy_and_emit_batches() {
    let mut h = Harness::new();
    let id = h.start(centre()).unwrap();
    h.run_until(ms(500));

    let batches = h.controller.particles();
    assert_eq!(batches.len(), 10);
    assert_eq!(batches[0].entropy, 0.0);
    for w in batches.windows(2) {
        assert!(w[1].entropy > w[0].entropy);
        assert_eq!(w[1].sequence, w[0].sequence + 1);
    }
    for b in batches {
        assert_eq!(b.session, id);
        assert_eq!(b.position, centre());
        assert_eq!(b.pieces.len(), PIECES_PER_BATCH);
        assert!(b.animated);
    }
    assert!((h.controller.entropy() - 0.1).abs() < 1e-4);
    assert_eq!(h.animator.animated.len(), 10);
    assert!(h.animator.animated.iter().all(|(_, _, _, done)| !done));
}

#[test]
fn batch_pieces_move_with_the_stepped_entropy() {
    let mut h = Harness::new();
    let id = h.start(centre()).unwrap();
    h.run_until(ms(50));

    let batch = &h.controller.particles()[0];
    assert_eq!(batch.entropy, 0.0);
    let seed = InstrumentConfig::default().seed;
    let expected = motion::roll_pieces(&mut motion::session_rng(seed, id.0), ENTROPY_STEP);
    assert_eq!(batch.pieces.as_slice(), expected.as_slice());
}

#[test]
fn audio_parameters_follow_entropy() {
    let mut h = Harness::new();
    h.start(centre()).unwrap();
    h.run_until(ms(500));

    let delay = h.audio.values(AudioParam::DelayWet);
    let chorus = h.audio.values(AudioParam::ChorusWet);
    let glide = h.audio.values(AudioParam::Portamento);
    // one initial zero plus one value per tick
    assert_eq!(delay.len(), 11);
    assert_eq!(delay, chorus);
    assert!(delay.windows(2).all(|w| w[1] >= w[0]));
    assert!(glide.windows(2).all(|w| w[1] >= w[0]));
    let last = *delay.last().unwrap();
    assert!((glide.last().unwrap() - last / 20.0).abs() < 1e-6);
}

#[test]
fn wet_mix_saturates_at_ceiling() {
    let mut h = Harness::new();
    h.start(centre()).unwrap();
    h.run_until(ms(50 * 150));

    assert!(h.controller.entropy() > 1.4);
    let delay = h.audio.values(AudioParam::DelayWet);
    assert!(delay.iter().all(|v| *v <= 1.0));
    assert_eq!(*delay.last().unwrap(), 1.0);
    let glide = h.audio.values(AudioParam::Portamento);
    assert!(*glide.last().unwrap() > 1.0 / 20.0);
}

#[test]
fn horizontal_motion_maps_modulation_index() {
    let mut h = Harness::new();
    h.start(centre()).unwrap();
    h.update(Position::new(1000.0, 400.0)).unwrap();
    h.update(Position::new(250.0, 400.0)).unwrap();
    assert_eq!(h.audio.values(AudioParam::ModulationIndex), vec![30.0, 10.5]);
    assert_eq!(h.controller.position(), Some(Position::new(250.0, 400.0)));
}

#[test]
fn pattern_swaps_only_when_vertical_band_changes() {
    let mut h = Harness::new();
    h.start(Position::new(500.0, 0.0)).unwrap();
    h.update(Position::new(500.0, 50.0)).unwrap();
    h.update(Position::new(500.0, 790.0)).unwrap();
    h.update(Position::new(600.0, 780.0)).unwrap();
    h.update(Position::new(600.0, 300.0)).unwrap();

    let swaps: Vec<_> = h
        .audio
        .calls
        .iter()
        .filter_map(|c| match c {
            AudioCall::SetPattern(name) => Some(*name),
            _ => None,
        })
        .collect();
    assert_eq!(swaps, vec!["C9", "Cmin7"]);
    // stepping was never restarted by a swap
    assert_eq!(h.audio.count(|c| *c == AudioCall::Start), 1);
    assert_eq!(h.audio.count(|c| *c == AudioCall::Stop), 0);
}

#[test]
fn entropy_survives_position_updates() {
    let mut h = Harness::new();
    h.start(centre()).unwrap();
    h.run_until(ms(200));
    let before = h.controller.entropy();
    h.update(Position::new(10.0, 10.0)).unwrap();
    assert_eq!(h.controller.entropy(), before);
}

#[test]
fn release_stops_ticks_immediately() {
    let mut h = Harness::new();
    h.start(centre()).unwrap();
    h.run_until(ms(500));
    h.end().unwrap();
    assert_eq!(h.controller.phase(), Phase::Releasing);

    let entropy = h.controller.entropy();
    h.run_until(ms(1499));
    assert_eq!(h.controller.particles().len(), 10);
    assert_eq!(h.controller.entropy(), entropy);
    assert_eq!(h.animator.animated.len(), 10);
    assert_eq!(h.update(centre()), Err(Rejected::NotActive(Phase::Releasing)));
}

#[test]
fn release_fades_delay_then_stops_arpeggio() {
    let mut h = Harness::new();
    h.start(centre()).unwrap();
    h.run_until(ms(300));
    h.end().unwrap();

    assert_eq!(
        h.audio.calls.last(),
        Some(&AudioCall::Ramp(AudioParam::DelayWet, 0.0, ms(1000)))
    );
    assert!(h.controller.engine().unwrap().arpeggio_running());
    h.run_until(ms(1299));
    assert_eq!(h.audio.count(|c| *c == AudioCall::Stop), 0);
    h.run_until(ms(1300));
    assert_eq!(h.audio.count(|c| *c == AudioCall::Stop), 1);
    assert_eq!(h.audio.count(|c| *c == AudioCall::Dispose), 1);
    assert_eq!(h.controller.phase(), Phase::Idle);
}

#[test]
fn gesture_end_is_idempotent() {
    let mut h = Harness::new();
    h.start(centre()).unwrap();
    h.run_until(ms(100));
    h.end().unwrap();
    let calls = h.audio.calls.len();
    let timers = h.scheduler.pending_timers();
    for _ in 0..5 {
        assert_eq!(h.end(), Err(Rejected::NotReleasable(Phase::Releasing)));
    }
    assert_eq!(h.audio.calls.len(), calls);
    assert_eq!(h.scheduler.pending_timers(), timers);

    h.run_until(ms(5000));
    assert_eq!(h.end(), Err(Rejected::NotReleasable(Phase::Idle)));
    assert_eq!(h.audio.count(|c| *c == AudioCall::Stop), 1);
}

#[test]
fn start_during_release_is_rejected() {
    let mut h = Harness::new();
    let first = h.start(centre()).unwrap();
    h.end().unwrap();
    assert_eq!(h.start(centre()), Err(Rejected::SessionBusy(Phase::Releasing)));
    assert_eq!(h.controller.session_id(), Some(first));
}

#[test]
fn ten_ticks_release_cooldown_then_restart() {
    let mut h = Harness::new();
    let first = h.start(centre()).unwrap();
    h.run_until(ms(500));
    assert_eq!(h.controller.particles().len(), 10);
    h.end().unwrap();

    h.run_until(ms(1500));
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(h.controller.particles().is_empty());
    assert_eq!(h.controller.entropy(), 0.0);
    assert_eq!(h.animator.clears, 1);
    assert_eq!(h.animator.animated.len(), 10);

    let second = h.start(centre()).unwrap();
    assert!(second > first);
    assert_eq!(h.controller.phase(), Phase::Active);
    assert_eq!(h.controller.entropy(), 0.0);
    h.run_until(ms(1550));
    assert_eq!(h.controller.particles().len(), 1);
    assert_eq!(h.controller.particles()[0].entropy, 0.0);
    assert_eq!(h.controller.particles()[0].session, second);
}

#[test]
fn stale_timers_never_touch_a_newer_session() {
    let mut h = Harness::new();
    let first = h.start(centre()).unwrap();
    h.end().unwrap();
    h.run_until(ms(1000));
    assert_eq!(h.controller.phase(), Phase::Idle);

    // Old tasks replayed against the new session must be dropped.
    let second = h.start(centre()).unwrap();
    let calls = h.audio.calls.len();
    for task in [
        SessionTask::Tick(first),
        SessionTask::StopArpeggio(first),
        SessionTask::Cooldown(first),
    ] {
        let mut fx = Effects {
            scheduler: &mut h.scheduler,
            audio: &mut h.audio,
            animator: &mut h.animator,
            viewport: h.viewport,
        };
        h.controller.handle(task, &mut fx);
    }
    assert_eq!(h.audio.calls.len(), calls);
    assert_eq!(h.controller.phase(), Phase::Active);
    assert_eq!(h.controller.session_id(), Some(second));
    assert!(h.controller.particles().is_empty());
    assert!(h.controller.engine().unwrap().arpeggio_running());
}

#[test]
fn rapid_cycles_keep_one_voice_at_a_time() {
    let mut h = Harness::new();
    let mut t = 0;
    for _ in 0..4 {
        h.start(centre()).unwrap();
        t += 120;
        h.run_until(ms(t));
        h.end().unwrap();
        t += 1000;
        h.run_until(ms(t));
        assert_eq!(h.controller.phase(), Phase::Idle);
    }
    let creates = h.audio.count(|c| matches!(c, AudioCall::CreateVoice { .. }));
    let disposes = h.audio.count(|c| *c == AudioCall::Dispose);
    let stops = h.audio.count(|c| *c == AudioCall::Stop);
    assert_eq!((creates, disposes, stops), (4, 4, 4));

    // voices never overlap: every create follows the previous dispose
    let mut live = 0;
    for c in &h.audio.calls {
        match c {
            AudioCall::CreateVoice { .. } => {
                live += 1;
                assert_eq!(live, 1);
            }
            AudioCall::Dispose => live -= 1,
            _ => {}
        }
    }
}

#[test]
fn particle_motion_widens_with_entropy() {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    for entropy in [0.0_f32, 0.5, 2.0] {
        let a = entropy + 1.0;
        for _ in 0..200 {
            let m = motion::roll_motion(&mut rng, entropy);
            assert!(m.translate.x.abs() <= 3.0 * a + 1e-4);
            assert!(m.translate.y.abs() <= 3.0 * a * a + 1e-3);
            assert!(m.scale >= 0.5 * a - 1e-4 && m.scale <= 3.0 * a + 1e-4);
            assert!(m.rotate_deg.abs() <= 900.0 * a + 1e-2);
            assert!(m.delay <= ms(100));
            assert!(m.duration >= ms(500) && m.duration <= ms(750));
            assert_eq!(m.opacity, 0.7);
        }
    }
}

#[test]
fn batches_use_the_palette_in_order() {
    let mut h = Harness::new();
    h.start(centre()).unwrap();
    h.run_until(ms(50));
    let colors: Vec<_> = h.controller.particles()[0]
        .pieces
        .iter()
        .map(|p| p.color)
        .collect();
    assert_eq!(colors, PIECE_PALETTE.to_vec());
}

#[test]
fn stalled_frame_skips_missed_ticks() {
    let (mut inst, _) = instrument();
    inst.pointer_down(centre());
    run_frames(&mut inst, ms(100));
    assert_eq!(inst.particles().len(), 2);

    // ten seconds without a frame: only the last 250ms are caught up
    inst.frame(ms(10_100));
    assert_eq!(inst.particles().len(), 7);
    assert_eq!(inst.phase(), Phase::Active);
    assert_eq!(inst.now(), ms(10_100));
}
