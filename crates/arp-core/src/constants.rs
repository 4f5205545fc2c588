use std::time::Duration;

// Shared timing/tuning constants used by both web and native frontends.

// Generation
pub const TICK_PERIOD: Duration = Duration::from_millis(50); // one particle batch per tick
pub const ENTROPY_STEP: f32 = 0.01; // entropy gained per tick while active
pub const WET_CEILING: f32 = 1.0; // delay/chorus mix never exceeds this
pub const PORTAMENTO_DIVISOR: f32 = 20.0; // glide seconds = entropy / divisor

// Synthesis modulation, mapped from horizontal position
pub const MODULATION_INDEX_MIN: f32 = 4.0;
pub const MODULATION_INDEX_MAX: f32 = 30.0;

// Release
pub const RELEASE_RAMP: Duration = Duration::from_secs(1); // delay mix fade-out
pub const ARPEGGIO_STOP_DELAY: Duration = Duration::from_secs(1);
pub const RELEASE_COOLDOWN: Duration = Duration::from_secs(1); // matches visual fade-out

// Host frames
pub const MAX_FRAME_CATCH_UP: Duration = Duration::from_millis(250); // longer stalls are skipped, not replayed

// Onboarding replay
pub const REPLAY_INITIAL_DELAY: Duration = Duration::from_millis(250);
pub const REPLAY_STEP_DELAY: Duration = Duration::from_millis(5);
pub const REPLAY_HOLD: Duration = Duration::from_millis(2500);

// Visuals
pub const PIECES_PER_BATCH: usize = 10;
pub const PIECE_OPACITY: f32 = 0.7;
pub const VISUAL_ENTROPY_BIAS: f32 = 1.0; // visuals run one entropy unit ahead of audio
pub const TRANSLATE_SPAN_REM: f32 = 3.0;
pub const SCALE_RANGE: (f32, f32) = (5.0, 30.0);
pub const SCALE_DIVISOR: f32 = 10.0;
pub const ROTATE_SPAN_DEG: f32 = 900.0;
pub const ANIMATION_DELAY_MAX_MS: u64 = 100;
pub const ANIMATION_DURATION_MS: (u64, u64) = (500, 750);

// Voice
pub const DEFAULT_BPM: f32 = 120.0;
pub const STEP_SUBDIVISION: u32 = 24; // arpeggio steps on 24th notes
pub const DELAY_SUBDIVISION: u32 = 12; // feedback delay time is a 12th note
pub const DELAY_FEEDBACK: f32 = 0.5;
pub const CHORUS_FREQUENCY_HZ: f32 = 4.0;
pub const CHORUS_DELAY_MS: f32 = 2.5;
pub const CHORUS_DEPTH: f32 = 0.5;
pub const FM_HARMONICITY: f32 = 3.0;
pub const NOTE_LENGTH: Duration = Duration::from_millis(100);
