//! DOM and WebAudio tuning for the web frontend.
//!
//! Behavioural constants (timings, mappings) live in `arp_core::constants`;
//! these only concern how the browser renders and sounds them.

// Element ids; missing elements are created on startup.
pub const PARTICLES_ID: &str = "particles";
pub const INSTRUCTIONS_ID: &str = "instructions";
pub const INSTRUCTIONS_TEXT: &str = "Drag to make some noise";

// BEM-ish class names the stylesheet keys off.
pub const NOTE_CLASS: &str = "note";
pub const ANIMATED_CLASS: &str = "animated";

// Instruction fade (CSS transition on opacity).
pub const INSTRUCTIONS_FADE: &str = "opacity 0.5s ease";

// Master output level
pub const MASTER_GAIN: f32 = 0.3;
// Peak of the per-note amplitude envelope
pub const NOTE_PEAK: f32 = 0.6;

// Arpeggio notes are scheduled this far ahead of the audio clock (seconds).
pub const LOOKAHEAD_SECS: f64 = 0.12;
// First note of a pattern starts slightly in the future so its envelope is not clipped.
pub const START_OFFSET_SECS: f64 = 0.01;

// Headroom for the feedback delay line (seconds).
pub const MAX_DELAY_SECS: f64 = 2.0;

// set_target_at_time reaches ~95% after three time constants.
pub const TIME_CONSTANTS_PER_GLIDE: f64 = 3.0;
