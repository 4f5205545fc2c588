use crate::mapper::map_range;

/// One arpeggio "chord": a fixed sequence of note symbols stepped in order.
#[derive(Debug, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub notes: [&'static str; 8],
}

/// Position of a pattern within [`PATTERNS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatternIndex(pub usize);

impl PatternIndex {
    #[inline]
    pub fn pattern(self) -> &'static Pattern {
        &PATTERNS[self.0]
    }
}

/// Pattern bank ordered top of the viewport to bottom: bright and high first,
/// richest and lowest register last.
pub static PATTERNS: [Pattern; 4] = [
    Pattern {
        name: "C6",
        notes: ["C5", "E5", "A5", "C6", "E6", "C6", "A5", "E5"],
    },
    Pattern {
        name: "Cmin7",
        notes: ["C4", "E4", "A#4", "C5", "E5", "C5", "A#4", "E4"],
    },
    Pattern {
        name: "Cmaj7",
        notes: ["C3", "E3", "G3", "B4", "E4", "B4", "G3", "E3"],
    },
    Pattern {
        name: "C9",
        notes: ["C2", "E2", "A#2", "D3", "G3", "D3", "A#2", "E2"],
    },
];

/// Pick the pattern for a vertical position.
///
/// Positions outside `[0, viewport_height]` clamp to the first or last
/// pattern; a degenerate viewport (zero height) falls back to the first.
pub fn select_pattern(vertical_position: f32, viewport_height: f32) -> PatternIndex {
    let last = PATTERNS.len() - 1;
    let raw = map_range(vertical_position, 0.0, viewport_height, 0.0, last as f32).round();
    if raw.is_nan() {
        return PatternIndex(0);
    }
    PatternIndex(raw.clamp(0.0, last as f32) as usize)
}

/// Parse a note symbol such as `"C4"`, `"A#2"` or `"Bb3"` into a MIDI number (C4 = 60).
pub fn note_to_midi(symbol: &str) -> Option<i32> {
    let mut chars = symbol.chars();
    let base = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = chars.as_str();
    let (accidental, octave) = match rest.as_bytes().first() {
        Some(b'#') => (1, &rest[1..]),
        Some(b'b') => (-1, &rest[1..]),
        _ => (0, rest),
    };
    let octave: i32 = octave.parse().ok()?;
    Some((octave + 1) * 12 + base + accidental)
}

pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}

/// Frequency of a note symbol, if it parses.
#[inline]
pub fn note_to_hz(symbol: &str) -> Option<f32> {
    note_to_midi(symbol).map(|m| midi_to_hz(m as f32))
}
