use crate::constants::*;
use crate::state::{Piece, PieceMotion, PIECE_PALETTE};
use glam::Vec2;
use rand::prelude::*;
use smallvec::SmallVec;
use std::time::Duration;

/// Roll one randomized target transform for the given entropy.
///
/// Visuals use `entropy + 1` so a fresh session already moves; translation,
/// scale and rotation spans all widen linearly with it, and vertical travel
/// grows quadratically.
pub fn roll_motion<R: Rng + ?Sized>(rng: &mut R, entropy: f32) -> PieceMotion {
    let amount = entropy.max(0.0) + VISUAL_ENTROPY_BIAS;
    let span = TRANSLATE_SPAN_REM * amount;
    let (scale_lo, scale_hi) = SCALE_RANGE;
    let (dur_lo, dur_hi) = ANIMATION_DURATION_MS;
    PieceMotion {
        translate: Vec2::new(
            rng.gen_range(-span..=span),
            rng.gen_range(-span..=span) * amount,
        ),
        scale: rng.gen_range(scale_lo..=scale_hi) * amount / SCALE_DIVISOR,
        rotate_deg: rng.gen_range(-ROTATE_SPAN_DEG..=ROTATE_SPAN_DEG) * amount,
        delay: Duration::from_millis(rng.gen_range(0..=ANIMATION_DELAY_MAX_MS)),
        duration: Duration::from_millis(rng.gen_range(dur_lo..=dur_hi)),
        opacity: PIECE_OPACITY,
    }
}

/// A full batch worth of pieces, one per palette colour.
pub fn roll_pieces<R: Rng + ?Sized>(rng: &mut R, entropy: f32) -> SmallVec<[Piece; PIECES_PER_BATCH]> {
    PIECE_PALETTE
        .iter()
        .map(|&color| Piece {
            color,
            motion: roll_motion(rng, entropy),
        })
        .collect()
}

/// Derive a per-session RNG from the instrument seed so sessions differ but replay identically.
pub fn session_rng(seed: u64, session: u64) -> StdRng {
    let mix = seed ^ session.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mix)
}
