//! Gesture and visual state types shared with the frontends.
//!
//! These types intentionally avoid referencing platform-specific APIs and are
//! suitable for use on both native and web targets. The web frontend turns
//! each [`ParticleBatch`] into DOM nodes; the native runner only logs them.

use crate::constants::PIECES_PER_BATCH;
use crate::session::SessionId;
use glam::Vec2;
use smallvec::SmallVec;
use std::time::Duration;

/// Absolute pointer coordinate in viewport space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub top: f32,
    pub left: f32,
}

impl Position {
    pub const fn new(left: f32, top: f32) -> Self {
        Self { top, left }
    }
}

/// Fill colour of a particle piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceColor {
    Blue,
    Green,
    Red,
    Yellow,
    Pink,
}

impl PieceColor {
    /// CSS modifier used by the web frontend (`note__piece--blue`, ...).
    pub fn css_name(self) -> &'static str {
        match self {
            PieceColor::Blue => "blue",
            PieceColor::Green => "green",
            PieceColor::Red => "red",
            PieceColor::Yellow => "yellow",
            PieceColor::Pink => "pink",
        }
    }
}

/// Colour of each piece in a batch, in creation order.
pub const PIECE_PALETTE: [PieceColor; PIECES_PER_BATCH] = [
    PieceColor::Blue,
    PieceColor::Green,
    PieceColor::Red,
    PieceColor::Yellow,
    PieceColor::Pink,
    PieceColor::Blue,
    PieceColor::Green,
    PieceColor::Red,
    PieceColor::Yellow,
    PieceColor::Pink,
];

/// Target transform a piece animates towards (and back, alternating).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceMotion {
    /// Translation in rem units.
    pub translate: Vec2,
    pub scale: f32,
    pub rotate_deg: f32,
    pub delay: Duration,
    pub duration: Duration,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Piece {
    pub color: PieceColor,
    pub motion: PieceMotion,
}

/// Visual elements created by one generation tick.
#[derive(Clone, Debug)]
pub struct ParticleBatch {
    pub session: SessionId,
    /// Tick number within the session, starting at 0.
    pub sequence: u32,
    pub position: Position,
    pub entropy: f32,
    pub pieces: SmallVec<[Piece; PIECES_PER_BATCH]>,
    /// Set once the batch has been handed to the animator; it is never re-targeted.
    pub animated: bool,
}
