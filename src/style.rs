// CSS for particle pieces. Pure string building so the host tests can include it.

use arp_core::{Piece, Position};

/// Class list for a piece: the block class plus its colour modifier.
pub fn piece_class(piece: &Piece) -> String {
    format!("note__piece note__piece--{}", piece.color.css_name())
}

/// Inline custom properties driving the piece's keyframes.
///
/// The stylesheet animates `transform` from identity to
/// `translate(var(--tx), var(--ty)) scale(var(--scale)) rotate(var(--rotate))`
/// with `animation-direction: alternate`.
pub fn piece_vars(piece: &Piece) -> [(&'static str, String); 7] {
    let m = &piece.motion;
    [
        ("--tx", format!("{:.3}rem", m.translate.x)),
        ("--ty", format!("{:.3}rem", m.translate.y)),
        ("--scale", format!("{:.3}", m.scale)),
        ("--rotate", format!("{:.1}deg", m.rotate_deg)),
        ("--delay", format!("{}ms", m.delay.as_millis())),
        ("--duration", format!("{}ms", m.duration.as_millis())),
        ("--opacity", format!("{}", m.opacity)),
    ]
}

/// Absolute placement of a batch container.
pub fn batch_placement(position: Position) -> [(&'static str, String); 2] {
    [
        ("left", format!("{:.1}px", position.left)),
        ("top", format!("{:.1}px", position.top)),
    ]
}
