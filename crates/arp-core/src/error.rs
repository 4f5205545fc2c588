use crate::session::Phase;
use thiserror::Error;

/// Why a session transition was not applied.
///
/// These never reach the user; the instrument logs and drops them so the
/// at-most-one-session invariant holds without interrupting playback.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    #[error("gesture start ignored: a session is already {0:?}")]
    SessionBusy(Phase),
    #[error("position update ignored: no active session ({0:?})")]
    NotActive(Phase),
    #[error("gesture end ignored: session is {0:?}")]
    NotReleasable(Phase),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("tick period must be non-zero")]
    ZeroTickPeriod,
    #[error("entropy step must be positive, got {0}")]
    NonPositiveEntropyStep(f32),
    #[error("{what} ({delay:?}) must not be shorter than the release ramp ({ramp:?})")]
    ShorterThanRamp {
        what: &'static str,
        delay: std::time::Duration,
        ramp: std::time::Duration,
    },
    #[error("modulation range is empty: {0}..{1}")]
    EmptyModulationRange(f32, f32),
    #[error("tempo must be positive, got {0} bpm")]
    NonPositiveTempo(f32),
}
