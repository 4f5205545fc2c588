//! Gesture lifecycle and entropy-driven generation for drag-arp.
//!
//! A held pointer gesture becomes a [`session`](crate::session): entropy grows
//! once per tick, each tick spawns a batch of particles, and the same entropy
//! pushes the arpeggio's delay/chorus mix and glide up. The crate is
//! platform-independent; frontends supply the [`backend`] traits.

pub mod backend;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod instrument;
pub mod mapper;
pub mod motion;
pub mod patterns;
pub mod replay;
pub mod scheduler;
pub mod script;
pub mod session;
pub mod state;

pub use backend::*;
pub use config::*;
pub use constants::*;
pub use engine::{Effects, GenerativeEngine};
pub use error::*;
pub use instrument::Instrument;
pub use mapper::map_range;
pub use patterns::*;
pub use replay::*;
pub use scheduler::{Scheduler, Task, TimerId};
pub use script::*;
pub use session::*;
pub use state::*;
