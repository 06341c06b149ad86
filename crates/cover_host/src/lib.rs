//! Typed host-collaborator contracts shared by the cover desktop runtime and hosted apps.
//!
//! This crate is the boundary between the simulated desktop and the surrounding host game. It
//! exposes the timer and sound service traits, deterministic/no-op adapters for headless use, and
//! the [`HostServices`] bundle injected into the runtime. Browser-backed adapters live next to the
//! view layer in `cover_desktop`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod sound;
pub mod timer;

pub use host::HostServices;
pub use sound::{NoopSoundService, RecordingSoundService, SoundCue, SoundEvent, SoundService};
pub use timer::{
    ManualTimerService, NoopTimerService, ScopedTimers, TimerCallback, TimerId, TimerService,
};
