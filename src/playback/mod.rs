//! Visibility tracking and video playback control.
//!
//! - `visibility` - per-block intersection state with the has-entered latch
//! - `machine` - pure playback transitions and their effects
//! - `controller` - applies effects to a host media element
//! - `motion` - reduced-motion preference signal

pub mod controller;
pub mod machine;
pub mod motion;
pub mod visibility;

pub use controller::PlaybackController;
pub use machine::{MachineState, PlaybackEffect, PlaybackEvent, PlaybackPhase};
pub use motion::{ReducedMotionSignal, Subscription};
pub use visibility::{Observation, ObserverOptions, VisibilityState};
