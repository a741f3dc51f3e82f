//! Pure playback state machine for video blocks.
//!
//! `step` maps (state, event) to the next state plus the side effects the controller
//! must apply to the media element. It never touches a host object, so every
//! transition can be exercised with synthetic events.
//!
//! | From                  | Event / condition                     | To                    | Effects            |
//! |-----------------------|---------------------------------------|-----------------------|--------------------|
//! | Idle                  | first intersection                    | ArmedOutOfView, then re-evaluated | AttachSource |
//! | any armed state       | reduced motion on                     | PausedByReducedMotion | Pause if Playing   |
//! | ArmedOutOfView / Paused* | intersecting, motion allowed       | Playing               | Play               |
//! | Playing               | not intersecting                      | PausedByVisibility    | Pause              |
//! | PausedByReducedMotion | reduced motion off, not intersecting  | PausedByVisibility    |                    |
//!
//! Reduced motion is evaluated before visibility.

use super::visibility::VisibilityState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// No source attached yet; nothing fetched.
    #[default]
    Idle,
    /// Source attached, sentinel currently outside the observation region.
    ArmedOutOfView,
    Playing,
    PausedByVisibility,
    PausedByReducedMotion,
}

impl PlaybackPhase {
    pub fn is_armed(&self) -> bool {
        *self != Self::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Intersection(bool),
    ReducedMotion(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEffect {
    AttachSource,
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MachineState {
    pub phase: PlaybackPhase,
    pub visibility: VisibilityState,
    pub reduced_motion: bool,
}

impl MachineState {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            reduced_motion,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: MachineState,
    pub effects: Vec<PlaybackEffect>,
}

pub fn step(state: MachineState, event: PlaybackEvent) -> Transition {
    let mut next = state;
    match event {
        PlaybackEvent::Intersection(intersecting) => {
            next.visibility = state.visibility.observe(intersecting);
        }
        PlaybackEvent::ReducedMotion(reduced) => next.reduced_motion = reduced,
    }

    let mut effects = Vec::new();
    if next.phase == PlaybackPhase::Idle {
        if !next.visibility.has_entered_once() {
            return Transition {
                state: next,
                effects,
            };
        }
        effects.push(PlaybackEffect::AttachSource);
        next.phase = PlaybackPhase::ArmedOutOfView;
    }

    let target = resolve(next.phase, next.visibility.is_in_view(), next.reduced_motion);
    match (next.phase == PlaybackPhase::Playing, target == PlaybackPhase::Playing) {
        (false, true) => effects.push(PlaybackEffect::Play),
        (true, false) => effects.push(PlaybackEffect::Pause),
        _ => {}
    }
    next.phase = target;

    Transition {
        state: next,
        effects,
    }
}

fn resolve(current: PlaybackPhase, in_view: bool, reduced_motion: bool) -> PlaybackPhase {
    if reduced_motion {
        PlaybackPhase::PausedByReducedMotion
    } else if in_view {
        PlaybackPhase::Playing
    } else if current == PlaybackPhase::ArmedOutOfView {
        PlaybackPhase::ArmedOutOfView
    } else {
        PlaybackPhase::PausedByVisibility
    }
}
