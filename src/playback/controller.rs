use once_cell::unsync::OnceCell;
use tracing::{debug, trace};

use super::machine::{self, MachineState, PlaybackEffect, PlaybackEvent, PlaybackPhase};
use super::motion::{ReducedMotionSignal, Subscription};
use super::visibility::VisibilityState;
use crate::events::EventSender;
use crate::host::MediaElement;
use crate::models::ItemId;

/// Drives one video element from visibility and reduced-motion input.
///
/// Transitions come from [`machine::step`]; this type applies the resulting effects to
/// the host element:
/// - the source is attached at most once and never cleared,
/// - play while playing and pause while paused are skipped,
/// - a rejected play is logged and swallowed; the element stays "not playing" so the
///   next transition into `Playing` tries again.
pub struct PlaybackController<M: MediaElement> {
    id: ItemId,
    source: String,
    media: M,
    attached: OnceCell<String>,
    state: MachineState,
    media_playing: bool,
    motion: Option<Subscription>,
}

impl<M: MediaElement> PlaybackController<M> {
    /// Subscribes to `motion`; preference changes come back through `events`.
    pub fn new(
        id: ItemId,
        source: impl Into<String>,
        media: M,
        motion: &ReducedMotionSignal,
        events: &EventSender,
    ) -> Self {
        let subscription = {
            let events = events.clone();
            let id = id.clone();
            motion.subscribe(move |reduced| events.reduced_motion(&id, reduced))
        };

        Self {
            id,
            source: source.into(),
            media,
            attached: OnceCell::new(),
            state: MachineState::new(motion.get()),
            media_playing: false,
            motion: Some(subscription),
        }
    }

    pub fn handle(&mut self, event: PlaybackEvent) -> PlaybackPhase {
        if self.is_torn_down() {
            trace!(id = %self.id, ?event, "Ignoring event after teardown");
            return self.state.phase;
        }

        let transition = machine::step(self.state, event);
        if transition.state.phase != self.state.phase {
            debug!(
                id = %self.id,
                from = ?self.state.phase,
                to = ?transition.state.phase,
                "Playback transition"
            );
        }
        self.state = transition.state;

        for effect in transition.effects {
            self.apply(effect);
        }
        self.state.phase
    }

    fn apply(&mut self, effect: PlaybackEffect) {
        match effect {
            PlaybackEffect::AttachSource => {
                let media = &mut self.media;
                let source = &self.source;
                self.attached.get_or_init(|| {
                    media.attach_source(source);
                    source.clone()
                });
            }
            PlaybackEffect::Play => {
                if self.media_playing {
                    return;
                }
                match self.media.play() {
                    Ok(()) => self.media_playing = true,
                    Err(e) => debug!(id = %self.id, error = %e, "Play request rejected"),
                }
            }
            PlaybackEffect::Pause => {
                if self.media_playing {
                    self.media.pause();
                    self.media_playing = false;
                }
            }
        }
    }

    /// Drops the reduced-motion subscription and pauses the element.
    /// A `Playing` controller ends in `PausedByVisibility`; later events are ignored.
    pub fn teardown(&mut self) {
        if self.motion.take().is_none() {
            return;
        }
        if self.state.phase == PlaybackPhase::Playing {
            self.state.phase = PlaybackPhase::PausedByVisibility;
        }
        if self.media_playing {
            self.media.pause();
            self.media_playing = false;
        }
        debug!(id = %self.id, "Playback controller torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.motion.is_none()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase
    }

    pub fn visibility(&self) -> VisibilityState {
        self.state.visibility
    }

    pub fn reduced_motion(&self) -> bool {
        self.state.reduced_motion
    }

    /// Source the element gets on first intersection.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn attached_source(&self) -> Option<&str> {
        self.attached.get().map(String::as_str)
    }

    pub fn is_media_playing(&self) -> bool {
        self.media_playing
    }

    pub fn media(&self) -> &M {
        &self.media
    }
}

impl<M: MediaElement> Drop for PlaybackController<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}
