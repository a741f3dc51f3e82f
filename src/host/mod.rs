//! Capabilities the gallery consumes from its rendering host.

pub mod headless;

use std::fmt;

use crate::error::PlaybackError;
use crate::events::EventSender;
use crate::models::{GalleryItem, ItemId};
use crate::playback::ObserverOptions;

pub use headless::{HeadlessHost, HeadlessMedia, MediaCall};

/// Playback primitives of one host media element.
pub trait MediaElement {
    /// Points the element at its source; this is what starts the network fetch.
    fn attach_source(&mut self, source: &str);

    /// Starts playback. Hosts may refuse (autoplay policy).
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);
}

pub trait GalleryHost {
    type Media: MediaElement;

    /// Called once when a gallery mounts. Observer and `loadedmetadata` callbacks post
    /// through `events`.
    fn attach(&mut self, events: EventSender);

    fn create_media(&mut self, item: &GalleryItem) -> Self::Media;

    /// Starts observing the block's sentinel. `None` means the host has no intersection
    /// support; the gallery then treats the block as always visible.
    fn observe(&mut self, id: &ItemId, options: &ObserverOptions) -> Option<ObserverRegistration>;
}

/// Detaches a host observer when dropped.
pub struct ObserverRegistration {
    disconnect: Option<Box<dyn FnOnce()>>,
}

impl ObserverRegistration {
    pub fn new(disconnect: impl FnOnce() + 'static) -> Self {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }
}

impl Drop for ObserverRegistration {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl fmt::Debug for ObserverRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistration")
            .field("connected", &self.disconnect.is_some())
            .finish()
    }
}
