//! In-memory host used for dry runs and tests.
//!
//! Observers are kept in a registry keyed by item id; "scrolling" a block into view
//! posts an intersection event through the gallery's queue exactly like a real
//! observer callback would. Media elements record every call they receive.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use super::{GalleryHost, MediaElement, ObserverRegistration};
use crate::error::PlaybackError;
use crate::events::EventSender;
use crate::models::{GalleryItem, ItemId};
use crate::playback::ObserverOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCall {
    AttachSource(String),
    Play,
    PlayRejected,
    Pause,
}

type CallLog = Rc<RefCell<HashMap<ItemId, Vec<MediaCall>>>>;

#[derive(Debug)]
pub struct HeadlessMedia {
    id: ItemId,
    source: Option<String>,
    playing: bool,
    autoplay_allowed: Rc<Cell<bool>>,
    log: CallLog,
}

impl HeadlessMedia {
    fn record(&self, call: MediaCall) {
        trace!(id = %self.id, ?call, "Media call");
        self.log
            .borrow_mut()
            .entry(self.id.clone())
            .or_default()
            .push(call);
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl MediaElement for HeadlessMedia {
    fn attach_source(&mut self, source: &str) {
        self.source = Some(source.to_owned());
        self.record(MediaCall::AttachSource(source.to_owned()));
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.source.is_none() {
            return Err(PlaybackError::NoSource);
        }
        if !self.autoplay_allowed.get() {
            self.record(MediaCall::PlayRejected);
            return Err(PlaybackError::AutoplayRejected);
        }
        self.playing = true;
        self.record(MediaCall::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
        self.record(MediaCall::Pause);
    }
}

pub struct HeadlessHost {
    intersection_supported: bool,
    autoplay_allowed: Rc<Cell<bool>>,
    observers: Rc<RefCell<HashMap<ItemId, ObserverOptions>>>,
    media_log: CallLog,
    events: Option<EventSender>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            intersection_supported: true,
            autoplay_allowed: Rc::new(Cell::new(true)),
            observers: Rc::new(RefCell::new(HashMap::new())),
            media_log: Rc::new(RefCell::new(HashMap::new())),
            events: None,
        }
    }

    /// A host without intersection observation.
    pub fn without_intersection() -> Self {
        Self {
            intersection_supported: false,
            ..Self::new()
        }
    }

    /// Applies to elements already created as well as future ones.
    pub fn set_autoplay_allowed(&self, allowed: bool) {
        self.autoplay_allowed.set(allowed);
    }

    pub fn is_observed(&self, id: &ItemId) -> bool {
        self.observers.borrow().contains_key(id)
    }

    pub fn observer_options(&self, id: &ItemId) -> Option<ObserverOptions> {
        self.observers.borrow().get(id).copied()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Reports an intersection change for an observed block.
    /// Returns false if nothing observes `id`.
    pub fn set_intersecting(&self, id: &ItemId, intersecting: bool) -> bool {
        if !self.is_observed(id) {
            trace!(%id, "No observer registered, dropping intersection report");
            return false;
        }
        match &self.events {
            Some(events) => {
                events.intersection(id, intersecting);
                true
            }
            None => false,
        }
    }

    /// Reports every observed block as intersecting.
    pub fn scroll_all_into_view(&self) -> usize {
        let ids: Vec<ItemId> = self.observers.borrow().keys().cloned().collect();
        ids.iter()
            .filter(|id| self.set_intersecting(id, true))
            .count()
    }

    /// Delivers natural dimensions as a `loadedmetadata`/`load` callback would.
    pub fn load_metadata(&self, id: &ItemId, width: f64, height: f64) {
        if let Some(events) = &self.events {
            events.metadata_loaded(id, width, height);
        }
    }

    pub fn media_calls(&self, id: &ItemId) -> Vec<MediaCall> {
        self.media_log
            .borrow()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryHost for HeadlessHost {
    type Media = HeadlessMedia;

    fn attach(&mut self, events: EventSender) {
        self.events = Some(events);
    }

    fn create_media(&mut self, item: &GalleryItem) -> HeadlessMedia {
        HeadlessMedia {
            id: item.id.clone(),
            source: None,
            playing: false,
            autoplay_allowed: Rc::clone(&self.autoplay_allowed),
            log: Rc::clone(&self.media_log),
        }
    }

    fn observe(&mut self, id: &ItemId, options: &ObserverOptions) -> Option<ObserverRegistration> {
        if !self.intersection_supported {
            return None;
        }

        self.observers.borrow_mut().insert(id.clone(), *options);
        debug!(%id, root_margin = %options.root_margin(), "Observing block");

        let observers = Rc::downgrade(&self.observers);
        let id = id.clone();
        Some(ObserverRegistration::new(move || {
            if let Some(observers) = observers.upgrade() {
                observers.borrow_mut().remove(&id);
                trace!(%id, "Observer disconnected");
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_drop_disconnects() {
        let mut host = HeadlessHost::new();
        let id = ItemId::new("a");
        let registration = host.observe(&id, &ObserverOptions::default());
        assert!(registration.is_some());
        assert!(host.is_observed(&id));

        drop(registration);
        assert!(!host.is_observed(&id));
        assert!(!host.set_intersecting(&id, true));
    }

    #[test]
    fn test_without_intersection_returns_none() {
        let mut host = HeadlessHost::without_intersection();
        assert!(host
            .observe(&ItemId::new("a"), &ObserverOptions::default())
            .is_none());
        assert_eq!(host.observer_count(), 0);
    }

    #[test]
    fn test_media_records_calls() {
        let mut host = HeadlessHost::new();
        let item = GalleryItem::new("v", "clip", "/videos/clip.mp4");
        let mut media = host.create_media(&item);

        assert_eq!(media.play(), Err(PlaybackError::NoSource));
        media.attach_source("/videos/clip.mp4");
        assert_eq!(media.play(), Ok(()));
        assert!(media.is_playing());
        media.pause();

        host.set_autoplay_allowed(false);
        assert_eq!(media.play(), Err(PlaybackError::AutoplayRejected));
        assert!(!media.is_playing());

        assert_eq!(
            host.media_calls(&item.id),
            vec![
                MediaCall::AttachSource("/videos/clip.mp4".into()),
                MediaCall::Play,
                MediaCall::Pause,
                MediaCall::PlayRejected,
            ]
        );
    }
}
