//! Host callback -> gallery event queue.
//!
//! Observer, media and preference callbacks never touch gallery state directly; they
//! post onto this queue and the gallery drains it run-to-completion in
//! [`Gallery::process_events`](crate::gallery::Gallery::process_events).

use flume::{Receiver, Sender};
use tracing::trace;

use crate::models::ItemId;

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    /// The block's sentinel entered or left the observation region.
    Intersection { id: ItemId, intersecting: bool },
    /// Natural dimensions became available for the item's media.
    MetadataLoaded { id: ItemId, width: f64, height: f64 },
    /// Reduced-motion preference as seen by one block's subscription.
    ReducedMotion { id: ItemId, reduced: bool },
}

impl GalleryEvent {
    pub fn id(&self) -> &ItemId {
        match self {
            Self::Intersection { id, .. }
            | Self::MetadataLoaded { id, .. }
            | Self::ReducedMotion { id, .. } => id,
        }
    }
}

/// Cloneable handle host callbacks use to reach the gallery.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<GalleryEvent>,
}

impl EventSender {
    pub fn send(&self, event: GalleryEvent) {
        if let Err(flume::SendError(event)) = self.tx.send(event) {
            trace!(id = %event.id(), "Gallery gone, dropping event");
        }
    }

    pub fn intersection(&self, id: &ItemId, intersecting: bool) {
        self.send(GalleryEvent::Intersection {
            id: id.clone(),
            intersecting,
        });
    }

    pub fn metadata_loaded(&self, id: &ItemId, width: f64, height: f64) {
        self.send(GalleryEvent::MetadataLoaded {
            id: id.clone(),
            width,
            height,
        });
    }

    pub fn reduced_motion(&self, id: &ItemId, reduced: bool) {
        self.send(GalleryEvent::ReducedMotion {
            id: id.clone(),
            reduced,
        });
    }
}

pub(crate) fn channel() -> (EventSender, Receiver<GalleryEvent>) {
    let (tx, rx) = flume::unbounded();
    (EventSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (sender, rx) = channel();
        let id = ItemId::new("a");
        sender.intersection(&id, true);
        sender.metadata_loaded(&id, 10.0, 20.0);
        sender.reduced_motion(&id, true);

        let events: Vec<GalleryEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], GalleryEvent::Intersection { intersecting: true, .. }));
        assert!(matches!(events[1], GalleryEvent::MetadataLoaded { .. }));
        assert!(matches!(events[2], GalleryEvent::ReducedMotion { reduced: true, .. }));
        assert!(events.iter().all(|e| e.id() == &id));
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (sender, rx) = channel();
        drop(rx);
        sender.intersection(&ItemId::new("gone"), true);
    }
}
