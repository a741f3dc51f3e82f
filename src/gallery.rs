//! The gallery container: sections of items, their grid layouts and one block per
//! item tracking visibility and (for videos) playback.
//!
//! Host callbacks arrive as [`GalleryEvent`]s on the queue returned by
//! [`Gallery::events`]. Nothing happens until [`Gallery::process_events`] drains it;
//! layouts are then recomputed from scratch whenever the aspect-ratio store moved.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use flume::Receiver;
use tracing::{debug, info, trace};

use crate::config::{GalleryConfig, GridView};
use crate::error::GalleryError;
use crate::events::{self, EventSender, GalleryEvent};
use crate::host::{GalleryHost, MediaElement, ObserverRegistration};
use crate::layout::{CachedLayoutComputer, GridLayoutEngine};
use crate::models::{AspectRatioStore, BlockContent, GalleryItem, GridLayout, ItemId, Placement};
use crate::playback::{
    PlaybackController, PlaybackEvent, PlaybackPhase, ReducedMotionSignal, VisibilityState,
};

/// A titled group of items with its own grid.
#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub description: String,
    /// Whether the description is shown
    pub expanded: bool,
    pub items: Vec<GalleryItem>,
}

impl Section {
    pub fn new(title: impl Into<String>, items: Vec<GalleryItem>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            expanded: false,
            items,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

enum BlockKind<M: MediaElement> {
    /// Image or placeholder: visibility only drives the lazy reveal.
    Still(VisibilityState),
    Video(PlaybackController<M>),
}

struct Block<M: MediaElement> {
    kind: BlockKind<M>,
    /// Dropped (and so disconnected) with the block.
    _registration: Option<ObserverRegistration>,
}

impl<M: MediaElement> Block<M> {
    fn visibility(&self) -> VisibilityState {
        match &self.kind {
            BlockKind::Still(visibility) => *visibility,
            BlockKind::Video(controller) => controller.visibility(),
        }
    }

    /// Whether this block was mounted for the same kind of content and source as `item`.
    fn matches(&self, item: &GalleryItem) -> bool {
        match (&self.kind, item.source.as_deref()) {
            (BlockKind::Video(controller), Some(source)) => {
                item.is_video() && controller.source() == source
            }
            (BlockKind::Video(_), None) => false,
            (BlockKind::Still(_), source) => !(item.is_video() && source.is_some()),
        }
    }

    fn observe(&mut self, intersecting: bool) {
        match &mut self.kind {
            BlockKind::Still(visibility) => *visibility = visibility.observe(intersecting),
            BlockKind::Video(controller) => {
                controller.handle(PlaybackEvent::Intersection(intersecting));
            }
        }
    }
}

/// Everything the rendering surface needs for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDirective<'a> {
    pub id: &'a ItemId,
    pub label: &'a str,
    pub content: BlockContent<'a>,
    pub role: &'static str,
    pub placement: Placement,
    pub visibility: VisibilityState,
    /// Lazy reveal: true once the block has entered the observation region.
    pub reveal: bool,
    /// Video blocks only
    pub playback: Option<PlaybackPhase>,
    /// Source currently attached to the video element, if any
    pub attached_source: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct SectionView<'a> {
    pub title: &'a str,
    /// Present only while the section is expanded
    pub description: Option<&'a str>,
    pub expanded: bool,
    pub layout: Arc<GridLayout>,
    pub directives: Vec<RenderDirective<'a>>,
}

/// Result of one [`Gallery::process_events`] turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub events: usize,
    /// Events addressed to blocks that no longer exist
    pub discarded: usize,
    /// True when a measurement changed the store, so layouts must be re-read.
    pub relayout: bool,
}

pub struct Gallery<H: GalleryHost> {
    config: GalleryConfig,
    view: GridView,
    host: H,
    sections: Vec<Section>,
    store: AspectRatioStore,
    layouts: CachedLayoutComputer,
    blocks: HashMap<ItemId, Block<H::Media>>,
    motion: ReducedMotionSignal,
    events: EventSender,
    inbox: Receiver<GalleryEvent>,
}

impl<H: GalleryHost> Gallery<H> {
    /// Mounts a gallery: validates ids, attaches the host and creates one block per item.
    pub fn mount(
        config: GalleryConfig,
        mut host: H,
        motion: ReducedMotionSignal,
        sections: Vec<Section>,
    ) -> Result<Self, GalleryError> {
        check_unique_ids(sections.iter().flat_map(|s| s.items.iter()))?;

        let (events, inbox) = events::channel();
        host.attach(events.clone());

        let engine = GridLayoutEngine::new(config.base_row_unit_px, config.span_rules);
        let mut gallery = Self {
            view: config.view,
            layouts: CachedLayoutComputer::new(engine, config.layout_cache_entries),
            config,
            host,
            sections,
            store: AspectRatioStore::new(),
            blocks: HashMap::new(),
            motion,
            events,
            inbox,
        };

        let items: Vec<GalleryItem> = gallery
            .sections
            .iter()
            .flat_map(|s| s.items.iter().cloned())
            .collect();
        for item in &items {
            gallery.mount_block(item);
        }

        info!(
            sections = gallery.sections.len(),
            blocks = gallery.blocks.len(),
            view = %gallery.view,
            "Mounted gallery"
        );
        Ok(gallery)
    }

    fn mount_block(&mut self, item: &GalleryItem) {
        let registration = self.host.observe(&item.id, &self.config.observer);
        if registration.is_none() {
            // Fail open: no observer means the block counts as visible from the next turn on.
            debug!(
                id = %item.id,
                "Intersection observation unavailable, treating block as visible"
            );
            self.events.intersection(&item.id, true);
        }

        let kind = match item.source.as_deref() {
            Some(source) if item.is_video() => {
                let media = self.host.create_media(item);
                BlockKind::Video(PlaybackController::new(
                    item.id.clone(),
                    source,
                    media,
                    &self.motion,
                    &self.events,
                ))
            }
            _ => BlockKind::Still(VisibilityState::new()),
        };

        trace!(id = %item.id, video = item.is_video(), "Mounted block");
        self.blocks.insert(
            item.id.clone(),
            Block {
                kind,
                _registration: registration,
            },
        );
    }

    fn unmount_block(&mut self, id: &ItemId) {
        if let Some(mut block) = self.blocks.remove(id) {
            if let BlockKind::Video(controller) = &mut block.kind {
                controller.teardown();
            }
            trace!(%id, "Unmounted block");
        }
    }

    /// Handle for host callbacks.
    pub fn events(&self) -> EventSender {
        self.events.clone()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn view(&self) -> GridView {
        self.view
    }

    pub fn set_view(&mut self, view: GridView) {
        if self.view != view {
            debug!(from = %self.view, to = %view, "Grid view changed");
            self.view = view;
        }
    }

    pub fn set_columns(&mut self, columns: u32) -> Result<(), GalleryError> {
        self.set_view(GridView::from_columns(columns)?);
        Ok(())
    }

    pub fn reduced_motion(&self) -> bool {
        self.motion.get()
    }

    pub fn store(&self) -> &AspectRatioStore {
        &self.store
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Flips a section's description; returns the new state.
    pub fn toggle_section(&mut self, index: usize) -> Result<bool, GalleryError> {
        let section = self
            .sections
            .get_mut(index)
            .ok_or(GalleryError::UnknownSection(index))?;
        section.expanded = !section.expanded;
        Ok(section.expanded)
    }

    /// Replaces a section's items.
    ///
    /// Blocks whose id survives (in any section) with unchanged content keep their visibility
    /// latch and attached source. Blocks for dropped ids, or whose item switched between image
    /// and video or changed source, are torn down before this returns; the latter are
    /// remounted fresh.
    pub fn set_section_items(
        &mut self,
        index: usize,
        items: Vec<GalleryItem>,
    ) -> Result<(), GalleryError> {
        if index >= self.sections.len() {
            return Err(GalleryError::UnknownSection(index));
        }
        check_unique_ids(
            self.sections
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .flat_map(|(_, s)| s.items.iter())
                .chain(items.iter()),
        )?;

        self.sections[index].items = items;

        let live: HashSet<ItemId> = self
            .sections
            .iter()
            .flat_map(|s| s.items.iter().map(|item| item.id.clone()))
            .collect();
        let mut stale: Vec<ItemId> = self
            .blocks
            .keys()
            .filter(|id| !live.contains(*id))
            .cloned()
            .collect();
        stale.extend(self.sections[index].items.iter().filter_map(|item| {
            let block = self.blocks.get(&item.id)?;
            (!block.matches(item)).then(|| item.id.clone())
        }));
        for id in &stale {
            self.unmount_block(id);
        }

        let fresh: Vec<GalleryItem> = self.sections[index]
            .items
            .iter()
            .filter(|item| !self.blocks.contains_key(&item.id))
            .cloned()
            .collect();
        for item in &fresh {
            self.mount_block(item);
        }

        debug!(
            section = index,
            removed = stale.len(),
            added = fresh.len(),
            "Section items replaced"
        );
        Ok(())
    }

    /// Drains the event queue, including events posted while draining.
    pub fn process_events(&mut self) -> ProcessSummary {
        let revision = self.store.revision();
        let inbox = self.inbox.clone();
        let mut summary = ProcessSummary::default();

        for event in inbox.try_iter() {
            summary.events += 1;
            if !self.dispatch(event) {
                summary.discarded += 1;
            }
        }

        summary.relayout = self.store.revision() != revision;
        if summary.events > 0 {
            debug!(
                events = summary.events,
                discarded = summary.discarded,
                relayout = summary.relayout,
                "Processed gallery events"
            );
        }
        summary
    }

    fn dispatch(&mut self, event: GalleryEvent) -> bool {
        let Some(block) = self.blocks.get_mut(event.id()) else {
            trace!(id = %event.id(), "Event for unmounted block discarded");
            return false;
        };

        match event {
            GalleryEvent::Intersection { intersecting, .. } => block.observe(intersecting),
            GalleryEvent::MetadataLoaded { id, width, height } => {
                self.store.record_measurement(&id, width, height);
            }
            GalleryEvent::ReducedMotion { reduced, .. } => {
                if let BlockKind::Video(controller) = &mut block.kind {
                    controller.handle(PlaybackEvent::ReducedMotion(reduced));
                }
            }
        }
        true
    }

    /// Grid layout of one section for the current view and measurements.
    pub fn layout(&self, index: usize) -> Result<Arc<GridLayout>, GalleryError> {
        let section = self
            .sections
            .get(index)
            .ok_or(GalleryError::UnknownSection(index))?;
        Ok(self
            .layouts
            .compute(self.view.columns(), &section.items, &self.store))
    }

    pub fn visibility(&self, id: &ItemId) -> Option<VisibilityState> {
        self.blocks.get(id).map(Block::visibility)
    }

    pub fn playback_phase(&self, id: &ItemId) -> Option<PlaybackPhase> {
        match &self.blocks.get(id)?.kind {
            BlockKind::Video(controller) => Some(controller.phase()),
            BlockKind::Still(_) => None,
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Render directives for every section, in section and item order.
    pub fn render(&self) -> Vec<SectionView<'_>> {
        let columns = self.view.columns();
        self.sections
            .iter()
            .map(|section| {
                let layout = self.layouts.compute(columns, &section.items, &self.store);
                let directives = section
                    .items
                    .iter()
                    .zip(layout.placements.iter())
                    .map(|(item, placement)| self.directive(item, placement))
                    .collect();
                SectionView {
                    title: &section.title,
                    description: section.expanded.then_some(section.description.as_str()),
                    expanded: section.expanded,
                    layout,
                    directives,
                }
            })
            .collect()
    }

    fn directive<'a>(
        &'a self,
        item: &'a GalleryItem,
        placement: &Placement,
    ) -> RenderDirective<'a> {
        let block = self.blocks.get(&item.id);
        let visibility = block.map(Block::visibility).unwrap_or_default();
        let (playback, attached_source) = match block.map(|b| &b.kind) {
            Some(BlockKind::Video(controller)) => {
                (Some(controller.phase()), controller.attached_source())
            }
            _ => (None, None),
        };
        let content = item.content();

        RenderDirective {
            id: &item.id,
            label: &item.label,
            role: content.role(),
            content,
            placement: placement.clone(),
            visibility,
            reveal: visibility.has_entered_once(),
            playback,
            attached_source,
        }
    }

    /// Tears down every block and drops the store.
    pub fn unmount(self) {
        info!(blocks = self.blocks.len(), "Unmounting gallery");
    }
}

impl<H: GalleryHost> Drop for Gallery<H> {
    fn drop(&mut self) {
        let ids: Vec<ItemId> = self.blocks.keys().cloned().collect();
        for id in &ids {
            self.unmount_block(id);
        }
    }
}

fn check_unique_ids<'a>(items: impl Iterator<Item = &'a GalleryItem>) -> Result<(), GalleryError> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(&item.id) {
            return Err(GalleryError::DuplicateItemId(item.id.clone()));
        }
    }
    Ok(())
}
