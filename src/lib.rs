//! Gallery layout and playback engine for the folio portfolio.
//!
//! - [`layout`] - greedy grid packing over measured aspect ratios, plus a layout cache
//! - [`models`] - gallery items, placements and the aspect-ratio store
//! - [`playback`] - visibility latch, playback state machine, reduced-motion signal
//! - [`gallery`] - the container wiring host events to the above
//! - [`host`] - capabilities consumed from the rendering host, and a headless host

pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod host;
pub mod layout;
pub mod models;
pub mod playback;

pub use config::{GalleryConfig, GridView};
pub use error::{ConfigError, GalleryError, PlaybackError};
pub use events::{EventSender, GalleryEvent};
pub use gallery::{Gallery, ProcessSummary, RenderDirective, Section, SectionView};
pub use host::{GalleryHost, MediaElement, ObserverRegistration};
pub use layout::{GridLayoutEngine, SpanRules};
pub use models::{AspectRatioStore, GalleryItem, GridLayout, ItemId, Placement};
pub use playback::{PlaybackPhase, ReducedMotionSignal};
