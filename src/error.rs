use thiserror::Error;

use crate::models::ItemId;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("duplicate gallery item id: {0}")]
    DuplicateItemId(ItemId),
    #[error("no section at index {0}")]
    UnknownSection(usize),
    #[error("unsupported column count {0}, expected 1, 2, 3 or 4")]
    UnsupportedColumns(u32),
}

/// Failure reported by a host media element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("playback rejected by autoplay policy")]
    AutoplayRejected,
    #[error("media element has no source attached")]
    NoSource,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
