use std::fmt;

/// Stable identity of a gallery item across renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Video containers the gallery plays inline; everything else is shown as an image.
    const VIDEO_EXTENSIONS: [&'static str; 3] = ["mp4", "webm", "mov"];

    pub fn from_extension(ext: &str) -> Self {
        if Self::VIDEO_EXTENSIONS
            .iter()
            .any(|v| v.eq_ignore_ascii_case(ext))
        {
            Self::Video
        } else {
            Self::Image
        }
    }

    /// Classifies a source locator: video when `.mp4`, `.webm` or `.mov` appears anywhere
    /// in it directly before a `?` or the end of the string.
    pub fn from_source(source: &str) -> Self {
        let is_video = source.match_indices('.').any(|(dot, _)| {
            let rest = &source[dot + 1..];
            let ext_len = rest.find('?').unwrap_or(rest.len());
            Self::from_extension(&rest[..ext_len]) == Self::Video
        });
        if is_video {
            Self::Video
        } else {
            Self::Image
        }
    }
}

#[derive(Debug, Clone)]
pub struct GalleryItem {
    pub id: ItemId,
    pub label: String,
    pub source: Option<String>,
    pub media_type: MediaType,
    pub show_trademark: bool,
    pub static_aspect_ratio: Option<f64>,
}

impl GalleryItem {
    /// Create an item backed by a media source; the media type follows the source suffix.
    pub fn new(id: impl Into<ItemId>, label: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            id: id.into(),
            label: label.into(),
            media_type: MediaType::from_source(&source),
            source: Some(source),
            show_trademark: false,
            static_aspect_ratio: None,
        }
    }

    /// Create a placeholder item with no media behind it.
    pub fn placeholder(id: impl Into<ItemId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            source: None,
            media_type: MediaType::Image,
            show_trademark: false,
            static_aspect_ratio: None,
        }
    }

    pub fn with_aspect_ratio(mut self, ratio: f64) -> Self {
        self.static_aspect_ratio = Some(ratio);
        self
    }

    pub fn with_trademark(mut self, show: bool) -> Self {
        self.show_trademark = show;
        self
    }

    pub fn is_video(&self) -> bool {
        self.source.is_some() && self.media_type == MediaType::Video
    }

    /// Designer-supplied fallback ratio, if it is usable.
    pub fn fallback_ratio(&self) -> Option<f64> {
        self.static_aspect_ratio
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
    }

    pub fn content(&self) -> BlockContent<'_> {
        match self.source.as_deref() {
            Some(source) if self.is_video() => BlockContent::Video { source },
            Some(source) => BlockContent::Image { source },
            None => BlockContent::Placeholder {
                show_trademark: self.show_trademark,
            },
        }
    }
}

/// What a rendered block shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockContent<'a> {
    Video { source: &'a str },
    Image { source: &'a str },
    Placeholder { show_trademark: bool },
}

impl BlockContent<'_> {
    /// Accessibility role of the block container.
    pub fn role(&self) -> &'static str {
        match self {
            Self::Video { .. } => "application",
            Self::Image { .. } | Self::Placeholder { .. } => "img",
        }
    }
}
