/// Last reported intersection of a block's sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Observation {
    #[default]
    Unobserved,
    OutOfView,
    InView,
}

/// Visibility of one rendered block.
///
/// `has_entered_once` is a latch: the first intersecting report sets it and nothing
/// clears it. It gates lazy activation (source attach, image reveal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityState {
    observation: Observation,
    has_entered_once: bool,
}

impl VisibilityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one intersection report.
    pub fn observe(self, intersecting: bool) -> Self {
        Self {
            observation: if intersecting {
                Observation::InView
            } else {
                Observation::OutOfView
            },
            has_entered_once: self.has_entered_once || intersecting,
        }
    }

    pub fn observation(&self) -> Observation {
        self.observation
    }

    pub fn is_in_view(&self) -> bool {
        self.observation == Observation::InView
    }

    pub fn has_entered_once(&self) -> bool {
        self.has_entered_once
    }
}

/// Intersection observer settings requested from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Vertical margin added around the viewport, in pixels (default: 600)
    pub root_margin_px: f32,
    /// Fraction of the sentinel that must intersect (default: 0.01)
    pub threshold: f32,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin_px: 600.0,
            threshold: 0.01,
        }
    }
}

impl ObserverOptions {
    /// CSS-style `rootMargin` string.
    pub fn root_margin(&self) -> String {
        format!("{}px 0px", self.root_margin_px)
    }
}
