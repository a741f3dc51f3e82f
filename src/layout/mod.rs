pub mod grid;
pub mod layout_cache;

pub use grid::{GridLayoutEngine, SpanRules};
pub use layout_cache::{CachedLayoutComputer, LayoutCache};
