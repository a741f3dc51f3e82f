pub mod aspect_store;
pub mod gallery_item;
pub mod placement;

pub use aspect_store::*;
pub use gallery_item::*;
pub use placement::*;
