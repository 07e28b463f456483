pub mod item;
pub mod media;

pub use item::Item;
pub use media::ResolvedMedia;
